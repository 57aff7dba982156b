//! Signature canonicalization and fingerprinting.
//!
//! The fingerprint must not move when a type is reformatted or when
//! logically commutative constructs are reordered. Canonicalization
//! collapses whitespace and sorts union members, intersection members, and
//! top-level object-literal properties; "top-level" means bracket-nesting
//! depth zero with respect to `<>`, `{}`, `()`, `[]`.

use sha2::{Digest, Sha256};

/// Hex length of a signature fingerprint.
const HASH_LEN: usize = 16;

/// Truncated sha-256 of a canonical surface string.
pub fn hash_signature(surface: &str) -> String {
    let digest = Sha256::digest(surface.as_bytes());
    let mut hex = String::with_capacity(HASH_LEN);
    for byte in digest.iter().take(HASH_LEN / 2) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Canonical form of a type annotation's text.
pub fn canonicalize_type(raw: &str) -> String {
    let text = collapse_whitespace(raw);

    let unions = split_top_level(&text, '|');
    if unions.len() > 1 {
        let mut members: Vec<String> = unions.iter().map(|m| canonicalize_type(m)).collect();
        members.sort_unstable();
        return members.join(" | ");
    }

    let intersections = split_top_level(&text, '&');
    if intersections.len() > 1 {
        let mut members: Vec<String> = intersections.iter().map(|m| canonicalize_type(m)).collect();
        members.sort_unstable();
        return members.join(" & ");
    }

    if let Some(interior) = object_literal_interior(&text) {
        let mut members: Vec<String> = split_members(interior)
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        members.sort_unstable();
        return format!("{{ {} }}", members.join("; "));
    }

    text
}

/// Surface string for a callable: `(name:canonType,...):canonReturn`.
pub fn callable_surface(params: &[(String, String)], return_type: &str) -> String {
    let rendered: Vec<String> = params
        .iter()
        .map(|(name, ty)| format!("{name}:{}", canonicalize_type(ty)))
        .collect();
    format!("({}):{}", rendered.join(","), canonicalize_type(return_type))
}

/// Surface string for an interface: sorted canonical member texts.
pub fn interface_surface(members: &[String]) -> String {
    let mut canon: Vec<String> = members
        .iter()
        .map(|m| collapse_whitespace(m.trim().trim_end_matches([';', ','])))
        .filter(|m| !m.is_empty())
        .collect();
    canon.sort_unstable();
    canon.join(";")
}

/// Surface string for a class: base class plus sorted implements list.
pub fn class_surface(base: Option<&str>, implements: &[String]) -> String {
    let mut impls: Vec<String> = implements.iter().map(|i| collapse_whitespace(i)).collect();
    impls.sort_unstable();
    format!(
        "class:{}:[{}]",
        base.map(collapse_whitespace).unwrap_or_default(),
        impls.join(",")
    )
}

/// Surface string for an enum: sorted `name=value` pairs.
pub fn enum_surface(members: &[(String, String)]) -> String {
    let mut pairs: Vec<String> = members
        .iter()
        .map(|(name, value)| format!("{name}={}", collapse_whitespace(value)))
        .collect();
    pairs.sort_unstable();
    pairs.join(",")
}

fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_ws = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(ch);
            in_ws = false;
        }
    }
    out
}

/// Split on `sep` at bracket depth zero. `=>` does not close a generic.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut prev = '\0';

    for ch in text.chars() {
        match ch {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' if prev != '=' => depth -= 1,
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
        if ch == sep && depth == 0 {
            parts.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(ch);
        }
        prev = ch;
    }
    parts.push(current.trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// The interior of `{ ... }` when the braces span the whole string.
fn object_literal_interior(text: &str) -> Option<&str> {
    if !text.starts_with('{') || !text.ends_with('}') {
        return None;
    }
    let mut depth = 0i32;
    let mut prev = '\0';
    for (i, ch) in text.char_indices() {
        match ch {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' if prev != '=' => depth -= 1,
            '}' | ')' | ']' => {
                depth -= 1;
                if depth == 0 && i != text.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
        prev = ch;
    }
    Some(&text[1..text.len() - 1])
}

/// Split object-literal members on `;` or `,` at depth zero.
fn split_members(interior: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut prev = '\0';

    for ch in interior.chars() {
        match ch {
            '<' | '{' | '(' | '[' => depth += 1,
            '>' if prev != '=' => depth -= 1,
            '}' | ')' | ']' => depth -= 1,
            _ => {}
        }
        if (ch == ';' || ch == ',') && depth == 0 {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
        prev = ch;
    }
    parts.push(current);
    parts
}
