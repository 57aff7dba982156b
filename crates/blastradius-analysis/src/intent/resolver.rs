//! Two-pass fuzzy resolution of oracle hints onto live symbols.
//!
//! Pass A is precision: score oracle hints against symbol names and file
//! paths. Pass B is recall and the relevance gate: score domain keywords
//! pulled from the raw prompt. A prompt that fails both is foreign to the
//! codebase and produces no analysis.

use blastradius_core::config::RadiusConfig;
use blastradius_core::types::collections::FxHashSet;
use blastradius_core::types::intent::{Confidence, IntentDescriptor};
use blastradius_core::types::symbol::{Symbol, SymbolId, SymbolIndex};

/// Words that carry no domain signal in a prompt: articles, pronouns,
/// change verbs, and generic code vocabulary.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "it", "its", "we", "our", "you",
    "your", "i", "my", "me", "and", "or", "not", "but", "with", "without", "for", "from",
    "into", "onto", "of", "in", "on", "to", "at", "by", "as", "is", "are", "was", "be",
    "been", "will", "would", "should", "could", "can", "do", "does", "did", "make",
    "makes", "add", "adds", "remove", "removes", "delete", "deletes", "change", "changes",
    "changed", "update", "updates", "modify", "modifies", "rename", "renames", "refactor",
    "use", "uses", "using", "new", "old", "all", "some", "any", "when", "what", "how",
    "where", "which", "want", "need", "please", "file", "files", "function", "functions",
    "method", "methods", "class", "classes", "type", "types", "module", "modules",
    "code", "symbol", "symbols", "variable", "variables", "interface", "interfaces",
];

/// Exported symbols score a small visibility bonus, capped at 1.0.
const EXPORTED_BONUS: f32 = 0.05;

/// A symbol the resolver matched to the intent.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub symbol_id: SymbolId,
    pub score: f32,
    pub confidence: Confidence,
}

/// Output of the two-pass resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolutionOutcome {
    /// False when the prompt cleared neither pass: the UI must be told the
    /// prompt is foreign to the codebase.
    pub relevant: bool,
    pub targets: Vec<ResolvedTarget>,
    pub hint_hits: usize,
    pub best_keyword_score: f32,
}

/// Resolve `descriptor` against the live index.
pub fn resolve_intent(
    descriptor: &IntentDescriptor,
    index: &SymbolIndex,
    project_root: &str,
    config: &RadiusConfig,
) -> ResolutionOutcome {
    // Pass A: high precision against hints.
    let mut pass_a: Vec<ResolvedTarget> = Vec::new();
    if !descriptor.symbol_hints.is_empty() || !descriptor.file_hints.is_empty() {
        for (_, symbol) in index.iter() {
            let score = hint_score(symbol, descriptor, project_root);
            if score >= config.hint_acceptance_threshold {
                pass_a.push(ResolvedTarget {
                    symbol_id: symbol.id.clone(),
                    score,
                    confidence: Confidence::from_score(score),
                });
            }
        }
    }
    sort_by_score(&mut pass_a);
    let hint_hits = pass_a.len();

    // Pass B: recall over prompt keywords.
    let keywords = extract_keywords(&descriptor.prompt);
    let mut pass_b: Vec<ResolvedTarget> = Vec::new();
    let mut best_keyword_score = 0.0f32;
    if !keywords.is_empty() {
        for (_, symbol) in index.iter() {
            let score = keyword_score(symbol, &keywords);
            best_keyword_score = best_keyword_score.max(score);
            if score >= config.keyword_acceptance_threshold {
                pass_b.push(ResolvedTarget {
                    symbol_id: symbol.id.clone(),
                    score,
                    confidence: Confidence::from_score(score),
                });
            }
        }
    }
    sort_by_score(&mut pass_b);

    let relevant = hint_hits > 0 || best_keyword_score >= config.relevance_threshold;

    let targets = if hint_hits > 0 {
        pass_a.truncate(config.max_resolved_hints);
        pass_a
    } else {
        pass_b.truncate(config.max_resolved_keywords);
        pass_b
    };

    ResolutionOutcome {
        relevant,
        targets,
        hint_hits,
        best_keyword_score,
    }
}

/// Combined pass-A score: symbol hints weighted 0.7 against file hints 0.3
/// when both are present, plus the exported bonus.
fn hint_score(symbol: &Symbol, descriptor: &IntentDescriptor, project_root: &str) -> f32 {
    let best_symbol = descriptor
        .symbol_hints
        .iter()
        .map(|hint| name_score(&symbol.name, hint))
        .fold(0.0f32, f32::max);

    let relative = relative_path(&symbol.file_path, project_root);
    let best_file = descriptor
        .file_hints
        .iter()
        .map(|hint| path_score(&relative, hint))
        .fold(0.0f32, f32::max);

    let combined = match (
        descriptor.symbol_hints.is_empty(),
        descriptor.file_hints.is_empty(),
    ) {
        (false, false) => 0.7 * best_symbol + 0.3 * best_file,
        (false, true) => best_symbol,
        (true, false) => best_file,
        (true, true) => 0.0,
    };

    apply_exported_bonus(combined, symbol.is_exported)
}

/// Tiered name similarity: exact, mutual substring, token overlap.
pub fn name_score(name: &str, hint: &str) -> f32 {
    let a = name.to_lowercase();
    let b = hint.trim().to_lowercase();
    if b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    if a.contains(&b) || b.contains(&a) {
        let (shorter, longer) = if a.len() <= b.len() {
            (a.len(), b.len())
        } else {
            (b.len(), a.len())
        };
        let ratio = shorter as f32 / longer as f32;
        if ratio >= 0.4 {
            return 0.5 + 0.3 * ratio;
        }
    }

    // Tokenize the original casing: lowercasing first would erase the
    // camelCase boundaries the tokenizer splits on.
    let overlap = jaccard(&tokenize(name), &tokenize(hint.trim()));
    if overlap >= 0.25 {
        overlap * 0.9
    } else {
        0.0
    }
}

/// Same tiers as `name_score`, over workspace-relative path tokens.
fn path_score(relative_path: &str, hint: &str) -> f32 {
    let normalized_hint = hint.trim().trim_start_matches("./").replace('\\', "/");
    let a = relative_path.to_lowercase();
    let b = normalized_hint.to_lowercase();
    if b.is_empty() {
        return 0.0;
    }
    if a == b || a.ends_with(&b) {
        return 1.0;
    }

    if a.contains(&b) || b.contains(&a) {
        let (shorter, longer) = if a.len() <= b.len() {
            (a.len(), b.len())
        } else {
            (b.len(), a.len())
        };
        let ratio = shorter as f32 / longer as f32;
        if ratio >= 0.4 {
            return 0.5 + 0.3 * ratio;
        }
    }

    let overlap = jaccard(&tokenize(relative_path), &tokenize(&normalized_hint));
    if overlap >= 0.25 {
        overlap * 0.9
    } else {
        0.0
    }
}

/// Pass-B score: average of the best per-keyword tier across the symbol's
/// name tokens, plus the exported bonus.
fn keyword_score(symbol: &Symbol, keywords: &[String]) -> f32 {
    let tokens = tokenize(&symbol.name);
    if tokens.is_empty() {
        return 0.0;
    }

    let mut sum = 0.0f32;
    for keyword in keywords {
        let mut best = 0.0f32;
        for token in &tokens {
            let tier = if token == keyword {
                1.0
            } else if token.starts_with(keyword.as_str())
                || token.ends_with(keyword.as_str())
                || keyword.starts_with(token.as_str())
                || keyword.ends_with(token.as_str())
            {
                0.7
            } else if token.contains(keyword.as_str()) || keyword.contains(token.as_str()) {
                0.4
            } else {
                0.0
            };
            best = best.max(tier);
        }
        sum += best;
    }

    let base = (sum / keywords.len() as f32).min(1.0);
    apply_exported_bonus(base, symbol.is_exported)
}

/// Domain keywords from the raw prompt: lowercased alphanumeric runs with
/// stopwords and short tokens dropped.
pub fn extract_keywords(prompt: &str) -> Vec<String> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut keywords = Vec::new();
    for raw in prompt.split(|c: char| !c.is_alphanumeric()) {
        let word = raw.to_lowercase();
        if word.len() < 3 || STOPWORDS.contains(&word.as_str()) {
            continue;
        }
        if seen.insert(word.clone()) {
            keywords.push(word);
        }
    }
    keywords
}

/// Split an identifier or path on camel, snake, kebab, dot, and slash
/// boundaries. Single-character fragments are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in text.chars() {
        if !ch.is_alphanumeric() {
            flush(&mut current, &mut tokens);
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            flush(&mut current, &mut tokens);
        }
        prev_lower = ch.is_lowercase() || ch.is_numeric();
        current.extend(ch.to_lowercase());
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if current.len() >= 2 {
        tokens.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

fn jaccard(a: &[String], b: &[String]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_a: FxHashSet<&String> = a.iter().collect();
    let set_b: FxHashSet<&String> = b.iter().collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

fn apply_exported_bonus(score: f32, exported: bool) -> f32 {
    if exported && score > 0.0 {
        (score + EXPORTED_BONUS).min(1.0)
    } else {
        score
    }
}

fn relative_path(absolute: &str, project_root: &str) -> String {
    absolute
        .strip_prefix(project_root)
        .map(|rest| rest.trim_start_matches('/').to_string())
        .unwrap_or_else(|| absolute.to_string())
}

fn sort_by_score(targets: &mut [ResolvedTarget]) {
    targets.sort_by(|x, y| {
        y.score
            .partial_cmp(&x.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.symbol_id.cmp(&y.symbol_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_name_match_scores_one() {
        assert_eq!(name_score("parseConfig", "parseconfig"), 1.0);
    }

    #[test]
    fn mutual_substring_requires_length_similarity() {
        // "parse" inside "parseConfiguration" misses the 40% ratio and
        // falls through to token overlap: {parse} vs {parse,configuration}.
        let fallthrough = name_score("parseConfiguration", "parse");
        assert!((fallthrough - 0.45).abs() < 1e-6);
        let score = name_score("parseConfig", "parseConf");
        assert!(score > 0.5 && score < 1.0);
    }

    #[test]
    fn token_overlap_scores_scaled_jaccard() {
        let score = name_score("fetchUserProfile", "loadUserProfile");
        // tokens {fetch,user,profile} vs {load,user,profile}: 2/4 = 0.5.
        assert!((score - 0.45).abs() < 1e-6);
    }

    #[test]
    fn tokenizer_splits_all_casings() {
        assert_eq!(tokenize("fetchUserHTTP"), vec!["fetch", "user", "http"]);
        assert_eq!(tokenize("snake_case-kebab.dot"), vec!["snake", "case", "kebab", "dot"]);
    }

    #[test]
    fn keywords_drop_stopwords_and_short_words() {
        let kw = extract_keywords("Add a new route to the payment handler");
        assert_eq!(kw, vec!["route", "payment", "handler"]);
    }
}
