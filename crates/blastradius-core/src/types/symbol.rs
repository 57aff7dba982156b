//! The symbol model: stable ids, declaration records, and the live index.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;

/// Reserved id prefix for hypothetical symbols synthesized by `add` intents.
pub const PHANTOM_PREFIX: &str = "__phantom__";

/// Stable symbol identifier: `absolutePath#qualifiedName`.
///
/// The path is absolute and normalized to forward slashes; the qualified
/// name uses dotted form for nested members (`Class.method`). The id is
/// stable across re-parses as long as neither component changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(String);

impl SymbolId {
    pub fn new(file_path: &str, qualified_name: &str) -> Self {
        Self(format!("{file_path}#{qualified_name}"))
    }

    /// Id for a phantom symbol (`__phantom__#name`).
    pub fn phantom(name: &str) -> Self {
        Self(format!("{PHANTOM_PREFIX}#{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file-path component (everything before the first `#`).
    pub fn file_path(&self) -> &str {
        self.0.split_once('#').map(|(p, _)| p).unwrap_or(&self.0)
    }

    /// The qualified-name component (everything after the first `#`).
    pub fn qualified_name(&self) -> &str {
        self.0.split_once('#').map(|(_, q)| q).unwrap_or("")
    }

    pub fn is_phantom(&self) -> bool {
        self.file_path() == PHANTOM_PREFIX
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SymbolId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Declaration kind of an indexed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
    TypeAlias,
    Enum,
    Variable,
    Method,
    Property,
}

impl SymbolKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::TypeAlias => "type-alias",
            Self::Enum => "enum",
            Self::Variable => "variable",
            Self::Method => "method",
            Self::Property => "property",
        }
    }
}

/// A named declaration extracted from a source file.
///
/// Line numbers are 1-based inclusive; offsets are absolute byte positions
/// from file start, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub qualified_name: String,
    pub kind: SymbolKind,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_offset: u32,
    pub end_offset: u32,
    pub is_exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SymbolId>,
    /// 16-hex-digit fingerprint of the public-API surface.
    pub signature_hash: String,
}

impl Symbol {
    /// Whether the symbol's byte range overlaps `[start, end]` (inclusive).
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start_offset <= end && start <= self.end_offset
    }
}

/// Mapping from symbol id to symbol.
///
/// Owned by the incremental updater; speculative analyses clone it and
/// mutate the clone freely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolIndex {
    symbols: FxHashMap<SymbolId, Symbol>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.id.clone(), symbol);
    }

    pub fn remove(&mut self, id: &SymbolId) -> Option<Symbol> {
        self.symbols.remove(id)
    }

    pub fn get(&self, id: &SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn contains(&self, id: &SymbolId) -> bool {
        self.symbols.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SymbolId> {
        self.symbols.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SymbolId, &Symbol)> {
        self.symbols.iter()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// All symbols declared in `file_path`.
    pub fn symbols_in_file<'a>(&'a self, file_path: &'a str) -> impl Iterator<Item = &'a Symbol> {
        self.symbols.values().filter(move |s| s.file_path == file_path)
    }

    /// Ids of all symbols declared in `file_path`.
    pub fn ids_in_file(&self, file_path: &str) -> Vec<SymbolId> {
        self.symbols_in_file(file_path).map(|s| s.id.clone()).collect()
    }

    /// Snapshot of `id -> signature hash` for one file's symbols.
    pub fn signature_snapshot(&self, file_path: &str) -> FxHashMap<SymbolId, String> {
        self.symbols_in_file(file_path)
            .map(|s| (s.id.clone(), s.signature_hash.clone()))
            .collect()
    }

    /// Distinct file paths that currently own at least one symbol.
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .symbols
            .values()
            .map(|s| s.file_path.clone())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}
