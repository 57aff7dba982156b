//! Intent descriptors produced by the external oracle, and the
//! confidence model attached to resolved targets.

use serde::{Deserialize, Serialize};

use super::symbol::SymbolKind;

/// What kind of change the prompt describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Refactor,
    Unknown,
}

/// Structured hints from the oracle about a hypothetical change.
///
/// `symbol_hints` and `file_hints` are expected to be verbatim names from
/// the grounding context; non-string entries have already been filtered out
/// by the time this struct exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDescriptor {
    pub prompt: String,
    pub change_type: ChangeType,
    #[serde(default)]
    pub symbol_hints: Vec<String>,
    #[serde(default)]
    pub file_hints: Vec<String>,
    #[serde(default)]
    pub affects_public_api: bool,
    #[serde(default)]
    pub summary: String,
}

/// Resolver confidence band for a matched symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Band for a resolver score: >= 0.85 high, >= 0.45 medium, else low.
    pub fn from_score(score: f32) -> Self {
        if score >= 0.85 {
            Self::High
        } else if score >= 0.45 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// One-tier demotion applied to paths of depth >= 2.
    pub fn demote(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

/// Grounding context handed to the oracle alongside the raw prompt.
///
/// Bounded lists, exported symbols first; the caps come from the run
/// configuration (`max_context_files` / `max_context_symbols`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingContext {
    pub files: Vec<String>,
    pub symbols: Vec<SymbolDescriptor>,
}

/// Compact symbol descriptor for oracle grounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDescriptor {
    pub name: String,
    pub file_path: String,
    pub kind: SymbolKind,
    pub is_exported: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_bands() {
        assert_eq!(Confidence::from_score(0.85), Confidence::High);
        assert_eq!(Confidence::from_score(0.6), Confidence::Medium);
        assert_eq!(Confidence::from_score(0.449), Confidence::Low);
    }

    #[test]
    fn demotion_is_one_tier_and_saturating() {
        assert_eq!(Confidence::High.demote(), Confidence::Medium);
        assert_eq!(Confidence::Medium.demote(), Confidence::Low);
        assert_eq!(Confidence::Low.demote(), Confidence::Low);
    }
}
