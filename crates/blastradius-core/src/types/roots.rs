//! Impact roots: the changed symbols that seed a blast-radius traversal.

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;
use super::symbol::SymbolId;

/// How far a root's impact propagates through reverse edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationMode {
    /// One-hop expansion: only direct dependents.
    Shallow,
    /// Unlimited BFS over reverse edges.
    Deep,
}

/// Why a symbol became an impact root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeReason {
    BodyChange,
    SignatureRipple,
    Deleted,
    Renamed,
}

impl ChangeReason {
    /// Deduplication priority, higher wins.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Deleted => 3,
            Self::SignatureRipple => 2,
            Self::Renamed => 1,
            Self::BodyChange => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::BodyChange => "body-change",
            Self::SignatureRipple => "signature-ripple",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

/// A changed symbol seeding the traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRoot {
    pub symbol_id: SymbolId,
    pub propagation_mode: PropagationMode,
    pub reason: ChangeReason,
}

impl ImpactRoot {
    pub fn new(symbol_id: SymbolId, propagation_mode: PropagationMode, reason: ChangeReason) -> Self {
        Self { symbol_id, propagation_mode, reason }
    }

    pub fn shallow(symbol_id: SymbolId, reason: ChangeReason) -> Self {
        Self::new(symbol_id, PropagationMode::Shallow, reason)
    }

    pub fn deep(symbol_id: SymbolId, reason: ChangeReason) -> Self {
        Self::new(symbol_id, PropagationMode::Deep, reason)
    }
}

/// Collapse candidate roots to one per symbol, keeping the
/// highest-priority reason. A deep mode always survives a shallow one for
/// the same symbol.
pub fn dedupe_roots(candidates: Vec<ImpactRoot>) -> Vec<ImpactRoot> {
    let mut best: FxHashMap<SymbolId, ImpactRoot> = FxHashMap::default();
    let mut order: Vec<SymbolId> = Vec::new();

    for candidate in candidates {
        match best.get_mut(&candidate.symbol_id) {
            None => {
                order.push(candidate.symbol_id.clone());
                best.insert(candidate.symbol_id.clone(), candidate);
            }
            Some(existing) => {
                if candidate.reason.priority() > existing.reason.priority() {
                    existing.reason = candidate.reason;
                }
                if candidate.propagation_mode == PropagationMode::Deep {
                    existing.propagation_mode = PropagationMode::Deep;
                }
            }
        }
    }

    order.into_iter().filter_map(|id| best.remove(&id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SymbolId {
        SymbolId::new("/a.ts", s)
    }

    #[test]
    fn priority_ordering_matches_table() {
        assert!(ChangeReason::Deleted.priority() > ChangeReason::SignatureRipple.priority());
        assert!(ChangeReason::SignatureRipple.priority() > ChangeReason::Renamed.priority());
        assert!(ChangeReason::Renamed.priority() > ChangeReason::BodyChange.priority());
    }

    #[test]
    fn dedupe_keeps_highest_priority_reason() {
        let roots = dedupe_roots(vec![
            ImpactRoot::shallow(id("f"), ChangeReason::BodyChange),
            ImpactRoot::deep(id("f"), ChangeReason::SignatureRipple),
            ImpactRoot::deep(id("f"), ChangeReason::Renamed),
            ImpactRoot::deep(id("g"), ChangeReason::Deleted),
        ]);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].reason, ChangeReason::SignatureRipple);
        assert_eq!(roots[0].propagation_mode, PropagationMode::Deep);
        assert_eq!(roots[1].reason, ChangeReason::Deleted);
    }

    #[test]
    fn dedupe_preserves_first_seen_order() {
        let roots = dedupe_roots(vec![
            ImpactRoot::deep(id("a"), ChangeReason::Deleted),
            ImpactRoot::shallow(id("b"), ChangeReason::BodyChange),
            ImpactRoot::deep(id("a"), ChangeReason::Renamed),
        ]);
        let ids: Vec<_> = roots.iter().map(|r| r.symbol_id.qualified_name()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
