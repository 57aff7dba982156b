//! Blast-radius traversal output and rebuild statistics.

use serde::{Deserialize, Serialize};

use super::collections::FxHashMap;
use super::roots::ImpactRoot;
use super::symbol::SymbolId;

/// Result of a blast-radius traversal.
///
/// Direct impact is depth 1, indirect is depth >= 2. Roots never appear in
/// the depth map or the impact lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlastRadiusResult {
    pub roots: Vec<ImpactRoot>,
    pub direct_impact: Vec<SymbolId>,
    pub indirect_impact: Vec<SymbolId>,
    /// Minimum depth at which each impacted symbol was reached.
    pub depth_map: FxHashMap<SymbolId, u32>,
    /// Explanation paths per impacted symbol, each starting at a root.
    pub paths: FxHashMap<SymbolId, Vec<Vec<SymbolId>>>,
}

impl BlastRadiusResult {
    /// All impacted symbol ids, direct first.
    pub fn impacted(&self) -> impl Iterator<Item = &SymbolId> {
        self.direct_impact.iter().chain(self.indirect_impact.iter())
    }

    pub fn total_impacted(&self) -> usize {
        self.direct_impact.len() + self.indirect_impact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.direct_impact.is_empty() && self.indirect_impact.is_empty()
    }
}

/// Counters for a full rebuild or multi-file patch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildStats {
    pub files_parsed: u32,
    pub files_failed: u32,
    pub symbols_indexed: u32,
    pub edges_added: u32,
    pub elapsed_ms: u64,
}
