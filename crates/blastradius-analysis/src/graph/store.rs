//! Forward/reverse adjacency maps keyed by symbol id.
//!
//! Invariants: the maps mirror each other (`y in forward[x]` iff
//! `x in reverse[y]`), no self-loops, and a neighbor set is removed the
//! moment it becomes empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use blastradius_core::types::collections::{FxHashMap, FxHashSet};
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};

/// The bidirectional symbol dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    forward: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
    reverse: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
}

/// Serialized form: object-of-arrays for both maps.
///
/// The reverse map is persisted rather than recomputed so a cache reload
/// needs no re-walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub forward: BTreeMap<String, Vec<String>>,
    pub reverse: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `src -> tgt`, mirrored into the reverse map. Self-loops are
    /// suppressed here rather than at every call site. Returns true when
    /// the edge was not already present.
    pub fn add_edge(&mut self, src: &SymbolId, tgt: &SymbolId) -> bool {
        if src == tgt {
            return false;
        }
        let inserted = self
            .forward
            .entry(src.clone())
            .or_default()
            .insert(tgt.clone());
        self.reverse.entry(tgt.clone()).or_default().insert(src.clone());
        inserted
    }

    /// Symbols that reference `id` (reverse neighbors).
    pub fn dependents(&self, id: &SymbolId) -> Option<&FxHashSet<SymbolId>> {
        self.reverse.get(id)
    }

    /// Symbols that `id` references (forward neighbors).
    pub fn dependencies(&self, id: &SymbolId) -> Option<&FxHashSet<SymbolId>> {
        self.forward.get(id)
    }

    pub fn node_count(&self) -> usize {
        let mut nodes: FxHashSet<&SymbolId> = self.forward.keys().collect();
        nodes.extend(self.reverse.keys());
        nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(|s| s.len()).sum()
    }

    /// Ids appearing as a key in either map.
    pub fn known_ids(&self) -> FxHashSet<SymbolId> {
        let mut ids: FxHashSet<SymbolId> = self.forward.keys().cloned().collect();
        ids.extend(self.reverse.keys().cloned());
        ids
    }

    /// Remove the file's symbols from `index` and their outgoing edges.
    ///
    /// Incoming edges from other files are left in place: dependents stay
    /// discoverable, and a target with no surviving declaration surfaces as
    /// a ghost in the next analyzer sweep.
    pub fn evict_file(&mut self, file_path: &str, index: &mut SymbolIndex) -> Vec<SymbolId> {
        let ids = index.ids_in_file(file_path);
        for id in &ids {
            self.remove_outgoing(id);
            index.remove(id);
        }
        ids
    }

    fn remove_outgoing(&mut self, src: &SymbolId) {
        if let Some(targets) = self.forward.remove(src) {
            for tgt in targets {
                if let Some(back) = self.reverse.get_mut(&tgt) {
                    back.remove(src);
                    if back.is_empty() {
                        self.reverse.remove(&tgt);
                    }
                }
            }
        }
    }

    /// Clear both maps in place, preserving shared references to the store.
    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }

    /// Convert to the serialized object-of-arrays form with sorted keys and
    /// neighbor lists, so artifacts are diff-stable.
    pub fn to_data(&self) -> GraphData {
        fn collect(map: &FxHashMap<SymbolId, FxHashSet<SymbolId>>) -> BTreeMap<String, Vec<String>> {
            map.iter()
                .map(|(k, v)| {
                    let mut neighbors: Vec<String> =
                        v.iter().map(|id| id.as_str().to_string()).collect();
                    neighbors.sort_unstable();
                    (k.as_str().to_string(), neighbors)
                })
                .collect()
        }
        GraphData {
            forward: collect(&self.forward),
            reverse: collect(&self.reverse),
        }
    }

    /// Rebuild from the serialized form. Empty neighbor lists are dropped
    /// so the no-empty-sets invariant survives round trips.
    pub fn from_data(data: GraphData) -> Self {
        fn collect(map: BTreeMap<String, Vec<String>>) -> FxHashMap<SymbolId, FxHashSet<SymbolId>> {
            map.into_iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| {
                    (
                        SymbolId::from(k),
                        v.into_iter().map(SymbolId::from).collect(),
                    )
                })
                .collect()
        }
        Self {
            forward: collect(data.forward),
            reverse: collect(data.reverse),
        }
    }

    /// Check the mirror invariant; used by tests and debug assertions.
    pub fn is_mirrored(&self) -> bool {
        let forward_ok = self.forward.iter().all(|(x, targets)| {
            targets
                .iter()
                .all(|y| self.reverse.get(y).is_some_and(|back| back.contains(x)))
        });
        let reverse_ok = self.reverse.iter().all(|(y, sources)| {
            sources
                .iter()
                .all(|x| self.forward.get(x).is_some_and(|out| out.contains(y)))
        });
        forward_ok && reverse_ok
    }
}
