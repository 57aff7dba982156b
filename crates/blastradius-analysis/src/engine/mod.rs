//! Blast-radius traversal: multi-source BFS on reverse edges.
//!
//! Deep roots expand without a depth limit, each with its own parent map
//! so every explanation path is locally shortest from its own root. A
//! single global parent map would collapse explanations to one arbitrary
//! root. Shallow roots expand one hop; a deep reach always wins the depth
//! classification, but shallow paths are still recorded so every root that
//! touches a node can explain it.

use blastradius_core::types::collections::{FxHashMap, FxHashSet};
use blastradius_core::types::impact::BlastRadiusResult;
use blastradius_core::types::roots::{ImpactRoot, PropagationMode};
use blastradius_core::types::symbol::SymbolId;

use crate::graph::DependencyGraph;

/// Transient reverse edges layered over the live graph.
///
/// The in-editor path uses this: eviction has already dropped reverse
/// edges of removed symbols, so their pre-eviction dependents are replayed
/// here without mutating the live graph.
pub type ReverseOverlay = FxHashMap<SymbolId, FxHashSet<SymbolId>>;

/// Run the traversal against `graph`.
pub fn compute_blast_radius(roots: &[ImpactRoot], graph: &DependencyGraph) -> BlastRadiusResult {
    run(roots, graph, None)
}

/// Run the traversal with a transient reverse-edge overlay.
pub fn compute_blast_radius_with_overlay(
    roots: &[ImpactRoot],
    graph: &DependencyGraph,
    overlay: &ReverseOverlay,
) -> BlastRadiusResult {
    run(roots, graph, Some(overlay))
}

fn run(
    roots: &[ImpactRoot],
    graph: &DependencyGraph,
    overlay: Option<&ReverseOverlay>,
) -> BlastRadiusResult {
    let root_ids: FxHashSet<&SymbolId> = roots.iter().map(|r| &r.symbol_id).collect();

    let dependents_of = |id: &SymbolId| -> Vec<SymbolId> {
        let mut out: FxHashSet<SymbolId> = graph
            .dependents(id)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        if let Some(extra) = overlay.and_then(|o| o.get(id)) {
            out.extend(extra.iter().cloned());
        }
        let mut sorted: Vec<SymbolId> = out.into_iter().collect();
        sorted.sort_unstable();
        sorted
    };

    // Pass 1: independent unlimited BFS per deep root, with a per-root
    // parent map and a shared minimum-depth map.
    let mut global_depth: FxHashMap<SymbolId, u32> = FxHashMap::default();
    let mut parent_maps: Vec<(SymbolId, FxHashMap<SymbolId, Option<SymbolId>>)> = Vec::new();

    for root in roots.iter().filter(|r| r.propagation_mode == PropagationMode::Deep) {
        let mut parents: FxHashMap<SymbolId, Option<SymbolId>> = FxHashMap::default();
        parents.insert(root.symbol_id.clone(), None);

        let mut queue: std::collections::VecDeque<(SymbolId, u32)> = std::collections::VecDeque::new();
        queue.push_back((root.symbol_id.clone(), 0));

        while let Some((node, depth)) = queue.pop_front() {
            for dependent in dependents_of(&node) {
                if parents.contains_key(&dependent) {
                    continue;
                }
                parents.insert(dependent.clone(), Some(node.clone()));
                let entry = global_depth.entry(dependent.clone()).or_insert(depth + 1);
                if depth + 1 < *entry {
                    *entry = depth + 1;
                }
                queue.push_back((dependent, depth + 1));
            }
        }

        parent_maps.push((root.symbol_id.clone(), parents));
    }

    // Pass 2: one-hop expansion per shallow root.
    let mut shallow_parents: FxHashMap<SymbolId, Vec<SymbolId>> = FxHashMap::default();
    for root in roots.iter().filter(|r| r.propagation_mode == PropagationMode::Shallow) {
        for dependent in dependents_of(&root.symbol_id) {
            if root_ids.contains(&dependent) {
                continue;
            }
            shallow_parents
                .entry(dependent)
                .or_default()
                .push(root.symbol_id.clone());
        }
    }

    // Classification. Roots never appear in the depth map or the impact
    // lists; a deep reach decides the depth even when a shallow root also
    // touched the node.
    let mut impacted: FxHashSet<SymbolId> = global_depth.keys().cloned().collect();
    impacted.extend(shallow_parents.keys().cloned());
    impacted.retain(|id| !root_ids.contains(id));

    let mut depth_map: FxHashMap<SymbolId, u32> = FxHashMap::default();
    let mut direct: Vec<SymbolId> = Vec::new();
    let mut indirect: Vec<SymbolId> = Vec::new();
    for id in &impacted {
        let depth = global_depth.get(id).copied().unwrap_or(1);
        depth_map.insert(id.clone(), depth);
        if depth == 1 {
            direct.push(id.clone());
        } else {
            indirect.push(id.clone());
        }
    }
    direct.sort_unstable();
    indirect.sort_unstable();

    // Path reconstruction: one path per deep root that reached the node,
    // plus a two-element path per shallow root.
    let mut paths: FxHashMap<SymbolId, Vec<Vec<SymbolId>>> = FxHashMap::default();
    for id in &impacted {
        let mut node_paths: Vec<Vec<SymbolId>> = Vec::new();
        for (root_id, parents) in &parent_maps {
            if id == root_id || !parents.contains_key(id) {
                continue;
            }
            node_paths.push(reconstruct(parents, id));
        }
        if let Some(shallow_roots) = shallow_parents.get(id) {
            for root_id in shallow_roots {
                node_paths.push(vec![root_id.clone(), id.clone()]);
            }
        }
        paths.insert(id.clone(), node_paths);
    }

    BlastRadiusResult {
        roots: roots.to_vec(),
        direct_impact: direct,
        indirect_impact: indirect,
        depth_map,
        paths,
    }
}

/// Walk parent links back to the root and reverse into `[root, .., node]`.
fn reconstruct(parents: &FxHashMap<SymbolId, Option<SymbolId>>, node: &SymbolId) -> Vec<SymbolId> {
    let mut path = vec![node.clone()];
    let mut current = node;
    while let Some(Some(parent)) = parents.get(current) {
        path.push(parent.clone());
        current = parent;
    }
    path.reverse();
    path
}
