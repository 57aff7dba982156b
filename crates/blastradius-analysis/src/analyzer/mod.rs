//! Signature analyzer: diff pre/post snapshots and sweep for ghosts.

use blastradius_core::types::collections::{FxHashMap, FxHashSet};
use blastradius_core::types::report::SignatureReport;
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};

use crate::graph::DependencyGraph;

/// Partition a file's current symbols against the pre-parse snapshot.
///
/// `snapshot` maps the file's former symbol ids to their signature hashes;
/// `index` is the post-parse index.
pub fn diff_signatures(
    snapshot: &FxHashMap<SymbolId, String>,
    index: &SymbolIndex,
    file_path: &str,
) -> SignatureReport {
    let mut report = SignatureReport::default();
    let mut seen: FxHashSet<&SymbolId> = FxHashSet::default();

    for symbol in index.symbols_in_file(file_path) {
        match snapshot.get(&symbol.id) {
            None => report.added.push(symbol.id.clone()),
            Some(old_hash) if *old_hash != symbol.signature_hash => {
                report.ripple.push(symbol.id.clone());
            }
            Some(_) => report.safe.push(symbol.id.clone()),
        }
        seen.insert(&symbol.id);
    }

    report.removed = snapshot
        .keys()
        .filter(|id| !seen.contains(*id))
        .cloned()
        .collect();
    report
}

/// Whole-graph ghost sweep: ids referenced in either adjacency map with no
/// declaration in `index`. Each ghost is treated as destructively changed.
///
/// Phantoms are excluded; they exist for display only.
pub fn detect_ghosts(graph: &DependencyGraph, index: &SymbolIndex) -> Vec<SymbolId> {
    let mut ghosts: Vec<SymbolId> = graph
        .known_ids()
        .into_iter()
        .filter(|id| !index.contains(id) && !id.is_phantom())
        .collect();
    ghosts.sort_unstable();
    ghosts
}

#[cfg(test)]
mod tests {
    use super::*;
    use blastradius_core::types::symbol::{Symbol, SymbolKind};

    fn symbol(path: &str, name: &str, hash: &str) -> Symbol {
        Symbol {
            id: SymbolId::new(path, name),
            name: name.into(),
            qualified_name: name.into(),
            kind: SymbolKind::Function,
            file_path: path.into(),
            start_line: 1,
            end_line: 1,
            start_offset: 0,
            end_offset: 0,
            is_exported: false,
            parent_id: None,
            signature_hash: hash.into(),
        }
    }

    #[test]
    fn partitions_added_ripple_safe_removed() {
        let mut index = SymbolIndex::new();
        index.insert(symbol("/a.ts", "kept", "aaaa"));
        index.insert(symbol("/a.ts", "changed", "bbbb"));
        index.insert(symbol("/a.ts", "fresh", "cccc"));

        let snapshot: FxHashMap<SymbolId, String> = [
            (SymbolId::new("/a.ts", "kept"), "aaaa".to_string()),
            (SymbolId::new("/a.ts", "changed"), "old!".to_string()),
            (SymbolId::new("/a.ts", "gone"), "dddd".to_string()),
        ]
        .into_iter()
        .collect();

        let report = diff_signatures(&snapshot, &index, "/a.ts");
        assert_eq!(report.added, vec![SymbolId::new("/a.ts", "fresh")]);
        assert_eq!(report.ripple, vec![SymbolId::new("/a.ts", "changed")]);
        assert_eq!(report.safe, vec![SymbolId::new("/a.ts", "kept")]);
        assert_eq!(report.removed, vec![SymbolId::new("/a.ts", "gone")]);
    }

    #[test]
    fn ghosts_are_referenced_but_undeclared() {
        let mut graph = DependencyGraph::new();
        let mut index = SymbolIndex::new();
        index.insert(symbol("/x.ts", "x", "1111"));
        graph.add_edge(&SymbolId::new("/x.ts", "x"), &SymbolId::new("/z.ts", "z"));

        let ghosts = detect_ghosts(&graph, &index);
        assert_eq!(ghosts, vec![SymbolId::new("/z.ts", "z")]);
    }
}
