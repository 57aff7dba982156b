//! Staged-diff mapping against an in-memory VCS collaborator.

use blastradius_analysis::engine::compute_blast_radius;
use blastradius_analysis::extract::extract_symbols;
use blastradius_analysis::graph::DependencyGraph;
use blastradius_analysis::incremental::IncrementalUpdater;
use blastradius_analysis::parser::TsParser;
use blastradius_analysis::staged::{
    analyze_staged, StagedFile, StagedHunk, StagedSource, StagedStatus,
};
use blastradius_analysis::walker::walk_references;
use blastradius_core::errors::VcsError;
use blastradius_core::types::collections::FxHashMap;
use blastradius_core::types::roots::{ChangeReason, PropagationMode};
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};

#[derive(Default)]
struct FakeStaged {
    files: Vec<StagedFile>,
    contents: FxHashMap<String, String>,
    hunks: Vec<StagedHunk>,
}

impl StagedSource for FakeStaged {
    fn staged_files(&self) -> Result<Vec<StagedFile>, VcsError> {
        Ok(self.files.clone())
    }

    fn staged_content(&self, path: &str) -> Result<Option<String>, VcsError> {
        Ok(self.contents.get(path).cloned())
    }

    fn staged_hunks(&self) -> Result<Vec<StagedHunk>, VcsError> {
        Ok(self.hunks.clone())
    }
}

fn build_live(files: &[(&str, &str)]) -> (SymbolIndex, DependencyGraph) {
    let mut parser = TsParser::new().unwrap();
    let mut index = SymbolIndex::new();
    let mut parsed = Vec::new();
    for (path, text) in files {
        let file = parser.parse(path, text.to_string()).unwrap();
        for symbol in extract_symbols(&file) {
            index.insert(symbol);
        }
        parsed.push(file);
    }
    let mut graph = DependencyGraph::new();
    for file in &parsed {
        walk_references(file, &index, &mut graph);
    }
    (index, graph)
}

fn id(path: &str, name: &str) -> SymbolId {
    SymbolId::new(path, name)
}

const X_TS: &str = "import { y } from \"./y\";\nexport function x(): number { return y(); }\n";
const Y_TS: &str = "import { z } from \"./z\";\nexport function y(): number { return z(); }\n";
const Z_TS: &str = "export function z(): number { return 1; }\n";

#[test]
fn deleting_a_file_yields_ghost_roots_and_transitive_impact() {
    // Graph: x -> y, y -> z. Staging deletes z's file.
    let (index, graph) = build_live(&[("/p/x.ts", X_TS), ("/p/y.ts", Y_TS), ("/p/z.ts", Z_TS)]);
    let mut updater = IncrementalUpdater::new().unwrap();

    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Deleted,
            path: "/p/z.ts".into(),
            old_path: None,
        }],
        ..FakeStaged::default()
    };

    let analysis = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();

    assert_eq!(analysis.ghosts, vec![id("/p/z.ts", "z")]);
    let z_root = analysis
        .roots
        .iter()
        .find(|r| r.symbol_id == id("/p/z.ts", "z"))
        .unwrap();
    assert_eq!(z_root.reason, ChangeReason::Deleted);
    assert_eq!(z_root.propagation_mode, PropagationMode::Deep);

    let result = compute_blast_radius(&analysis.roots, &analysis.shadow_graph);
    assert_eq!(result.direct_impact, vec![id("/p/y.ts", "y")]);
    assert_eq!(result.indirect_impact, vec![id("/p/x.ts", "x")]);
}

#[test]
fn rename_classifies_old_as_deleted_and_new_as_renamed() {
    let (index, graph) = build_live(&[
        ("/p/old.ts", "export function foo(): number { return 1; }\n"),
        (
            "/p/user.ts",
            "import { foo } from \"./old\";\nexport function use(): number { return foo(); }\n",
        ),
    ]);
    let mut updater = IncrementalUpdater::new().unwrap();

    let new_text = "export function foo(): number { return 1; }\n";
    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Renamed,
            path: "/p/new.ts".into(),
            old_path: Some("/p/old.ts".into()),
        }],
        contents: [("/p/new.ts".to_string(), new_text.to_string())]
            .into_iter()
            .collect(),
        ..FakeStaged::default()
    };

    let analysis = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();

    let old_root = analysis
        .roots
        .iter()
        .find(|r| r.symbol_id == id("/p/old.ts", "foo"))
        .expect("old symbol must be a root");
    assert_eq!(old_root.reason, ChangeReason::Deleted);

    let new_root = analysis
        .roots
        .iter()
        .find(|r| r.symbol_id == id("/p/new.ts", "foo"))
        .expect("new symbol must be a root");
    assert_eq!(new_root.reason, ChangeReason::Renamed);
    assert_eq!(new_root.propagation_mode, PropagationMode::Deep);
}

#[test]
fn body_only_hunks_become_shallow_roots() {
    let (index, graph) = build_live(&[("/p/x.ts", X_TS), ("/p/y.ts", Y_TS), ("/p/z.ts", Z_TS)]);
    let mut updater = IncrementalUpdater::new().unwrap();

    // Same signature, different body.
    let staged_z = "export function z(): number { return 2; }\n";
    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Modified,
            path: "/p/z.ts".into(),
            old_path: None,
        }],
        contents: [("/p/z.ts".to_string(), staged_z.to_string())]
            .into_iter()
            .collect(),
        hunks: vec![StagedHunk {
            path: "/p/z.ts".into(),
            new_start_line: 1,
            new_line_count: 1,
        }],
    };

    let analysis = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();

    assert_eq!(analysis.roots.len(), 1);
    let root = &analysis.roots[0];
    assert_eq!(root.symbol_id, id("/p/z.ts", "z"));
    assert_eq!(root.reason, ChangeReason::BodyChange);
    assert_eq!(root.propagation_mode, PropagationMode::Shallow);

    let result = compute_blast_radius(&analysis.roots, &analysis.shadow_graph);
    assert_eq!(result.direct_impact, vec![id("/p/y.ts", "y")]);
    assert!(result.indirect_impact.is_empty());
}

#[test]
fn signature_ripple_outranks_a_body_change_hunk() {
    let (index, graph) = build_live(&[("/p/x.ts", X_TS), ("/p/y.ts", Y_TS), ("/p/z.ts", Z_TS)]);
    let mut updater = IncrementalUpdater::new().unwrap();

    // Return type changes and a hunk overlaps the declaration.
    let staged_z = "export function z(): string { return \"1\"; }\n";
    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Modified,
            path: "/p/z.ts".into(),
            old_path: None,
        }],
        contents: [("/p/z.ts".to_string(), staged_z.to_string())]
            .into_iter()
            .collect(),
        hunks: vec![StagedHunk {
            path: "/p/z.ts".into(),
            new_start_line: 1,
            new_line_count: 1,
        }],
    };

    let analysis = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();

    let root = analysis
        .roots
        .iter()
        .find(|r| r.symbol_id == id("/p/z.ts", "z"))
        .unwrap();
    assert_eq!(root.reason, ChangeReason::SignatureRipple);
    assert_eq!(root.propagation_mode, PropagationMode::Deep);

    let result = compute_blast_radius(&analysis.roots, &analysis.shadow_graph);
    assert_eq!(result.direct_impact, vec![id("/p/y.ts", "y")]);
    assert_eq!(result.indirect_impact, vec![id("/p/x.ts", "x")]);
}

#[test]
fn speculative_analysis_never_mutates_live_state() {
    let (index, graph) = build_live(&[("/p/x.ts", X_TS), ("/p/y.ts", Y_TS), ("/p/z.ts", Z_TS)]);
    let mut updater = IncrementalUpdater::new().unwrap();

    let graph_before = graph.to_data();
    let index_len_before = index.len();

    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Deleted,
            path: "/p/z.ts".into(),
            old_path: None,
        }],
        ..FakeStaged::default()
    };
    let _ = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();

    assert_eq!(graph.to_data(), graph_before);
    assert_eq!(index.len(), index_len_before);
    assert!(index.contains(&id("/p/z.ts", "z")));
}

#[test]
fn missing_staged_content_skips_the_file() {
    let (index, graph) = build_live(&[("/p/z.ts", Z_TS)]);
    let mut updater = IncrementalUpdater::new().unwrap();

    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Modified,
            path: "/p/z.ts".into(),
            old_path: None,
        }],
        // No content: the file changed between enumeration and read.
        ..FakeStaged::default()
    };

    let analysis = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();
    assert!(analysis.roots.is_empty());
}

#[test]
fn non_source_staged_files_are_ignored() {
    let (index, graph) = build_live(&[("/p/z.ts", Z_TS)]);
    let mut updater = IncrementalUpdater::new().unwrap();

    let vcs = FakeStaged {
        files: vec![StagedFile {
            status: StagedStatus::Modified,
            path: "/p/readme.md".into(),
            old_path: None,
        }],
        contents: [("/p/readme.md".to_string(), "# notes".to_string())]
            .into_iter()
            .collect(),
        ..FakeStaged::default()
    };

    let analysis = analyze_staged(&vcs, &mut updater, &index, &graph).unwrap();
    assert!(analysis.roots.is_empty());
    assert!(analysis.reports.is_empty());
}
