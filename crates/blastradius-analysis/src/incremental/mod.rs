//! Incremental updater: the only writer of the live index and graph.
//!
//! Single-file updates run snapshot -> evict -> reparse -> reindex ->
//! rewalk without yielding between steps. Multi-file operations are
//! two-pass: every eviction and re-extraction completes before any
//! re-walk, so cross-file edges always resolve against fresh symbols.

use std::time::Instant;

use tracing::{debug, warn};

use blastradius_core::errors::ParseError;
use blastradius_core::types::collections::FxHashMap;
use blastradius_core::types::impact::RebuildStats;
use blastradius_core::types::report::SignatureReport;
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};
use blastradius_core::traits::YieldPoint;

use crate::extract::extract_symbols;
use crate::graph::DependencyGraph;
use crate::parser::{ParsedFile, TsParser};
use crate::walker::walk_references;

/// Orchestrates re-parsing and re-indexing against an index/graph pair.
///
/// The updater itself is state-light: it owns only the parser. Callers
/// decide whether the index and graph passed in are live or shadow clones.
pub struct IncrementalUpdater {
    parser: TsParser,
}

impl IncrementalUpdater {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            parser: TsParser::new()?,
        })
    }

    /// Re-index one file with `new_text` overriding disk.
    ///
    /// On parse failure the file's symbols stay evicted and the report's
    /// `removed` set equals the snapshot's key set.
    pub fn handle_file_changed(
        &mut self,
        path: &str,
        new_text: &str,
        index: &mut SymbolIndex,
        graph: &mut DependencyGraph,
    ) -> SignatureReport {
        let snapshot = index.signature_snapshot(path);
        graph.evict_file(path, index);

        match self.parser.parse(path, new_text.to_string()) {
            Ok(parsed) => {
                for symbol in extract_symbols(&parsed) {
                    index.insert(symbol);
                }
                walk_references(&parsed, index, graph);
                crate::analyzer::diff_signatures(&snapshot, index, path)
            }
            Err(e) => {
                warn!(file = path, error = %e, "reparse failed; file stays evicted");
                removed_report(snapshot)
            }
        }
    }

    /// Index a file seen for the first time.
    pub fn handle_file_created(
        &mut self,
        path: &str,
        text: &str,
        index: &mut SymbolIndex,
        graph: &mut DependencyGraph,
    ) -> SignatureReport {
        self.handle_file_changed(path, text, index, graph)
    }

    /// Drop a deleted file: evict and report every former symbol removed.
    pub fn handle_file_deleted(
        &mut self,
        path: &str,
        index: &mut SymbolIndex,
        graph: &mut DependencyGraph,
    ) -> SignatureReport {
        let snapshot = index.signature_snapshot(path);
        graph.evict_file(path, index);
        removed_report(snapshot)
    }

    /// Rebuild everything from disk.
    ///
    /// Clears both maps and the index in place (preserving shared
    /// references), then re-extracts all symbols before walking any
    /// references. Per-file parse errors are swallowed and counted. Yields
    /// cooperatively every `batch_size` files in both passes.
    pub fn full_rebuild(
        &mut self,
        files: &[String],
        index: &mut SymbolIndex,
        graph: &mut DependencyGraph,
        yielder: &dyn YieldPoint,
        batch_size: usize,
    ) -> RebuildStats {
        let started = Instant::now();
        let mut stats = RebuildStats::default();

        index.clear();
        graph.clear();

        let mut parsed_files: Vec<ParsedFile> = Vec::with_capacity(files.len());
        for (i, path) in files.iter().enumerate() {
            match self.parser.parse_from_disk(path) {
                Ok(parsed) => {
                    for symbol in extract_symbols(&parsed) {
                        index.insert(symbol);
                        stats.symbols_indexed += 1;
                    }
                    parsed_files.push(parsed);
                    stats.files_parsed += 1;
                }
                Err(e) => {
                    debug!(file = path.as_str(), error = %e, "skipping unparseable file");
                    stats.files_failed += 1;
                }
            }
            maybe_yield(i, batch_size, yielder);
        }

        for (i, parsed) in parsed_files.iter().enumerate() {
            stats.edges_added += walk_references(parsed, index, graph);
            maybe_yield(i, batch_size, yielder);
        }

        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(
            files = stats.files_parsed,
            failed = stats.files_failed,
            symbols = stats.symbols_indexed,
            edges = stats.edges_added,
            "full rebuild complete"
        );
        stats
    }

    /// Two-pass partial patch for a set of stale files read from disk.
    ///
    /// All evictions and re-extractions complete before any re-walk;
    /// otherwise a re-walk for file A could record an edge into the stale
    /// version of B, which B's later eviction would erase for good.
    pub fn patch_files(
        &mut self,
        paths: &[String],
        index: &mut SymbolIndex,
        graph: &mut DependencyGraph,
        yielder: &dyn YieldPoint,
        batch_size: usize,
    ) -> (Vec<(String, SignatureReport)>, RebuildStats) {
        let started = Instant::now();
        let mut stats = RebuildStats::default();
        let mut reports: Vec<(String, SignatureReport)> = Vec::with_capacity(paths.len());
        let mut parsed_files: Vec<ParsedFile> = Vec::new();
        let mut snapshots: Vec<(String, FxHashMap<SymbolId, String>)> = Vec::new();

        // Pass 1: evict + re-extract.
        for (i, path) in paths.iter().enumerate() {
            let snapshot = index.signature_snapshot(path);
            graph.evict_file(path, index);

            match self.parser.parse_from_disk(path) {
                Ok(parsed) => {
                    for symbol in extract_symbols(&parsed) {
                        index.insert(symbol);
                        stats.symbols_indexed += 1;
                    }
                    parsed_files.push(parsed);
                    snapshots.push((path.clone(), snapshot));
                    stats.files_parsed += 1;
                }
                Err(e) => {
                    debug!(file = path.as_str(), error = %e, "stale file unreadable; stays evicted");
                    reports.push((path.clone(), removed_report(snapshot)));
                    stats.files_failed += 1;
                }
            }
            maybe_yield(i, batch_size, yielder);
        }

        // Pass 2: re-walk everything re-extracted.
        for (i, parsed) in parsed_files.iter().enumerate() {
            stats.edges_added += walk_references(parsed, index, graph);
            maybe_yield(i, batch_size, yielder);
        }

        for (path, snapshot) in snapshots {
            let report = crate::analyzer::diff_signatures(&snapshot, index, &path);
            reports.push((path, report));
        }

        stats.elapsed_ms = started.elapsed().as_millis() as u64;
        (reports, stats)
    }
}

fn removed_report(snapshot: FxHashMap<SymbolId, String>) -> SignatureReport {
    let mut removed: Vec<SymbolId> = snapshot.into_keys().collect();
    removed.sort_unstable();
    SignatureReport {
        removed,
        ..SignatureReport::default()
    }
}

fn maybe_yield(i: usize, batch_size: usize, yielder: &dyn YieldPoint) {
    if batch_size > 0 && (i + 1) % batch_size == 0 {
        yielder.yield_now();
    }
}
