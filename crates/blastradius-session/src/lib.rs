//! Session orchestrator.
//!
//! The session is the single owner of the live symbol index and live
//! graph. Only the incremental updater mutates them, and only through the
//! entry points here. Speculative analyses (staged, intent) run on shadow
//! clones; the editor path mutates live state (the buffer is the new
//! truth) but traverses with a transient overlay so the traversal itself
//! never writes. Interleaved analyses are fenced by a monotone version
//! counter: a result whose ticket is stale is discarded.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use blastradius_analysis::analyzer::detect_ghosts;
use blastradius_analysis::engine::{
    compute_blast_radius, compute_blast_radius_with_overlay, ReverseOverlay,
};
use blastradius_analysis::graph::DependencyGraph;
use blastradius_analysis::incremental::IncrementalUpdater;
use blastradius_analysis::intent::oracle::{build_grounding, IntentOracle};
use blastradius_analysis::intent::{analyze_intent, IntentAnalysis};
use blastradius_analysis::scanner::{normalize_path, scan_workspace};
use blastradius_analysis::staged::{analyze_staged, StagedAnalysis, StagedSource};
use blastradius_core::config::RadiusConfig;
use blastradius_core::errors::SessionError;
use blastradius_core::traits::{CancellationToken, NoYield, YieldPoint};
use blastradius_core::types::collections::{FxHashMap, FxHashSet};
use blastradius_core::types::impact::{BlastRadiusResult, RebuildStats};
use blastradius_core::types::report::SignatureReport;
use blastradius_core::types::roots::{dedupe_roots, ChangeReason, ImpactRoot};
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};
use blastradius_storage::{hash_content, hash_project_config, CacheStore};

/// Outcome of a staged-diff analysis.
#[derive(Debug)]
pub struct StagedImpact {
    pub analysis: StagedAnalysis,
    pub result: BlastRadiusResult,
}

/// Outcome of an in-editor (unstaged) analysis.
#[derive(Debug)]
pub struct EditorImpact {
    pub report: SignatureReport,
    pub result: BlastRadiusResult,
}

/// One live analysis session over a project root.
pub struct Session {
    project_root: PathBuf,
    root_key: String,
    config: RadiusConfig,
    updater: IncrementalUpdater,
    index: SymbolIndex,
    graph: DependencyGraph,
    cache: CacheStore,
    version: u64,
}

impl Session {
    pub fn new(project_root: &Path, config: RadiusConfig) -> Result<Self, SessionError> {
        let cache = CacheStore::new(project_root, &config.cache_dir_name);
        Ok(Self {
            project_root: project_root.to_path_buf(),
            root_key: normalize_path(project_root),
            config,
            updater: IncrementalUpdater::new()?,
            index: SymbolIndex::new(),
            graph: DependencyGraph::new(),
            cache,
            version: 0,
        })
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn config(&self) -> &RadiusConfig {
        &self.config
    }

    /// Startup: restore from cache when the project hash matches, patching
    /// stale files with the two-pass discipline; otherwise rebuild from
    /// scratch. Either way the cache is persisted afterwards.
    pub fn initialize(&mut self, yielder: &dyn YieldPoint) -> Result<RebuildStats, SessionError> {
        let project_hash = self.current_project_hash();
        let files = scan_workspace(&self.project_root);

        let restored = match self.cache.load() {
            Some(artifacts)
                if artifacts.project_hash == project_hash && !artifacts.index.is_empty() =>
            {
                Some(artifacts)
            }
            Some(_) => {
                debug!("cache present but project hash differs or index empty; rebuilding");
                None
            }
            None => None,
        };

        let Some(artifacts) = restored else {
            return self.rebuild_and_persist(&files, &project_hash, yielder);
        };

        self.index = artifacts.index;
        self.graph = artifacts.graph;

        // Diff stored hashes against current content.
        let current_hashes = hash_files(&files);
        let mut stale: Vec<String> = Vec::new();
        for path in &files {
            match (current_hashes.get(path), artifacts.file_hashes.get(path)) {
                (Some(current), Some(stored)) if current == stored => {}
                _ => stale.push(path.clone()),
            }
        }

        // Files that vanished since the cache was written.
        let live_files: FxHashSet<&String> = files.iter().collect();
        let deleted: Vec<String> = self
            .index
            .file_paths()
            .into_iter()
            .filter(|p| !live_files.contains(p))
            .collect();
        for path in &deleted {
            self.updater
                .handle_file_deleted(path, &mut self.index, &mut self.graph);
        }

        let (_, stats) = self.updater.patch_files(
            &stale,
            &mut self.index,
            &mut self.graph,
            yielder,
            self.config.batch_yield_size,
        );

        info!(
            restored_symbols = self.index.len(),
            stale = stale.len(),
            deleted = deleted.len(),
            "cache restored with partial patch"
        );

        self.persist(&current_hashes, &project_hash)?;
        Ok(stats)
    }

    /// Rebuild everything from disk and persist fresh artifacts.
    pub fn full_rebuild(&mut self, yielder: &dyn YieldPoint) -> Result<RebuildStats, SessionError> {
        let project_hash = self.current_project_hash();
        let files = scan_workspace(&self.project_root);
        self.rebuild_and_persist(&files, &project_hash, yielder)
    }

    /// Apply a saved-file change to live state (host file-watch event).
    pub fn handle_file_changed(&mut self, path: &str, new_text: &str) -> SignatureReport {
        self.updater
            .handle_file_changed(path, new_text, &mut self.index, &mut self.graph)
    }

    /// Drop a deleted file from live state.
    pub fn handle_file_deleted(&mut self, path: &str) -> SignatureReport {
        self.updater
            .handle_file_deleted(path, &mut self.index, &mut self.graph)
    }

    /// Blast radius of the VCS staging area. Live state is untouched; the
    /// traversal runs on the staged shadow graph.
    pub fn analyze_staged(&mut self, vcs: &dyn StagedSource) -> Result<StagedImpact, SessionError> {
        let ticket = self.begin_analysis();

        let analysis = analyze_staged(vcs, &mut self.updater, &self.index, &self.graph)?;
        let result = compute_blast_radius(&analysis.roots, &analysis.shadow_graph);

        self.finish_analysis(ticket)?;
        Ok(StagedImpact { analysis, result })
    }

    /// Blast radius of an editor buffer.
    ///
    /// The updater mutates live state (the buffer is the current truth),
    /// and eviction drops reverse edges of removed symbols. Their
    /// dependents are snapshotted beforehand and replayed as a transient
    /// overlay; the traversal never mutates the live graph.
    pub fn analyze_editor(&mut self, path: &str, new_text: &str) -> Result<EditorImpact, SessionError> {
        let ticket = self.begin_analysis();

        let pre_dependents: FxHashMap<SymbolId, FxHashSet<SymbolId>> = self
            .index
            .ids_in_file(path)
            .into_iter()
            .filter_map(|id| {
                self.graph
                    .dependents(&id)
                    .map(|deps| (id.clone(), deps.clone()))
            })
            .collect();

        let report = self
            .updater
            .handle_file_changed(path, new_text, &mut self.index, &mut self.graph);

        let mut candidates: Vec<ImpactRoot> = Vec::new();
        for id in &report.ripple {
            candidates.push(ImpactRoot::deep(id.clone(), ChangeReason::SignatureRipple));
        }
        for id in &report.removed {
            candidates.push(ImpactRoot::deep(id.clone(), ChangeReason::Deleted));
        }
        let roots = dedupe_roots(candidates);

        let overlay: ReverseOverlay = report
            .removed
            .iter()
            .filter_map(|id| pre_dependents.get(id).map(|deps| (id.clone(), deps.clone())))
            .collect();

        let result = compute_blast_radius_with_overlay(&roots, &self.graph, &overlay);

        self.finish_analysis(ticket)?;
        Ok(EditorImpact { report, result })
    }

    /// Blast radius of a natural-language "what if". The oracle call is
    /// the only cancellable step; resolution and traversal run on shadow
    /// clones and the live graph respectively.
    pub fn analyze_prompt(
        &mut self,
        prompt: &str,
        oracle: &dyn IntentOracle,
        cancel: &CancellationToken,
    ) -> Result<IntentAnalysis, SessionError> {
        let ticket = self.begin_analysis();

        let grounding = build_grounding(&self.index, &self.config);
        let descriptor = oracle.interpret(prompt, &grounding, cancel)?;
        let analysis = analyze_intent(
            descriptor,
            &self.index,
            &self.graph,
            &self.root_key,
            &self.config,
        );

        self.finish_analysis(ticket)?;
        Ok(analysis)
    }

    /// Ids referenced in the live graph with no surviving declaration.
    pub fn ghosts(&self) -> Vec<SymbolId> {
        detect_ghosts(&self.graph, &self.index)
    }

    /// Persist the current live state to the cache directory.
    pub fn persist_current(&self) -> Result<(), SessionError> {
        let project_hash = self.current_project_hash();
        let files = scan_workspace(&self.project_root);
        let hashes = hash_files(&files);
        self.persist(&hashes, &project_hash)
    }

    fn rebuild_and_persist(
        &mut self,
        files: &[String],
        project_hash: &str,
        yielder: &dyn YieldPoint,
    ) -> Result<RebuildStats, SessionError> {
        let stats = self.updater.full_rebuild(
            files,
            &mut self.index,
            &mut self.graph,
            yielder,
            self.config.batch_yield_size,
        );
        info!(
            files = stats.files_parsed,
            symbols = stats.symbols_indexed,
            edges = stats.edges_added,
            "full rebuild complete"
        );
        let hashes = hash_files(files);
        self.persist(&hashes, project_hash)?;
        Ok(stats)
    }

    fn persist(
        &self,
        file_hashes: &FxHashMap<String, String>,
        project_hash: &str,
    ) -> Result<(), SessionError> {
        self.cache
            .save(&self.index, &self.graph, file_hashes, project_hash)?;
        Ok(())
    }

    fn current_project_hash(&self) -> String {
        let path = self.project_root.join(&self.config.project_config_file);
        let text = std::fs::read_to_string(&path).unwrap_or_default();
        hash_project_config(&text)
    }

    /// Start an analysis: bump the monotone counter and take a ticket.
    fn begin_analysis(&mut self) -> u64 {
        self.version += 1;
        self.version
    }

    /// Discard the result when a newer analysis has started since.
    fn finish_analysis(&self, ticket: u64) -> Result<(), SessionError> {
        if self.version != ticket {
            warn!(ticket, current = self.version, "analysis superseded; result discarded");
            return Err(SessionError::Superseded);
        }
        Ok(())
    }
}

/// Convenience: initialize a session with no host yielding.
pub fn open_session(project_root: &Path) -> Result<(Session, RebuildStats), SessionError> {
    let config = RadiusConfig::load(project_root)?;
    let mut session = Session::new(project_root, config)?;
    let stats = session.initialize(&NoYield)?;
    Ok((session, stats))
}

/// xxh3 of each readable file's bytes; unreadable files are omitted and
/// therefore counted stale by the caller.
fn hash_files(files: &[String]) -> FxHashMap<String, String> {
    let mut hashes = FxHashMap::default();
    for path in files {
        match std::fs::read(path) {
            Ok(bytes) => {
                hashes.insert(path.clone(), hash_content(&bytes));
            }
            Err(e) => {
                debug!(file = path.as_str(), error = %e, "unreadable during hashing");
            }
        }
    }
    hashes
}
