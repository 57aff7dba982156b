//! Intent pipeline: resolve oracle hints, build a virtual diff on shadow
//! clones, traverse the live graph, and attach depth-degraded confidence.

pub mod oracle;
pub mod resolver;

use tracing::debug;

use blastradius_core::config::RadiusConfig;
use blastradius_core::types::collections::{FxHashMap, FxHashSet};
use blastradius_core::types::impact::BlastRadiusResult;
use blastradius_core::types::intent::{ChangeType, Confidence, IntentDescriptor};
use blastradius_core::types::roots::{dedupe_roots, ChangeReason, ImpactRoot};
use blastradius_core::types::symbol::{Symbol, SymbolId, SymbolIndex, SymbolKind};

use crate::engine::compute_blast_radius;
use crate::extract::signature::hash_signature;
use crate::graph::DependencyGraph;
use resolver::{resolve_intent, ResolvedTarget};

/// Everything an intent analysis produces.
#[derive(Debug)]
pub struct IntentAnalysis {
    pub descriptor: IntentDescriptor,
    /// False when the prompt is foreign to the codebase; the result is
    /// empty and the UI must say so.
    pub relevant: bool,
    pub targets: Vec<ResolvedTarget>,
    pub result: BlastRadiusResult,
    /// Per-impacted-symbol confidence after depth degradation.
    pub confidences: FxHashMap<SymbolId, Confidence>,
    /// Hypothetical symbols synthesized for unresolved `add` hints;
    /// display-only, never traversed.
    pub phantoms: Vec<Symbol>,
    pub shadow_index: SymbolIndex,
    pub shadow_graph: DependencyGraph,
}

/// Run the full intent pipeline against the live index and graph.
///
/// The traversal runs against the live graph: the question is who
/// currently depends on the resolved symbols. The shadow clones exist so
/// deletions and phantoms are visible to the UI without touching live
/// state.
pub fn analyze_intent(
    descriptor: IntentDescriptor,
    index: &SymbolIndex,
    graph: &DependencyGraph,
    project_root: &str,
    config: &RadiusConfig,
) -> IntentAnalysis {
    let outcome = resolve_intent(&descriptor, index, project_root, config);

    if !outcome.relevant {
        debug!(
            prompt = descriptor.prompt.as_str(),
            best_keyword_score = outcome.best_keyword_score,
            "prompt is foreign to the codebase"
        );
        return IntentAnalysis {
            descriptor,
            relevant: false,
            targets: Vec::new(),
            result: BlastRadiusResult::default(),
            confidences: FxHashMap::default(),
            phantoms: Vec::new(),
            shadow_index: index.clone(),
            shadow_graph: graph.clone(),
        };
    }

    let mut shadow_index = index.clone();
    let shadow_graph = graph.clone();

    // Virtual diff: classify each resolved target into a root.
    let mut candidates: Vec<ImpactRoot> = Vec::new();
    for target in &outcome.targets {
        match descriptor.change_type {
            ChangeType::Delete => {
                // Remove the declaration from the shadow; reverse edges
                // stay in the live graph so the traversal finds dependents.
                shadow_index.remove(&target.symbol_id);
                candidates.push(ImpactRoot::deep(target.symbol_id.clone(), ChangeReason::Deleted));
            }
            _ if descriptor.affects_public_api => {
                candidates.push(ImpactRoot::deep(
                    target.symbol_id.clone(),
                    ChangeReason::SignatureRipple,
                ));
            }
            _ => {
                candidates.push(ImpactRoot::shallow(
                    target.symbol_id.clone(),
                    ChangeReason::BodyChange,
                ));
            }
        }
    }

    // Phantoms for `add`: one per hint that resolved to nothing real.
    let mut phantoms: Vec<Symbol> = Vec::new();
    if descriptor.change_type == ChangeType::Add {
        let resolved_names: FxHashSet<String> = outcome
            .targets
            .iter()
            .filter_map(|t| index.get(&t.symbol_id))
            .map(|s| s.name.to_lowercase())
            .collect();
        for hint in &descriptor.symbol_hints {
            if resolved_names.contains(&hint.to_lowercase()) {
                continue;
            }
            let phantom = phantom_symbol(hint);
            shadow_index.insert(phantom.clone());
            phantoms.push(phantom);
        }
    }

    let roots = dedupe_roots(candidates);
    let mut result = compute_blast_radius(&roots, graph);

    // Confidence degradation: root confidence for depth <= 1, one tier
    // down for anything deeper; best path wins per symbol.
    let root_confidence: FxHashMap<&SymbolId, Confidence> = outcome
        .targets
        .iter()
        .map(|t| (&t.symbol_id, t.confidence))
        .collect();
    let mut confidences: FxHashMap<SymbolId, Confidence> = FxHashMap::default();
    for (id, paths) in &result.paths {
        for path in paths {
            let Some(root) = path.first() else { continue };
            let base = root_confidence
                .get(root)
                .copied()
                .unwrap_or(Confidence::Low);
            let depth = path.len().saturating_sub(1);
            let effective = if depth <= 1 { base } else { base.demote() };
            confidences
                .entry(id.clone())
                .and_modify(|c| *c = (*c).max(effective))
                .or_insert(effective);
        }
    }

    // Delete post-filter: intra-file dependents of a deletion are being
    // deleted with it.
    if descriptor.change_type == ChangeType::Delete {
        let root_files: FxHashSet<&str> = roots
            .iter()
            .map(|r| r.symbol_id.file_path())
            .collect();
        strip_same_file_impact(&mut result, &mut confidences, &root_files);
    }

    debug!(
        targets = outcome.targets.len(),
        roots = result.roots.len(),
        impacted = result.total_impacted(),
        phantoms = phantoms.len(),
        "intent analysis complete"
    );

    IntentAnalysis {
        descriptor,
        relevant: true,
        targets: outcome.targets,
        result,
        confidences,
        phantoms,
        shadow_index,
        shadow_graph,
    }
}

/// A display-only symbol for a hypothetical new declaration. Phantoms have
/// no edges and are never roots.
fn phantom_symbol(name: &str) -> Symbol {
    Symbol {
        id: SymbolId::phantom(name),
        name: name.to_string(),
        qualified_name: name.to_string(),
        kind: SymbolKind::Function,
        file_path: blastradius_core::types::symbol::PHANTOM_PREFIX.to_string(),
        start_line: 0,
        end_line: 0,
        start_offset: 0,
        end_offset: 0,
        is_exported: false,
        parent_id: None,
        signature_hash: hash_signature(name),
    }
}

fn strip_same_file_impact(
    result: &mut BlastRadiusResult,
    confidences: &mut FxHashMap<SymbolId, Confidence>,
    root_files: &FxHashSet<&str>,
) {
    let doomed = |id: &SymbolId| root_files.contains(id.file_path());
    result.direct_impact.retain(|id| !doomed(id));
    result.indirect_impact.retain(|id| !doomed(id));
    result.depth_map.retain(|id, _| !doomed(id));
    result.paths.retain(|id, _| !doomed(id));
    confidences.retain(|id, _| !doomed(id));
}
