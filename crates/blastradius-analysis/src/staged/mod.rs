//! Staged-diff mapper: turn the VCS staging area into impact roots.
//!
//! The mapper never touches live state: it applies staged contents to
//! shadow clones through the incremental updater, classifies the fallout
//! (ghosts, ripples, renames, hunk overlaps), and hands a deduplicated
//! root list back to the caller.

pub mod git;

use tracing::debug;

use blastradius_core::errors::VcsError;
use blastradius_core::types::collections::FxHashMap;
use blastradius_core::types::report::SignatureReport;
use blastradius_core::types::roots::{dedupe_roots, ChangeReason, ImpactRoot};
use blastradius_core::types::symbol::{SymbolId, SymbolIndex};

use crate::analyzer::detect_ghosts;
use crate::graph::DependencyGraph;
use crate::incremental::IncrementalUpdater;
use crate::scanner::is_workspace_source;

/// Single-letter staging status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    TypeChanged,
}

impl StagedStatus {
    /// Map a VCS status letter; unknown letters are treated as modified.
    pub fn from_letter(letter: char) -> Self {
        match letter {
            'A' => Self::Added,
            'D' => Self::Deleted,
            'R' => Self::Renamed,
            'C' => Self::Copied,
            'T' => Self::TypeChanged,
            _ => Self::Modified,
        }
    }
}

/// One staged file entry.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub status: StagedStatus,
    pub path: String,
    /// Rename/copy source.
    pub old_path: Option<String>,
}

/// One staged hunk, post-image coordinates. Pure-deletion hunks
/// (`new_line_count == 0`) are excluded by the collaborator.
#[derive(Debug, Clone)]
pub struct StagedHunk {
    pub path: String,
    pub new_start_line: u32,
    pub new_line_count: u32,
}

/// The VCS collaborator contract. Binary-opaque; the core never invokes
/// VCS commands itself.
pub trait StagedSource {
    fn staged_files(&self) -> Result<Vec<StagedFile>, VcsError>;
    fn staged_content(&self, path: &str) -> Result<Option<String>, VcsError>;
    fn staged_hunks(&self) -> Result<Vec<StagedHunk>, VcsError>;
}

/// Everything the staged analysis produced besides the traversal itself.
#[derive(Debug)]
pub struct StagedAnalysis {
    pub roots: Vec<ImpactRoot>,
    pub reports: Vec<(String, SignatureReport)>,
    pub removed: Vec<SymbolId>,
    pub ghosts: Vec<SymbolId>,
    pub shadow_index: SymbolIndex,
    pub shadow_graph: DependencyGraph,
}

/// Map the staging area onto shadow clones of `index` and `graph`.
pub fn analyze_staged(
    vcs: &dyn StagedSource,
    updater: &mut IncrementalUpdater,
    index: &SymbolIndex,
    graph: &DependencyGraph,
) -> Result<StagedAnalysis, VcsError> {
    let mut shadow_index = index.clone();
    let mut shadow_graph = graph.clone();

    let mut reports: Vec<(String, SignatureReport)> = Vec::new();
    let mut removed: Vec<SymbolId> = Vec::new();
    let mut rename_dest_files: Vec<String> = Vec::new();
    let mut staged_texts: FxHashMap<String, String> = FxHashMap::default();

    for file in vcs.staged_files()? {
        if !is_workspace_source(&file.path)
            && !file.old_path.as_deref().is_some_and(is_workspace_source)
        {
            continue;
        }
        match file.status {
            StagedStatus::Deleted => {
                let report =
                    updater.handle_file_deleted(&file.path, &mut shadow_index, &mut shadow_graph);
                removed.extend(report.removed.iter().cloned());
                reports.push((file.path, report));
            }
            StagedStatus::Renamed | StagedStatus::Copied => {
                if let Some(old_path) = &file.old_path {
                    let report =
                        updater.handle_file_deleted(old_path, &mut shadow_index, &mut shadow_graph);
                    removed.extend(report.removed.iter().cloned());
                }
                if let Some(text) = read_staged(vcs, &file.path)? {
                    let report = updater.handle_file_created(
                        &file.path,
                        &text,
                        &mut shadow_index,
                        &mut shadow_graph,
                    );
                    staged_texts.insert(file.path.clone(), text);
                    rename_dest_files.push(file.path.clone());
                    reports.push((file.path, report));
                }
            }
            StagedStatus::Added | StagedStatus::Modified | StagedStatus::TypeChanged => {
                if let Some(text) = read_staged(vcs, &file.path)? {
                    let report = updater.handle_file_changed(
                        &file.path,
                        &text,
                        &mut shadow_index,
                        &mut shadow_graph,
                    );
                    staged_texts.insert(file.path.clone(), text);
                    reports.push((file.path, report));
                }
            }
        }
    }

    // Ghosts: still referenced in the staged graph, no declaration left.
    let ghosts = detect_ghosts(&shadow_graph, &shadow_index);

    let mut candidates: Vec<ImpactRoot> = Vec::new();
    for ghost in &ghosts {
        candidates.push(ImpactRoot::deep(ghost.clone(), ChangeReason::Deleted));
    }
    for id in &removed {
        candidates.push(ImpactRoot::deep(id.clone(), ChangeReason::Deleted));
    }
    for (_, report) in &reports {
        for id in &report.ripple {
            candidates.push(ImpactRoot::deep(id.clone(), ChangeReason::SignatureRipple));
        }
    }
    for file in &rename_dest_files {
        for id in shadow_index.ids_in_file(file) {
            candidates.push(ImpactRoot::deep(id, ChangeReason::Renamed));
        }
    }

    // Hunk overlap: body-change candidates against the staged symbols.
    for (path, ranges) in hunk_offsets(vcs, &staged_texts)? {
        for (start, end) in ranges {
            for symbol in shadow_index.symbols_in_file(&path) {
                if symbol.overlaps(start, end) {
                    candidates.push(ImpactRoot::shallow(
                        symbol.id.clone(),
                        ChangeReason::BodyChange,
                    ));
                }
            }
        }
    }

    let roots = dedupe_roots(candidates);
    debug!(
        roots = roots.len(),
        ghosts = ghosts.len(),
        files = reports.len(),
        "staged analysis mapped"
    );

    Ok(StagedAnalysis {
        roots,
        reports,
        removed,
        ghosts,
        shadow_index,
        shadow_graph,
    })
}

fn read_staged(vcs: &dyn StagedSource, path: &str) -> Result<Option<String>, VcsError> {
    match vcs.staged_content(path)? {
        Some(text) if !text.is_empty() => Ok(Some(text)),
        _ => {
            // File changed between enumeration and read; skip it.
            debug!(file = path, "staged content unavailable; skipping");
            Ok(None)
        }
    }
}

/// Convert each file's hunks into inclusive character ranges, reading the
/// staged text once per file.
fn hunk_offsets(
    vcs: &dyn StagedSource,
    staged_texts: &FxHashMap<String, String>,
) -> Result<Vec<(String, Vec<(u32, u32)>)>, VcsError> {
    let mut by_file: FxHashMap<String, Vec<(u32, u32)>> = FxHashMap::default();

    for hunk in vcs.staged_hunks()? {
        if hunk.new_line_count == 0 || !is_workspace_source(&hunk.path) {
            continue;
        }
        let Some(text) = staged_texts.get(&hunk.path) else {
            continue;
        };
        let end_line = hunk.new_start_line + hunk.new_line_count - 1;
        if let Some(range) = line_range_to_offsets(text, hunk.new_start_line, end_line) {
            by_file.entry(hunk.path.clone()).or_default().push(range);
        }
    }

    Ok(by_file.into_iter().collect())
}

/// Map a 1-based inclusive line range to inclusive byte offsets.
///
/// Line numbers are clamped to the file's line count; the end offset is
/// the last character of the end line, newline excluded.
pub fn line_range_to_offsets(text: &str, start_line: u32, end_line: u32) -> Option<(u32, u32)> {
    if start_line == 0 {
        return None;
    }
    let bytes = text.as_bytes();
    let mut line_starts: Vec<usize> = vec![0];
    for (i, b) in bytes.iter().enumerate() {
        // A trailing newline does not open another line.
        if *b == b'\n' && i + 1 < bytes.len() {
            line_starts.push(i + 1);
        }
    }
    let line_count = line_starts.len() as u32;

    let start = start_line.min(line_count);
    let end = end_line.clamp(start, line_count);

    let start_offset = line_starts[(start - 1) as usize];
    let end_exclusive = if (end as usize) < line_starts.len() {
        // One past the end line's last character, newline excluded.
        line_starts[end as usize] - 1
    } else if text.ends_with('\n') {
        text.len() - 1
    } else {
        text.len()
    };
    let end_offset = end_exclusive.saturating_sub(1).max(start_offset);

    Some((start_offset as u32, end_offset as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ranges_exclude_the_trailing_newline() {
        let text = "line one\nline two\nline three\n";
        let (start, end) = line_range_to_offsets(text, 2, 2).unwrap();
        assert_eq!(&text[start as usize..=end as usize], "line two");
    }

    #[test]
    fn line_ranges_clamp_to_file_length() {
        let text = "only\n";
        let (start, end) = line_range_to_offsets(text, 5, 9).unwrap();
        assert_eq!(&text[start as usize..=end as usize], "only");
    }

    #[test]
    fn status_letters_map() {
        assert_eq!(StagedStatus::from_letter('A'), StagedStatus::Added);
        assert_eq!(StagedStatus::from_letter('R'), StagedStatus::Renamed);
        assert_eq!(StagedStatus::from_letter('X'), StagedStatus::Modified);
    }
}
