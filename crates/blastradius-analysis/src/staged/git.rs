//! Git CLI adapter for the staged-source contract.
//!
//! "Not a repository", "nothing staged", and "git absent" are all mapped
//! to an empty staged set; only genuinely unparseable output is an error.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use blastradius_core::errors::VcsError;

use crate::scanner::normalize_path;

use super::{StagedFile, StagedHunk, StagedSource, StagedStatus};

/// Staged-source implementation shelling out to `git`.
pub struct GitStagedSource {
    repo_root: PathBuf,
}

impl GitStagedSource {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
        }
    }

    /// Run git and capture stdout; `None` when git is unavailable or the
    /// command fails (treated as an empty staging area).
    fn git(&self, args: &[&str]) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(args)
            .output();
        match output {
            Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
            Ok(out) => {
                debug!(
                    args = ?args,
                    status = ?out.status.code(),
                    "git command failed; treating staging area as empty"
                );
                None
            }
            Err(e) => {
                debug!(error = %e, "git unavailable; treating staging area as empty");
                None
            }
        }
    }

    fn absolute(&self, repo_relative: &str) -> String {
        normalize_path(&self.repo_root.join(repo_relative))
    }

    fn repo_relative(&self, absolute: &str) -> String {
        let root = normalize_path(&self.repo_root);
        absolute
            .strip_prefix(&root)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .unwrap_or_else(|| absolute.to_string())
    }
}

impl StagedSource for GitStagedSource {
    fn staged_files(&self) -> Result<Vec<StagedFile>, VcsError> {
        let Some(output) = self.git(&["diff", "--cached", "--name-status"]) else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            let mut columns = line.split('\t');
            let Some(status_token) = columns.next() else {
                continue;
            };
            let Some(letter) = status_token.chars().next() else {
                continue;
            };
            let status = StagedStatus::from_letter(letter);

            let first = columns.next().map(str::to_string);
            let second = columns.next().map(str::to_string);
            match (status, first, second) {
                // Rename/copy rows carry source then destination.
                (StagedStatus::Renamed | StagedStatus::Copied, Some(old), Some(new)) => {
                    files.push(StagedFile {
                        status,
                        path: self.absolute(&new),
                        old_path: Some(self.absolute(&old)),
                    });
                }
                (_, Some(path), _) => {
                    files.push(StagedFile {
                        status,
                        path: self.absolute(&path),
                        old_path: None,
                    });
                }
                _ => {
                    return Err(VcsError::BadOutput {
                        message: format!("name-status row without a path: {line:?}"),
                    });
                }
            }
        }
        Ok(files)
    }

    fn staged_content(&self, path: &str) -> Result<Option<String>, VcsError> {
        let spec = format!(":{}", self.repo_relative(path));
        Ok(self.git(&["show", &spec]))
    }

    fn staged_hunks(&self) -> Result<Vec<StagedHunk>, VcsError> {
        let Some(output) = self.git(&["diff", "--cached", "--unified=0"]) else {
            return Ok(Vec::new());
        };

        let mut hunks = Vec::new();
        let mut current_path: Option<String> = None;
        for line in output.lines() {
            if let Some(rest) = line.strip_prefix("+++ b/") {
                current_path = Some(self.absolute(rest.trim()));
            } else if line.starts_with("+++ ") {
                // `+++ /dev/null`: deletion, no post-image.
                current_path = None;
            } else if let Some(header) = line.strip_prefix("@@ ") {
                let Some(path) = &current_path else {
                    continue;
                };
                if let Some((start, count)) = parse_hunk_header(header) {
                    // Pure-deletion hunks carry no post-image lines.
                    if count > 0 {
                        hunks.push(StagedHunk {
                            path: path.clone(),
                            new_start_line: start,
                            new_line_count: count,
                        });
                    }
                }
            }
        }
        Ok(hunks)
    }
}

/// Parse `-a,b +c,d @@ ...` and return the post-image `(start, count)`.
fn parse_hunk_header(header: &str) -> Option<(u32, u32)> {
    let plus = header.split_whitespace().find(|t| t.starts_with('+'))?;
    let spec = &plus[1..];
    match spec.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((spec.parse().ok()?, 1)),
    }
}
