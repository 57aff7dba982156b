//! Workspace file enumeration and path normalization.

use std::path::Path;

use ignore::WalkBuilder;

/// Absolute path with forward slashes; the canonical form used in symbol
/// ids and cache keys.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Whether a path is a workspace source file the engine indexes.
pub fn is_workspace_source(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    if lower.contains("/node_modules/") || lower.contains("/typings/") {
        return false;
    }
    lower.ends_with(".ts") || lower.ends_with(".tsx")
}

/// Enumerate the project's TypeScript sources, sorted for deterministic
/// iteration. Respects gitignore rules and skips hidden directories and
/// `node_modules`.
pub fn scan_workspace(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .filter_entry(|entry| entry.file_name().to_string_lossy() != "node_modules")
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| normalize_path(entry.path()))
        .filter(|path| is_workspace_source(path))
        .collect();
    files.sort_unstable();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_finds_sources_and_skips_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("src/a.ts"), "export const a = 1;").unwrap();
        fs::write(dir.path().join("src/b.txt"), "not source").unwrap();
        fs::write(dir.path().join("node_modules/pkg/c.ts"), "export const c = 1;").unwrap();

        let files = scan_workspace(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/a.ts"));
    }
}
