//! Per-file import bindings and module-specifier resolution.
//!
//! Only relative specifiers resolve: bare specifiers are third-party
//! dependencies, which the graph excludes by contract.

use blastradius_core::types::collections::{FxHashMap, FxHashSet};

use crate::parser::ParsedFile;

/// What a local import name is bound to.
#[derive(Debug, Clone)]
pub enum ImportBinding {
    /// `import { x } from './m'` or `import x from './m'`.
    Named { file: String, exported: String },
    /// `import * as ns from './m'`.
    Namespace { file: String },
}

/// Local name -> binding for one file.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    bindings: FxHashMap<String, ImportBinding>,
}

impl ImportTable {
    pub fn get(&self, local_name: &str) -> Option<&ImportBinding> {
        self.bindings.get(local_name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Scan a file's import statements and resolve their specifiers against the
/// set of files the index currently knows.
pub fn build_import_table(file: &ParsedFile, known_files: &FxHashSet<String>) -> ImportTable {
    let mut table = ImportTable::default();
    let root = file.root();
    let mut cursor = root.walk();

    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "import_statement" {
            continue;
        }
        let Some(source) = statement.child_by_field_name("source") else {
            continue;
        };
        let specifier = file.slice(source).trim_matches(['"', '\'']).to_string();
        let Some(target) = resolve_specifier(file.path(), &specifier, known_files) else {
            continue;
        };

        let mut clause_cursor = statement.walk();
        for clause in statement.named_children(&mut clause_cursor) {
            if clause.kind() != "import_clause" {
                continue;
            }
            let mut inner = clause.walk();
            for binding in clause.named_children(&mut inner) {
                match binding.kind() {
                    // Default import: binds by its own name; resolves only
                    // when the target exports a same-named declaration.
                    "identifier" => {
                        let name = file.slice(binding).to_string();
                        table.bindings.insert(
                            name.clone(),
                            ImportBinding::Named {
                                file: target.clone(),
                                exported: name,
                            },
                        );
                    }
                    "namespace_import" => {
                        if let Some(alias) = binding.named_child(0) {
                            table.bindings.insert(
                                file.slice(alias).to_string(),
                                ImportBinding::Namespace {
                                    file: target.clone(),
                                },
                            );
                        }
                    }
                    "named_imports" => {
                        let mut spec_cursor = binding.walk();
                        for spec in binding.named_children(&mut spec_cursor) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let Some(name_node) = spec.child_by_field_name("name") else {
                                continue;
                            };
                            let exported = file.slice(name_node).to_string();
                            let local = spec
                                .child_by_field_name("alias")
                                .map(|a| file.slice(a).to_string())
                                .unwrap_or_else(|| exported.clone());
                            table.bindings.insert(
                                local,
                                ImportBinding::Named {
                                    file: target.clone(),
                                    exported,
                                },
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    table
}

/// Resolve a relative module specifier to a known workspace file.
fn resolve_specifier(
    importer: &str,
    specifier: &str,
    known_files: &FxHashSet<String>,
) -> Option<String> {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return None;
    }
    let dir = importer.rsplit_once('/').map(|(d, _)| d).unwrap_or("");
    let joined = normalize_joined(dir, specifier);

    let candidates = [
        format!("{joined}.ts"),
        format!("{joined}.tsx"),
        joined.clone(),
        format!("{joined}/index.ts"),
        format!("{joined}/index.tsx"),
    ];
    candidates.into_iter().find(|c| known_files.contains(c))
}

/// Lexically join and normalize `dir/spec`, collapsing `.` and `..`.
fn normalize_joined(dir: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    let mut out = String::new();
    for part in parts {
        out.push('/');
        out.push_str(part);
    }
    out
}
