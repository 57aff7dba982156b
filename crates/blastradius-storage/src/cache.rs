//! Cache artifact reads and writes.
//!
//! Layout under `<project>/<cache-dir>/`:
//!
//! ```text
//! graph.json        { "forward": {id: [id,..]}, "reverse": {id: [id,..]} }
//! symbols.json      { id: Symbol, .. }
//! fileHashes.json   { "<absPath>": "<hex>", .. }
//! metadata.json     { "projectHash": "<hex>", "createdAt": ISO-8601, "version": "<semver>" }
//! ```
//!
//! Reads are forgiving: a missing or corrupt artifact means "no cache" and
//! the caller falls back to a full rebuild. Writes are strict.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use blastradius_analysis::graph::{DependencyGraph, GraphData};
use blastradius_core::errors::CacheError;
use blastradius_core::types::collections::FxHashMap;
use blastradius_core::types::symbol::{Symbol, SymbolIndex};

const GRAPH_FILE: &str = "graph.json";
const SYMBOLS_FILE: &str = "symbols.json";
const FILE_HASHES_FILE: &str = "fileHashes.json";
const METADATA_FILE: &str = "metadata.json";

/// Everything a successful cache load restores.
#[derive(Debug)]
pub struct CacheArtifacts {
    pub index: SymbolIndex,
    pub graph: DependencyGraph,
    pub file_hashes: FxHashMap<String, String>,
    pub project_hash: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    project_hash: String,
    created_at: String,
    version: String,
}

/// Reads and writes the cache directory.
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(project_root: &Path, cache_dir_name: &str) -> Self {
        Self {
            dir: project_root.join(cache_dir_name),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load all artifacts; `None` when any is missing or unreadable.
    pub fn load(&self) -> Option<CacheArtifacts> {
        let metadata: Metadata = self.read_json(METADATA_FILE)?;
        let symbols: BTreeMap<String, Symbol> = self.read_json(SYMBOLS_FILE)?;
        let graph_data = self.read_graph()?;
        let file_hashes: BTreeMap<String, String> = self.read_json(FILE_HASHES_FILE)?;

        let mut index = SymbolIndex::new();
        for (_, symbol) in symbols {
            index.insert(symbol);
        }

        debug!(
            symbols = index.len(),
            files = file_hashes.len(),
            version = metadata.version.as_str(),
            "cache artifacts loaded"
        );

        Some(CacheArtifacts {
            index,
            graph: DependencyGraph::from_data(graph_data),
            file_hashes: file_hashes.into_iter().collect(),
            project_hash: metadata.project_hash,
            version: metadata.version,
        })
    }

    /// Persist every artifact. Pretty JSON for the human-inspectable
    /// files, compact for the potentially-large hash table.
    pub fn save(
        &self,
        index: &SymbolIndex,
        graph: &DependencyGraph,
        file_hashes: &FxHashMap<String, String>,
        project_hash: &str,
    ) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.display().to_string(),
            message: e.to_string(),
        })?;

        let symbols: BTreeMap<&str, &Symbol> =
            index.iter().map(|(id, s)| (id.as_str(), s)).collect();
        self.write_json(SYMBOLS_FILE, &symbols, true)?;
        self.write_json(GRAPH_FILE, &graph.to_data(), true)?;

        let hashes: BTreeMap<&String, &String> = file_hashes.iter().collect();
        self.write_json(FILE_HASHES_FILE, &hashes, false)?;

        let metadata = Metadata {
            project_hash: project_hash.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        self.write_json(METADATA_FILE, &metadata, true)?;
        Ok(())
    }

    /// Read `graph.json`, accepting both the flat form and the legacy
    /// sectioned form with `present`/`future` top-level keys.
    fn read_graph(&self) -> Option<GraphData> {
        let value: serde_json::Value = self.read_json(GRAPH_FILE)?;
        let section = if value.get("present").is_some() {
            value.get("present")?.clone()
        } else {
            value
        };
        match serde_json::from_value(section) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(error = %e, "graph artifact malformed; cache ignored");
                None
            }
        }
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.dir.join(name);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                debug!(file = %path.display(), error = %e, "cache artifact unavailable");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "cache artifact malformed; cache ignored");
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T, pretty: bool) -> Result<(), CacheError> {
        let path = self.dir.join(name);
        let text = if pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| CacheError::Malformed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| CacheError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
