//! Cache persistence: the symbol index, the bidirectional graph, per-file
//! content hashes, and project metadata, all as JSON artifacts under the
//! cache directory.

pub mod cache;
pub mod hasher;

pub use cache::{CacheArtifacts, CacheStore};
pub use hasher::{hash_content, hash_project_config};
