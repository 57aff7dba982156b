//! Bidirectional dependency graph store.

mod store;

pub use store::{DependencyGraph, GraphData};
