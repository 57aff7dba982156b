//! Per-file signature change report.

use serde::{Deserialize, Serialize};

use super::symbol::SymbolId;

/// Outcome of re-indexing one file, partitioned by signature fate.
///
/// `removed` doubles as the failure channel: when a reparse fails, the
/// file's symbols stay evicted and every snapshot id lands here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureReport {
    /// Symbols not present in the pre-parse snapshot.
    pub added: Vec<SymbolId>,
    /// Symbols whose signature hash changed.
    pub ripple: Vec<SymbolId>,
    /// Symbols whose signature hash is unchanged.
    pub safe: Vec<SymbolId>,
    /// Snapshot ids absent after the re-parse.
    pub removed: Vec<SymbolId>,
}

impl SignatureReport {
    pub fn is_quiet(&self) -> bool {
        self.added.is_empty() && self.ripple.is_empty() && self.removed.is_empty()
    }
}
