//! Cache persistence errors.

/// Errors raised while reading or writing cache artifacts.
///
/// Read-side errors are never surfaced to the user: an unreadable artifact
/// means a full rebuild.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to access {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed artifact {path}: {message}")]
    Malformed { path: String, message: String },
}
