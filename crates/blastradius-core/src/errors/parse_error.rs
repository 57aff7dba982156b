//! Parse errors.

/// Errors raised by the parser adapter.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Grammar initialization failed: {message}")]
    Language { message: String },

    #[error("Parser produced no tree for {path}")]
    NoTree { path: String },
}
