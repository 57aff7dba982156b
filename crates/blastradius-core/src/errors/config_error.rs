//! Configuration errors.

/// Errors raised while loading or validating the run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    FileUnreadable { path: String, message: String },

    #[error("Invalid config {path}: {message}")]
    ParseFailed { path: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}
