//! Session errors aggregating subsystem failures.

use super::{CacheError, ConfigError, IntentParseError, ParseError, VcsError};

/// Errors crossing the session boundary.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Intent error: {0}")]
    Intent(#[from] IntentParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis superseded by a newer request")]
    Superseded,
}
