//! Intent oracle errors.

/// The oracle failed to produce a structured descriptor.
/// No analysis runs when this is returned.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Intent parse failed for {prompt:?}: {reason}")]
pub struct IntentParseError {
    pub prompt: String,
    pub reason: String,
}
