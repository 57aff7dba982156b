//! VCS collaborator errors.

/// Errors raised by the staged-diff collaborator.
///
/// "Not a repository" and "tool absent" are not errors: the adapter maps
/// those to an empty staged set before they reach the core.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("VCS command failed: {message}")]
    CommandFailed { message: String },

    #[error("Unparseable VCS output: {message}")]
    BadOutput { message: String },
}
