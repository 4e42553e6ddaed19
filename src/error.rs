//! Error types for stacklab

use thiserror::Error;

/// Result type alias using stacklab's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// All errors that can occur in stacklab
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file missing, unreadable, or invalid
    #[error("config error: {0}")]
    Config(String),

    /// git operation failed
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// HTTP transport failure (connection, TLS, body decoding)
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API rejected a request. Fatal: the run stops here and the
    /// server's response body is surfaced for diagnostics.
    #[error("{context} for {source_branch} \u{2192} {target_branch}: HTTP {status}\n{body}")]
    Api {
        /// Which operation was rejected (e.g. "creating merge request")
        context: &'static str,
        /// HTTP status code returned by the server
        status: u16,
        /// Raw response body
        body: String,
        /// Source branch of the MR involved
        source_branch: String,
        /// Target branch of the MR involved
        target_branch: String,
    },

    /// The MR set does not form a simple parent-to-child path
    #[error("malformed merge request chain: {0}")]
    MalformedChain(String),

    /// Operation requires a remotely created MR (missing iid)
    #[error("merge request for {0} has not been created on the remote")]
    NotCreated(String),

    /// A retry policy ran out of attempts before the remote reached the
    /// expected state
    #[error("timed out waiting for remote: {waiting_for} (after {attempts} attempts)")]
    Timeout {
        /// Human-readable description of the condition being waited for
        waiting_for: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// The merge run stopped partway through the chain
    #[error("merge aborted at {branch}: {message}")]
    MergeAborted {
        /// Source branch of the chain link that failed
        branch: String,
        /// Underlying failure
        message: String,
    },

    /// Internal invariant violation (a bug, not a remote failure)
    #[error("internal error: {0}")]
    Internal(String),
}
