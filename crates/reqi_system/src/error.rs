//! Errors raised by system implementations during execution.

/// Errors a [`System`](crate::System) may return from `execute`.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// The system refused to execute the node sequence.
    #[error("system '{system}' rejected the request: {reason}")]
    Rejected { system: String, reason: String },

    /// A node referenced a schema the system does not expose.
    #[error("system '{system}' does not expose schema '{schema}'")]
    UnknownSchema { system: String, schema: String },

    /// Storage or backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}
