// ── Core error types ──
//
// User-facing errors from passweave-core. Derivation functions prefer
// degrading with a diagnostic over returning errors; the variants here
// cover the cases the caller must react to (rejected edges, empty plans,
// missing nodes). The `From<passweave_api::Error>` impl translates
// transport-layer errors at the crate seam.

use thiserror::Error;

use crate::model::NodeId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Graph errors ─────────────────────────────────────────────────
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid connection: {source_kind} -> {target_kind} is not allowed")]
    InvalidConnection {
        source_kind: &'static str,
        target_kind: &'static str,
    },

    // ── Submission errors ────────────────────────────────────────────
    #[error("Nothing to submit: no resolvable endpoint nodes on the canvas")]
    NothingToSubmit,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<passweave_api::Error> for CoreError {
    fn from(err: passweave_api::Error) -> Self {
        match err {
            passweave_api::Error::InvalidToken => CoreError::Api {
                message: "Invalid API token".into(),
                status: Some(401),
            },
            passweave_api::Error::Authentication { message } => CoreError::Api {
                message,
                status: Some(401),
            },
            passweave_api::Error::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            passweave_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            passweave_api::Error::Api { message, status } => CoreError::Api {
                message,
                status: Some(status),
            },
            passweave_api::Error::Deserialization { message, .. } => CoreError::Api {
                message: format!("Malformed response: {message}"),
                status: None,
            },
        }
    }
}
