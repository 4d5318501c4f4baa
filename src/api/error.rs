use thiserror::Error;

/// Errors surfaced by the inventory API client.
///
/// `Api` displays as the bare server message so that per-host failure
/// reporting can attach it to a host verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, timeout)
    #[error("request failed: {0}")]
    Network(String),

    /// The service answered with a non-success status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but the payload was not usable
    #[error("failed to parse response: {0}")]
    Parse(String),
}
