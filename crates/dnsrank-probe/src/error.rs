use std::time::Duration;

use thiserror::Error;

/// Result type alias for probing operations
pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

/// Per-resolver failures during upstream construction or exchange.
///
/// None of these are fatal to the run; each disqualifies a single
/// resolver.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Server stamp could not be decoded
    #[error("invalid server stamp: {0}")]
    InvalidStamp(String),

    /// Stamp decodes to a transport this build cannot speak
    #[error("unsupported transport: {0}")]
    Unsupported(String),

    /// Network I/O failure during connect or exchange
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// HTTP-level failure from the DoH client
    #[error("HTTP error: {0}")]
    Http(String),

    /// TLS setup failure from the DoT client
    #[error("TLS error: {0}")]
    Tls(String),

    /// DNS wire-format encode/decode failure
    #[error("protocol error: {0}")]
    Proto(String),

    /// Response did not match the query
    #[error("bad response: {0}")]
    BadResponse(String),

    /// Exchange did not finish within the configured timeout
    #[error("exchange timed out after {0:?}")]
    Timeout(Duration),
}
