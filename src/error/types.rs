//! Error type definitions
//!
//! Defines the error taxonomy used throughout the importer library.

use thiserror::Error;

/// Main error type for the importer
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failures: DNS, connect, timeout, interrupted reads
    #[error("Network error: {0}")]
    Network(String),

    /// TLS certificate validation failures
    #[error("Transport security error: {0}")]
    TransportSecurity(String),

    /// Structurally unexpected responses (bad JSON, missing fields)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Errors reported by the LinguaLeo service itself
    #[error("Remote API error: {0}")]
    Remote(String),

    /// Per-word media download failures, aggregated by the pipeline
    #[error("Media download failed for '{word}': {reason}")]
    Download { word: String, reason: String },

    /// Cooperative cancellation observed between requests
    #[error("Operation cancelled")]
    Cancelled,

    /// Cookie store load/save failures
    #[error("Cookie store error: {0}")]
    Cookie(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new transport security error
    pub fn transport_security(msg: impl Into<String>) -> Self {
        Self::TransportSecurity(msg.into())
    }

    /// Create a new protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a new remote API error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a media download error for one word
    pub fn download(word: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Download {
            word: word.into(),
            reason: reason.into(),
        }
    }

    /// Create a new cookie store error
    pub fn cookie(msg: impl Into<String>) -> Self {
        Self::Cookie(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if is_certificate_error(&err) {
            Self::TransportSecurity(describe_chain(&err))
        } else if err.is_decode() {
            Self::Protocol(describe_chain(&err))
        } else {
            Self::Network(describe_chain(&err))
        }
    }
}

/// Render an error and its full source chain as one line.
///
/// `reqwest::Error`'s `Display` hides the underlying cause ("error sending
/// request for url"), so the chain is what actually tells the user whether
/// DNS, TLS or the socket failed.
pub(crate) fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Whether a transport error looks like a certificate validation failure.
///
/// Matched on the rendered source chain. rustls reports "invalid peer
/// certificate"; native stacks mention "SSL" or "self signed".
pub(crate) fn is_certificate_error(err: &reqwest::Error) -> bool {
    chain_mentions_certificate(&describe_chain(err))
}

fn chain_mentions_certificate(chain: &str) -> bool {
    let lower = chain.to_lowercase();
    lower.contains("certificate") || lower.contains("ssl") || lower.contains("self signed")
}
