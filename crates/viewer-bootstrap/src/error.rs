use thiserror::Error;

/// Failure to obtain the text of a remote configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {message}")]
    Request {
        /// The requested URL.
        url: String,
        /// Underlying client message.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    Status {
        /// The requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be read as text.
    #[error("failed to read response body from {url}: {message}")]
    Body {
        /// The requested URL.
        url: String,
        /// Underlying client message.
        message: String,
    },

    /// A config URL was supplied but the session has no fetcher.
    #[error("no fetcher available for {url}")]
    NoFetcher {
        /// The requested URL.
        url: String,
    },
}

/// Construction or render failure reported by the rendering engine.
///
/// The message is shown to the user verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RenderError {
    /// Human-readable reason.
    message: String,
}

impl RenderError {
    /// Create a render error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The engine's message.
    pub fn message(&self) -> &str {
        &self.message
    }
}
