//! Error types for the flowchat core.
//!
//! [`ChatError`] covers the conversation controller and configuration;
//! [`TransportError`] is what a [`Transport`](crate::transport::Transport)
//! fails with and is classified into a reply by the controller.

/// Error type for controller and configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A send was attempted while a previous exchange is still unresolved.
    #[error("a message is already being sent")]
    ExchangeInFlight,

    /// Suggestion ids are 1-based indexes into the suggestion list.
    #[error("no suggestion with id {0}")]
    UnknownSuggestion(u32),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file (de)serialization.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a flow invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request never produced a response (connect, DNS, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Server { status: u16, detail: Option<String> },

    /// The server answered 2xx but the body was not JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The background task running the request died before settling.
    #[error("request task ended unexpectedly: {0}")]
    Aborted(String),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
