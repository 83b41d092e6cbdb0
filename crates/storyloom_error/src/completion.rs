//! Completion client error types.

/// Error kinds for completion requests.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum CompletionErrorKind {
    /// HTTP request failed
    #[display("HTTP request failed: {}", _0)]
    Http(String),

    /// Endpoint answered with a non-success status
    #[display("API error {}: {}", status, message)]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Failed to deserialize response
    #[display("Failed to deserialize response: {}", _0)]
    Deserialization(String),

    /// Stream broke off or carried invalid data
    #[display("Stream error: {}", _0)]
    Stream(String),

    /// The response finished without any content
    #[display("Completion returned no content")]
    EmptyResponse,

    /// Client configuration error
    #[display("Configuration error: {}", _0)]
    Configuration(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The error kind
    pub kind: CompletionErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
