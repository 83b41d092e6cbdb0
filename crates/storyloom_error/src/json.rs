//! Seed file encoding errors.

/// What went wrong while moving a session seed to or from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum JsonErrorKind {
    /// The seed could not be encoded
    #[display("Failed to serialize seed: {}", _0)]
    Serialize(String),
    /// A seed file on disk is not valid JSON for the seed shape
    #[display("Failed to parse {}: {}", path, message)]
    Parse {
        /// File that was read
        path: String,
        /// Decoder message
        message: String,
    },
}

/// Seed encoding error with source location.
///
/// # Examples
///
/// ```
/// use storyloom_error::{JsonError, JsonErrorKind};
///
/// let err = JsonError::new(JsonErrorKind::Parse {
///     path: "stories/keeper/seed.json".into(),
///     message: "expected value at line 1 column 1".into(),
/// });
/// assert!(err.to_string().contains("seed.json"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", kind, line, file)]
pub struct JsonError {
    /// The specific error condition
    pub kind: JsonErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Create a new JsonError at the current location.
    #[track_caller]
    pub fn new(kind: JsonErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
