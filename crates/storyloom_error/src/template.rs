//! Template rendering error types.

/// Specific error conditions for template rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TemplateErrorKind {
    /// A placeholder in the template has no supplied value
    #[display("No value supplied for placeholder '{}'", _0)]
    MissingPlaceholder(String),
    /// A `{` was opened but never closed
    #[display("Unclosed placeholder starting at byte {}", _0)]
    UnclosedPlaceholder(usize),
    /// A lone `}` that is not part of a `}}` escape
    #[display("Unmatched '}}' at byte {}", _0)]
    UnmatchedBrace(usize),
    /// A placeholder with an empty or malformed name
    #[display("Invalid placeholder name '{}'", _0)]
    InvalidPlaceholder(String),
    /// The requested template identifier is not configured
    #[display("Unknown template '{}'", _0)]
    UnknownTemplate(String),
}

/// Error type for template rendering.
///
/// # Examples
///
/// ```
/// use storyloom_error::{TemplateError, TemplateErrorKind};
///
/// let err = TemplateError::new(TemplateErrorKind::MissingPlaceholder("topic".into()));
/// assert!(format!("{}", err).contains("topic"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Template Error: {} at line {} in {}", kind, line, file)]
pub struct TemplateError {
    /// The specific error condition
    pub kind: TemplateErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TemplateError {
    /// Create a new TemplateError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TemplateErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
