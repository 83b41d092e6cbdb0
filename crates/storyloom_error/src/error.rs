//! Top-level error wrapper types.

use crate::{
    BuilderError, CompletionError, ConfigError, JsonError, PipelineError, StorageError,
    TemplateError,
};

/// Every error condition a Storyloom operation can surface.
///
/// # Examples
///
/// ```
/// use storyloom_error::{StoryloomError, TemplateError, TemplateErrorKind};
///
/// let template_err = TemplateError::new(TemplateErrorKind::MissingPlaceholder("topic".into()));
/// let err: StoryloomError = template_err.into();
/// assert!(format!("{}", err).contains("topic"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryloomErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Session storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Template rendering error
    #[from(TemplateError)]
    Template(TemplateError),
    /// Completion client error
    #[from(CompletionError)]
    Completion(CompletionError),
    /// Pipeline stage error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Storyloom error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyloom_error::{StoryloomResult, ConfigError};
///
/// fn might_fail() -> StoryloomResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyloom Error: {}", _0)]
pub struct StoryloomError(Box<StoryloomErrorKind>);

impl StoryloomError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryloomErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryloomErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to StoryloomErrorKind
impl<T> From<T> for StoryloomError
where
    T: Into<StoryloomErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyloom operations.
pub type StoryloomResult<T> = std::result::Result<T, StoryloomError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JsonErrorKind, PipelineErrorKind};

    #[test]
    fn test_question_mark_keeps_the_kind() {
        fn fail() -> StoryloomResult<()> {
            Err(PipelineError::new(PipelineErrorKind::EmptyInspiration))?
        }

        let err = fail().unwrap_err();
        match err.kind() {
            StoryloomErrorKind::Pipeline(e) => {
                assert_eq!(e.kind, PipelineErrorKind::EmptyInspiration)
            }
            other => panic!("unexpected kind: {}", other),
        }
    }

    #[test]
    fn test_location_points_at_construction_site() {
        let err = JsonError::new(JsonErrorKind::Serialize("bad".into()));
        assert!(err.file.ends_with("error.rs"));
        let err: StoryloomError = err.into();
        assert!(err.to_string().contains("Failed to serialize seed: bad"));
    }
}
