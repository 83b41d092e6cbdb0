//! Story pipeline error types.

/// Specific error conditions for pipeline stage handling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Transition not allowed from the current stage
    #[display("Cannot {} from stage {}", transition, stage)]
    InvalidTransition {
        /// Stage the machine was in
        stage: String,
        /// Transition that was requested
        transition: String,
    },
    /// A stage needs an artifact that has not been approved yet
    #[display("Stage {} requires an approved {}", stage, input)]
    MissingInput {
        /// Stage being generated
        stage: String,
        /// Name of the missing artifact
        input: String,
    },
    /// The seed inspiration is blank
    #[display("Inspiration must not be empty")]
    EmptyInspiration,
    /// The stage does not produce a draft
    #[display("Stage {} does not produce a draft", _0)]
    NothingToGenerate(String),
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use storyloom_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::EmptyInspiration);
/// assert!(format!("{}", err).contains("Inspiration"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
