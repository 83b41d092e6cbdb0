//! Error types for Storyloom.
//!
//! This crate provides the foundation error types used throughout the Storyloom workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use storyloom_error::{CompletionError, CompletionErrorKind, StoryloomErrorKind, StoryloomResult};
//!
//! fn complete() -> StoryloomResult<String> {
//!     Err(CompletionError::new(CompletionErrorKind::EmptyResponse))?
//! }
//!
//! match complete() {
//!     Ok(text) => println!("Got: {}", text),
//!     Err(e) => assert!(matches!(e.kind(), StoryloomErrorKind::Completion(_))),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod completion;
mod config;
mod error;
mod json;
mod pipeline;
mod storage;
mod template;

pub use builder::{BuilderError, BuilderErrorKind};
pub use completion::{CompletionError, CompletionErrorKind};
pub use config::ConfigError;
pub use error::{StoryloomError, StoryloomErrorKind, StoryloomResult};
pub use json::{JsonError, JsonErrorKind};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use template::{TemplateError, TemplateErrorKind};
