//! Trait definitions for the Storyloom completion client.
//!
//! The expansion engine only ever talks to a model through the
//! [`CompletionDriver`] and [`Streaming`] traits defined here, so any
//! endpoint (or a scripted test double) can be plugged in.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collect;
mod traits;
mod types;

pub use collect::{collect_completion, collect_stream};
pub use traits::{CompletionDriver, CompletionStream, Streaming};
pub use types::{FinishReason, StreamChunk, StreamChunkBuilder, StreamChunkBuilderError};
