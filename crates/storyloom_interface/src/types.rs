//! Core type definitions for the completion interface.

use serde::{Deserialize, Serialize};

/// A single chunk from a streaming response.
///
/// # Examples
///
/// ```
/// use storyloom_interface::{FinishReason, StreamChunk};
///
/// let chunk = StreamChunk::builder()
///     .text("Once")
///     .is_final(false)
///     .build()
///     .unwrap();
/// assert_eq!(chunk.text(), "Once");
/// assert!(chunk.finish_reason().is_none());
///
/// let last = StreamChunk::final_chunk(FinishReason::Stop);
/// assert!(*last.is_final());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct StreamChunk {
    /// Incremental text; may be empty on role-only or final chunks.
    #[builder(default)]
    text: String,
    /// Whether this is the final chunk.
    #[builder(default)]
    is_final: bool,
    /// Finish reason, present on the final chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    /// Start building a chunk.
    pub fn builder() -> StreamChunkBuilder {
        StreamChunkBuilder::default()
    }

    /// A text fragment that is not the last one.
    pub fn fragment(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
            finish_reason: None,
        }
    }

    /// The terminating chunk, possibly still carrying text.
    pub fn last(text: impl Into<String>, reason: FinishReason) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            finish_reason: Some(reason),
        }
    }

    /// An empty terminating chunk.
    pub fn final_chunk(reason: FinishReason) -> Self {
        Self::last(String::new(), reason)
    }
}

/// Why generation stopped.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    /// Model completed naturally.
    Stop,
    /// Hit the max_tokens limit.
    Length,
    /// Content was filtered.
    ContentFilter,
    /// Other/unknown reason.
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style finish reason string.
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_from_wire() {
        assert_eq!(FinishReason::from_wire("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from_wire("length"), FinishReason::Length);
        assert_eq!(
            FinishReason::from_wire("content_filter"),
            FinishReason::ContentFilter
        );
        assert_eq!(FinishReason::from_wire("tool_calls"), FinishReason::Other);
    }

    #[test]
    fn test_finish_reason_display() {
        assert_eq!(FinishReason::ContentFilter.to_string(), "content_filter");
    }
}
