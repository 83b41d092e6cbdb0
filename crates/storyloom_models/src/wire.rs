//! OpenAI-compatible request and response bodies.

use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completion request
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, derive_builder::Builder, derive_getters::Getters,
)]
#[builder(setter(into))]
pub struct ChatCompletionRequest {
    /// Model identifier
    model: String,
    /// Conversation messages
    messages: Vec<ChatMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    max_tokens: Option<u32>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    temperature: Option<f32>,
    /// Top-p sampling parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    top_p: Option<f32>,
    /// Enable streaming mode
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Switch the request into (or out of) streaming mode.
    pub fn set_stream(&mut self, stream: bool) {
        self.stream = Some(stream);
    }
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Message content
    pub content: String,
}

/// OpenAI-compatible chat completion response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, derive_getters::Getters)]
pub struct ChatCompletionResponse {
    /// Unique identifier for the completion
    #[serde(default)]
    id: String,
    /// Model used for completion
    #[serde(default)]
    model: String,
    /// Generated completions
    choices: Vec<Choice>,
}

/// A completion choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct Choice {
    /// Index of this choice
    #[serde(default)]
    index: u32,
    /// The generated message
    message: ChoiceMessage,
    /// Reason why generation finished
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Message in a choice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct ChoiceMessage {
    /// Role of the message (typically "assistant")
    #[serde(default)]
    role: String,
    /// Generated content
    #[serde(default)]
    content: Option<String>,
}

/// Streaming chat completion chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, derive_getters::Getters)]
pub struct ChatCompletionChunk {
    /// Unique identifier
    #[serde(default)]
    id: String,
    /// Model used
    #[serde(default)]
    model: String,
    /// Delta choices; usage-only chunks carry none
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

/// A choice in a streaming chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, derive_getters::Getters)]
pub struct ChunkChoice {
    /// Index of this choice
    #[serde(default)]
    index: u32,
    /// Delta content
    #[serde(default)]
    delta: Delta,
    /// Finish reason (if complete)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    finish_reason: Option<String>,
}

/// Delta content in a streaming chunk
#[derive(
    Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, derive_getters::Getters,
)]
pub struct Delta {
    /// Role (only in first chunk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    /// Incremental content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}
