//! Request and response types for model completion.

use crate::Message;
use serde::{Deserialize, Serialize};

/// A completion request: the whole conversation so far plus sampling limits.
///
/// # Examples
///
/// ```
/// use storyloom_core::{CompletionRequest, Message};
///
/// let request = CompletionRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .max_tokens(100u32)
///     .temperature(0.8f32)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages().len(), 1);
/// assert_eq!(*request.max_tokens(), Some(100));
/// assert_eq!(*request.top_p(), None);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    derive_builder::Builder,
    derive_getters::Getters,
)]
#[builder(setter(into, strip_option), default)]
pub struct CompletionRequest {
    /// The conversation messages to send, oldest first
    messages: Vec<Message>,
    /// Maximum number of tokens to generate
    max_tokens: Option<u32>,
    /// Sampling temperature
    temperature: Option<f32>,
    /// Nucleus sampling parameter
    top_p: Option<f32>,
    /// Model identifier override
    model: Option<String>,
}

impl CompletionRequest {
    /// Start building a request.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }
}

/// The full text produced for one completion request.
///
/// # Examples
///
/// ```
/// use storyloom_core::CompletionResponse;
///
/// let response = CompletionResponse::new("Once upon a time");
/// assert!(!response.is_empty());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct CompletionResponse {
    /// Generated text
    text: String,
}

impl CompletionResponse {
    /// Wrap generated text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the model produced no content at all.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consume the response, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}
