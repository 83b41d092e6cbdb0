//! Trait definitions for completion backends.

use crate::StreamChunk;
use async_trait::async_trait;
use futures_util::stream::Stream;
use storyloom_core::{CompletionRequest, CompletionResponse};
use storyloom_error::StoryloomResult;
use std::pin::Pin;

/// A boxed stream of response chunks.
pub type CompletionStream = Pin<Box<dyn Stream<Item = StoryloomResult<StreamChunk>> + Send>>;

/// Core trait that every completion backend implements.
///
/// Sends the accumulated conversation and returns the full generated text.
/// Failures are reported as errors; an empty response is a valid `Ok` value
/// and callers decide whether to treat it as a failure.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Generate a completion for the given conversation.
    async fn generate(&self, req: &CompletionRequest) -> StoryloomResult<CompletionResponse>;

    /// Provider name (e.g., "openai-compatible").
    fn provider_name(&self) -> &'static str;

    /// Model identifier used when the request does not override it.
    fn model_name(&self) -> &str;
}

/// Trait for backends that deliver text incrementally.
#[async_trait]
pub trait Streaming: CompletionDriver {
    /// Generate a streaming response.
    ///
    /// Returns a stream that yields chunks as they arrive from the endpoint.
    async fn generate_stream(&self, req: &CompletionRequest) -> StoryloomResult<CompletionStream>;
}

#[async_trait]
impl<T: CompletionDriver + ?Sized> CompletionDriver for std::sync::Arc<T> {
    async fn generate(&self, req: &CompletionRequest) -> StoryloomResult<CompletionResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: Streaming + ?Sized> Streaming for std::sync::Arc<T> {
    async fn generate_stream(&self, req: &CompletionRequest) -> StoryloomResult<CompletionStream> {
        (**self).generate_stream(req).await
    }
}
