//! HTTP client for OpenAI-compatible chat completion endpoints.

use crate::convert::{chunk_to_stream_chunk, from_chat_response, to_chat_request};
use crate::sse::{SseDecoder, SseEvent};
use crate::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ClientConfig};
use futures_util::StreamExt;
use storyloom_core::{CompletionRequest, CompletionResponse};
use storyloom_error::{CompletionError, CompletionErrorKind, StoryloomResult};
use storyloom_interface::{CompletionDriver, CompletionStream, FinishReason, StreamChunk, Streaming};
use tracing::instrument;

/// Client for any OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip(config), fields(base_url = %config.base_url, model = %config.model))]
    pub fn new(config: ClientConfig) -> Result<Self, CompletionError> {
        tracing::debug!("Creating completion client");
        let client = reqwest::Client::builder().build().map_err(|e| {
            CompletionError::new(CompletionErrorKind::Configuration(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        })?;
        Ok(Self { config, client })
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<reqwest::Response, CompletionError> {
        let url = self.config.completions_url();
        tracing::debug!("Sending chat completion request to {}", url);

        let mut req = self
            .client
            .post(&url)
            .json(request)
            .header("Content-Type", "application/json");

        if let Some(api_key) = &self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        let response = req.send().await.map_err(|e| {
            tracing::error!("Request failed: {}", e);
            CompletionError::new(CompletionErrorKind::Http(format!("Request failed: {}", e)))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Endpoint returned error");
            return Err(CompletionError::new(CompletionErrorKind::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            }));
        }

        Ok(response)
    }

    /// Send a chat completion request
    #[instrument(skip(self, request), fields(model = %request.model()))]
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let response = self.send(request).await?;

        let result = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse response: {}", e);
            CompletionError::new(CompletionErrorKind::Deserialization(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        tracing::debug!("Chat completion successful");
        Ok(result)
    }

    /// Send a streaming chat completion request
    #[instrument(skip(self, request), fields(model = %request.model()))]
    pub async fn chat_completion_stream(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<CompletionStream, CompletionError> {
        request.set_stream(true);
        let response = self.send(&request).await?;

        tracing::debug!("Streaming request accepted, parsing SSE stream");
        Ok(parse_sse_stream(response))
    }
}

/// Parse a Server-Sent Events body into stream chunks
fn parse_sse_stream(response: reqwest::Response) -> CompletionStream {
    let stream = response
        .bytes_stream()
        .scan(SseDecoder::default(), |decoder, bytes_result| {
            let items: Vec<StoryloomResult<StreamChunk>> = match bytes_result {
                Ok(bytes) => decoder
                    .feed(&bytes)
                    .into_iter()
                    .filter_map(event_to_chunk)
                    .collect(),
                Err(e) => vec![Err(CompletionError::new(CompletionErrorKind::Stream(
                    format!("Stream error: {}", e),
                ))
                .into())],
            };
            futures_util::future::ready(Some(items))
        })
        .flat_map(futures_util::stream::iter);

    Box::pin(stream)
}

fn event_to_chunk(
    event: Result<SseEvent, std::str::Utf8Error>,
) -> Option<StoryloomResult<StreamChunk>> {
    match event {
        Ok(SseEvent::Done) => Some(Ok(StreamChunk::final_chunk(FinishReason::Stop))),
        Ok(SseEvent::Data(data)) => match serde_json::from_str::<ChatCompletionChunk>(&data) {
            Ok(chunk) => chunk_to_stream_chunk(&chunk).map(Ok),
            Err(e) => Some(Err(CompletionError::new(
                CompletionErrorKind::Deserialization(format!("Failed to parse chunk: {}", e)),
            )
            .into())),
        },
        Err(e) => Some(Err(CompletionError::new(CompletionErrorKind::Stream(
            format!("Invalid UTF-8: {}", e),
        ))
        .into())),
    }
}

#[async_trait::async_trait]
impl CompletionDriver for OpenAiCompatClient {
    #[instrument(skip(self, req), fields(messages = req.messages().len()))]
    async fn generate(&self, req: &CompletionRequest) -> StoryloomResult<CompletionResponse> {
        let chat_request = to_chat_request(req, &self.config.model)?;
        let response = self.chat_completion(&chat_request).await?;
        Ok(from_chat_response(response)?)
    }

    fn provider_name(&self) -> &'static str {
        "openai-compatible"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait::async_trait]
impl Streaming for OpenAiCompatClient {
    #[instrument(skip(self, req), fields(messages = req.messages().len()))]
    async fn generate_stream(&self, req: &CompletionRequest) -> StoryloomResult<CompletionStream> {
        let chat_request = to_chat_request(req, &self.config.model)?;
        Ok(self.chat_completion_stream(chat_request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_to_chunk_done() {
        let chunk = event_to_chunk(Ok(SseEvent::Done)).unwrap().unwrap();
        assert!(*chunk.is_final());
    }

    #[test]
    fn test_event_to_chunk_bad_json() {
        let result = event_to_chunk(Ok(SseEvent::Data("{not json".into()))).unwrap();
        assert!(result.is_err());
    }
}
