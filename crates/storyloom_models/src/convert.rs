//! Conversion between Storyloom and wire types.

use crate::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::wire::ChatCompletionRequestBuilder;
use storyloom_core::{CompletionRequest, CompletionResponse, Message};
use storyloom_error::{CompletionError, CompletionErrorKind};
use storyloom_interface::{FinishReason, StreamChunk};

/// Convert a CompletionRequest into a chat completion body.
#[tracing::instrument(skip(request), fields(messages = request.messages().len()))]
pub fn to_chat_request(
    request: &CompletionRequest,
    default_model: &str,
) -> Result<ChatCompletionRequest, CompletionError> {
    let messages = request
        .messages()
        .iter()
        .map(to_chat_message)
        .collect::<Vec<_>>();

    let model = request
        .model()
        .clone()
        .unwrap_or_else(|| default_model.to_string());

    ChatCompletionRequestBuilder::default()
        .model(model)
        .messages(messages)
        .max_tokens(*request.max_tokens())
        .temperature(*request.temperature())
        .top_p(*request.top_p())
        .stream(Some(false))
        .build()
        .map_err(|e| {
            CompletionError::new(CompletionErrorKind::Configuration(format!(
                "Failed to build request: {}",
                e
            )))
        })
}

fn to_chat_message(message: &Message) -> ChatMessage {
    ChatMessage {
        role: message.role().as_str().to_string(),
        content: message.content().clone(),
    }
}

/// Convert a ChatCompletionResponse into a CompletionResponse.
///
/// A choice with no content converts to an empty response rather than an
/// error; callers decide what empty means.
pub fn from_chat_response(
    response: ChatCompletionResponse,
) -> Result<CompletionResponse, CompletionError> {
    let choice = response.choices().first().ok_or_else(|| {
        CompletionError::new(CompletionErrorKind::Deserialization(
            "No choices in response".into(),
        ))
    })?;

    let text = choice.message().content().clone().unwrap_or_default();
    Ok(CompletionResponse::new(text))
}

/// Convert a streaming chunk into a StreamChunk.
///
/// Returns `None` for chunks without choices (usage reports and keep-alives).
pub fn chunk_to_stream_chunk(chunk: &ChatCompletionChunk) -> Option<StreamChunk> {
    let choice = chunk.choices().first()?;

    let text = choice.delta().content().clone().unwrap_or_default();
    let finish_reason = choice
        .finish_reason()
        .as_deref()
        .map(FinishReason::from_wire);

    Some(match finish_reason {
        Some(reason) => StreamChunk::last(text, reason),
        None => StreamChunk::fragment(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_chat_request_uses_default_model() {
        let request = CompletionRequest::builder()
            .messages(vec![
                Message::user("first prompt"),
                Message::assistant("first answer"),
                Message::user("second prompt"),
            ])
            .max_tokens(8192u32)
            .temperature(0.8f32)
            .top_p(0.9f32)
            .build()
            .unwrap();

        let chat = to_chat_request(&request, "qwen-plus").unwrap();
        assert_eq!(chat.model(), "qwen-plus");
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[1].role, "assistant");
        assert_eq!(*chat.max_tokens(), Some(8192));
        assert_eq!(*chat.stream(), Some(false));
    }

    #[test]
    fn test_to_chat_request_model_override() {
        let request = CompletionRequest::builder()
            .messages(vec![Message::user("hi")])
            .model("other-model")
            .build()
            .unwrap();
        let chat = to_chat_request(&request, "default").unwrap();
        assert_eq!(chat.model(), "other-model");
    }

    #[test]
    fn test_from_chat_response_without_choices() {
        let response: ChatCompletionResponse =
            serde_json::from_str(r#"{"id":"x","model":"m","choices":[]}"#).unwrap();
        assert!(from_chat_response(response).is_err());
    }

    #[test]
    fn test_from_chat_response_null_content_is_empty() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert!(from_chat_response(response).unwrap().is_empty());
    }

    #[test]
    fn test_chunk_conversion() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"c","model":"m","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#,
        )
        .unwrap();
        let converted = chunk_to_stream_chunk(&chunk).unwrap();
        assert_eq!(converted.text(), "Hel");
        assert!(!*converted.is_final());

        let last: ChatCompletionChunk = serde_json::from_str(
            r#"{"choices":[{"index":0,"delta":{},"finish_reason":"length"}]}"#,
        )
        .unwrap();
        let converted = chunk_to_stream_chunk(&last).unwrap();
        assert!(*converted.is_final());
        assert_eq!(*converted.finish_reason(), Some(FinishReason::Length));
    }

    #[test]
    fn test_usage_chunk_is_skipped() {
        let usage: ChatCompletionChunk =
            serde_json::from_str(r#"{"id":"c","choices":[],"usage":{"total_tokens":5}}"#).unwrap();
        assert!(chunk_to_stream_chunk(&usage).is_none());
    }
}
