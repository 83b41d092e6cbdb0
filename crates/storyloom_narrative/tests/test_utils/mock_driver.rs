//! Scripted completion driver for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use storyloom_core::{CompletionRequest, CompletionResponse, Message};
use storyloom_error::{CompletionError, CompletionErrorKind, StoryloomResult};
use storyloom_interface::{CompletionDriver, CompletionStream, FinishReason, StreamChunk, Streaming};

/// A single scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream this text in two fragments
    Text(String),
    /// Finish immediately without any text
    Empty,
    /// Fail before streaming
    Error(CompletionErrorKind),
    /// Stream this text, then break off with a stream error
    Broken(String),
}

/// Mock driver that replays a script and records every request.
///
/// Once the script runs out it answers `"reply {n}"` for call `n`.
#[derive(Clone)]
pub struct MockDriver {
    script: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockDriver {
    /// Driver that always replies with generated text.
    pub fn new() -> Self {
        Self::scripted(Vec::new())
    }

    /// Driver replaying `script` in order.
    pub fn scripted(script: Vec<MockResponse>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The final user prompt of every request.
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.messages().last().map(|m: &Message| m.content().clone()))
            .collect()
    }

    fn next(&self, request: &CompletionRequest) -> MockResponse {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let call = requests.len();
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Text(format!("reply {}", call)))
    }
}

#[async_trait]
impl CompletionDriver for MockDriver {
    async fn generate(&self, req: &CompletionRequest) -> StoryloomResult<CompletionResponse> {
        match self.next(req) {
            MockResponse::Text(text) => Ok(CompletionResponse::new(text)),
            MockResponse::Empty => Ok(CompletionResponse::new("")),
            MockResponse::Error(kind) => Err(CompletionError::new(kind).into()),
            MockResponse::Broken(_) => Err(CompletionError::new(CompletionErrorKind::Stream(
                "connection reset".into(),
            ))
            .into()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

#[async_trait]
impl Streaming for MockDriver {
    async fn generate_stream(&self, req: &CompletionRequest) -> StoryloomResult<CompletionStream> {
        let chunks: Vec<StoryloomResult<StreamChunk>> = match self.next(req) {
            MockResponse::Text(text) => {
                let split = text
                    .char_indices()
                    .nth(text.chars().count() / 2)
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                vec![
                    Ok(StreamChunk::fragment(&text[..split])),
                    Ok(StreamChunk::fragment(&text[split..])),
                    Ok(StreamChunk::final_chunk(FinishReason::Stop)),
                ]
            }
            MockResponse::Empty => vec![Ok(StreamChunk::final_chunk(FinishReason::Stop))],
            MockResponse::Error(kind) => return Err(CompletionError::new(kind).into()),
            MockResponse::Broken(partial) => vec![
                Ok(StreamChunk::fragment(partial)),
                Err(CompletionError::new(CompletionErrorKind::Stream(
                    "connection reset".into(),
                ))
                .into()),
            ],
        };
        Ok(Box::pin(futures_util::stream::iter(chunks)))
    }
}
