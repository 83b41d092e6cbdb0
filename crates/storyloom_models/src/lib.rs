//! OpenAI-compatible completion client for Storyloom.
//!
//! Any endpoint that speaks the `/chat/completions` protocol (hosted or
//! local) can back the expansion engine through [`OpenAiCompatClient`],
//! which implements both [`CompletionDriver`](storyloom_interface::CompletionDriver)
//! and [`Streaming`](storyloom_interface::Streaming).
//!
//! # Example
//!
//! ```rust,no_run
//! use storyloom_models::{ClientConfig, OpenAiCompatClient};
//! use storyloom_interface::CompletionDriver;
//! use storyloom_core::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:8080/v1", "qwen-plus")
//!         .with_api_key("sk-local");
//!     let client = OpenAiCompatClient::new(config)?;
//!
//!     let request = CompletionRequest::builder()
//!         .messages(vec![Message::user("Say hello")])
//!         .build()?;
//!     let response = client.generate(&request).await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod convert;
mod sse;
mod wire;

pub use client::OpenAiCompatClient;
pub use config::ClientConfig;
pub use wire::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChunkChoice,
    Choice, ChoiceMessage, Delta,
};
