//! Core data types for Storyloom.
//!
//! This crate provides the conversation and request types shared by the
//! completion client and the expansion engine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod message;
mod request;
mod role;

pub use message::{Message, MessageBuilder};
pub use request::{
    CompletionRequest, CompletionRequestBuilder, CompletionRequestBuilderError,
    CompletionResponse,
};
pub use role::Role;
