//! Storyloom - guided outline-to-prose story generation.
//!
//! A human supplies seed parameters (genre, conflict, platform, tone and a
//! free-text inspiration) and Storyloom expands them stage by stage into a
//! finished short story: topic → characters → coarse outline → detailed
//! outline → prose chapters → title and teaser. Every stage is a draft the
//! reviewer approves, regenerates or steps back from.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use storyloom::{
//!     ClientConfig, OpenAiCompatClient, Stage, StoryContext, StoryPipeline, StorySeed,
//!     StoryloomConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoryloomConfig::load()?;
//!     let client = OpenAiCompatClient::new(ClientConfig::new(
//!         &config.model.base_url,
//!         &config.model.model,
//!     ))?;
//!     let pipeline = StoryPipeline::new(client, &config)?;
//!
//!     let seed = StorySeed::builder()
//!         .genre("mystery")
//!         .conflict("betrayal")
//!         .platform("web serial")
//!         .inspiration("a lighthouse keeper hears knocking")
//!         .build()?;
//!     let mut context = StoryContext::new(seed);
//!
//!     let draft = pipeline.draft(Stage::Topic, &context).await?;
//!     println!("{}", draft.text());
//!     draft.approve_into(&mut context)?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `storyloom_error` - Error types
//! - `storyloom_core` - Conversation and request data types
//! - `storyloom_interface` - `CompletionDriver` / `Streaming` traits
//! - `storyloom_models` - OpenAI-compatible client
//! - `storyloom_narrative` - Parser, windowing, expansion engine, pipeline, sessions
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod observability;

pub use storyloom_core::*;
pub use storyloom_error::*;
pub use storyloom_interface::*;
pub use storyloom_models::*;
pub use storyloom_narrative::*;
