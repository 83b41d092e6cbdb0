//! Outline-to-prose expansion engine for Storyloom.
//!
//! The engine turns a coarse outline into prose in three steps:
//!
//! 1. [`parse_beats`] reads model output that is *supposed* to be a list of
//!    beats (JSON, bracketed pseudo-JSON, or loose lines/sections).
//! 2. [`WindowPolicy::plan`] groups the beats into windows of one or two.
//! 3. [`ExpansionExecutor`] expands every window in order, carrying the
//!    conversation forward so later windows stay consistent with earlier ones.
//!
//! Around the engine sit the [`StoryPipeline`] (topic → characters → outline →
//! detailed outline → prose → title/teaser), the explicit [`StageMachine`]
//! that drives it, [`StoryloomConfig`] and the on-disk [`SessionStore`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod expansion;
mod parser;
mod pipeline;
mod session;
mod stage;
mod template;
mod windowing;

pub use config::{
    ExpansionSettings, ExpansionSettingsBuilder, ModelSettings, SessionSettings, StoryloomConfig,
    TemplateSettings,
};
pub use expansion::{
    ExpansionArtifact, ExpansionEvent, ExpansionExecutor, ExpansionRequest,
    ExpansionRequestBuilder, ExpansionWarning, LabelStyle, Segment, WarningKind,
};
pub use parser::{ParseMode, parse_beats, parse_list, retain_marked};
pub use pipeline::{StageDraft, StoryContext, StoryPipeline, StorySeed, StorySeedBuilder};
pub use session::{Session, SessionStore};
pub use stage::{Stage, StageMachine, Transition};
pub use template::{TemplateId, TemplateSet, TemplateValues, render};
pub use windowing::{Window, WindowPolicy};
