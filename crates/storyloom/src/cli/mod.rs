//! Command-line interface module.

mod commands;
mod review;
mod run;
mod sessions;

pub use commands::{Cli, Commands};
pub use run::{new_story, regenerate_stage, resume_story};
pub use sessions::list_sessions;
