//! Storyloom CLI binary.
//!
//! - Start a new story from seed parameters
//! - Resume a saved session at its first unapproved stage
//! - List saved sessions
//! - Regenerate a single stage of a saved session

use clap::Parser;
use storyloom::StoryloomConfig;
use storyloom::observability::{ObservabilityConfig, init_observability};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, list_sessions, new_story, regenerate_stage, resume_story};

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    init_observability(&ObservabilityConfig::new(log_level).with_json_logs(cli.json_logs))?;

    let config = StoryloomConfig::load_with(cli.config.as_deref())?;

    match cli.command {
        Commands::New {
            genre,
            conflict,
            platform,
            tone,
            inspiration,
            auto_approve,
        } => {
            let seed = storyloom::StorySeed::builder()
                .genre(genre)
                .conflict(conflict)
                .platform(platform)
                .tones(tone)
                .inspiration(inspiration)
                .build()?;
            new_story(&config, seed, auto_approve).await?;
        }

        Commands::Resume {
            session,
            auto_approve,
        } => {
            resume_story(&config, &session, auto_approve).await?;
        }

        Commands::List => {
            list_sessions(&config)?;
        }

        Commands::Regenerate { session, stage } => {
            regenerate_stage(&config, &session, stage).await?;
        }
    }

    Ok(())
}
