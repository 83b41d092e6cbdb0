//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use storyloom::Stage;

/// Storyloom - guided outline-to-prose story generation
#[derive(Parser, Debug)]
#[command(name = "storyloom")]
#[command(about = "Guided outline-to-prose story generation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file used instead of ./storyloom.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new story
    New {
        /// Genre, e.g. "mystery"
        #[arg(long)]
        genre: String,

        /// Kind of central conflict, e.g. "betrayal"
        #[arg(long)]
        conflict: String,

        /// Target publishing platform
        #[arg(long)]
        platform: String,

        /// Emotional tone (repeatable)
        #[arg(long)]
        tone: Vec<String>,

        /// Free-text inspiration
        #[arg(long)]
        inspiration: String,

        /// Approve every draft without asking
        #[arg(long)]
        auto_approve: bool,
    },

    /// Resume a saved session at its first unapproved stage
    Resume {
        /// Session name, e.g. story_20240101_120000
        session: String,

        /// Approve every draft without asking
        #[arg(long)]
        auto_approve: bool,
    },

    /// List saved sessions
    List,

    /// Regenerate one stage of a saved session and save it
    Regenerate {
        /// Session name
        session: String,

        /// Stage to regenerate (topic, characters, outline, detailed_outline, prose, title_teaser)
        #[arg(value_parser = parse_stage)]
        stage: Stage,
    },
}

fn parse_stage(value: &str) -> Result<Stage, String> {
    let stage: Stage = value
        .parse()
        .map_err(|_| format!("unknown stage '{}'", value))?;
    if stage.produces_draft() {
        Ok(stage)
    } else {
        Err(format!("stage '{}' has nothing to generate", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_command() {
        let cli = Cli::try_parse_from([
            "storyloom",
            "-v",
            "new",
            "--genre",
            "mystery",
            "--conflict",
            "betrayal",
            "--platform",
            "web serial",
            "--tone",
            "tense",
            "--tone",
            "hopeful",
            "--inspiration",
            "a lighthouse",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::New { tone, auto_approve, .. } => {
                assert_eq!(tone, vec!["tense", "hopeful"]);
                assert!(!auto_approve);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_regenerate_rejects_seed_stage() {
        assert!(Cli::try_parse_from(["storyloom", "regenerate", "story_x", "prose"]).is_ok());
        assert!(Cli::try_parse_from(["storyloom", "regenerate", "story_x", "seed"]).is_err());
        assert!(Cli::try_parse_from(["storyloom", "regenerate", "story_x", "epilogue"]).is_err());
    }
}
