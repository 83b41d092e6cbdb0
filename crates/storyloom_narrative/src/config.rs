//! Storyloom configuration.
//!
//! Configuration is loaded once, before any generation, and is immutable
//! afterwards. Sources in order of precedence (later sources override
//! earlier):
//!
//! 1. Bundled defaults (`include_str!` of `storyloom.toml`)
//! 2. `~/.config/storyloom/storyloom.toml`
//! 3. `./storyloom.toml`, or an explicit file passed to [`StoryloomConfig::load_with`]
//! 4. `STORYLOOM__SECTION__KEY` environment variables

use crate::{TemplateId, TemplateSet, TemplateValues, render};
use config::{Config, Environment, File, FileFormat};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use storyloom_error::{ConfigError, StoryloomResult};
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../storyloom.toml");

/// Completion endpoint and sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// API key; falls back to `STORYLOOM_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling cutoff
    pub top_p: f32,
    /// Output limit for single-shot stages and outline expansion
    pub max_output_tokens: u32,
    /// Output limit per prose window
    pub prose_max_output_tokens: u32,
}

/// Settings for beat parsing and window expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[builder(setter(into), default)]
pub struct ExpansionSettings {
    /// Marker every beat must contain
    sigil: String,
    /// Heading that starts a detailed-outline section
    section_marker: String,
    /// Text substituted for a failed window; `{number}` is the 1-based window number
    failure_placeholder: String,
    /// Characters per token for the truncation heuristic
    chars_per_token: usize,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            sigil: "#".to_string(),
            section_marker: "## Conflict".to_string(),
            failure_placeholder: "[[ window {number} failed to generate ]]".to_string(),
            chars_per_token: 3,
        }
    }
}

impl ExpansionSettings {
    /// Builder with every field defaulted.
    pub fn builder() -> ExpansionSettingsBuilder {
        ExpansionSettingsBuilder::default()
    }

    /// The placeholder text for 1-based window `number`.
    pub fn placeholder_for(&self, number: usize) -> String {
        let values = TemplateValues::new().with("number", number.to_string());
        render(&self.failure_placeholder, &values).unwrap_or_else(|_| self.failure_placeholder.clone())
    }
}

/// Prompt template texts keyed by [`TemplateId`] name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TemplateSettings {
    /// Directory of `<identifier>.prompt` files overriding the entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    /// Template text per identifier
    #[serde(flatten)]
    pub entries: HashMap<String, String>,
}

/// Where sessions are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Directory holding one sub-directory per session
    pub base_dir: PathBuf,
}

/// Top-level Storyloom configuration.
///
/// # Example
///
/// ```no_run
/// use storyloom_narrative::StoryloomConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryloomConfig::load()?;
/// println!("Using model {}", config.model.model);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryloomConfig {
    /// Completion endpoint settings
    pub model: ModelSettings,
    /// Parsing and expansion settings
    pub expansion: ExpansionSettings,
    /// Prompt templates
    pub templates: TemplateSettings,
    /// Session storage settings
    pub sessions: SessionSettings,
}

impl StoryloomConfig {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or a template is
    /// missing.
    #[instrument]
    pub fn load() -> StoryloomResult<Self> {
        Self::load_with(None)
    }

    /// Load configuration, using `path` in place of `./storyloom.toml` when given.
    #[instrument]
    pub fn load_with(path: Option<&Path>) -> StoryloomResult<Self> {
        debug!("Loading configuration: env > local > home > bundled defaults");

        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyloom/storyloom.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("storyloom").required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix("STORYLOOM")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder.build().map_err(|e| {
            ConfigError::new(format!("Failed to build configuration: {}", e))
        })?)
    }

    /// Load the bundled defaults overlaid with a TOML document.
    ///
    /// User config files and `STORYLOOM__*` variables are not consulted. A
    /// document without `model.api_key` still falls back to
    /// `STORYLOOM_API_KEY` (read after loading `.env`).
    pub fn from_toml_str(overrides: &str) -> StoryloomResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?;
        Self::finish(config)
    }

    /// The bundled defaults alone.
    pub fn bundled() -> StoryloomResult<Self> {
        Self::from_toml_str("")
    }

    fn finish(config: Config) -> StoryloomResult<Self> {
        let mut settings: Self = config
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        if settings.model.api_key.is_none() {
            dotenvy::dotenv().ok();
            settings.model.api_key = std::env::var("STORYLOOM_API_KEY").ok();
        }

        if let Some(dir) = settings.templates.templates_dir.clone() {
            settings.apply_template_dir(&dir)?;
        }

        settings.validate()?;
        debug!(model = %settings.model.model, "Configuration loaded");
        Ok(settings)
    }

    /// Replace template entries with `<identifier>.prompt` files from `dir`.
    fn apply_template_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        for id in TemplateId::iter() {
            let path = dir.join(format!("{}.prompt", id));
            if !path.is_file() {
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|e| {
                ConfigError::new(format!("Failed to read {}: {}", path.display(), e))
            })?;
            debug!(template = %id, path = %path.display(), "Template overridden from file");
            self.templates.entries.insert(id.to_string(), text);
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.template_set()?;
        render(
            self.expansion.failure_placeholder(),
            &TemplateValues::new().with("number", "1"),
        )
        .map_err(|e| ConfigError::new(format!("Invalid failure_placeholder: {}", e)))?;
        if *self.expansion.chars_per_token() == 0 {
            return Err(ConfigError::new("chars_per_token must be at least 1"));
        }
        Ok(())
    }

    /// The validated prompt templates.
    pub fn template_set(&self) -> Result<TemplateSet, ConfigError> {
        TemplateSet::from_entries(&self.templates.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults() {
        let config = StoryloomConfig::bundled().unwrap();
        assert_eq!(config.model.max_output_tokens, 8192);
        assert_eq!(config.model.prose_max_output_tokens, 8000);
        assert_eq!(config.expansion.sigil(), "#");
        assert_eq!(config.expansion.section_marker(), "## Conflict");
        assert_eq!(config.sessions.base_dir, PathBuf::from("stories"));
        assert!(config.template_set().is_ok());
    }

    #[test]
    fn test_override_merges_over_defaults() {
        let config = StoryloomConfig::from_toml_str(
            "[model]\nmodel = \"qwen-plus\"\n[expansion]\nsigil = \"##\"\n",
        )
        .unwrap();
        assert_eq!(config.model.model, "qwen-plus");
        assert_eq!(config.model.temperature, 0.8);
        assert_eq!(config.expansion.sigil(), "##");
        assert_eq!(config.expansion.chars_per_token(), &3);
    }

    #[test]
    fn test_explicit_api_key_wins_over_environment() {
        let config = StoryloomConfig::from_toml_str("[model]\napi_key = \"sk-test\"\n").unwrap();
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_template_rejected() {
        let result = StoryloomConfig::from_toml_str("[templates]\ntitle = \"\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_placeholder_numbering() {
        let settings = ExpansionSettings::default();
        assert_eq!(settings.placeholder_for(2), "[[ window 2 failed to generate ]]");
    }
}
