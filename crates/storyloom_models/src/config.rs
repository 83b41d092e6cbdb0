//! Connection settings for an OpenAI-compatible endpoint.

use storyloom_error::{CompletionError, CompletionErrorKind};

/// Where and as whom to send completion requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
    /// Base URL of the API, up to and including the version segment
    /// (e.g., "https://api.openai.com/v1")
    pub base_url: String,
    /// Model identifier used when a request does not override it
    pub model: String,
    /// Optional bearer token
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Create a new client configuration without credentials.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
        }
    }

    /// Create config from environment variables
    ///
    /// Reads:
    /// - `STORYLOOM_BASE_URL` (default: "https://api.openai.com/v1")
    /// - `STORYLOOM_MODEL` (required)
    /// - `STORYLOOM_API_KEY` (optional)
    pub fn from_env() -> Result<Self, CompletionError> {
        let base_url = std::env::var("STORYLOOM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("STORYLOOM_MODEL").map_err(|_| {
            CompletionError::new(CompletionErrorKind::Configuration(
                "STORYLOOM_MODEL not set".into(),
            ))
        })?;
        let api_key = std::env::var("STORYLOOM_API_KEY").ok();

        Ok(Self {
            base_url,
            model,
            api_key,
        })
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/v1/", "m");
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }
}
