//! Model selection and generation settings.
//!
//! Everything here is passed in by the caller; nothing is read from disk or
//! the environment.

use std::fmt;
use std::str::FromStr;

use llm::builder::LLMBackend;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    Ollama,
    Groq,
    Mistral,
    DeepSeek,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::Ollama => "ollama",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Local providers run without a key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, Provider::Ollama)
    }

    pub(crate) fn backend(self) -> LLMBackend {
        match self {
            Provider::OpenAi => LLMBackend::OpenAI,
            Provider::Anthropic => LLMBackend::Anthropic,
            Provider::Google => LLMBackend::Google,
            Provider::Ollama => LLMBackend::Ollama,
            Provider::Groq => LLMBackend::Groq,
            Provider::Mistral => LLMBackend::Mistral,
            Provider::DeepSeek => LLMBackend::DeepSeek,
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "google" => Ok(Provider::Google),
            "ollama" => Ok(Provider::Ollama),
            "groq" => Ok(Provider::Groq),
            "mistral" => Ok(Provider::Mistral),
            "deepseek" => Ok(Provider::DeepSeek),
            other => Err(ConfigurationError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `<provider>:<model>` id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: Provider,
    pub model: String,
}

impl FromStr for ModelId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigurationError::MissingModel);
        }
        let (provider, model) = s
            .split_once(':')
            .ok_or_else(|| ConfigurationError::MalformedModelId(s.to_string()))?;
        let provider: Provider = provider.parse()?;
        let model = model.trim();
        if model.is_empty() {
            return Err(ConfigurationError::MalformedModelId(s.to_string()));
        }
        Ok(ModelId {
            provider,
            model: model.to_string(),
        })
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

/// Provider credentials. `Debug` never prints the key.
#[derive(Clone, Default)]
pub struct Credentials {
    api_key: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        let key = key.trim();
        Self {
            api_key: (!key.is_empty()).then(|| key.to_string()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Replace every occurrence of the key in `text`.
    pub fn scrub(&self, text: &str) -> String {
        match &self.api_key {
            Some(key) => text.replace(key.as_str(), "[redacted]"),
            None => text.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Per-call settings for model-augmented generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    /// Output budget per artifact.
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Request timeout handed to the provider client.
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: Some(0.2),
            timeout_secs: None,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_tokens == 0 {
            return Err(ConfigurationError::InvalidSetting("maxTokens must be positive".to_string()));
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigurationError::InvalidSetting(format!(
                    "temperature {t} is outside 0.0..=2.0"
                )));
            }
        }
        Ok(())
    }
}

/// Everything needed to talk to one model, checked up front.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: ModelId,
    pub credentials: Credentials,
    pub generation: GenerationConfig,
}

impl ModelSettings {
    pub fn new(
        model_id: &str,
        credentials: Credentials,
        generation: GenerationConfig,
    ) -> Result<Self, ConfigurationError> {
        let model: ModelId = model_id.parse()?;
        if model.provider.requires_api_key() && credentials.api_key().is_none() {
            return Err(ConfigurationError::MissingApiKey {
                provider: model.provider.as_str(),
            });
        }
        generation.validate()?;
        Ok(Self {
            model,
            credentials,
            generation,
        })
    }
}
