use async_trait::async_trait;
use llm::builder::LLMBuilder;
use llm::chat::ChatMessage;

use crate::config::ModelSettings;
use crate::prompt::Prompt;

/// Opaque text generation: prompt in, text out. Errors are plain messages.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, String>;
}

/// [`TextGenerator`] backed by the `llm` crate.
pub struct LlmTextGenerator {
    settings: ModelSettings,
}

impl LlmTextGenerator {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String, String> {
        let settings = &self.settings;
        let generation = &settings.generation;

        // The system prompt differs per artifact, so a client is built per call.
        let mut builder = LLMBuilder::new()
            .backend(settings.model.provider.backend())
            .model(&settings.model.model)
            .system(&prompt.system)
            .max_tokens(generation.max_tokens);

        if let Some(key) = settings.credentials.api_key() {
            builder = builder.api_key(key);
        }
        if let Some(t) = generation.temperature {
            builder = builder.temperature(t);
        }
        if let Some(secs) = generation.timeout_secs {
            builder = builder.timeout_seconds(secs);
        }

        let scrub = |e: String| settings.credentials.scrub(&e);
        let llm = builder.build().map_err(|e| scrub(format!("build LLM: {e}")))?;

        let messages = vec![ChatMessage::user().content(&prompt.user).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| scrub(format!("chat: {e}")))?;

        // Blank output is judged by the caller, like any other unusable reply.
        Ok(response.text().unwrap_or_default())
    }
}
