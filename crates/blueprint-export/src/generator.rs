//! Per-artifact content generation.
//!
//! Both modes go through [`ArtifactGenerator`]; the orchestrator does not know
//! which one it is driving.

use std::sync::Arc;

use async_trait::async_trait;
use blueprint_core::{render_artifact, ArtifactJob, GenerationContext};

use crate::config::Credentials;
use crate::engine::TextGenerator;
use crate::error::GeneratorError;
use crate::parse::clean_response;
use crate::prompt::build_prompt;

#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate(&self, job: &ArtifactJob, ctx: &GenerationContext) -> Result<String, GeneratorError>;
}

/// Deterministic rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

#[async_trait]
impl ArtifactGenerator for TemplateGenerator {
    async fn generate(&self, job: &ArtifactJob, ctx: &GenerationContext) -> Result<String, GeneratorError> {
        Ok(render_artifact(job, ctx))
    }
}

/// Model-augmented rendering: prompt, call, clean up.
pub struct ModelGenerator {
    text: Arc<dyn TextGenerator>,
    credentials: Credentials,
}

impl ModelGenerator {
    pub fn new(text: Arc<dyn TextGenerator>, credentials: Credentials) -> Self {
        Self { text, credentials }
    }
}

#[async_trait]
impl ArtifactGenerator for ModelGenerator {
    async fn generate(&self, job: &ArtifactJob, ctx: &GenerationContext) -> Result<String, GeneratorError> {
        let prompt = build_prompt(job, ctx);
        tracing::debug!(artifact = %job.name, prompt_bytes = prompt.user.len(), "requesting artifact");

        let raw = self
            .text
            .generate(&prompt)
            .await
            .map_err(|e| GeneratorError::Provider(self.credentials.scrub(&e)))?;

        clean_response(&raw, &prompt.heading).ok_or(GeneratorError::EmptyResponse)
    }
}
