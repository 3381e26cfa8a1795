pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod orchestrator;
mod parse;
pub mod prompt;

use std::sync::Arc;

use blueprint_core::{render_artifact, Artifact, ArtifactSet, Edge, GenerationContext, Node};
use tokio_util::sync::CancellationToken;

pub use config::{Credentials, GenerationConfig, ModelId, ModelSettings, Provider};
pub use engine::{LlmTextGenerator, TextGenerator};
pub use error::{ConfigurationError, ExportError, GenerationFailure, GeneratorError};
pub use generator::{ArtifactGenerator, ModelGenerator, TemplateGenerator};
pub use orchestrator::{ExportObserver, ExportOutcome, ExportState, NoopObserver, Orchestrator};
pub use parse::clean_response;

/// Render the full bundle from templates. Always complete.
pub fn export_deterministic(nodes: &[Node], edges: &[Edge], project_name: &str) -> ArtifactSet {
    render_bundle(&GenerationContext::build(project_name, nodes, edges))
}

/// Render the bundle planned by a prepared context, e.g. one whose spec
/// paths were replaced with [`GenerationContext::with_file_names`].
pub fn render_bundle(ctx: &GenerationContext) -> ArtifactSet {
    let artifacts = ctx
        .artifact_plan()
        .iter()
        .map(|job| Artifact::new(job, render_artifact(job, ctx)))
        .collect();
    let set = ArtifactSet::new(artifacts);
    tracing::info!(project = %ctx.project_name, artifacts = set.len(), "deterministic export completed");
    set
}

/// Generate the bundle with a model, one call per artifact.
///
/// `model_id` is `<provider>:<model>`. Configuration is checked before any
/// call is made.
pub async fn export_with_model(
    nodes: &[Node],
    edges: &[Edge],
    project_name: &str,
    model_id: &str,
    credentials: &Credentials,
    cancel: &CancellationToken,
    observer: &dyn ExportObserver,
) -> Result<ExportOutcome, ExportError> {
    let settings = ModelSettings::new(model_id, credentials.clone(), GenerationConfig::default())?;
    export_with_settings(nodes, edges, project_name, settings, cancel, observer).await
}

/// Like [`export_with_model`] with explicit generation settings.
pub async fn export_with_settings(
    nodes: &[Node],
    edges: &[Edge],
    project_name: &str,
    settings: ModelSettings,
    cancel: &CancellationToken,
    observer: &dyn ExportObserver,
) -> Result<ExportOutcome, ExportError> {
    let ctx = GenerationContext::build(project_name, nodes, edges);
    generate_bundle(&ctx, settings, cancel, observer).await
}

/// Model-augmented export of a prepared context.
pub async fn generate_bundle(
    ctx: &GenerationContext,
    settings: ModelSettings,
    cancel: &CancellationToken,
    observer: &dyn ExportObserver,
) -> Result<ExportOutcome, ExportError> {
    tracing::info!(model = %settings.model, "using model-augmented generation");
    let credentials = settings.credentials.clone();
    let text = Arc::new(LlmTextGenerator::new(settings));
    let orchestrator = Orchestrator::new(Arc::new(ModelGenerator::new(text, credentials)));
    Ok(orchestrator.run(ctx, cancel, observer).await?)
}

/// Model-augmented export over any [`TextGenerator`].
pub async fn export_with_text_generator(
    nodes: &[Node],
    edges: &[Edge],
    project_name: &str,
    text: Arc<dyn TextGenerator>,
    credentials: Credentials,
    cancel: &CancellationToken,
    observer: &dyn ExportObserver,
) -> Result<ExportOutcome, ExportError> {
    let ctx = GenerationContext::build(project_name, nodes, edges);
    let orchestrator = Orchestrator::new(Arc::new(ModelGenerator::new(text, credentials)));
    Ok(orchestrator.run(&ctx, cancel, observer).await?)
}
