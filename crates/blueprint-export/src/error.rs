//! Error types for exports.
//!
//! Cancellation is deliberately absent: an aborted export is reported as
//! `ExportOutcome::Aborted`, not as an error.

/// Model settings rejected before any generation call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no model selected")]
    MissingModel,

    #[error("model id '{0}' must look like '<provider>:<model>'")]
    MalformedModelId(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("provider '{provider}' needs an API key")]
    MissingApiKey { provider: &'static str },

    #[error("invalid generation setting: {0}")]
    InvalidSetting(String),
}

/// Failure of a single generation call, as reported by a generator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    /// Provider or transport error. Text is passed through with credentials scrubbed.
    #[error("{0}")]
    Provider(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("generation cancelled")]
    Cancelled,
}

/// One artifact call failed; the whole export fails with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to generate {artifact}: {source}")]
pub struct GenerationFailure {
    /// Name of the artifact whose call failed, e.g. `specs/api.md`.
    pub artifact: String,
    #[source]
    pub source: GeneratorError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Generation(#[from] GenerationFailure),
}

impl ExportError {
    /// Artifact named by a generation failure.
    pub fn artifact(&self) -> Option<&str> {
        match self {
            ExportError::Generation(f) => Some(&f.artifact),
            ExportError::Configuration(_) => None,
        }
    }
}
