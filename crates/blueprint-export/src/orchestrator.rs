//! Fan-out of one generation call per artifact, fan-in into a complete set.

use std::sync::Arc;

use blueprint_core::{Artifact, ArtifactSet, GenerationContext};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::{GenerationFailure, GeneratorError};
use crate::generator::ArtifactGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Generating { completed: usize, total: usize },
    Completed { artifacts: usize },
    Failed { artifact: String },
    Aborted,
}

impl ExportState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportState::Completed { .. } | ExportState::Failed { .. } | ExportState::Aborted
        )
    }
}

/// Progress callback. Called once per finished artifact, never after the
/// export has been cancelled or has failed.
pub trait ExportObserver: Send + Sync {
    fn on_artifact(&self, artifact: &Artifact, completed: usize, total: usize);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {
    fn on_artifact(&self, _artifact: &Artifact, _completed: usize, _total: usize) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed(ArtifactSet),
    Aborted,
}

impl ExportOutcome {
    pub fn artifacts(&self) -> Option<&ArtifactSet> {
        match self {
            ExportOutcome::Completed(set) => Some(set),
            ExportOutcome::Aborted => None,
        }
    }
}

pub struct Orchestrator {
    generator: Arc<dyn ArtifactGenerator>,
    state: watch::Sender<ExportState>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn ArtifactGenerator>) -> Self {
        let (state, _) = watch::channel(ExportState::Idle);
        Self { generator, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ExportState {
        self.state.borrow().clone()
    }

    fn set_state(&self, state: ExportState) {
        self.state.send_replace(state);
    }

    /// Generate every planned artifact concurrently.
    ///
    /// The first failure cancels the remaining calls and is returned. Caller
    /// cancellation stops all calls and yields [`ExportOutcome::Aborted`].
    pub async fn run(
        &self,
        ctx: &GenerationContext,
        cancel: &CancellationToken,
        observer: &dyn ExportObserver,
    ) -> Result<ExportOutcome, GenerationFailure> {
        let jobs = ctx.artifact_plan();
        let total = jobs.len();
        let calls = cancel.child_token();

        self.set_state(ExportState::Generating { completed: 0, total });
        tracing::info!(project = %ctx.project_name, artifacts = total, "export started");

        if cancel.is_cancelled() {
            return Ok(self.abort(&calls, 0, total));
        }

        let generator = &self.generator;
        let mut pending: FuturesUnordered<_> = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| {
                let calls = calls.clone();
                async move {
                    let result = tokio::select! {
                        biased;
                        _ = calls.cancelled() => Err(GeneratorError::Cancelled),
                        r = generator.generate(job, ctx) => r,
                    };
                    (index, result)
                }
            })
            .collect();

        let mut slots: Vec<Option<Artifact>> = vec![None; total];
        let mut completed = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.abort(&calls, completed, total)),
                next = pending.next() => next,
            };
            let Some((index, result)) = next else { break };
            let job = &jobs[index];

            match result {
                Ok(content) => {
                    completed += 1;
                    let artifact = Artifact::new(job, content);
                    tracing::debug!(artifact = %job.name, completed, total, "artifact generated");
                    self.set_state(ExportState::Generating { completed, total });
                    if cancel.is_cancelled() {
                        return Ok(self.abort(&calls, completed, total));
                    }
                    observer.on_artifact(&artifact, completed, total);
                    slots[index] = Some(artifact);
                }
                Err(GeneratorError::Cancelled) => {
                    return Ok(self.abort(&calls, completed, total));
                }
                Err(source) => {
                    calls.cancel();
                    tracing::warn!(artifact = %job.name, error = %source, "artifact generation failed");
                    self.set_state(ExportState::Failed {
                        artifact: job.name.clone(),
                    });
                    return Err(GenerationFailure {
                        artifact: job.name.clone(),
                        source,
                    });
                }
            }
        }

        let set = ArtifactSet::new(slots.into_iter().flatten().collect());
        self.set_state(ExportState::Completed { artifacts: set.len() });
        tracing::info!(project = %ctx.project_name, artifacts = set.len(), "export completed");
        Ok(ExportOutcome::Completed(set))
    }

    fn abort(&self, calls: &CancellationToken, completed: usize, total: usize) -> ExportOutcome {
        calls.cancel();
        self.set_state(ExportState::Aborted);
        tracing::info!(completed, total, "export aborted");
        ExportOutcome::Aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::TemplateGenerator;
    use blueprint_core::{ArtifactJob, ComponentType, Node};

    fn ctx() -> GenerationContext {
        let nodes = vec![
            Node::new("a", ComponentType::Backend, "API"),
            Node::new("d", ComponentType::Storage, "DB"),
        ];
        GenerationContext::build("Shop", &nodes, &[])
    }

    #[tokio::test]
    async fn completes_in_plan_order() {
        let orch = Orchestrator::new(Arc::new(TemplateGenerator));
        let rx = orch.subscribe();
        let outcome = orch
            .run(&ctx(), &CancellationToken::new(), &NoopObserver)
            .await
            .unwrap();
        let set = outcome.artifacts().unwrap();
        let names: Vec<&str> = set.artifacts().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["project-rules.md", "agent-protocol.md", "specs/api.md", "specs/db.md"]);
        assert_eq!(*rx.borrow(), ExportState::Completed { artifacts: 4 });
    }

    #[tokio::test]
    async fn pre_cancelled_export_aborts_without_calls() {
        struct Panics;
        #[async_trait::async_trait]
        impl ArtifactGenerator for Panics {
            async fn generate(&self, _: &ArtifactJob, _: &GenerationContext) -> Result<String, GeneratorError> {
                panic!("must not be called");
            }
        }
        let orch = Orchestrator::new(Arc::new(Panics));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = orch.run(&ctx(), &cancel, &NoopObserver).await.unwrap();
        assert_eq!(outcome, ExportOutcome::Aborted);
        assert_eq!(orch.state(), ExportState::Aborted);
        assert!(orch.state().is_terminal());
    }
}
