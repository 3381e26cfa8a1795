use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use blueprint_core::{render_project_rules, Artifact, ComponentType, Edge, Node};
use blueprint_export::prompt::Prompt;
use blueprint_export::{
    export_deterministic, export_with_model, export_with_text_generator, ConfigurationError, Credentials,
    ExportError, ExportObserver, ExportOutcome, GeneratorError, TextGenerator,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn shop() -> (Vec<Node>, Vec<Edge>) {
    let nodes = vec![
        Node::new("web", ComponentType::Frontend, "Web App").with_tech(["React"]),
        Node::new("api", ComponentType::Backend, "API").with_tech(["Express"]),
        Node::new("db", ComponentType::Storage, "DB").with_tech(["PostgreSQL"]),
    ];
    let edges = vec![
        Edge::new("e1", "web", "api"),
        Edge::new("e2", "api", "db").with_label("queries"),
    ];
    (nodes, edges)
}

/// What the fake model does for a given prompt heading.
#[derive(Clone, Copy)]
enum Reply {
    Document,
    Fail,
    Empty,
    Hang,
}

struct FakeModel {
    calls: AtomicUsize,
    reply: fn(&str) -> Reply,
}

impl FakeModel {
    fn new(reply: fn(&str) -> Reply) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for FakeModel {
    async fn generate(&self, prompt: &Prompt) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match (self.reply)(&prompt.heading) {
            Reply::Document => Ok(format!("Sure, here it is:\n```markdown\n{}\n\nGenerated.\n```", prompt.heading)),
            Reply::Fail => Err("chat: 401 invalid api key sk-test-999".to_string()),
            Reply::Empty => Ok("\n\n".to_string()),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(String, usize, usize)>>,
    cancel_on_first: Option<CancellationToken>,
}

impl ExportObserver for Recorder {
    fn on_artifact(&self, artifact: &Artifact, completed: usize, total: usize) {
        self.seen
            .lock()
            .unwrap()
            .push((artifact.name.clone(), completed, total));
        if let Some(token) = &self.cancel_on_first {
            token.cancel();
        }
    }
}

impl Recorder {
    fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[tokio::test]
async fn one_call_per_artifact() {
    let (nodes, edges) = shop();
    let model = FakeModel::new(|_| Reply::Document);
    let observer = Recorder::default();

    let outcome = export_with_text_generator(
        &nodes,
        &edges,
        "Shop",
        model.clone(),
        Credentials::new("sk-test-999"),
        &CancellationToken::new(),
        &observer,
    )
    .await
    .unwrap();

    assert_eq!(model.calls(), nodes.len() + 2);
    let set = outcome.artifacts().unwrap();
    assert_eq!(set.len(), 5);
    assert_eq!(set.rules().unwrap().content, "# Shop Project Rules\n\nGenerated.\n");
    assert_eq!(set.component("db").unwrap().content, "# DB Component Spec\n\nGenerated.\n");

    let seen = observer.seen.lock().unwrap();
    let progress: Vec<(usize, usize)> = seen.iter().map(|(_, c, t)| (*c, *t)).collect();
    assert_eq!(progress, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
}

#[tokio::test]
async fn first_failure_fails_the_export() {
    let (nodes, edges) = shop();
    let model = FakeModel::new(|heading| if heading == "# DB Component Spec" { Reply::Fail } else { Reply::Hang });
    let observer = Recorder::default();

    let err = export_with_text_generator(
        &nodes,
        &edges,
        "Shop",
        model,
        Credentials::new("sk-test-999"),
        &CancellationToken::new(),
        &observer,
    )
    .await
    .unwrap_err();

    assert_eq!(err.artifact(), Some("specs/db.md"));
    let text = err.to_string();
    assert!(text.contains("401 invalid api key"), "{text}");
    assert!(!text.contains("sk-test-999"), "{text}");
    assert_eq!(observer.count(), 0);
}

#[tokio::test]
async fn empty_response_is_a_failure() {
    let (nodes, edges) = shop();
    let model = FakeModel::new(|heading| if heading.ends_with("Agent Protocol") { Reply::Empty } else { Reply::Document });

    let err = export_with_text_generator(
        &nodes,
        &edges,
        "Shop",
        model,
        Credentials::none(),
        &CancellationToken::new(),
        &blueprint_export::NoopObserver,
    )
    .await
    .unwrap_err();

    match err {
        ExportError::Generation(f) => {
            assert_eq!(f.artifact, "agent-protocol.md");
            assert_eq!(f.source, GeneratorError::EmptyResponse);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn cancellation_aborts_without_further_notifications() {
    let (nodes, edges) = shop();
    let model = FakeModel::new(|heading| if heading.ends_with("Project Rules") { Reply::Document } else { Reply::Hang });
    let cancel = CancellationToken::new();
    let observer = Recorder {
        cancel_on_first: Some(cancel.clone()),
        ..Recorder::default()
    };

    let outcome = export_with_text_generator(
        &nodes,
        &edges,
        "Shop",
        model.clone(),
        Credentials::none(),
        &cancel,
        &observer,
    )
    .await
    .unwrap();

    assert_eq!(outcome, ExportOutcome::Aborted);
    assert_eq!(observer.count(), 1);
    assert!(model.calls() <= nodes.len() + 2);
}

#[tokio::test]
async fn configuration_errors_come_before_any_call() {
    let (nodes, edges) = shop();
    let observer = Recorder::default();
    let cancel = CancellationToken::new();

    let err = export_with_model(&nodes, &edges, "Shop", "openai:gpt-4o", &Credentials::none(), &cancel, &observer)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ExportError::Configuration(ConfigurationError::MissingApiKey { provider: "openai" })
    );

    let err = export_with_model(&nodes, &edges, "Shop", "gpt-4o", &Credentials::new("k"), &cancel, &observer)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ExportError::Configuration(ConfigurationError::MalformedModelId(_))
    ));

    let err = export_with_model(&nodes, &edges, "Shop", "", &Credentials::new("k"), &cancel, &observer)
        .await
        .unwrap_err();
    assert_eq!(err, ExportError::Configuration(ConfigurationError::MissingModel));

    assert_eq!(observer.count(), 0);
}

#[test]
fn deterministic_export_is_stable() {
    let (nodes, edges) = shop();
    let first = export_deterministic(&nodes, &edges, "Shop");
    let second = export_deterministic(&nodes, &edges, "Shop");
    assert_eq!(first, second);
    assert_eq!(first.len(), nodes.len() + 2);
    assert_eq!(first.rules().unwrap().content, render_project_rules(&nodes, &edges, "Shop"));
    assert!(first.collisions().is_empty());
}

#[test]
fn deterministic_export_of_empty_graph_has_two_files() {
    let set = export_deterministic(&[], &[], "Empty");
    let names: Vec<&str> = set.artifacts().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["project-rules.md", "agent-protocol.md"]);
}
