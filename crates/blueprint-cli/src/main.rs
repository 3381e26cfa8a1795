use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use blueprint_cli::bundle::{resolve_file_names, write_bundle};
use blueprint_cli::graph::{load_graph, schema_json};
use blueprint_cli::settings::{layered, settings_path, Settings};
use blueprint_core::registry::entry_count;
use blueprint_core::{resolve_packages, Artifact, GenerationContext, Language};
use blueprint_export::{
    generate_bundle, render_bundle, Credentials, ExportObserver, ExportOutcome, GenerationConfig, ModelSettings,
};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for an export cancelled with Ctrl-C.
const EXIT_ABORTED: u8 = 130;

#[derive(Parser)]
#[command(name = "blueprint")]
#[command(about = "Turn an architecture sketch into documentation for coding agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the documentation bundle for a graph
    Export {
        /// Graph document (JSON)
        graph: PathBuf,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Generate with a model, e.g. anthropic:claude-sonnet-4
        #[arg(long)]
        model: Option<String>,

        /// API key for the model provider
        #[arg(long)]
        api_key: Option<String>,

        /// Output budget per artifact
        #[arg(long, default_value_t = 4096)]
        max_tokens: u32,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the JSON Schema of the graph document
    Schema,

    /// Show verified packages for a technology label
    Registry {
        label: String,

        /// Implementation language (typescript, javascript, python, go, rust, java)
        #[arg(short, long)]
        language: Option<Language>,
    },
}

struct ProgressLog;

impl ExportObserver for ProgressLog {
    fn on_artifact(&self, artifact: &Artifact, completed: usize, total: usize) {
        tracing::info!(artifact = %artifact.name, "generated {completed}/{total}");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Export {
            graph,
            out,
            model,
            api_key,
            max_tokens,
            timeout,
        } => {
            let flags = Settings {
                model: model.unwrap_or_default(),
                api_key: api_key.unwrap_or_default(),
            };
            let generation = GenerationConfig {
                max_tokens,
                timeout_secs: timeout,
                ..GenerationConfig::default()
            };
            export(graph, out, flags, generation).await
        }
        Commands::Schema => {
            println!("{}", schema_json()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Registry { label, language } => {
            let packages = resolve_packages(&label, language);
            if packages.is_empty() {
                println!("No verified package for \"{label}\" ({} registry entries).", entry_count());
            }
            for p in packages {
                let companion = if p.is_runtime_companion { " (runtime companion)" } else { "" };
                println!("{} [{}]{companion} {} - {}", p.pinned(), p.registry_kind.as_str(), p.purpose, p.docs_url);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn export(graph: PathBuf, out: PathBuf, flags: Settings, generation: GenerationConfig) -> Result<ExitCode> {
    let doc = load_graph(&graph)?;

    let settings = layered(Settings::read_from(&settings_path())?, Settings::from_env(), flags);

    let ctx = GenerationContext::build(&doc.project_name, &doc.nodes, &doc.edges)
        .with_file_names(resolve_file_names(&doc.nodes));

    let set = match settings.model() {
        None => render_bundle(&ctx),
        Some(model_id) => {
            let model = ModelSettings::new(model_id, Credentials::new(settings.api_key.clone()), generation)
                .context("invalid model settings")?;

            let cancel = CancellationToken::new();
            let on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupted, cancelling export");
                    on_signal.cancel();
                }
            });

            match generate_bundle(&ctx, model, &cancel, &ProgressLog).await? {
                ExportOutcome::Completed(set) => set,
                ExportOutcome::Aborted => {
                    eprintln!("Export aborted; nothing was written.");
                    return Ok(ExitCode::from(EXIT_ABORTED));
                }
            }
        }
    };

    let written = write_bundle(&out, set.artifacts())?;
    for path in &written {
        println!("{}", path.display());
    }
    tracing::info!(files = written.len(), dir = %out.display(), "bundle written");
    Ok(ExitCode::SUCCESS)
}
