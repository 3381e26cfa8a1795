use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blueprint_core::artifact::SPECS_DIR;
use blueprint_core::{plan_artifacts, slugify, Artifact, ArtifactSet, Node};

/// Unique spec paths for nodes whose default paths collide, keyed by node id.
/// Colliding specs get `-<node id slug>` appended; anything still clashing
/// gets a counter. Nodes with a unique default path are left out.
///
/// Feed the result to `GenerationContext::with_file_names` before rendering
/// so the rules and protocol files link to the paths actually written.
pub fn resolve_file_names(nodes: &[Node]) -> BTreeMap<String, String> {
    let jobs = plan_artifacts(nodes);
    let planned = ArtifactSet::new(jobs.iter().map(|job| Artifact::new(job, String::new())).collect());
    let collisions = planned.collisions();
    let mut renamed = BTreeMap::new();
    if collisions.is_empty() {
        return renamed;
    }

    let mut names: Vec<String> = jobs
        .iter()
        .map(|job| match job.kind.node_id() {
            Some(id) if collisions.iter().any(|c| c.name == job.name) => with_suffix(&job.name, &slugify(id)),
            _ => job.name.clone(),
        })
        .collect();

    let mut seen: HashMap<String, usize> = HashMap::new();
    for name in names.iter_mut() {
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            *name = with_suffix(name, &count.to_string());
        }
    }

    for (job, name) in jobs.iter().zip(names) {
        let Some(node_id) = job.kind.node_id() else { continue };
        if name != job.name {
            tracing::warn!(from = %job.name, to = %name, "renamed colliding component spec");
            renamed.insert(node_id.to_string(), name);
        }
    }
    renamed
}

fn with_suffix(name: &str, suffix: &str) -> String {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    if suffix.is_empty() {
        format!("{stem}.md")
    } else {
        format!("{stem}-{suffix}.md")
    }
}

/// Write artifacts under `dir`, creating `specs/` as needed.
pub fn write_bundle(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir.join(SPECS_DIR)).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&path, &artifact.content).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
