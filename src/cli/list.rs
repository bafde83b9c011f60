use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{ComponentRef, ComponentType};
use crate::store::ProjectStore;

pub async fn run(
    cwd: &Path,
    installed_only: bool,
    kind: Option<ComponentType>,
    namespace: Option<String>,
) -> Result<()> {
    let project = ProjectStore::open(cwd).context("failed to open project")?;
    let fetcher = super::fetcher(&project)?;

    let namespaces: Vec<String> = match namespace {
        Some(ns) => vec![ns],
        None => project.config().registries.keys().cloned().collect(),
    };

    let mut shown = 0;
    for ns in &namespaces {
        let index = match fetcher.fetch_index(ns).await {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("failed to fetch index for {ns}: {e}");
                eprintln!("warning: could not load registry {ns}: {e}");
                continue;
            }
        };

        for entry in index.list(kind) {
            let key = ComponentRef {
                namespace: ns.clone(),
                name: entry.name.clone(),
                version: None,
            }
            .install_key();
            let installed = project.installed(&key);
            if installed_only && installed.is_none() {
                continue;
            }

            let status = match (installed, &entry.version) {
                (Some(rec), Some(latest)) if rec.version != *latest => {
                    format!(" [installed {}, {latest} available]", rec.version)
                }
                (Some(rec), _) => format!(" [installed {}]", rec.version),
                (None, _) => String::new(),
            };
            let desc = if entry.description.is_empty() {
                String::new()
            } else {
                format!(" - {}", entry.description)
            };

            println!("  {key} ({}){desc}{status}", entry.kind);
            shown += 1;
        }
    }

    if shown == 0 {
        if installed_only {
            println!("No components installed.");
        } else {
            println!("No components found.");
        }
    }
    Ok(())
}
