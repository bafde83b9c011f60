use std::path::Path;

use anyhow::{Context, Result};

use crate::install::InstallOptions;
use crate::model::ComponentRef;
use crate::resolve::Resolver;
use crate::store::ProjectStore;

pub async fn run(cwd: &Path, components: Vec<String>) -> Result<()> {
    let mut project = ProjectStore::open(cwd).context("failed to open project")?;

    let keys: Vec<String> = if components.is_empty() {
        project.config().installed.keys().cloned().collect()
    } else {
        for name in &components {
            if project.installed(name).is_none() {
                anyhow::bail!("component '{name}' is not installed. Add it with `kitn add {name}`.");
            }
        }
        components
    };

    if keys.is_empty() {
        println!("No components installed.");
        return Ok(());
    }

    let refs = keys
        .iter()
        .map(|k| ComponentRef::parse(k))
        .collect::<Result<Vec<_>, _>>()?;

    let fetcher = super::fetcher(&project)?;
    let resolved = Resolver::new(&fetcher)
        .resolve(&refs)
        .await
        .context("failed to resolve components")?;

    println!("Updating {} component(s):", resolved.len());
    super::install(&mut project, &resolved, InstallOptions { overwrite: true }).await
}
