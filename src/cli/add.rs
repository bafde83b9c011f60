use std::path::Path;

use anyhow::{Context, Result};

use crate::install::InstallOptions;
use crate::model::ComponentRef;
use crate::resolve::Resolver;
use crate::store::ProjectStore;

pub async fn run(cwd: &Path, components: Vec<String>, overwrite: bool) -> Result<()> {
    let refs = components
        .iter()
        .map(|c| ComponentRef::parse(c))
        .collect::<Result<Vec<_>, _>>()?;

    let mut project = ProjectStore::open(cwd).context("failed to open project")?;
    let fetcher = super::fetcher(&project)?;

    let resolved = Resolver::new(&fetcher)
        .resolve(&refs)
        .await
        .context("failed to resolve components")?;

    println!("Installing {} component(s):", resolved.len());
    super::install(&mut project, &resolved, InstallOptions { overwrite }).await
}
