use std::path::Path;

use anyhow::{Context, Result};

use crate::model::ComponentRef;
use crate::store::ProjectStore;

pub async fn run(cwd: &Path, component: String) -> Result<()> {
    let reference = ComponentRef::parse(&component)?;
    let project = ProjectStore::open(cwd).context("failed to open project")?;
    let fetcher = super::fetcher(&project)?;

    let item = fetcher
        .fetch_component(&reference)
        .await
        .with_context(|| format!("failed to fetch '{reference}'"))?;

    println!("Name:         {}", item.name);
    println!("Type:         {}", item.kind);
    println!("Version:      {}", item.version);
    if !item.description.is_empty() {
        println!("Description:  {}", item.description);
    }
    if !item.categories.is_empty() {
        println!("Categories:   {}", item.categories.join(", "));
    }
    if !item.dependencies.is_empty() {
        println!("Dependencies: {}", item.dependencies.join(", "));
    }
    if !item.registry_dependencies.is_empty() {
        println!("Requires:     {}", item.registry_dependencies.join(", "));
    }
    if let Some(dir) = &item.install_dir {
        println!("Install dir:  {dir}");
    }

    match project.installed(&reference.install_key()) {
        Some(rec) if rec.version == item.version => println!("Installed:    {}", rec.version),
        Some(rec) => println!("Installed:    {} ({} available)", rec.version, item.version),
        None => println!("Installed:    no"),
    }

    println!("Files:");
    for file in &item.files {
        println!("  - {}", file.path);
    }
    if let Some(docs) = &item.docs {
        println!("\n{docs}");
    }
    Ok(())
}
