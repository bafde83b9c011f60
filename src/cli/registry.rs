use std::path::Path;

use anyhow::{Context, Result};

use super::RegistrySubcommand;
use crate::store::ProjectStore;

pub fn run(cwd: &Path, cmd: RegistrySubcommand) -> Result<()> {
    let mut project = ProjectStore::open(cwd).context("failed to open project")?;

    match cmd {
        RegistrySubcommand::Add { namespace, url } => {
            project.add_registry(&namespace, &url)?;
            println!("Added registry '{namespace}' from {url}");
        }
        RegistrySubcommand::Remove { namespace } => {
            project.remove_registry(&namespace)?;
            println!("Removed registry '{namespace}'");
        }
        RegistrySubcommand::List => {
            let registries = &project.config().registries;
            if registries.is_empty() {
                println!("No registries configured.");
                println!("Add one with: kitn registry add <@namespace> <url-template>");
            }
            for (namespace, url) in registries {
                println!("{namespace}: {url}");
            }
        }
    }
    Ok(())
}
