use std::path::Path;

use anyhow::{Context, Result};

use crate::model::reference::DEFAULT_NAMESPACE;
use crate::model::{Aliases, ProjectConfig};
use crate::pm;
use crate::store::project::CONFIG_FILE;
use crate::store::ProjectStore;

pub fn run(
    cwd: &Path,
    framework: String,
    runtime: Option<String>,
    base: String,
    registry: Option<String>,
) -> Result<()> {
    let mut config = ProjectConfig::new(&framework);
    config.runtime = runtime;
    config.aliases = Aliases::with_base(&base);
    if let Some(url) = registry {
        if !url.contains("{name}") {
            anyhow::bail!("registry URL template must contain {{name}}: {url}");
        }
        config.registries.insert(DEFAULT_NAMESPACE.to_string(), url);
    }

    let store = ProjectStore::init(cwd, config).context("failed to initialize project")?;

    println!("Initialized kitn at {}", store.root().display());
    println!("  config: {}", store.root().join(CONFIG_FILE).display());
    println!("  components: {}", store.config().aliases.base);

    let add = ["kitn", "add", "<component>"].map(String::from);
    let next = match pm::detect(store.root()) {
        Some(manager) => manager.exec_command(&add).join(" "),
        None => add.join(" "),
    };
    println!("\nNext: {next}");
    Ok(())
}
