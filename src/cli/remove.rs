use std::path::Path;

use anyhow::{Context, Result};

use crate::install::Installer;
use crate::pm::ProcessRunner;
use crate::store::ProjectStore;

pub fn run(cwd: &Path, components: Vec<String>) -> Result<()> {
    let mut project = ProjectStore::open(cwd).context("failed to open project")?;
    let runner = ProcessRunner;
    let installer = Installer::new(&runner);

    for name in &components {
        let report = installer
            .remove(&mut project, name)
            .with_context(|| format!("failed to remove '{name}'"))?;

        println!("Removed '{name}' ({} files deleted).", report.removed.len());
        for (path, reason) in &report.skipped {
            eprintln!("  warning: skipped {path}: {reason}");
        }
    }
    Ok(())
}
