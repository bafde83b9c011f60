pub mod add;
pub mod info;
pub mod init;
pub mod list;
pub mod registry;
pub mod remove;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::install::{FileOutcome, InstallOptions, Installer};
use crate::model::ComponentType;
use crate::pm::ProcessRunner;
use crate::registry::{HttpTransport, RegistryFetcher};
use crate::resolve::Resolved;
use crate::store::ProjectStore;

#[derive(Debug, Parser)]
#[command(
    name = "kitn",
    about = "Install AI agents, tools, skills and storage adapters from a component registry",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Project directory (default: current directory)
    #[arg(long, env = "KITN_CWD", global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create kitn.json in the project
    Init {
        /// Web framework the project uses
        #[arg(long, default_value = "hono")]
        framework: String,

        /// JavaScript runtime (bun, node, deno)
        #[arg(long)]
        runtime: Option<String>,

        /// Base directory for installed components
        #[arg(long, default_value = "src/ai")]
        base: String,

        /// URL template for the default @kitn registry
        #[arg(long, env = "KITN_REGISTRY_URL")]
        registry: Option<String>,
    },

    /// Install components and their registry dependencies
    Add {
        /// Components as [@namespace/]name[@version]
        #[arg(required = true)]
        components: Vec<String>,

        /// Replace local files that differ from the registry
        #[arg(long)]
        overwrite: bool,
    },

    /// Re-install components from the registry, replacing local files
    Update {
        /// Installed components to update (default: all)
        components: Vec<String>,
    },

    /// Remove installed components and the files they own
    Remove {
        /// Installed components to remove
        #[arg(required = true)]
        components: Vec<String>,
    },

    /// List components available in the configured registries
    List {
        /// Only show installed components
        #[arg(long)]
        installed: bool,

        /// Filter by type (agent, tool, skill, storage, package)
        #[arg(short = 't', long = "type")]
        kind: Option<ComponentType>,

        /// Only list this registry namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },

    /// Show details of a registry component
    Info {
        /// Component as [@namespace/]name[@version]
        component: String,
    },

    /// Manage registry namespaces
    #[command(subcommand)]
    Registry(RegistrySubcommand),
}

#[derive(Debug, Subcommand)]
pub enum RegistrySubcommand {
    /// List configured registries
    List,

    /// Add a registry namespace
    Add {
        /// Namespace, e.g. @acme
        namespace: String,
        /// URL template containing {type} and {name}
        url: String,
    },

    /// Remove a registry namespace
    Remove {
        /// Namespace to remove
        namespace: String,
    },
}

fn fetcher(project: &ProjectStore) -> Result<RegistryFetcher> {
    let transport = HttpTransport::new()?;
    Ok(RegistryFetcher::new(
        project.config().registries.clone(),
        transport,
    ))
}

/// Install a resolved set and print what happened to each file.
async fn install(
    project: &mut ProjectStore,
    resolved: &[Resolved],
    options: InstallOptions,
) -> Result<()> {
    let runner = ProcessRunner;
    let installer = Installer::new(&runner);

    let mut report = installer
        .install_files(project, resolved, options)
        .context("failed to install components")?;

    for component in &report.components {
        let version = match &component.previous_version {
            Some(prev) if *prev != component.version => format!("{prev} -> {}", component.version),
            _ => component.version.clone(),
        };
        println!("  {} ({version})", component.key);
        for file in &component.files {
            match &file.outcome {
                FileOutcome::Written => println!("    wrote {}", file.path),
                FileOutcome::Unchanged => println!("    unchanged {}", file.path),
                FileOutcome::Excluded => {}
                FileOutcome::Conflict => println!(
                    "    conflict {} (local changes kept; use --overwrite to replace)",
                    file.path
                ),
                FileOutcome::Failed(reason) => println!("    FAILED {}: {reason}", file.path),
            }
        }
    }

    let deps_result = installer
        .install_dependencies(project.root(), &mut report)
        .await;

    println!("\n{}", report.summary());
    if let Some(pm) = report.package_manager {
        if report.dependencies_installed > 0 {
            println!("Dependencies installed with {pm}.");
        }
    } else if !report.dependencies.is_empty() || !report.dev_dependencies.is_empty() {
        let all: Vec<&str> = report
            .dependencies
            .iter()
            .chain(&report.dev_dependencies)
            .map(String::as_str)
            .collect();
        println!("No package manager detected. Install manually: {}", all.join(" "));
    }

    deps_result.context("failed to install dependencies")?;
    Ok(())
}
