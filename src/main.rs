use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod error;
mod hash;
mod install;
mod model;
mod pm;
mod registry;
mod resolve;
mod store;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if cli.verbose { "kitn=debug" } else { "kitn=info" })
        }))
        .with_writer(std::io::stderr)
        .init();

    let cwd = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    match cli.command {
        cli::Command::Init {
            framework,
            runtime,
            base,
            registry,
        } => cli::init::run(&cwd, framework, runtime, base, registry),
        cli::Command::Add {
            components,
            overwrite,
        } => cli::add::run(&cwd, components, overwrite).await,
        cli::Command::Update { components } => cli::update::run(&cwd, components).await,
        cli::Command::Remove { components } => cli::remove::run(&cwd, components),
        cli::Command::List {
            installed,
            kind,
            namespace,
        } => cli::list::run(&cwd, installed, kind, namespace).await,
        cli::Command::Info { component } => cli::info::run(&cwd, component).await,
        cli::Command::Registry(cmd) => cli::registry::run(&cwd, cmd),
    }
}
