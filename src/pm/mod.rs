use std::path::Path;
use std::str::FromStr;

use tokio::process::Command;

use crate::error::KitnError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Bun,
    Pnpm,
    Yarn,
    Npm,
}

/// Lockfiles in probe order. Projects can carry stale lockfiles from a
/// previous tool, so the order is the tie-break and must not change.
const LOCKFILES: &[(&str, PackageManager)] = &[
    ("bun.lockb", PackageManager::Bun),
    ("bun.lock", PackageManager::Bun),
    ("pnpm-lock.yaml", PackageManager::Pnpm),
    ("yarn.lock", PackageManager::Yarn),
    ("package-lock.json", PackageManager::Npm),
];

pub fn detect(dir: &Path) -> Option<PackageManager> {
    LOCKFILES
        .iter()
        .find(|(file, _)| dir.join(file).exists())
        .map(|(_, pm)| *pm)
}

impl PackageManager {
    pub fn program(self) -> &'static str {
        match self {
            Self::Bun => "bun",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Npm => "npm",
        }
    }

    /// Command line that adds runtime dependencies.
    pub fn add_command(self, packages: &[String]) -> Vec<String> {
        let verb = match self {
            Self::Npm => "install",
            Self::Bun | Self::Pnpm | Self::Yarn => "add",
        };
        let mut argv = vec![self.program().to_string(), verb.to_string()];
        argv.extend(packages.iter().cloned());
        argv
    }

    /// Command line that adds development dependencies.
    pub fn add_dev_command(self, packages: &[String]) -> Vec<String> {
        let flag = match self {
            Self::Bun => "-d",
            Self::Pnpm | Self::Yarn => "-D",
            Self::Npm => "--save-dev",
        };
        let mut argv = self.add_command(&[]);
        argv.push(flag.to_string());
        argv.extend(packages.iter().cloned());
        argv
    }

    /// Command line that runs a published binary without installing it.
    pub fn exec_command(self, args: &[String]) -> Vec<String> {
        let mut argv: Vec<String> = match self {
            Self::Bun => vec!["bunx".to_string()],
            Self::Pnpm => vec!["pnpm".to_string(), "dlx".to_string()],
            Self::Yarn => vec!["yarn".to_string(), "dlx".to_string()],
            Self::Npm => vec!["npx".to_string()],
        };
        argv.extend(args.iter().cloned());
        argv
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bun" => Ok(Self::Bun),
            "pnpm" => Ok(Self::Pnpm),
            "yarn" => Ok(Self::Yarn),
            "npm" => Ok(Self::Npm),
            other => Err(format!("unknown package manager '{other}'")),
        }
    }
}

/// Runs package-manager command lines in a project directory.
pub trait DependencyRunner {
    async fn run(&self, cwd: &Path, argv: &[String]) -> Result<(), KitnError>;
}

/// Spawns the real package manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl DependencyRunner for ProcessRunner {
    async fn run(&self, cwd: &Path, argv: &[String]) -> Result<(), KitnError> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(());
        };

        tracing::debug!("running `{}` in {}", argv.join(" "), cwd.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => KitnError::PackageManagerNotFound {
                    program: program.clone(),
                },
                _ => KitnError::Spawn {
                    program: program.clone(),
                    source,
                },
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KitnError::CommandFailed {
                command: argv.join(" "),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}
