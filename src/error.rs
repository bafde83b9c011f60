use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KitnError {
    #[error("failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove file: {path}")]
    FileRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create directory: {path}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("refusing to write outside the install directory: {path}")]
    UnsafePath { path: String },

    #[error("project not initialized; run `kitn init` first")]
    NotInitialized,

    #[error("project already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("failed to parse {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid component reference '{input}': {reason}")]
    InvalidReference { input: String, reason: String },

    #[error("invalid registry '{namespace}': {reason}")]
    InvalidRegistry { namespace: String, reason: String },

    #[error("no registry configured for namespace '{namespace}'")]
    RegistryNotConfigured { namespace: String },

    #[error("fetch failed for {url}: {status}")]
    FetchFailed { url: String, status: String },

    #[error("failed to create HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("component '{name}' not found in registry '{namespace}'")]
    ComponentNotFound { namespace: String, name: String },

    #[error("circular dependency: {cycle}")]
    CircularDependency { cycle: String },

    #[error("component '{name}' is not installed")]
    NotInstalled { name: String },

    #[error("{program} is not installed or not in PATH")]
    PackageManagerNotFound { program: String },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },
}
