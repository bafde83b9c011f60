pub mod project;

pub use project::ProjectStore;
