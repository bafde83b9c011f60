pub mod config;
pub mod index;
pub mod item;
pub mod reference;

pub use config::{Aliases, InstalledComponent, ProjectConfig, Registries};
pub use index::{IndexEntry, RegistryIndex};
pub use item::{ComponentType, RegistryFile, RegistryItem};
pub use reference::ComponentRef;
