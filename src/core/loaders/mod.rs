pub mod fabric;
pub mod forge;
pub mod installer;
pub mod layout;
pub mod table;

pub use installer::{Installer, LoaderInstaller, LoaderKind, LoaderSelection};
pub use layout::{LoaderEntry, LoaderInstallerResolver, LoaderLayout, LOADER_DIR};
pub use table::{LoaderRule, LoaderTable};
