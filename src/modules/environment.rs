use crate::config::Settings;
use crate::fs::FileSystem;
use crate::util::paths;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build flavor whose project file supplies configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildFlavor {
    Server,
    Client,
}

impl BuildFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildFlavor::Server => "server",
            BuildFlavor::Client => "client",
        }
    }
}

impl fmt::Display for BuildFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration extracted from one flavor's project file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlavorConfig {
    /// Include directories that exist on disk, absolute
    pub include_dirs: Vec<PathBuf>,
    /// Preprocessor symbols, in declaration order
    pub symbols: Vec<String>,
    /// Source root named by the `SRCDIR` macro, absolute
    pub src_dir: PathBuf,
    /// Directory containing the project file
    pub config_dir: PathBuf,
}

impl FlavorConfig {
    /// Resolve a module output path against this flavor's project directory
    pub fn module_dir(&self, module_path: &Path) -> PathBuf {
        paths::resolve(&self.config_dir, module_path)
    }
}

/// Everything a module may consult while generating
///
/// Handed to [`super::BindingModule::run`] explicitly; nothing is stored on
/// module instances between runs.
#[derive(Clone)]
pub struct ModuleEnvironment {
    pub server: FlavorConfig,
    pub client: FlavorConfig,
    pub settings: Arc<Settings>,
    /// The run's file system; modules check paths through it
    pub file_system: Arc<dyn FileSystem>,
}

impl fmt::Debug for ModuleEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleEnvironment")
            .field("server", &self.server)
            .field("client", &self.client)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ModuleEnvironment {
    pub fn new(
        server: FlavorConfig,
        client: FlavorConfig,
        settings: Arc<Settings>,
        file_system: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            server,
            client,
            settings,
            file_system,
        }
    }

    pub fn flavor(&self, flavor: BuildFlavor) -> &FlavorConfig {
        match flavor {
            BuildFlavor::Server => &self.server,
            BuildFlavor::Client => &self.client,
        }
    }
}
