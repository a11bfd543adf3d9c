//! Binding modules
//!
//! A module is one independently-defined generator that exposes a native
//! subsystem to the scripting runtime. The pipeline knows modules only
//! through [`BindingModule`]; concrete types are created from settings
//! declarations by the [`ModuleRegistry`].

pub mod command;
mod environment;
pub mod registry;

pub use command::CommandModule;
pub use environment::{BuildFlavor, FlavorConfig, ModuleEnvironment};
pub use registry::{ModuleFactory, ModuleRegistry};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Build target a module's output is routed to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Client,
    Server,
    #[default]
    Shared,
}

impl ModuleType {
    pub const ALL: [ModuleType; 3] = [ModuleType::Client, ModuleType::Server, ModuleType::Shared];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Client => "client",
            ModuleType::Server => "server",
            ModuleType::Shared => "shared",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(ModuleType::Client),
            "server" => Ok(ModuleType::Server),
            "shared" => Ok(ModuleType::Shared),
            other => Err(format!(
                "Invalid module type: {}. Valid options: client, server, shared",
                other
            )),
        }
    }
}

/// Contract every generator module fulfils
pub trait BindingModule: Send {
    /// Identifier used in the append files; must not be empty
    fn module_name(&self) -> &str;

    fn module_type(&self) -> ModuleType {
        ModuleType::Shared
    }

    /// Whether output is divided into separate client and server file sets
    fn split(&self) -> bool {
        false
    }

    /// Output location, relative to the directory of the owning side's
    /// project file
    fn path(&self) -> &Path;

    /// Generate this module's binding sources
    fn run(&mut self, env: &ModuleEnvironment) -> Result<()>;
}
