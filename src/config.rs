//! Run settings for modulegen
//!
//! Settings are read from a TOML file. The file is located through, in order:
//! the `--settings` command-line flag, the `MODULEGEN_SETTINGS` environment
//! variable, or `modulegen.toml` in the current directory.
//!
//! Relative paths inside the file are resolved against the directory that
//! contains it, so a run never depends on where the binary was started from.
//! The append-file output directories are the exception: like the file lists
//! handed to the build description, they are relative to `src_path`.
//!
//! # Example
//!
//! ```toml
//! src_path = "../src"
//! search_paths = ["srcpypp/modules"]
//! vpc_server_path = "../src/game/server/server_mod.vpc"
//! vpc_client_path = "../src/game/client/client_mod.vpc"
//! client_path = "game/client/python/modules"
//! server_path = "game/server/python/modules"
//! shared_path = "game/shared/python/modules"
//! vpc_server_auto_path = "../src/game/server/python_autogenerated.vpc"
//!
//! [macros]
//! GAMENAME = "mymod"
//!
//! [[modules]]
//! source = "builtin"
//! type_name = "command"
//! options = { name = "entities", module_type = "server", path = "../server/python/modules", command = ["genentities"] }
//! ```

use crate::fs::FileSystem;
use crate::util::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the current directory when nothing else is given
pub const DEFAULT_SETTINGS_FILE: &str = "modulegen.toml";

/// Environment variable naming the settings file
pub const SETTINGS_ENV_VAR: &str = "MODULEGEN_SETTINGS";

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Settings validation failed: {0}")]
    ValidationFailed(String),
}

/// A reference to a module type, resolved through the module registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    /// Where the type comes from, e.g. `builtin` or a plugin namespace
    pub source: String,

    /// Type name within that source
    pub type_name: String,

    /// Free-form options handed to the module factory
    #[serde(default)]
    pub options: toml::Table,
}

impl ModuleDeclaration {
    pub fn new(source: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            type_name: type_name.into(),
            options: toml::Table::new(),
        }
    }

    pub fn with_options(mut self, options: toml::Table) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Display for ModuleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.source, self.type_name)
    }
}

/// Process-wide run settings, read-only once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Declared modules, in registration order
    #[serde(default)]
    pub modules: Vec<ModuleDeclaration>,

    /// Extra lookup directories for module programs, relative to `src_path`
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Root of the native source tree
    pub src_path: PathBuf,

    /// Server project-configuration file
    pub vpc_server_path: PathBuf,

    /// Client project-configuration file
    pub vpc_client_path: PathBuf,

    /// Output directory of the client append file, relative to `src_path`
    pub client_path: PathBuf,

    /// Output directory of the server append file, relative to `src_path`
    pub server_path: PathBuf,

    /// Output directory of the shared append file, relative to `src_path`
    pub shared_path: PathBuf,

    /// Server build-description fragment listing generated files
    #[serde(default)]
    pub vpc_server_auto_path: Option<PathBuf>,

    /// Client build-description fragment listing generated files
    #[serde(default)]
    pub vpc_client_auto_path: Option<PathBuf>,

    /// Macros merged over the base macro table of both project files
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

impl Settings {
    /// Parse settings from TOML text, resolving relative paths against `base_dir`
    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self, SettingsError> {
        Self::parse(content, base_dir, base_dir)
    }

    fn parse(content: &str, origin: &Path, base_dir: &Path) -> Result<Self, SettingsError> {
        let mut settings: Settings =
            toml::from_str(content).map_err(|source| SettingsError::Parse {
                path: origin.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        settings.resolve_paths(base_dir);
        Ok(settings)
    }

    /// Load and validate a settings file
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, SettingsError> {
        let content = fs.read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            message: format!("{:#}", e),
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let settings = Self::parse(&content, path, base_dir)?;

        tracing::debug!(path = %path.display(), modules = settings.modules.len(), "Loaded settings");
        Ok(settings)
    }

    /// Decide which settings file to use
    ///
    /// An explicit path wins, then `MODULEGEN_SETTINGS`, then
    /// `modulegen.toml` under `cwd`.
    pub fn locate(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
        if let Some(path) = explicit {
            return paths::resolve(cwd, path);
        }

        match env::var(SETTINGS_ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => paths::resolve(cwd, Path::new(value.trim())),
            _ => cwd.join(DEFAULT_SETTINGS_FILE),
        }
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        self.src_path = paths::resolve(base_dir, &self.src_path);
        self.vpc_server_path = paths::resolve(base_dir, &self.vpc_server_path);
        self.vpc_client_path = paths::resolve(base_dir, &self.vpc_client_path);
        self.vpc_server_auto_path = self
            .vpc_server_auto_path
            .as_deref()
            .map(|p| paths::resolve(base_dir, p));
        self.vpc_client_auto_path = self
            .vpc_client_auto_path
            .as_deref()
            .map(|p| paths::resolve(base_dir, p));
    }

    /// Validates the settings
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ValidationFailed` for empty required paths or
    /// output directories that escape through an absolute path.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let required = [
            ("src_path", &self.src_path),
            ("vpc_server_path", &self.vpc_server_path),
            ("vpc_client_path", &self.vpc_client_path),
            ("client_path", &self.client_path),
            ("server_path", &self.server_path),
            ("shared_path", &self.shared_path),
        ];
        for (field, value) in required {
            if value.as_os_str().is_empty() {
                return Err(SettingsError::ValidationFailed(format!(
                    "{} must not be empty",
                    field
                )));
            }
        }

        for (field, value) in [
            ("client_path", &self.client_path),
            ("server_path", &self.server_path),
            ("shared_path", &self.shared_path),
        ] {
            if value.is_absolute() {
                return Err(SettingsError::ValidationFailed(format!(
                    "{} must be relative to src_path, got {}",
                    field,
                    value.display()
                )));
            }
        }

        for (index, decl) in self.modules.iter().enumerate() {
            if decl.source.trim().is_empty() || decl.type_name.trim().is_empty() {
                return Err(SettingsError::ValidationFailed(format!(
                    "module declaration #{} needs both source and type_name",
                    index
                )));
            }
        }

        Ok(())
    }

    /// Absolute directory of the client append file
    pub fn client_output_dir(&self) -> PathBuf {
        paths::resolve(&self.src_path, &self.client_path)
    }

    /// Absolute directory of the server append file
    pub fn server_output_dir(&self) -> PathBuf {
        paths::resolve(&self.src_path, &self.server_path)
    }

    /// Absolute directory of the shared append file
    pub fn shared_output_dir(&self) -> PathBuf {
        paths::resolve(&self.src_path, &self.shared_path)
    }

    /// Search paths resolved against `src_path`
    pub fn resolved_search_paths(&self) -> Vec<PathBuf> {
        self.search_paths
            .iter()
            .map(|p| paths::resolve(&self.src_path, p))
            .collect()
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Modulegen Settings:")?;
        writeln!(f, "  Source root: {}", self.src_path.display())?;
        writeln!(f, "  Server project: {}", self.vpc_server_path.display())?;
        writeln!(f, "  Client project: {}", self.vpc_client_path.display())?;
        writeln!(f, "  Client output: {}", self.client_path.display())?;
        writeln!(f, "  Server output: {}", self.server_path.display())?;
        writeln!(f, "  Shared output: {}", self.shared_path.display())?;
        if let Some(ref path) = self.vpc_server_auto_path {
            writeln!(f, "  Server file list: {}", path.display())?;
        }
        if let Some(ref path) = self.vpc_client_auto_path {
            writeln!(f, "  Client file list: {}", path.display())?;
        }
        writeln!(f, "  Modules: {}", self.modules.len())?;
        Ok(())
    }
}
