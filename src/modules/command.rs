//! Module backed by an external generator program
//!
//! Declared in settings as `builtin::command`:
//!
//! ```toml
//! [[modules]]
//! source = "builtin"
//! type_name = "command"
//! options = { name = "entities", module_type = "server", split = false, path = "python/modules", command = ["genentities", "--verbose"] }
//! ```
//!
//! The program runs in the project directory of the module's side and learns
//! the build configuration through `MODULEGEN_*` environment variables.

use super::{BindingModule, BuildFlavor, FlavorConfig, ModuleEnvironment, ModuleType};
use crate::config::{ModuleDeclaration, Settings};
use crate::fs::FileSystem;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandModuleOptions {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub module_type: ModuleType,
    #[serde(default)]
    pub split: bool,
    #[serde(default)]
    pub path: PathBuf,
    /// Program followed by its arguments; empty means nothing to run
    #[serde(default)]
    pub command: Vec<String>,
}

pub struct CommandModule {
    options: CommandModuleOptions,
    settings: Arc<Settings>,
}

impl CommandModule {
    pub fn new(options: CommandModuleOptions, settings: Arc<Settings>) -> Self {
        Self { options, settings }
    }

    pub fn from_declaration(decl: &ModuleDeclaration, settings: Arc<Settings>) -> Result<Self> {
        let options: CommandModuleOptions = toml::Value::Table(decl.options.clone())
            .try_into()
            .with_context(|| format!("Invalid options for {}", decl))?;
        Ok(Self::new(options, settings))
    }

    /// Side whose project directory hosts this module
    fn home_flavor(&self) -> BuildFlavor {
        match self.options.module_type {
            ModuleType::Client => BuildFlavor::Client,
            ModuleType::Server | ModuleType::Shared => BuildFlavor::Server,
        }
    }

    /// Resolve a bare program name through the search paths
    fn resolve_program(&self, fs: &dyn FileSystem, program: &str) -> PathBuf {
        let candidate = Path::new(program);
        if candidate.is_absolute() {
            return candidate.to_path_buf();
        }

        if candidate.components().count() > 1 {
            return self.settings.src_path.join(candidate);
        }

        for dir in self.settings.resolved_search_paths() {
            let path = dir.join(candidate);
            if fs.is_file(&path) {
                debug!("Resolved {} to {}", program, path.display());
                return path;
            }
        }

        candidate.to_path_buf()
    }

    fn environment(&self, env: &ModuleEnvironment) -> Vec<(String, String)> {
        let home = env.flavor(self.home_flavor());
        let mut vars = vec![
            ("MODULEGEN_MODULE_NAME".to_string(), self.options.name.clone()),
            (
                "MODULEGEN_MODULE_TYPE".to_string(),
                self.options.module_type.to_string(),
            ),
            (
                "MODULEGEN_MODULE_PATH".to_string(),
                home.module_dir(&self.options.path).display().to_string(),
            ),
            ("MODULEGEN_SPLIT".to_string(), self.options.split.to_string()),
            (
                "MODULEGEN_SRC_PATH".to_string(),
                self.settings.src_path.display().to_string(),
            ),
        ];

        for (prefix, flavor) in [("SERVER", &env.server), ("CLIENT", &env.client)] {
            vars.extend(flavor_vars(prefix, flavor));
        }
        vars
    }
}

fn flavor_vars(prefix: &str, flavor: &FlavorConfig) -> Vec<(String, String)> {
    let includes: Vec<String> = flavor
        .include_dirs
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    vec![
        (format!("MODULEGEN_{}_INCLUDES", prefix), includes.join(";")),
        (format!("MODULEGEN_{}_SYMBOLS", prefix), flavor.symbols.join(";")),
        (
            format!("MODULEGEN_{}_SRCDIR", prefix),
            flavor.src_dir.display().to_string(),
        ),
        (
            format!("MODULEGEN_{}_CONFIG_DIR", prefix),
            flavor.config_dir.display().to_string(),
        ),
    ]
}

impl BindingModule for CommandModule {
    fn module_name(&self) -> &str {
        &self.options.name
    }

    fn module_type(&self) -> ModuleType {
        self.options.module_type
    }

    fn split(&self) -> bool {
        self.options.split
    }

    fn path(&self) -> &Path {
        &self.options.path
    }

    fn run(&mut self, env: &ModuleEnvironment) -> Result<()> {
        let Some((program, args)) = self.options.command.split_first() else {
            debug!("Module {} has no command, nothing to generate", self.options.name);
            return Ok(());
        };

        let program = self.resolve_program(env.file_system.as_ref(), program);
        let workdir = &env.flavor(self.home_flavor()).config_dir;
        info!("Running {} in {}", program.display(), workdir.display());

        let output = Command::new(&program)
            .args(args)
            .current_dir(workdir)
            .envs(self.environment(env))
            .output()
            .with_context(|| format!("Failed to start {}", program.display()))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("[{}] {}", self.options.name, line);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            warn!("[{}] {}", self.options.name, line);
        }

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}
