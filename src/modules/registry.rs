//! Module registry

use super::{BindingModule, CommandModule};
use crate::config::{ModuleDeclaration, Settings};
use crate::error::PipelineError;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds a module from its declaration
pub type ModuleFactory =
    Arc<dyn Fn(&ModuleDeclaration, Arc<Settings>) -> Result<Box<dyn BindingModule>> + Send + Sync>;

/// Maps `(source, type_name)` to a module factory
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    factories: HashMap<(String, String), ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("builtin", "command", |decl, settings| {
            Ok(Box::new(CommandModule::from_declaration(decl, settings)?) as Box<dyn BindingModule>)
        });
        registry
    }

    pub fn register<F>(&mut self, source: &str, type_name: &str, factory: F)
    where
        F: Fn(&ModuleDeclaration, Arc<Settings>) -> Result<Box<dyn BindingModule>>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert((source.to_string(), type_name.to_string()), Arc::new(factory));
    }

    pub fn contains(&self, source: &str, type_name: &str) -> bool {
        self.factories
            .contains_key(&(source.to_string(), type_name.to_string()))
    }

    /// Registered types as `source::type_name`, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .factories
            .keys()
            .map(|(source, type_name)| format!("{}::{}", source, type_name))
            .collect();
        names.sort();
        names
    }

    pub fn instantiate(
        &self,
        decl: &ModuleDeclaration,
        settings: Arc<Settings>,
    ) -> Result<Box<dyn BindingModule>, PipelineError> {
        let factory = self
            .factories
            .get(&(decl.source.clone(), decl.type_name.clone()))
            .ok_or_else(|| PipelineError::ModuleNotFound {
                declaration: decl.to_string(),
            })?;

        factory(decl, settings).map_err(|source| PipelineError::ModuleConstruction {
            declaration: decl.to_string(),
            source,
        })
    }

    /// Instantiate every declared module, preserving declaration order
    pub fn instantiate_all(
        &self,
        settings: &Arc<Settings>,
    ) -> Result<Vec<Box<dyn BindingModule>>, PipelineError> {
        settings
            .modules
            .iter()
            .map(|decl| {
                let module = self.instantiate(decl, Arc::clone(settings))?;
                debug!("Instantiated {} as '{}'", decl, module.module_name());
                Ok(module)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{ModuleEnvironment, ModuleType};
    use std::path::{Path, PathBuf};

    struct Fixed {
        name: String,
        path: PathBuf,
    }

    impl BindingModule for Fixed {
        fn module_name(&self) -> &str {
            &self.name
        }

        fn module_type(&self) -> ModuleType {
            ModuleType::Client
        }

        fn path(&self) -> &Path {
            &self.path
        }

        fn run(&mut self, _env: &ModuleEnvironment) -> Result<()> {
            Ok(())
        }
    }

    fn settings_with(modules: Vec<ModuleDeclaration>) -> Arc<Settings> {
        let content = r#"
src_path = "/src"
vpc_server_path = "/src/server.vpc"
vpc_client_path = "/src/client.vpc"
client_path = "client"
server_path = "server"
shared_path = "shared"
"#;
        let mut settings = Settings::from_toml_str(content, Path::new("/")).unwrap();
        settings.modules = modules;
        Arc::new(settings)
    }

    #[test]
    fn test_with_defaults_has_command() {
        let registry = ModuleRegistry::with_defaults();
        assert!(registry.contains("builtin", "command"));
        assert_eq!(registry.names(), vec!["builtin::command".to_string()]);
    }

    #[test]
    fn test_unknown_type_is_not_found() {
        let registry = ModuleRegistry::with_defaults();
        let settings = settings_with(vec![ModuleDeclaration::new("plugins", "missing")]);

        let err = registry.instantiate_all(&settings).err().unwrap();
        assert!(matches!(err, PipelineError::ModuleNotFound { ref declaration } if declaration == "plugins::missing"));
    }

    #[test]
    fn test_instantiate_all_preserves_order() {
        let mut registry = ModuleRegistry::new();
        registry.register("test", "fixed", |decl, _| {
            let name = decl
                .options
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            Ok(Box::new(Fixed {
                name,
                path: PathBuf::from("."),
            }) as Box<dyn BindingModule>)
        });

        let decl = |name: &str| {
            let mut options = toml::Table::new();
            options.insert("name".to_string(), toml::Value::String(name.to_string()));
            ModuleDeclaration::new("test", "fixed").with_options(options)
        };
        let settings = settings_with(vec![decl("b"), decl("a"), decl("c")]);

        let modules = registry.instantiate_all(&settings).unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.module_name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_factory_error_is_construction_error() {
        let mut registry = ModuleRegistry::new();
        registry.register("test", "broken", |_, _| Err(anyhow::anyhow!("bad options")));
        let settings = settings_with(vec![ModuleDeclaration::new("test", "broken")]);

        let err = registry.instantiate_all(&settings).err().unwrap();
        assert!(matches!(err, PipelineError::ModuleConstruction { .. }));
    }
}
