//! Routing module names and output files to build targets

use crate::error::PipelineError;
use crate::fs::FileSystem;
use crate::modules::{BindingModule, BuildFlavor, ModuleEnvironment, ModuleType};
use crate::util::paths;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// One list per build target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetBuckets {
    pub client: Vec<String>,
    pub server: Vec<String>,
    pub shared: Vec<String>,
}

impl TargetBuckets {
    pub fn get(&self, target: ModuleType) -> &[String] {
        match target {
            ModuleType::Client => &self.client,
            ModuleType::Server => &self.server,
            ModuleType::Shared => &self.shared,
        }
    }

    fn get_mut(&mut self, target: ModuleType) -> &mut Vec<String> {
        match target {
            ModuleType::Client => &mut self.client,
            ModuleType::Server => &mut self.server,
            ModuleType::Shared => &mut self.shared,
        }
    }

    pub fn push(&mut self, target: ModuleType, value: String) {
        self.get_mut(target).push(value);
    }

    pub fn extend(&mut self, target: ModuleType, values: impl IntoIterator<Item = String>) {
        self.get_mut(target).extend(values);
    }

    pub fn len(&self) -> usize {
        self.client.len() + self.server.len() + self.shared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Module names and generated file names, bucketed per target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub names: TargetBuckets,
    pub filenames: TargetBuckets,
}

impl Classification {
    /// Record `module` in its buckets
    ///
    /// Every module is classified, whether or not it was generated in this
    /// run. Client and server modules list their files from their own side
    /// only. A shared split module lists its client file set under client and
    /// its server file set under server, and nothing under shared.
    pub fn add(
        &mut self,
        fs: &dyn FileSystem,
        env: &ModuleEnvironment,
        module: &dyn BindingModule,
    ) -> Result<(), PipelineError> {
        let name = module.module_name().to_string();
        let target = module.module_type();

        if self.names.get(target).contains(&name) {
            warn!("Module {} is registered more than once for {}", name, target);
        }
        self.names.push(target, name);

        match target {
            ModuleType::Client => {
                let files = output_filenames(fs, env, module, BuildFlavor::Client)?;
                self.filenames.extend(ModuleType::Client, files);
            }
            ModuleType::Server => {
                let files = output_filenames(fs, env, module, BuildFlavor::Server)?;
                self.filenames.extend(ModuleType::Server, files);
            }
            ModuleType::Shared if module.split() => {
                let client = output_filenames(fs, env, module, BuildFlavor::Client)?;
                let server = output_filenames(fs, env, module, BuildFlavor::Server)?;
                self.filenames.extend(ModuleType::Client, client);
                self.filenames.extend(ModuleType::Server, server);
            }
            ModuleType::Shared => {
                let files = output_filenames(fs, env, module, BuildFlavor::Server)?;
                self.filenames.extend(ModuleType::Shared, files);
            }
        }

        Ok(())
    }
}

/// Files `module` produces, relative to the flavor's source root, `/`-separated
///
/// A non-split module yields `<base>/<name>.cpp`. A split module yields every
/// `.cpp` and `.hpp` file in `<module dir>/<name>`, sorted by file name.
pub fn output_filenames(
    fs: &dyn FileSystem,
    env: &ModuleEnvironment,
    module: &dyn BindingModule,
    flavor: BuildFlavor,
) -> Result<Vec<String>, PipelineError> {
    let config = env.flavor(flavor);
    let module_dir = config.module_dir(module.path());
    let base = paths::relative_to(&module_dir, &config.src_dir).ok_or_else(|| {
        PipelineError::Filesystem {
            path: module_dir.clone(),
            source: anyhow::anyhow!(
                "module directory cannot be expressed relative to {}",
                config.src_dir.display()
            ),
        }
    })?;
    let name = module.module_name();

    if !module.split() {
        let file = paths::normalize(&base.join(format!("{}.cpp", name)));
        return Ok(vec![paths::to_slash(&file)]);
    }

    let split_dir = module_dir.join(name);
    let mut entries = fs
        .read_dir(&split_dir)
        .map_err(|source| PipelineError::Filesystem {
            path: split_dir.clone(),
            source,
        })?;
    entries.retain(|e| e.is_file() && is_source_file(e.file_name()));
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

    debug!(
        "Split module {} has {} {} file(s) in {}",
        name,
        entries.len(),
        flavor,
        split_dir.display()
    );

    Ok(entries
        .iter()
        .map(|e| paths::to_slash(&paths::normalize(&base.join(name).join(e.file_name()))))
        .collect())
}

fn is_source_file(file_name: &str) -> bool {
    matches!(
        Path::new(file_name).extension().and_then(|e| e.to_str()),
        Some("cpp") | Some("hpp")
    )
}
