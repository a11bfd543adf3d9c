use super::append::write_append_file;
use super::classify::Classification;
use super::context::PipelineContext;
use super::flavor::{base_macros, load_flavor};
use super::report::{BuildListUpdate, PipelineReport};
use crate::config::Settings;
use crate::error::PipelineError;
use crate::modules::{BindingModule, BuildFlavor, FlavorConfig, ModuleEnvironment, ModuleType};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::util::paths;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Selects what a run generates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Generate only the module with this name; all modules are still
    /// classified and listed in the append files
    pub specific_module: Option<String>,
    /// Skip every generation step and only rewrite the append files
    pub append_file_only: bool,
}

impl RunOptions {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(name: impl Into<String>) -> Self {
        Self {
            specific_module: Some(name.into()),
            append_file_only: false,
        }
    }

    pub fn append_only() -> Self {
        Self {
            specific_module: None,
            append_file_only: true,
        }
    }

    fn should_generate(&self, name: &str) -> bool {
        if self.append_file_only {
            return false;
        }
        match &self.specific_module {
            Some(only) => only == name,
            None => true,
        }
    }
}

pub struct ModulePipeline {
    context: PipelineContext,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl ModulePipeline {
    pub fn new(context: PipelineContext) -> Self {
        Self {
            context,
            progress_handler: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    /// Run the whole pipeline once
    pub fn run(&self, options: &RunOptions) -> Result<PipelineReport, PipelineError> {
        let result = self.execute(options);
        if let Err(ref e) = result {
            self.emit(ProgressEvent::Failed {
                error: e.to_string(),
            });
        }
        result
    }

    fn execute(&self, options: &RunOptions) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        let settings = &self.context.settings;
        let fs = self.context.file_system.as_ref();

        info!(
            "Starting module generation for {} declared module(s)",
            settings.modules.len()
        );
        self.emit(ProgressEvent::Started {
            modules: settings.modules.len(),
            specific_module: options.specific_module.clone(),
        });

        let mut modules = self.context.registry.instantiate_all(settings)?;
        validate_names(&modules, settings)?;

        let server = self.load(BuildFlavor::Server, &settings.vpc_server_path)?;
        let client = self.load(BuildFlavor::Client, &settings.vpc_client_path)?;
        let env = ModuleEnvironment::new(
            server,
            client,
            Arc::clone(settings),
            Arc::clone(&self.context.file_system),
        );

        let mut report = PipelineReport::default();
        let mut classification = Classification::default();
        let total = modules.len();

        for (index, module) in modules.iter_mut().enumerate() {
            let name = module.module_name().to_string();

            if options.should_generate(&name) {
                info!("Generating module {}...", name);
                self.emit(ProgressEvent::ModuleStarted {
                    name: name.clone(),
                    index: index + 1,
                    total,
                });

                let module_start = Instant::now();
                module
                    .run(&env)
                    .map_err(|source| PipelineError::ModuleFailed {
                        name: name.clone(),
                        source,
                    })?;

                self.emit(ProgressEvent::ModuleComplete {
                    name: name.clone(),
                    duration: module_start.elapsed(),
                });
                report.generated.push(name);
            } else {
                self.emit(ProgressEvent::ModuleSkipped { name: name.clone() });
                report.skipped.push(name);
            }

            classification.add(fs, &env, &**module)?;
        }

        if let Some(ref only) = options.specific_module {
            if report.generated.is_empty() && !options.append_file_only {
                warn!("No module named {} is declared", only);
            }
        }

        for (target, dir) in [
            (ModuleType::Client, settings.client_output_dir()),
            (ModuleType::Server, settings.server_output_dir()),
            (ModuleType::Shared, settings.shared_output_dir()),
        ] {
            let append = write_append_file(fs, &dir, classification.names.get(target), target)?;
            self.emit(ProgressEvent::AppendFileChecked {
                target,
                path: append.path.clone(),
                written: append.written,
            });

            if !classification.filenames.get(target).is_empty() {
                let relative = source_relative(&append.path, &settings.src_path)?;
                classification.filenames.push(target, relative);
            }
            report.append_files.push(append);
        }

        let lists = [
            (&settings.vpc_server_auto_path, ModuleType::Server, BuildFlavor::Server),
            (&settings.vpc_client_auto_path, ModuleType::Client, BuildFlavor::Client),
        ];
        for (target_path, side, flavor) in lists {
            let Some(target_path) = target_path else {
                debug!("No {} build file list configured", side);
                continue;
            };

            let mut files = classification.filenames.shared.clone();
            files.extend(classification.filenames.get(side).iter().cloned());

            self.context
                .updater
                .generate(settings, &files, &env.flavor(flavor).src_dir, target_path)
                .map_err(|source| PipelineError::BuildList {
                    target: target_path.clone(),
                    source,
                })?;

            self.emit(ProgressEvent::BuildListUpdated {
                target: target_path.clone(),
                files: files.len(),
            });
            report.build_lists.push(BuildListUpdate {
                target: target_path.clone(),
                files: files.len(),
            });
        }

        report.modules = classification.names;
        report.filenames = classification.filenames;

        info!(
            "Module generation complete: {} generated, {} append file(s) written",
            report.generated.len(),
            report.append_files_written()
        );
        self.emit(ProgressEvent::Completed {
            generated: report.generated.len(),
            total_time: start.elapsed(),
        });

        Ok(report)
    }

    fn load(&self, flavor: BuildFlavor, project_path: &Path) -> Result<FlavorConfig, PipelineError> {
        let start = Instant::now();
        let config = load_flavor(
            self.context.parser.as_ref(),
            self.context.file_system.as_ref(),
            flavor,
            project_path,
            base_macros(&self.context.settings),
        )?;

        self.emit(ProgressEvent::FlavorLoaded {
            flavor,
            include_dirs: config.include_dirs.len(),
            symbols: config.symbols.len(),
            load_time: start.elapsed(),
        });
        Ok(config)
    }
}

/// `path` relative to `src_path`, `/`-separated, for a build file list
fn source_relative(path: &Path, src_path: &Path) -> Result<String, PipelineError> {
    let relative = paths::relative_to(path, src_path).ok_or_else(|| PipelineError::Filesystem {
        path: path.to_path_buf(),
        source: anyhow::anyhow!("not expressible relative to {}", src_path.display()),
    })?;
    Ok(paths::to_slash(&relative))
}

fn validate_names(
    modules: &[Box<dyn BindingModule>],
    settings: &Settings,
) -> Result<(), PipelineError> {
    for (index, module) in modules.iter().enumerate() {
        if module.module_name().trim().is_empty() {
            return Err(PipelineError::MissingModuleName {
                index,
                declaration: settings
                    .modules
                    .get(index)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            });
        }
    }
    Ok(())
}
