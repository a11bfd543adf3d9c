//! Subcommand handlers
//!
//! Each handler returns the process exit code: 0 on success, 1 on any error
//! after printing the full error chain to stderr.

use super::commands::{AppendArgs, ListArgs, OutputFormatArg, ParseArgs};
use super::output::{ModuleListing, ModuleSummary, OutputFormat, OutputFormatter};
use crate::config::Settings;
use crate::fs::{FileSystem, RealFileSystem};
use crate::modules::ModuleRegistry;
use crate::pipeline::{ModulePipeline, PipelineContext, PipelineReport, RunOptions};
use crate::progress::LoggingHandler;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

pub fn handle_parse(args: &ParseArgs, settings: Option<&Path>, quiet: bool) -> i32 {
    let options = match &args.module {
        Some(name) => RunOptions::only(name.clone()),
        None => RunOptions::all(),
    };
    run_and_print(settings, &options, args.format, quiet)
}

pub fn handle_append(args: &AppendArgs, settings: Option<&Path>, quiet: bool) -> i32 {
    run_and_print(settings, &RunOptions::append_only(), args.format, quiet)
}

pub fn handle_list(args: &ListArgs, settings: Option<&Path>) -> i32 {
    let result = resolve_settings_path(settings).and_then(|path| {
        let fs = Arc::new(RealFileSystem::new());
        list_modules(fs, &path, &ModuleRegistry::with_defaults())
    });

    match result.and_then(|listing| OutputFormatter::new(args.format.into()).format_listing(&listing)) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => report_error(&e),
    }
}

fn run_and_print(
    settings: Option<&Path>,
    options: &RunOptions,
    format: OutputFormatArg,
    quiet: bool,
) -> i32 {
    let result = resolve_settings_path(settings).and_then(|path| {
        let fs = Arc::new(RealFileSystem::new());
        run_pipeline(fs, &path, ModuleRegistry::with_defaults(), options)
    });

    let report = match result {
        Ok(report) => report,
        Err(e) => return report_error(&e),
    };

    let format: OutputFormat = format.into();
    if quiet && format == OutputFormat::Human {
        return 0;
    }

    match OutputFormatter::new(format).format_report(&report) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => report_error(&e),
    }
}

fn report_error(e: &anyhow::Error) -> i32 {
    error!("{:#}", e);
    eprintln!("Error: {:#}", e);
    1
}

fn resolve_settings_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = env::current_dir().context("Failed to determine the current directory")?;
    let path = Settings::locate(explicit, &cwd);
    debug!("Using settings file {}", path.display());
    Ok(path)
}

/// Load settings from `settings_path` and run the pipeline once
pub fn run_pipeline(
    fs: Arc<dyn FileSystem>,
    settings_path: &Path,
    registry: ModuleRegistry,
    options: &RunOptions,
) -> Result<PipelineReport> {
    let settings = Settings::load(fs.as_ref(), settings_path)?;
    debug!("{}", settings);

    let context = PipelineContext::with_registry(settings, fs, registry);
    let pipeline = ModulePipeline::new(context).with_progress(Arc::new(LoggingHandler));
    Ok(pipeline.run(options)?)
}

/// Describe the declared modules without running anything
pub fn list_modules(
    fs: Arc<dyn FileSystem>,
    settings_path: &Path,
    registry: &ModuleRegistry,
) -> Result<ModuleListing> {
    let settings = Arc::new(Settings::load(fs.as_ref(), settings_path)?);
    let modules = registry.instantiate_all(&settings)?;

    let modules = modules
        .iter()
        .zip(&settings.modules)
        .map(|(module, decl)| ModuleSummary {
            name: module.module_name().to_string(),
            module_type: module.module_type(),
            split: module.split(),
            path: module.path().to_path_buf(),
            declaration: decl.to_string(),
        })
        .collect();

    Ok(ModuleListing {
        registered_types: registry.names(),
        modules,
    })
}
