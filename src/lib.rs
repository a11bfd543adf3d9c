//! modulegen - binding-module generation for native game builds
//!
//! A game's native code is exposed to its embedded scripting runtime through
//! many independently generated binding modules. This crate runs those
//! generators against the build configuration of both native builds (server
//! and client), then emits one "append" source per build target that
//! registers every module with the interpreter at startup.
//!
//! # Core Concepts
//!
//! - **Settings**: the TOML run description, see [`config::Settings`]
//! - **Modules**: generators behind [`modules::BindingModule`], created from
//!   declarations by the [`modules::ModuleRegistry`]
//! - **Project configuration**: include directories, preprocessor symbols and
//!   the source root read from VPC project files, see [`projectconfig`]
//! - **Append files**: `src_append_<target>.cpp`, rewritten only when their
//!   content changes
//!
//! # Example Usage
//!
//! ```no_run
//! use modulegen::fs::RealFileSystem;
//! use modulegen::pipeline::{ModulePipeline, PipelineContext, RunOptions};
//! use modulegen::Settings;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let fs = Arc::new(RealFileSystem::new());
//! let settings = Settings::load(fs.as_ref(), Path::new("modulegen.toml"))?;
//! let pipeline = ModulePipeline::new(PipelineContext::with_defaults(settings, fs));
//!
//! let report = pipeline.run(&RunOptions::all())?;
//! println!("{} append file(s) written", report.append_files_written());
//! # Ok(())
//! # }
//! ```

pub mod buildlist;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod modules;
pub mod pipeline;
pub mod progress;
pub mod projectconfig;
pub mod util;

pub use config::{ModuleDeclaration, Settings, SettingsError};
pub use error::PipelineError;
pub use modules::{BindingModule, ModuleEnvironment, ModuleRegistry, ModuleType};
pub use pipeline::{ModulePipeline, PipelineContext, PipelineReport, RunOptions};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
