//! Pipeline error taxonomy

use crate::projectconfig::ProjectConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run
///
/// There is no partial-success mode: the first error ends the run and is
/// surfaced unchanged. The only recoverable condition (an unreadable existing
/// output file) never reaches this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No factory is registered for a declared `(source, type_name)` pair
    #[error("Module type {declaration} is not registered")]
    ModuleNotFound { declaration: String },

    /// A factory rejected its declaration
    #[error("Failed to construct module {declaration}")]
    ModuleConstruction {
        declaration: String,
        #[source]
        source: anyhow::Error,
    },

    /// A module instance reported an empty name
    #[error("Module declared as {declaration} (#{index}) has no name; modules must have a valid name")]
    MissingModuleName { index: usize, declaration: String },

    /// A module's generation step failed
    #[error("Generating module {name} failed")]
    ModuleFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    ProjectConfig(#[from] ProjectConfigError),

    #[error("File operation failed for {path}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to update build file list {target}")]
    BuildList {
        target: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// True for errors caused by the run's configuration rather than by a
    /// module or the file system
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PipelineError::ModuleNotFound { .. }
                | PipelineError::ModuleConstruction { .. }
                | PipelineError::MissingModuleName { .. }
                | PipelineError::ProjectConfig(_)
        )
    }
}
