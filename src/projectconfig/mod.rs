//! Project-configuration loading
//!
//! The pipeline needs three things from each project file: the include
//! directories, the preprocessor definitions and the `SRCDIR` macro. It
//! reaches them through [`ProjectConfigParser`], so the file grammar stays
//! behind this seam. [`VpcParser`] is the default implementation.

mod condition;
mod macros;
mod tree;
mod vpc;

pub use macros::MacroTable;
pub use tree::{ConfigNode, ConfigTree};
pub use vpc::VpcParser;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key path of the include-directory field
pub const INCLUDE_DIRS_KEY: [&str; 3] = [
    "$Configuration",
    "$Compiler",
    "$AdditionalIncludeDirectories",
];

/// Key path of the preprocessor-definition field
pub const DEFINES_KEY: [&str; 3] = ["$Configuration", "$Compiler", "$PreprocessorDefinitions"];

/// Macro holding the source root of a project
pub const SRCDIR_MACRO: &str = "SRCDIR";

#[derive(Debug, Error)]
pub enum ProjectConfigError {
    #[error("Failed to read project file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path}:{line}: invalid condition [{expr}]: {message}")]
    Condition {
        path: PathBuf,
        line: usize,
        expr: String,
        message: String,
    },

    #[error("Include nesting too deep at {path}")]
    IncludeDepth { path: PathBuf },

    #[error("Project file {path} does not define the {name} macro")]
    MissingMacro { path: PathBuf, name: String },
}

/// Parser and macro engine for a structured project-configuration format
pub trait ProjectConfigParser: Send + Sync {
    /// Parse `path` into a tree, starting from `macros`
    ///
    /// The table is taken by value; macros defined by the file end up in
    /// [`ConfigTree::macros`] and never leak back to the caller.
    fn parse(&self, path: &Path, macros: MacroTable) -> Result<ConfigTree, ProjectConfigError>;

    /// Substitute `macros` into every value of `tree`, in place
    fn apply_macros(&self, tree: &mut ConfigTree, macros: &MacroTable);
}
