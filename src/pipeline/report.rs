//! Run summary

use super::append::AppendFile;
use super::classify::TargetBuckets;
use serde::Serialize;
use std::path::PathBuf;

/// A refreshed build-description file list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildListUpdate {
    pub target: PathBuf,
    pub files: usize,
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    /// Module names per target, in declaration order
    pub modules: TargetBuckets,
    /// Generated files per target, relative to the source root
    pub filenames: TargetBuckets,
    /// Modules whose generation step ran
    pub generated: Vec<String>,
    /// Modules classified without running
    pub skipped: Vec<String>,
    pub append_files: Vec<AppendFile>,
    pub build_lists: Vec<BuildListUpdate>,
}

impl PipelineReport {
    /// Number of append files rewritten during the run
    pub fn append_files_written(&self) -> usize {
        self.append_files.iter().filter(|a| a.written).count()
    }
}
