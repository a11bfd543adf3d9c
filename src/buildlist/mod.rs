//! Build-description file lists
//!
//! After a run, the generated sources of each native build have to be listed
//! in that build's description. [`BuildFileListUpdater`] is the seam; the
//! default [`VpcFileListWriter`] emits a VPC fragment.

mod vpc;

pub use vpc::VpcFileListWriter;

use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Writes the list of generated files into a build description
pub trait BuildFileListUpdater: Send + Sync {
    /// `filenames` are `/`-separated and relative to `src_dir`, the source
    /// root (`SRCDIR`) of the project that includes `target`
    fn generate(
        &self,
        settings: &Settings,
        filenames: &[String],
        src_dir: &Path,
        target: &Path,
    ) -> Result<()>;
}
