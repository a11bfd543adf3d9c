//! FileSystem abstraction for testable file operations

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{DirEntry, FileSystem, FileType};
pub use real::RealFileSystem;

use anyhow::Result;
use std::path::Path;
use tracing::{debug, warn};

/// Write `content` to `path` only when it differs from what is already there
///
/// Returns whether a write happened. An existing file that cannot be read
/// counts as changed. Missing parent directories are created.
pub fn write_if_changed(fs: &dyn FileSystem, path: &Path, content: &str) -> Result<bool> {
    if fs.exists(path) {
        match fs.read_to_string(path) {
            Ok(existing) if existing == content => {
                debug!("{} is up to date", path.display());
                return Ok(false);
            }
            Ok(_) => debug!("{} changed, rewriting", path.display()),
            Err(e) => warn!("Could not read {}, rewriting: {:#}", path.display(), e),
        }
    } else {
        debug!("{} does not exist yet", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !fs.is_dir(parent) {
            fs.create_dir_all(parent)?;
        }
    }

    fs.write(path, content)?;
    Ok(true)
}
