//! Per-flavor configuration loading

use crate::config::Settings;
use crate::fs::FileSystem;
use crate::modules::{BuildFlavor, FlavorConfig};
use crate::projectconfig::{
    MacroTable, ProjectConfigError, ProjectConfigParser, DEFINES_KEY, INCLUDE_DIRS_KEY,
    SRCDIR_MACRO,
};
use crate::util::paths;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

fn include_entry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^;,]+").expect("valid include entry regex"))
}

/// Base macro table for both flavors: POSIX defaults overlaid with settings
pub fn base_macros(settings: &Settings) -> MacroTable {
    let mut macros = MacroTable::posix_defaults();
    macros.extend(&settings.macros);
    macros
}

/// Parse one flavor's project file and extract its configuration
///
/// `macros` is consumed; each flavor must be handed its own copy of the base
/// table so definitions made by one project file never reach the other.
pub fn load_flavor(
    parser: &dyn ProjectConfigParser,
    fs: &dyn FileSystem,
    flavor: BuildFlavor,
    project_path: &Path,
    macros: MacroTable,
) -> Result<FlavorConfig, ProjectConfigError> {
    debug!("Loading {} configuration from {}", flavor, project_path.display());

    let config_dir = project_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut tree = parser.parse(project_path, macros)?;
    let final_macros = tree.macros.clone();
    parser.apply_macros(&mut tree, &final_macros);

    let include_dirs = match tree.value(&INCLUDE_DIRS_KEY) {
        Some(raw) => split_include_dirs(fs, raw, &config_dir),
        None => {
            warn!(
                "{} has no {} entry",
                project_path.display(),
                INCLUDE_DIRS_KEY.join("/")
            );
            Vec::new()
        }
    };

    let symbols = match tree.value(&DEFINES_KEY) {
        Some(raw) => split_symbols(raw),
        None => {
            warn!(
                "{} has no {} entry",
                project_path.display(),
                DEFINES_KEY.join("/")
            );
            Vec::new()
        }
    };

    let src_dir = tree
        .macros
        .get(SRCDIR_MACRO)
        .map(|raw| paths::resolve(&config_dir, &paths::from_project_path(raw)))
        .ok_or_else(|| ProjectConfigError::MissingMacro {
            path: project_path.to_path_buf(),
            name: SRCDIR_MACRO.to_string(),
        })?;

    debug!(
        "{}: {} include dirs, {} symbols, source root {}",
        flavor,
        include_dirs.len(),
        symbols.len(),
        src_dir.display()
    );

    Ok(FlavorConfig {
        include_dirs,
        symbols,
        src_dir,
        config_dir,
    })
}

/// Split an include-directory list on `;` or `,`, keeping directories that exist
fn split_include_dirs(fs: &dyn FileSystem, raw: &str, config_dir: &Path) -> Vec<PathBuf> {
    include_entry_regex()
        .find_iter(raw)
        .map(|m| m.as_str().trim().trim_matches('"').trim())
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let dir = paths::resolve(config_dir, &paths::from_project_path(entry));
            if fs.is_dir(&dir) {
                Some(dir)
            } else {
                debug!("Dropping include directory {} (not found)", dir.display());
                None
            }
        })
        .collect()
}

/// Split a definition list on `;`, dropping empty tokens
fn split_symbols(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
