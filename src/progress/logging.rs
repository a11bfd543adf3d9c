//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started {
                modules,
                specific_module,
            } => match specific_module {
                Some(name) => info!(modules, only = %name, "Starting module generation"),
                None => info!(modules, "Starting module generation"),
            },
            ProgressEvent::FlavorLoaded {
                flavor,
                include_dirs,
                symbols,
                load_time,
            } => {
                info!(
                    flavor = %flavor,
                    include_dirs,
                    symbols,
                    load_time_ms = load_time.as_millis(),
                    "Project configuration loaded"
                );
            }
            ProgressEvent::ModuleStarted { name, index, total } => {
                info!(
                    module = %name,
                    progress = format!("{}/{}", index, total),
                    "Generating module"
                );
            }
            ProgressEvent::ModuleComplete { name, duration } => {
                info!(
                    module = %name,
                    duration_ms = duration.as_millis(),
                    "Module generated"
                );
            }
            ProgressEvent::ModuleSkipped { name } => {
                debug!(module = %name, "Module not selected, skipping generation");
            }
            ProgressEvent::AppendFileChecked {
                target,
                path,
                written,
            } => {
                if *written {
                    info!(side = %target, path = %path.display(), "Append file written");
                } else {
                    debug!(side = %target, path = %path.display(), "Append file unchanged");
                }
            }
            ProgressEvent::BuildListUpdated { target, files } => {
                info!(file = %target.display(), files, "Build file list updated");
            }
            ProgressEvent::Completed {
                generated,
                total_time,
            } => {
                info!(
                    generated,
                    total_time_ms = total_time.as_millis(),
                    "Module generation complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Module generation failed");
            }
        }
    }
}
