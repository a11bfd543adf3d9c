//! Progress handler trait and events

use crate::modules::{BuildFlavor, ModuleType};
use std::path::PathBuf;
use std::time::Duration;

/// Events emitted while a run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started {
        modules: usize,
        specific_module: Option<String>,
    },

    /// A project file was parsed and its configuration extracted
    FlavorLoaded {
        flavor: BuildFlavor,
        include_dirs: usize,
        symbols: usize,
        load_time: Duration,
    },

    /// A module's generation step started
    ModuleStarted { name: String, index: usize, total: usize },

    /// A module's generation step finished
    ModuleComplete { name: String, duration: Duration },

    /// A module was classified without being generated
    ModuleSkipped { name: String },

    /// An append file was checked and written when its content changed
    AppendFileChecked {
        target: ModuleType,
        path: PathBuf,
        written: bool,
    },

    /// A build-description file list was refreshed
    BuildListUpdated { target: PathBuf, files: usize },

    /// Run completed successfully
    Completed {
        generated: usize,
        total_time: Duration,
    },

    /// Run failed
    Failed { error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        NoOpHandler.on_progress(&ProgressEvent::ModuleSkipped {
            name: "physics".to_string(),
        });
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started {
            modules: 3,
            specific_module: None,
        });
        handler.on_progress(&ProgressEvent::ModuleStarted {
            name: "entities".to_string(),
            index: 1,
            total: 3,
        });
        handler.on_progress(&ProgressEvent::Completed {
            generated: 3,
            total_time: Duration::from_secs(2),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_event_debug() {
        let event = ProgressEvent::ModuleSkipped {
            name: "ui".to_string(),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("ModuleSkipped"));
        assert!(debug_str.contains("\"ui\""));
    }
}
