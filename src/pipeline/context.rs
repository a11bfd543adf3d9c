//! Pipeline context for managing dependencies

use std::sync::Arc;

use crate::buildlist::{BuildFileListUpdater, VpcFileListWriter};
use crate::config::Settings;
use crate::fs::FileSystem;
use crate::modules::ModuleRegistry;
use crate::projectconfig::{ProjectConfigParser, VpcParser};

/// Context that owns all long-lived pipeline dependencies
#[derive(Clone)]
pub struct PipelineContext {
    /// Run settings, read-only for the whole run
    pub settings: Arc<Settings>,

    /// File system abstraction
    pub file_system: Arc<dyn FileSystem>,

    /// Project-file parser used for both flavors
    pub parser: Arc<dyn ProjectConfigParser>,

    /// Factories for declared module types
    pub registry: Arc<ModuleRegistry>,

    /// Receives the generated file lists
    pub updater: Arc<dyn BuildFileListUpdater>,
}

impl PipelineContext {
    pub fn new(
        settings: Arc<Settings>,
        file_system: Arc<dyn FileSystem>,
        parser: Arc<dyn ProjectConfigParser>,
        registry: Arc<ModuleRegistry>,
        updater: Arc<dyn BuildFileListUpdater>,
    ) -> Self {
        Self {
            settings,
            file_system,
            parser,
            registry,
            updater,
        }
    }

    /// Context with the VPC parser, the default module registry and the VPC
    /// file-list writer, all over `file_system`
    pub fn with_defaults(settings: Settings, file_system: Arc<dyn FileSystem>) -> Self {
        Self::with_registry(settings, file_system, ModuleRegistry::with_defaults())
    }

    pub fn with_registry(
        settings: Settings,
        file_system: Arc<dyn FileSystem>,
        registry: ModuleRegistry,
    ) -> Self {
        Self::new(
            Arc::new(settings),
            Arc::clone(&file_system),
            Arc::new(VpcParser::new(Arc::clone(&file_system))),
            Arc::new(registry),
            Arc::new(VpcFileListWriter::new(file_system)),
        )
    }
}
