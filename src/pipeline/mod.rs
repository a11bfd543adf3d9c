//! Generation pipeline: configuration, dispatch, classification, output

pub mod append;
pub mod classify;
pub mod context;
pub mod flavor;
pub mod orchestrator;
pub mod report;

pub use append::{render_append_code, write_append_file, AppendFile};
pub use classify::{Classification, TargetBuckets};
pub use context::PipelineContext;
pub use orchestrator::{ModulePipeline, RunOptions};
pub use report::{BuildListUpdate, PipelineReport};
