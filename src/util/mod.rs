//! Utility modules for modulegen
//!
//! - Structured logging setup and configuration
//! - Lexical path resolution against explicit bases

pub mod logging;
pub mod paths;

pub use logging::{init_from_env, init_logging, LoggingConfig};
