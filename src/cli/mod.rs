pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AppendArgs, CliArgs, Commands, ListArgs, ParseArgs};
pub use output::{OutputFormat, OutputFormatter};
