use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Binding-module generator for native game builds
#[derive(Parser, Debug)]
#[command(
    name = "modulegen",
    about = "Generate scripting binding modules and their registration sources",
    version,
    author,
    long_about = "modulegen runs the declared binding-module generators against the server \
                  and client project configurations, then writes one append file per build \
                  target registering every module with the embedded interpreter."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 's',
        long,
        global = true,
        value_name = "FILE",
        help = "Settings file (defaults to $MODULEGEN_SETTINGS, then ./modulegen.toml)"
    )]
    pub settings: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Increase verbosity"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate modules and rewrite the append files",
        long_about = "Runs every declared module generator, or only the one named with \
                      --module, then rewrites the append files and build file lists.\n\n\
                      Examples:\n  \
                      modulegen parse\n  \
                      modulegen parse --module entities\n  \
                      modulegen --settings tools/modulegen.toml parse --format json"
    )]
    Parse(ParseArgs),

    #[command(
        about = "Rewrite the append files without generating modules",
        long_about = "Classifies every declared module and rewrites the append files and \
                      build file lists. No generator runs.\n\n\
                      Examples:\n  \
                      modulegen append\n  \
                      modulegen append --format yaml"
    )]
    Append(AppendArgs),

    #[command(about = "List declared modules and registered module types")]
    List(ListArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ParseArgs {
    #[arg(
        short = 'm',
        long,
        value_name = "NAME",
        help = "Generate only this module (all modules are still listed in the append files)"
    )]
    pub module: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct AppendArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
