use modulegen::cli::commands::{CliArgs, Commands};
use modulegen::cli::handlers::{handle_append, handle_list, handle_parse};
use modulegen::util::logging::{config_from_env, init_logging, parse_level, LoggingConfig};
use modulegen::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("modulegen v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let settings = args.settings.as_deref();
    let exit_code = match &args.command {
        Commands::Parse(parse_args) => handle_parse(parse_args, settings, args.quiet),
        Commands::Append(append_args) => handle_append(append_args, settings, args.quiet),
        Commands::List(list_args) => handle_list(list_args, settings),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = config_from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config = LoggingConfig {
            use_json: config.use_json,
            ..LoggingConfig::development()
        };
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}
