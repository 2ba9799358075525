//! vibelog CLI - write, rotate and inspect structured JSON logs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set JSON output mode if requested
    output::set_json_mode(cli.json);

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "vibelog={0},vibelog_core={0},vibelog_logs={0}",
                    log_level
                )
                .into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Write(args) => {
            load_config(config_path).and_then(|(logger_config, _)| write::execute(args, logger_config))
        }
        Commands::Rotate(args) => {
            load_config(config_path).and_then(|(logger_config, _)| rotate::execute(args, logger_config))
        }
        Commands::Config(args) => load_config(config_path).and_then(|(logger_config, source)| {
            config::execute(args, &logger_config, source.as_deref())
        }),
        Commands::List(args) => list::execute(args),
        Commands::Version => version::execute(),
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
