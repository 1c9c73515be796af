//! Rustform - a minimal declarative cloud provisioning tool.
//!
//! This is the main entry point for the Rustform CLI.

use clap::Parser;
use rustform::cli::commands::CommandContext;
use rustform::cli::{Cli, Commands};
use rustform::config::Config;
use rustform::error::Result;
use rustform::output;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let exit_code = match run(&cli).await {
        Ok(code) => code,
        Err(err) => {
            output::error(&err.to_string());
            err.exit_code()
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let config = Config::load(cli.config.as_ref())?;

    init_logging(cli.verbosity(), config.logging.level.as_deref());
    for path in &config.loaded_files {
        tracing::debug!(path = %path.display(), "Applied configuration file");
    }

    if !config.colors.enabled {
        colored::control::set_override(false);
    }

    let ctx = CommandContext::new(cli, config);

    match &cli.command {
        Commands::Validate(args) => args.execute(&ctx),
        Commands::Plan(args) => args.execute(&ctx),
        Commands::Apply(args) => args.execute(&ctx).await,
        Commands::Output(args) => args.execute(&ctx),
        Commands::Graph(args) => args.execute(&ctx),
    }
}

/// Initialize logging from verbosity, with configured level taking priority.
fn init_logging(verbosity: u8, configured: Option<&str>) {
    let filter = configured.map(str::to_string).unwrap_or_else(|| {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
        .to_string()
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3).with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}
