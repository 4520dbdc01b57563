mod cli;
mod commands;
mod model;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded environment file");
    }

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Load(args) => commands::load::run(args),
        Commands::Download(args) => commands::download::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
