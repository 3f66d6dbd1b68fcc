//! Mapstitch CLI - download map tile grids and stitch them into atlases.

mod commands;
mod error;
mod progress;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "mapstitch",
    version,
    about = "Download game map tile grids and stitch them into atlas images"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Download a map's tiles into the local cache
    Fetch(commands::fetch::FetchArgs),
    /// Download tiles, compose one atlas per resolution, then clear the
    /// per-resolution cache
    Build(commands::build::BuildArgs),
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fetch(args) => commands::fetch::run(args),
        Command::Build(args) => commands::build::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
