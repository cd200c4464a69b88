mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{fips, grid, locate};

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Grid(args) => grid::run(&cli, args),
        Commands::Locate(args) => locate::run(&cli, args),
        Commands::Fips(args) => fips::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
