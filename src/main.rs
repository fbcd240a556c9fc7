mod aggregate;
mod cli;
mod commands;
mod common;
mod constants;
mod dataset;
mod error;
mod graph;
mod matrix;
mod output;
mod regions;
mod series;

use anyhow::Context;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let default_level = if args.global.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &args.cmd {
        cli::Command::Specialty(cmd) => {
            commands::run_specialty(&args.global, cmd).context("specialty failed")
        }
        cli::Command::States(cmd) => commands::run_states(&args.global, cmd).context("states failed"),
        cli::Command::Occurrence(cmd) => {
            commands::run_occurrence(&args.global, cmd).context("occurrence failed")
        }
    }
}
