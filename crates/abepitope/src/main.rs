//! Entrypoint for CLI

use clap::Parser;
mod cli;
mod commands;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = cli::Cli::parse();
    cli.execute()?;
    Ok(())
}
