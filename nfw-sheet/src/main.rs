use anyhow::{Context, Result};
use clap::Parser;
use nfw_sheet::config::{default_config, load_config, Config};

mod check_cmd;
mod cli;
mod export_cmd;
mod import_cmd;
mod logging;
mod path_guard;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Export(args) => export_cmd::run_export(args, &config),
        Command::Import(args) => import_cmd::run_import(args, &config),
        Command::Check(args) => check_cmd::run_check(args, &config),
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(default_config()),
    }
}
