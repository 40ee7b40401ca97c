//! wirepress - markup, script and style compression engine.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use wirepress::config::{CompressionConfig, Environment, STRATEGY_VAR};
use wirepress::{Compressor, logger};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = CompressionConfig::resolve(&cli.config)
        .with_context(|| format!("failed to load `{}`", cli.config.display()))?;
    let compressor = Compressor::new(config)
        .with_environment(Environment::detect())
        .with_strategy(std::env::var(STRATEGY_VAR).ok());

    match &cli.command {
        Commands::Minify { args } => cli::minify::run_minify(args, &compressor),
        Commands::Info { accept_encoding } => {
            cli::info::run_info(&compressor, accept_encoding.as_deref())
        }
    }
}
