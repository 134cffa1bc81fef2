//! Synthi CLI - render, measure and inspect the analog-chain kernels.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "synthi")]
#[command(author, version, about = "Synthi analog-chain kernel CLI", long_about = None)]
struct Cli {
    /// TOML file with kernel tuning constants and render settings
    #[arg(long, global = true, value_name = "TOML")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an oscillator or noise source through the output stage to WAV
    Render(commands::render::RenderArgs),

    /// Measure level, frequency and distortion of a WAV file
    Analyze(commands::analyze::AnalyzeArgs),

    /// List kernels and their controls
    Kernels(commands::kernels::KernelsArgs),

    /// Run trigger capture over a rendered tone and report frame alignment
    Scope(commands::scope::ScopeArgs),

    /// Write the default configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::common::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Kernels(args) => commands::kernels::run(args),
        Commands::Scope(args) => commands::scope::run(args, &config),
        Commands::Config(args) => commands::config::run(args, &config),
    }
}
