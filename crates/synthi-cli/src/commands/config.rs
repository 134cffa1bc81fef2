//! Config command: print or write the active configuration.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use synthi_config::SynthConfig;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs, config: &SynthConfig) -> anyhow::Result<()> {
    match args.output {
        Some(path) => {
            config
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote configuration to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
