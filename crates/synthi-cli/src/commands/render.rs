//! Render command: source → output stage → WAV.

use super::common::{ChainSettings, CliWaveform, Source, parse_key_val, render_chain};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use synthi_config::SynthConfig;
use synthi_io::{WavSpec, write_wav, write_wav_stereo};

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Source kernel
    #[arg(long, value_enum, default_value_t = Source::Oscillator)]
    source: Source,

    /// Oscillator waveform
    #[arg(long, value_enum, default_value_t = CliWaveform::Sine)]
    waveform: CliWaveform,

    /// Oscillator frequency in Hz
    #[arg(long, default_value = "440.0")]
    freq: f32,

    /// Duration in seconds
    #[arg(long, default_value = "1.0")]
    duration: f32,

    /// Source control override (e.g. pulse_width=0.2, colour=-0.5)
    #[arg(short, long = "param", value_parser = parse_key_val)]
    params: Vec<(String, f32)>,

    /// Tone filter position (-1 low-pass .. +1 shelf)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    filter: f32,

    /// Level dial (0-10)
    #[arg(long, default_value = "10.0")]
    level: f32,

    /// Control voltage added to the dial
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    cv: f32,

    /// Pan (-1 left .. +1 right)
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pan: f32,

    /// Write the panned left/right pair instead of the mono signal
    #[arg(long)]
    stereo: bool,

    /// Bit depth (16, 24 or 32 float)
    #[arg(long, default_value = "32")]
    bits: u16,
}

pub fn run(args: RenderArgs, config: &SynthConfig) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("duration must be positive, got {}", args.duration);
    }
    if ![16, 24, 32].contains(&args.bits) {
        anyhow::bail!("unsupported bit depth {} (use 16, 24 or 32)", args.bits);
    }
    let frames = (args.duration * config.sample_rate_hz()).round() as usize;

    let mut source_params = Vec::with_capacity(args.params.len() + 1);
    if args.source == Source::Oscillator {
        source_params.push(("frequency".to_string(), args.freq));
    }
    source_params.extend(args.params);

    let settings = ChainSettings {
        source: args.source,
        waveform: args.waveform,
        source_params,
        filter: args.filter,
        level: args.level,
        cv: args.cv,
        pan: args.pan,
    };
    let rendered = render_chain(config, &settings, frames)?;

    let spec = WavSpec {
        sample_rate: config.sample_rate,
        bits_per_sample: args.bits,
    };
    let written = if args.stereo {
        write_wav_stereo(&args.output, &rendered.left, &rendered.right, spec)
    } else {
        write_wav(&args.output, &rendered.mono, spec)
    };
    written.with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Rendered {:.2}s of {:?} ({} samples @ {} Hz, {}) to {}",
        args.duration,
        args.source,
        frames,
        config.sample_rate,
        if args.stereo { "stereo" } else { "mono" },
        args.output.display()
    );
    Ok(())
}
