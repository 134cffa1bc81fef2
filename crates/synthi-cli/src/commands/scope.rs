//! Scope command: trigger capture over a rendered tone.
//!
//! Renders oscillator → output stage, feeds the mono signal to a trigger
//! capture kernel through the same host, control channel and frame pool a
//! live instrument uses, and reports where each captured window starts.

use super::common::{ChainSettings, CliWaveform, Source, render_chain};
use clap::Args;
use synthi_config::SynthConfig;
use synthi_core::{KernelKind, ScopeFrame};
use synthi_io::{KernelHost, control_channel, scope_channel};
use synthi_registry::KernelRegistry;

#[derive(Args)]
pub struct ScopeArgs {
    /// Oscillator frequency in Hz
    #[arg(long, default_value = "300.0")]
    freq: f32,

    /// Oscillator waveform
    #[arg(long, value_enum, default_value_t = CliWaveform::Sine)]
    waveform: CliWaveform,

    /// Window length in samples (512, 1024, 2048, 4096); default from config
    #[arg(long)]
    window: Option<usize>,

    /// Trigger level; default from config
    #[arg(long, allow_hyphen_values = true)]
    trigger_level: Option<f32>,

    /// Disable triggering (free-running windows)
    #[arg(long)]
    free_run: bool,

    /// Seconds of signal to capture
    #[arg(long, default_value = "0.5")]
    duration: f32,

    /// Frames to print individually
    #[arg(long, default_value = "8")]
    show: usize,
}

/// Summary of one captured window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Window length in samples.
    pub len: usize,
    /// Whether the window starts on a trigger edge.
    pub triggered: bool,
    /// First sample of channel A.
    pub start: f32,
    /// Slope at the start (second minus first sample).
    pub slope: f32,
}

impl FrameReport {
    fn of(frame: &ScopeFrame) -> Self {
        let a = &frame.channel_a;
        let start = a.first().copied().unwrap_or(0.0);
        let slope = a.get(1).map_or(0.0, |next| next - start);
        Self {
            len: frame.len(),
            triggered: frame.triggered,
            start,
            slope,
        }
    }
}

/// Feed `signal` through a trigger capture kernel and collect every frame.
pub fn capture(
    config: &SynthConfig,
    signal: &[f32],
    window: usize,
    trigger_level: f32,
    trigger_enabled: bool,
) -> anyhow::Result<Vec<FrameReport>> {
    let registry = KernelRegistry::new();
    let kernel = registry
        .create(KernelKind::TriggerCapture, config.sample_rate_hz(), &config.kernel_tuning())
        .ok_or_else(|| anyhow::anyhow!("trigger capture not registered"))?;

    let (tx, rx) = control_channel(8);
    let mut host = KernelHost::new(rx);
    let scope = host.add(kernel);
    tx.set_buffer_size(scope, window)?;
    tx.set_trigger_level(scope, trigger_level)?;
    tx.set_trigger_enabled(scope, trigger_enabled)?;

    let (mut egress, reader) = scope_channel(4);
    let mut reports = Vec::new();
    for block in signal.chunks(config.block_size) {
        host.begin_block();
        host.process(scope, &[block, block], &mut [], &[]);
        host.publish_snapshots(&mut egress);
        while let Some(frame) = reader.try_next() {
            reports.push(FrameReport::of(&frame));
            reader.recycle(frame);
        }
    }

    if egress.dropped() > 0 {
        tracing::warn!(dropped = egress.dropped(), "scope frames dropped");
    }
    Ok(reports)
}

pub fn run(args: ScopeArgs, config: &SynthConfig) -> anyhow::Result<()> {
    if !(args.duration.is_finite() && args.duration > 0.0) {
        anyhow::bail!("duration must be positive, got {}", args.duration);
    }
    let window = args.window.unwrap_or(config.scope.window);
    let level = args.trigger_level.unwrap_or(config.scope.trigger_level);
    let enabled = config.scope.trigger_enabled && !args.free_run;

    let frames = (args.duration * config.sample_rate_hz()).round() as usize;
    let settings = ChainSettings {
        source: Source::Oscillator,
        waveform: args.waveform,
        source_params: vec![("frequency".to_string(), args.freq)],
        filter: 0.0,
        level: 10.0,
        cv: 0.0,
        pan: 0.0,
    };
    let rendered = render_chain(config, &settings, frames)?;
    let reports = capture(config, &rendered.mono, window, level, enabled)?;

    println!(
        "Captured {} frames of {} samples ({} Hz {:?}, trigger {} at {:+.3})",
        reports.len(),
        window,
        args.freq,
        args.waveform,
        if enabled { "on" } else { "off" },
        level
    );
    println!();
    println!("  {:>5}  {:>9}  {:>10}  {:>10}", "frame", "triggered", "start", "slope");
    for (i, r) in reports.iter().take(args.show).enumerate() {
        println!(
            "  {:>5}  {:>9}  {:>+10.5}  {:>+10.5}",
            i,
            if r.triggered { "yes" } else { "no" },
            r.start,
            r.slope
        );
    }

    let triggered: Vec<&FrameReport> = reports.iter().filter(|r| r.triggered).collect();
    println!();
    if triggered.is_empty() {
        println!("No triggered frames.");
    } else {
        let worst = triggered
            .iter()
            .map(|r| (r.start - level).abs())
            .fold(0.0f32, f32::max);
        let rising = triggered.iter().filter(|r| r.slope >= 0.0).count();
        println!(
            "{} of {} frames triggered; start within {:.5} of the level, {} on a rising slope",
            triggered.len(),
            reports.len(),
            worst,
            rising
        );
    }
    Ok(())
}
