//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::ValueEnum;
use std::path::Path;
use synthi_config::SynthConfig;
use synthi_core::{KernelKind, OscillatorMode, ParamBlock, Waveform};
use synthi_io::{KernelHost, SlotId, control_channel};
use synthi_registry::{KernelRegistry, KernelTuning};

/// Load `path`, or the defaults when no file was given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SynthConfig> {
    match path {
        Some(path) => {
            let config = SynthConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?;
            tracing::info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(SynthConfig::default()),
    }
}

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, f32), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter format: '{s}' (expected key=value)"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number for '{key}': '{value}'"))?;
    Ok((key.trim().to_string(), value))
}

/// Signal source feeding the output stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Phase oscillator
    #[default]
    Oscillator,
    /// Coloured noise
    Noise,
}

impl Source {
    fn kind(self) -> KernelKind {
        match self {
            Source::Oscillator => KernelKind::Oscillator,
            Source::Noise => KernelKind::Noise,
        }
    }
}

/// Waveform names for the CLI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CliWaveform {
    #[default]
    Sine,
    Saw,
    Triangle,
    Pulse,
}

impl From<CliWaveform> for Waveform {
    fn from(w: CliWaveform) -> Self {
        match w {
            CliWaveform::Sine => Waveform::Sine,
            CliWaveform::Saw => Waveform::Saw,
            CliWaveform::Triangle => Waveform::Triangle,
            CliWaveform::Pulse => Waveform::Pulse,
        }
    }
}

/// Everything needed to render source → output stage.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    /// Which source kernel to run.
    pub source: Source,
    /// Oscillator waveform (ignored for noise).
    pub waveform: CliWaveform,
    /// Source control overrides by id or name.
    pub source_params: Vec<(String, f32)>,
    /// Tone filter position.
    pub filter: f32,
    /// Level dial.
    pub level: f32,
    /// Control voltage added to the dial.
    pub cv: f32,
    /// Pan position.
    pub pan: f32,
}

/// Rendered output-stage channels.
#[derive(Debug, Default)]
pub struct Rendered {
    /// Post-VCA, pre-pan signal.
    pub mono: Vec<f32>,
    /// Left after the pan law.
    pub left: Vec<f32>,
    /// Right after the pan law.
    pub right: Vec<f32>,
}

/// Source control values: declared defaults with named overrides applied.
fn source_values(
    registry: &KernelRegistry,
    kind: KernelKind,
    overrides: &[(String, f32)],
) -> anyhow::Result<Vec<f32>> {
    let specs = registry
        .get(kind)
        .with_context(|| format!("kernel '{}' not registered", kind.id()))?
        .params;
    let mut values: Vec<f32> = specs.iter().map(|s| s.default).collect();
    for (name, value) in overrides {
        let index = registry.param_index_by_name(kind, name).with_context(|| {
            format!("'{}' has no control '{name}' (see `synthi kernels {}`)", kind.id(), kind.id())
        })?;
        values[index] = *value;
    }
    Ok(values)
}

/// Render `frames` samples of source → output stage, block by block.
pub fn render_chain(
    config: &SynthConfig,
    settings: &ChainSettings,
    frames: usize,
) -> anyhow::Result<Rendered> {
    let registry = KernelRegistry::new();
    let tuning = config.kernel_tuning();
    let sr = config.sample_rate_hz();
    let kind = settings.source.kind();

    let (tx, rx) = control_channel(16);
    let mut host = KernelHost::new(rx);
    let source = add(&mut host, &registry, kind, sr, &tuning)?;
    let stage = add(&mut host, &registry, KernelKind::OutputStage, sr, &tuning)?;

    if settings.source == Source::Oscillator {
        tx.set_mode(source, OscillatorMode::Single)?;
        tx.set_waveform(source, settings.waveform.into())?;
    }

    let values = source_values(&registry, kind, &settings.source_params)?;
    let source_params: Vec<ParamBlock<'_>> =
        values.iter().map(|&v| ParamBlock::Constant(v)).collect();
    let stage_params = [
        ParamBlock::Constant(settings.filter),
        ParamBlock::Constant(settings.level),
        ParamBlock::Constant(settings.pan),
        ParamBlock::Constant(1.0),
    ];
    let cv = [settings.cv];

    let block = config.block_size;
    let (mut signal, mut mono, mut left, mut right) =
        (vec![0.0; block], vec![0.0; block], vec![0.0; block], vec![0.0; block]);
    let mut out = Rendered {
        mono: Vec::with_capacity(frames),
        left: Vec::with_capacity(frames),
        right: Vec::with_capacity(frames),
    };

    tracing::debug!(source = kind.id(), frames, block, sample_rate = sr, "rendering");
    let mut done = 0;
    while done < frames {
        let n = block.min(frames - done);
        host.begin_block();
        host.process(source, &[], &mut [&mut signal[..n]], &source_params);
        host.process(
            stage,
            &[&signal[..n], &cv],
            &mut [&mut mono[..n], &mut left[..n], &mut right[..n]],
            &stage_params,
        );
        out.mono.extend_from_slice(&mono[..n]);
        out.left.extend_from_slice(&left[..n]);
        out.right.extend_from_slice(&right[..n]);
        done += n;
    }
    Ok(out)
}

fn add(
    host: &mut KernelHost,
    registry: &KernelRegistry,
    kind: KernelKind,
    sample_rate: f32,
    tuning: &KernelTuning,
) -> anyhow::Result<SlotId> {
    let kernel = registry
        .create(kind, sample_rate, tuning)
        .with_context(|| format!("kernel '{}' not registered", kind.id()))?;
    Ok(host.add(kernel))
}
