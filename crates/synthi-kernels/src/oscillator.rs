//! Phase-coherent multi-waveform oscillator.
//!
//! One master phase accumulator drives four derived waveforms, so sine, saw,
//! triangle and pulse can never drift against each other. Every waveform
//! reaches its positive peak at `phase = 0`:
//!
//! | Output | Shape | Anti-aliasing |
//! |--------|-------|---------------|
//! | 0 | Sine: cosine blended with a `tanh`-shaped triangle | none needed |
//! | 1 | Saw: `2·phase − 1` | PolyBLEP at the wrap |
//! | 2 | Triangle: peak at 0, trough at 0.5 | none (continuous) |
//! | 3 | Pulse: `phase < width` | PolyBLEP at both edges |
//!
//! In [`OscillatorMode::Multi`] the pulse is read a quarter cycle ahead so its
//! plateau centres on the sine peak.
//!
//! # Asymmetric sine
//!
//! The hardware sine is a shaped triangle whose symmetry trims a DC offset
//! ahead of a saturating stage. At symmetry 0.5 the output is a pure cosine;
//! moving towards either extreme crossfades into the shaped triangle (down to
//! the configured purity) and drops the amplitude along a quadratic curve to
//! the configured extreme attenuation.
//!
//! # Controls
//!
//! See [`OSCILLATOR_PARAMS`] for positions, ranges and defaults. Input 0 is an
//! optional hard-sync signal: each rising zero crossing resets the phase.

use core::f32::consts::TAU;

use libm::{cosf, fabsf, tanhf};
use synthi_core::{
    Kernel, KernelCommand, KernelKind, Lifecycle, OscillatorMode, ParamBlock, ParamSpec,
    ParamUnit, Waveform, all_constant, block_len, cents_to_ratio, fill_silence, input, param_or,
};

/// Lowest frequency the accumulator runs at; lower requests are clamped here.
pub const MIN_FREQUENCY: f32 = 1e-3;

/// Quarter-cycle lead applied to the pulse in multi-output mode.
const PULSE_LEAD: f32 = 0.25;

/// Control positions.
pub mod param {
    /// Frequency in Hz.
    pub const FREQUENCY: usize = 0;
    /// Detune in cents.
    pub const DETUNE: usize = 1;
    /// Pulse width (duty cycle).
    pub const PULSE_WIDTH: usize = 2;
    /// Sine symmetry.
    pub const SYMMETRY: usize = 3;
    /// Sine output level.
    pub const SINE_LEVEL: usize = 4;
    /// Saw output level.
    pub const SAW_LEVEL: usize = 5;
    /// Triangle output level.
    pub const TRIANGLE_LEVEL: usize = 6;
    /// Pulse output level.
    pub const PULSE_LEVEL: usize = 7;
}

/// Oscillator controls, in position order.
pub static OSCILLATOR_PARAMS: [ParamSpec; 8] = [
    ParamSpec::new("Frequency", "frequency", ParamUnit::Hertz, MIN_FREQUENCY, 24000.0, 440.0),
    ParamSpec::new("Detune", "detune", ParamUnit::Cents, -2400.0, 2400.0, 0.0),
    ParamSpec::new("Pulse Width", "pulse_width", ParamUnit::None, 0.01, 0.99, 0.5),
    ParamSpec::new("Symmetry", "symmetry", ParamUnit::None, 0.0, 1.0, 0.5),
    ParamSpec::new("Sine Level", "sine_level", ParamUnit::None, 0.0, 1.0, 1.0),
    ParamSpec::new("Saw Level", "saw_level", ParamUnit::None, 0.0, 1.0, 1.0),
    ParamSpec::new("Triangle Level", "triangle_level", ParamUnit::None, 0.0, 1.0, 1.0),
    ParamSpec::new("Pulse Level", "pulse_level", ParamUnit::None, 0.0, 1.0, 1.0),
];

/// Construction-time constants of the sine shaping circuit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OscillatorTuning {
    /// Saturation coefficient `k` of the `tanh` stage.
    pub saturation: f32,
    /// Triangle offset at symmetry 0 or 1.
    pub max_offset: f32,
    /// Share of pure cosine left at the symmetry extremes (0..=1).
    pub sine_purity: f32,
    /// Amplitude at the symmetry extremes relative to centre.
    pub extreme_attenuation: f32,
}

impl Default for OscillatorTuning {
    fn default() -> Self {
        Self {
            saturation: 1.55,
            max_offset: 0.85,
            sine_purity: 0.7,
            extreme_attenuation: 0.125,
        }
    }
}

impl OscillatorTuning {
    /// Clamp every constant into its usable range.
    pub fn sanitized(self) -> Self {
        Self {
            saturation: self.saturation.max(1e-3),
            max_offset: self.max_offset.clamp(0.0, 1.0),
            sine_purity: self.sine_purity.clamp(0.0, 1.0),
            extreme_attenuation: self.extreme_attenuation.clamp(0.0, 1.0),
        }
    }
}

/// 2nd-order PolyBLEP (Polynomial Band-Limited Step) residual.
///
/// For a unit step at phase 0 with increment `dt`, returns the parabolic
/// correction for the sample `t` lies in: one sample after the edge
/// (`t < dt`) or one sample before it (`t > 1 − dt`); zero elsewhere.
///
/// Reference: Välimäki & Huovilainen, "Antialiasing Oscillators in
/// Subtractive Synthesis", IEEE Signal Processing Magazine, 2007.
#[inline]
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let x = t / dt;
        x + x - x * x - 1.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}

#[inline]
fn wrap_unit(x: f32) -> f32 {
    if x >= 1.0 { x - 1.0 } else { x }
}

/// Triangle core: +1 at phase 0, −1 at phase 0.5.
#[inline]
fn triangle(phase: f32) -> f32 {
    4.0 * fabsf(phase - 0.5) - 1.0
}

/// Cached sine blend for one symmetry setting.
#[derive(Debug, Clone, Copy)]
struct SineShaper {
    symmetry: f32,
    offset: f32,
    dc: f32,
    norm: f32,
    shaped_weight: f32,
    amplitude: f32,
}

impl SineShaper {
    fn new(tuning: &OscillatorTuning) -> Self {
        let mut shaper = Self {
            symmetry: f32::NAN,
            offset: 0.0,
            dc: 0.0,
            norm: 1.0,
            shaped_weight: 0.0,
            amplitude: 1.0,
        };
        shaper.update(0.5, tuning);
        shaper
    }

    /// Recompute blend constants when symmetry changes.
    #[inline]
    fn update(&mut self, symmetry: f32, tuning: &OscillatorTuning) {
        let symmetry = symmetry.clamp(0.0, 1.0);
        if symmetry == self.symmetry {
            return;
        }
        self.symmetry = symmetry;

        let distance = fabsf(symmetry - 0.5) * 2.0;
        self.offset = (symmetry - 0.5) * 2.0 * tuning.max_offset;
        self.shaped_weight = distance * (1.0 - tuning.sine_purity);
        self.amplitude = 1.0 - (1.0 - tuning.extreme_attenuation) * distance * distance;

        // DC-correct and peak-normalize so the triangle peaks map to ±1
        let k = tuning.saturation;
        let hi = tanhf(k * (1.0 + self.offset));
        let lo = tanhf(k * (-1.0 + self.offset));
        self.dc = 0.5 * (hi + lo);
        let half_span = 0.5 * (hi - lo);
        self.norm = if half_span > 1e-9 { 1.0 / half_span } else { 0.0 };
    }

    #[inline]
    fn sine(&self, phase: f32, tri: f32, saturation: f32) -> f32 {
        let pure = cosf(TAU * phase);
        if self.shaped_weight == 0.0 {
            return self.amplitude * pure;
        }
        let shaped = (tanhf(saturation * (tri + self.offset)) - self.dc) * self.norm;
        self.amplitude * (pure + (shaped - pure) * self.shaped_weight)
    }
}

/// Derived per-sample quantities.
#[derive(Debug, Clone, Copy)]
struct Controls {
    dt: f32,
    width: f32,
    levels: [f32; 4],
}

/// The oscillator's control blocks.
struct Blocks<'a> {
    frequency: ParamBlock<'a>,
    detune: ParamBlock<'a>,
    width: ParamBlock<'a>,
    symmetry: ParamBlock<'a>,
    levels: [ParamBlock<'a>; 4],
}

impl<'a> Blocks<'a> {
    fn from_params(params: &[ParamBlock<'a>]) -> Self {
        let p = |i: usize| param_or(params, i, OSCILLATOR_PARAMS[i].default);
        Self {
            frequency: p(param::FREQUENCY),
            detune: p(param::DETUNE),
            width: p(param::PULSE_WIDTH),
            symmetry: p(param::SYMMETRY),
            levels: [
                p(param::SINE_LEVEL),
                p(param::SAW_LEVEL),
                p(param::TRIANGLE_LEVEL),
                p(param::PULSE_LEVEL),
            ],
        }
    }

    fn is_constant(&self) -> bool {
        all_constant(&[self.frequency, self.detune, self.width, self.symmetry])
            && all_constant(&self.levels)
    }
}

/// Multi-waveform phase oscillator with hard sync.
///
/// # Example
///
/// ```rust
/// use synthi_core::{Kernel, KernelCommand, OscillatorMode, ParamBlock, Waveform};
/// use synthi_kernels::PhaseOscillator;
///
/// let mut osc = PhaseOscillator::new(48000.0);
/// osc.apply(KernelCommand::SetMode(OscillatorMode::Single));
/// osc.apply(KernelCommand::SetWaveform(Waveform::Saw));
///
/// let mut out = [0.0f32; 128];
/// let params = [ParamBlock::Constant(220.0)];
/// let alive = osc.process(&[], &mut [&mut out], &params);
/// assert!(alive);
/// ```
#[derive(Debug, Clone)]
pub struct PhaseOscillator {
    phase: f32,
    prev_sync: f32,
    sample_rate: f32,
    max_frequency: f32,
    tuning: OscillatorTuning,
    shaper: SineShaper,
    mode: OscillatorMode,
    waveform: Waveform,
    life: Lifecycle,
}

impl PhaseOscillator {
    /// Create an oscillator with default tuning.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_tuning(sample_rate, OscillatorTuning::default())
    }

    /// Create an oscillator with explicit shaping constants.
    pub fn with_tuning(sample_rate: f32, tuning: OscillatorTuning) -> Self {
        let tuning = tuning.sanitized();
        Self {
            phase: 0.0,
            prev_sync: 0.0,
            sample_rate,
            max_frequency: (sample_rate * 0.5).max(MIN_FREQUENCY),
            tuning,
            shaper: SineShaper::new(&tuning),
            mode: OscillatorMode::default(),
            waveform: Waveform::default(),
            life: Lifecycle::default(),
        }
    }

    /// Current master phase in \[0, 1).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Current output layout.
    pub fn mode(&self) -> OscillatorMode {
        self.mode
    }

    /// Waveform used in single-output mode.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Shaping constants in use.
    pub fn tuning(&self) -> OscillatorTuning {
        self.tuning
    }

    #[inline]
    fn controls_at(&self, blocks: &Blocks<'_>, i: usize) -> Controls {
        let read =
            |index: usize, block: &ParamBlock<'_>| OSCILLATOR_PARAMS[index].clamp(block.at(i));
        // Frequency is bounded by Nyquist, not by its display range
        let requested = blocks.frequency.at(i);
        let requested = if requested.is_finite() {
            requested
        } else {
            OSCILLATOR_PARAMS[param::FREQUENCY].default
        };
        let frequency = (requested.max(MIN_FREQUENCY)
            * cents_to_ratio(read(param::DETUNE, &blocks.detune)))
        .clamp(MIN_FREQUENCY, self.max_frequency);
        Controls {
            dt: frequency / self.sample_rate,
            width: read(param::PULSE_WIDTH, &blocks.width),
            levels: [
                read(param::SINE_LEVEL, &blocks.levels[0]),
                read(param::SAW_LEVEL, &blocks.levels[1]),
                read(param::TRIANGLE_LEVEL, &blocks.levels[2]),
                read(param::PULSE_LEVEL, &blocks.levels[3]),
            ],
        }
    }

    #[inline]
    fn symmetry_at(blocks: &Blocks<'_>, i: usize) -> f32 {
        OSCILLATOR_PARAMS[param::SYMMETRY].clamp(blocks.symmetry.at(i))
    }

    #[inline]
    fn saw(phase: f32, dt: f32) -> f32 {
        2.0 * phase - 1.0 - poly_blep(phase, dt)
    }

    #[inline]
    fn pulse(phase: f32, width: f32, dt: f32) -> f32 {
        let naive = if phase < width { 1.0 } else { -1.0 };
        naive + poly_blep(phase, dt) - poly_blep(wrap_unit(phase + 1.0 - width), dt)
    }

    /// Produce sample `i`: apply sync, write outputs, advance the phase.
    #[inline]
    fn render_sample(
        &mut self,
        i: usize,
        c: Controls,
        sync: Option<&[f32]>,
        outputs: &mut [&mut [f32]],
    ) {
        if let Some(sync) = sync {
            let s = sync.get(i).copied().unwrap_or(self.prev_sync);
            if self.prev_sync <= 0.0 && s > 0.0 {
                self.phase = 0.0;
            }
            self.prev_sync = s;
        }

        let phase = self.phase;
        let k = self.tuning.saturation;

        match self.mode {
            OscillatorMode::Multi => {
                let tri = triangle(phase);
                let values = [
                    self.shaper.sine(phase, tri, k),
                    Self::saw(phase, c.dt),
                    tri,
                    Self::pulse(wrap_unit(phase + PULSE_LEAD), c.width, c.dt),
                ];
                for (ch, value) in values.iter().enumerate() {
                    if let Some(out) = outputs.get_mut(ch).and_then(|o| o.get_mut(i)) {
                        *out = value * c.levels[ch];
                    }
                }
            }
            OscillatorMode::Single => {
                let value = match self.waveform {
                    Waveform::Sine => self.shaper.sine(phase, triangle(phase), k),
                    Waveform::Saw => Self::saw(phase, c.dt),
                    Waveform::Triangle => triangle(phase),
                    Waveform::Pulse => Self::pulse(phase, c.width, c.dt),
                };
                if let Some(out) = outputs.get_mut(0).and_then(|o| o.get_mut(i)) {
                    *out = value * c.levels[self.waveform.channel()];
                }
            }
        }

        self.phase = wrap_unit(phase + c.dt);
    }
}

impl Kernel for PhaseOscillator {
    fn kind(&self) -> KernelKind {
        KernelKind::Oscillator
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &[ParamBlock<'_>],
    ) -> bool {
        let len = block_len(inputs, outputs);
        fill_silence(outputs);
        if self.life.is_silent() {
            return self.life.keep_alive();
        }

        let sync = input(inputs, 0);
        let blocks = Blocks::from_params(params);

        if blocks.is_constant() {
            let controls = self.controls_at(&blocks, 0);
            self.shaper.update(Self::symmetry_at(&blocks, 0), &self.tuning);
            for i in 0..len {
                self.render_sample(i, controls, sync, outputs);
            }
        } else {
            for i in 0..len {
                let controls = self.controls_at(&blocks, i);
                self.shaper.update(Self::symmetry_at(&blocks, i), &self.tuning);
                self.render_sample(i, controls, sync, outputs);
            }
        }

        self.life.keep_alive()
    }

    fn apply(&mut self, command: KernelCommand) {
        if self.life.apply(self.kind(), command) {
            return;
        }
        match command {
            KernelCommand::ResetPhase => {
                self.phase = 0.0;
                self.prev_sync = 0.0;
            }
            KernelCommand::SetWaveform(waveform) => self.waveform = waveform,
            KernelCommand::SetMode(mode) => self.mode = mode,
            _ => {}
        }
    }

    fn is_dormant(&self) -> bool {
        self.life.is_dormant()
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.prev_sync = 0.0;
    }

    fn param_specs(&self) -> &'static [ParamSpec] {
        &OSCILLATOR_PARAMS
    }
}
