//! White noise through the passive colour network.
//!
//! Fresh uniform noise every sample feeds an [`RcToneFilter`] built from the
//! colour pot's RC divider. Position −1 darkens to a low-pass above the
//! corner, 0 is the identity, +1 lifts a high shelf reaching +6 dB at Nyquist
//! while DC stays at unity.
//!
//! Controls (see [`NOISE_PARAMS`]): 0 = colour position, 1 = output level.

use synthi_core::{
    Kernel, KernelCommand, KernelKind, Lifecycle, ParamBlock, ParamSpec, ParamUnit, RcToneFilter,
    block_len, fill_silence, param_or,
};

/// Control positions.
pub mod param {
    /// Colour position in \[-1, 1\].
    pub const COLOUR: usize = 0;
    /// Output level.
    pub const LEVEL: usize = 1;
}

/// Noise controls, in position order.
pub static NOISE_PARAMS: [ParamSpec; 2] = [
    ParamSpec::new("Colour", "colour", ParamUnit::None, -1.0, 1.0, 0.0),
    ParamSpec::new("Level", "level", ParamUnit::None, 0.0, 1.0, 1.0),
];

/// Construction-time constants of the colour network.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NoiseTuning {
    /// Colour network resistance in ohms.
    pub resistance: f32,
    /// Colour network capacitance in farads.
    pub capacitance: f32,
    /// PRNG seed. Zero is replaced by a fixed non-zero seed.
    pub seed: u32,
    /// Constant colour positions closer to 0 than this skip the filter.
    pub bypass_epsilon: f32,
}

impl Default for NoiseTuning {
    fn default() -> Self {
        Self {
            resistance: 10_000.0,
            capacitance: 33e-9,
            seed: 0x1234_5678,
            bypass_epsilon: 1e-4,
        }
    }
}

/// Xorshift32 white noise, uniform in \[-1, 1\].
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    state: u32,
}

impl WhiteNoise {
    /// Seeded generator. A zero seed would lock the generator at zero, so it
    /// is replaced.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x1234_5678 } else { seed },
        }
    }

    /// Next sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as i32 as f32) / (i32::MAX as f32)
    }
}

/// Coloured noise generator.
///
/// # Example
///
/// ```rust
/// use synthi_core::{Kernel, ParamBlock};
/// use synthi_kernels::ColourNoiseSource;
///
/// let mut noise = ColourNoiseSource::new(48000.0);
/// let mut out = [0.0f32; 128];
/// noise.process(&[], &mut [&mut out], &[ParamBlock::Constant(-1.0)]);
/// assert!(out.iter().all(|s| s.abs() <= 1.0));
/// ```
#[derive(Debug, Clone)]
pub struct ColourNoiseSource {
    white: WhiteNoise,
    filter: RcToneFilter,
    tuning: NoiseTuning,
    bypassed: bool,
    life: Lifecycle,
}

impl ColourNoiseSource {
    /// Create a source with default tuning.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_tuning(sample_rate, NoiseTuning::default())
    }

    /// Create a source with explicit circuit constants.
    pub fn with_tuning(sample_rate: f32, tuning: NoiseTuning) -> Self {
        Self {
            white: WhiteNoise::new(tuning.seed),
            filter: RcToneFilter::from_components(
                sample_rate,
                tuning.resistance,
                tuning.capacitance,
            ),
            tuning,
            bypassed: false,
            life: Lifecycle::default(),
        }
    }

    /// Filter history `(x1, y1)`.
    pub fn filter_state(&self) -> (f32, f32) {
        self.filter.state()
    }

    /// Whether the last block took the bypass path.
    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// Colour network corner frequency in Hz.
    pub fn corner_hz(&self) -> f32 {
        self.filter.corner_hz()
    }

    fn enter_bypass(&mut self) {
        if !self.bypassed {
            self.filter.reset();
            self.bypassed = true;
        }
    }
}

impl Kernel for ColourNoiseSource {
    fn kind(&self) -> KernelKind {
        KernelKind::Noise
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
        let Some((out, _)) = outputs.split_first_mut() else {
            return self.life.keep_alive();
        };
        let n = len.min(out.len());
        let out = &mut out[..n];

        let colour_spec = &NOISE_PARAMS[param::COLOUR];
        let level_spec = &NOISE_PARAMS[param::LEVEL];
        let colour = param_or(params, param::COLOUR, colour_spec.default);
        let level = param_or(params, param::LEVEL, level_spec.default);

        match colour {
            ParamBlock::Constant(p) => {
                let p = colour_spec.clamp(p);
                if p.abs() < self.tuning.bypass_epsilon {
                    self.enter_bypass();
                    for (i, sample) in out.iter_mut().enumerate() {
                        let x = self.white.next_sample();
                        let gain = level_spec.clamp(level.at(i));
                        *sample = self.filter.bypass_sample(x) * gain;
                    }
                } else {
                    self.bypassed = false;
                    let (b0, b1) = self.filter.coefficients(p);
                    for (i, sample) in out.iter_mut().enumerate() {
                        let x = self.white.next_sample();
                        let gain = level_spec.clamp(level.at(i));
                        *sample = self.filter.process_with(x, b0, b1) * gain;
                    }
                }
            }
            ParamBlock::PerSample(_) => {
                self.bypassed = false;
                for (i, sample) in out.iter_mut().enumerate() {
                    let x = self.white.next_sample();
                    let p = colour_spec.clamp(colour.at(i));
                    *sample = self.filter.process(x, p) * level_spec.clamp(level.at(i));
                }
            }
        }

        self.filter.flush();
        self.life.keep_alive()
    }

    fn apply(&mut self, command: KernelCommand) {
        self.life.apply(self.kind(), command);
    }

    fn is_dormant(&self) -> bool {
        self.life.is_dormant()
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.bypassed = false;
    }

    fn param_specs(&self) -> &'static [ParamSpec] {
        &NOISE_PARAMS
    }
}
