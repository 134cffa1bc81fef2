//! Output channel: passive tone filter, VCA and equal-power pan.
//!
//! ```text
//! signal ─► RcToneFilter(position) ─► × VCA(dial, cv) × route ─┬─► out 0 (mono)
//!                                                              ├─► out 1 (L = cos θ)
//!                                                              └─► out 2 (R = sin θ)
//! ```
//!
//! Inputs: 0 = signal, 1 = control voltage in volts (optional).
//! Controls: see [`OUTPUT_STAGE_PARAMS`].

use synthi_core::{
    Kernel, KernelCommand, KernelKind, Lifecycle, ParamBlock, ParamSpec, ParamUnit, RcToneFilter,
    block_len, equal_power_pan, fill_silence, input, param_or,
};

use crate::vca::{DIAL_MAX, VcaLaw};

/// Control positions.
pub mod param {
    /// Tone filter position in \[-1, 1\].
    pub const FILTER: usize = 0;
    /// Level dial in \[0, 10\].
    pub const LEVEL: usize = 1;
    /// Pan in \[-1, 1\].
    pub const PAN: usize = 2;
    /// Static gain of the matrix connection feeding this stage.
    pub const ROUTE_GAIN: usize = 3;
}

/// Output stage controls, in position order.
pub static OUTPUT_STAGE_PARAMS: [ParamSpec; 4] = [
    ParamSpec::new("Filter", "filter", ParamUnit::None, -1.0, 1.0, 0.0),
    ParamSpec::new("Level", "level", ParamUnit::Dial, 0.0, DIAL_MAX, DIAL_MAX),
    ParamSpec::new("Pan", "pan", ParamUnit::None, -1.0, 1.0, 0.0),
    ParamSpec::new("Route Gain", "route_gain", ParamUnit::None, 0.0, 1.0, 1.0),
];

/// Construction-time constants of the output channel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OutputStageTuning {
    /// Tone network resistance in ohms.
    pub resistance: f32,
    /// Tone network capacitance in farads.
    pub capacitance: f32,
    /// Constant filter positions closer to 0 than this skip the filter.
    pub bypass_epsilon: f32,
    /// VCA transfer.
    pub vca: VcaLaw,
}

impl Default for OutputStageTuning {
    fn default() -> Self {
        Self {
            resistance: 4_700.0,
            capacitance: 10e-9,
            bypass_epsilon: 1e-4,
            vca: VcaLaw::default(),
        }
    }
}

#[inline]
fn write(outputs: &mut [&mut [f32]], channel: usize, index: usize, value: f32) {
    if let Some(out) = outputs.get_mut(channel).and_then(|o| o.get_mut(index)) {
        *out = value;
    }
}

/// One output channel of the instrument.
///
/// # Example
///
/// ```rust
/// use synthi_core::{Kernel, ParamBlock};
/// use synthi_kernels::OutputStage;
///
/// let mut stage = OutputStage::new(48000.0);
/// let signal = [0.5f32; 64];
/// let mut mono = [0.0f32; 64];
/// // Dial 0 is a hard mute
/// let params = [ParamBlock::Constant(0.0), ParamBlock::Constant(0.0)];
/// stage.process(&[&signal], &mut [&mut mono], &params);
/// assert!(mono.iter().all(|&s| s == 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct OutputStage {
    filter: RcToneFilter,
    tuning: OutputStageTuning,
    filter_bypassed: bool,
    in_bypass: bool,
    life: Lifecycle,
}

impl OutputStage {
    /// Create a stage with default tuning.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_tuning(sample_rate, OutputStageTuning::default())
    }

    /// Create a stage with explicit circuit constants.
    pub fn with_tuning(sample_rate: f32, tuning: OutputStageTuning) -> Self {
        Self {
            filter: RcToneFilter::from_components(
                sample_rate,
                tuning.resistance,
                tuning.capacitance,
            ),
            tuning,
            filter_bypassed: false,
            in_bypass: false,
            life: Lifecycle::default(),
        }
    }

    /// VCA law in use.
    pub fn vca(&self) -> &VcaLaw {
        &self.tuning.vca
    }

    /// Tone filter history `(x1, y1)`.
    pub fn filter_state(&self) -> (f32, f32) {
        self.filter.state()
    }

    /// Whether the tone filter is switched out by command.
    pub fn is_filter_bypassed(&self) -> bool {
        self.filter_bypassed
    }

    /// Tone network corner frequency in Hz.
    pub fn corner_hz(&self) -> f32 {
        self.filter.corner_hz()
    }

    fn enter_bypass(&mut self) {
        if !self.in_bypass {
            self.filter.reset();
            self.in_bypass = true;
        }
    }

    /// Filter sample `i` according to the block's filter path.
    #[inline]
    fn tone(
        &mut self,
        x: f32,
        position: &ParamBlock<'_>,
        coeffs: Option<(f32, f32)>,
        i: usize,
    ) -> f32 {
        if self.in_bypass {
            self.filter.bypass_sample(x)
        } else if let Some((b0, b1)) = coeffs {
            self.filter.process_with(x, b0, b1)
        } else {
            let p = OUTPUT_STAGE_PARAMS[param::FILTER].clamp(position.at(i));
            self.filter.process(x, p)
        }
    }
}

impl Kernel for OutputStage {
    fn kind(&self) -> KernelKind {
        KernelKind::OutputStage
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

        let signal = input(inputs, 0).unwrap_or(&[]);
        let cv = input(inputs, 1)
            .map_or(ParamBlock::Constant(0.0), |s| ParamBlock::from_slice(s, 0.0));
        let [filter_spec, _, pan_spec, route_spec] = &OUTPUT_STAGE_PARAMS;
        let position = param_or(params, param::FILTER, filter_spec.default);
        // A non-finite dial mutes inside the VCA law.
        let dial = param_or(params, param::LEVEL, DIAL_MAX);
        let pan = param_or(params, param::PAN, pan_spec.default);
        let route = param_or(params, param::ROUTE_GAIN, route_spec.default);

        // Filter path for the whole block
        let coeffs = match position {
            _ if self.filter_bypassed => {
                self.enter_bypass();
                None
            }
            ParamBlock::Constant(p) if filter_spec.clamp(p).abs() < self.tuning.bypass_epsilon => {
                self.enter_bypass();
                None
            }
            ParamBlock::Constant(p) => {
                self.in_bypass = false;
                Some(self.filter.coefficients(filter_spec.clamp(p)))
            }
            ParamBlock::PerSample(_) => {
                self.in_bypass = false;
                None
            }
        };

        let law = self.tuning.vca;
        let gain_at = |i: usize| law.gain(dial.at(i), cv.at(i)) * route_spec.clamp(route.at(i));
        let pan_at = |i: usize| equal_power_pan(pan_spec.clamp(pan.at(i)));
        let block_gain =
            (dial.is_constant() && cv.is_constant() && route.is_constant()).then(|| gain_at(0));
        let block_pan = pan.is_constant().then(|| pan_at(0));

        for i in 0..len {
            let x = signal.get(i).copied().unwrap_or(0.0);
            let y = self.tone(x, &position, coeffs, i);
            let gain = block_gain.unwrap_or_else(|| gain_at(i));
            let (left, right) = block_pan.unwrap_or_else(|| pan_at(i));
            let mono = y * gain;
            write(outputs, 0, i, mono);
            write(outputs, 1, i, mono * left);
            write(outputs, 2, i, mono * right);
        }

        self.filter.flush();
        self.life.keep_alive()
    }

    fn apply(&mut self, command: KernelCommand) {
        if self.life.apply(self.kind(), command) {
            return;
        }
        if let KernelCommand::SetFilterBypassed(bypassed) = command {
            #[cfg(feature = "tracing")]
            tracing::debug!(bypassed, "output stage filter bypass");
            self.filter_bypassed = bypassed;
            if bypassed {
                self.enter_bypass();
            }
        }
    }

    fn is_dormant(&self) -> bool {
        self.life.is_dormant()
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.in_bypass = false;
    }

    fn param_specs(&self) -> &'static [ParamSpec] {
        &OUTPUT_STAGE_PARAMS
    }
}
