//! Integration tests for synthi-kernels.
//!
//! Tests run the kernels the way a host does (fixed 128-sample blocks) and
//! check the behaviour visible at their outputs: waveform alignment, filter
//! neutrality, VCA law, pan law, anti-aliasing, scope triggering, dormancy
//! and the complete oscillator → output stage chain.

use synthi_analysis::{
    ThdAnalyzer, band_energy_db, dynamics,
    waveform::{falling_jumps, local_maxima, rising_crossings},
};
use synthi_core::{
    Kernel, KernelCommand, OscillatorMode, ParamBlock, RcToneFilter, ScopeFrame, Waveform,
    WindowSize, db_to_linear,
};
use synthi_kernels::{
    ColourNoiseSource, OutputStage, PhaseOscillator, TriggerCapture, VcaLaw,
    oscillator::param as osc,
};

const SR: f32 = 48000.0;
const BLOCK: usize = 128;

/// Run an oscillator for `len` samples in host-sized blocks, all four outputs.
fn render_oscillator(
    osc_kernel: &mut PhaseOscillator,
    params: &[ParamBlock<'_>],
    len: usize,
) -> [Vec<f32>; 4] {
    let mut outs = [vec![0.0; len], vec![0.0; len], vec![0.0; len], vec![0.0; len]];
    let mut start = 0;
    while start < len {
        let end = (start + BLOCK).min(len);
        let [a, b, c, d] = &mut outs;
        let mut outputs = [
            &mut a[start..end],
            &mut b[start..end],
            &mut c[start..end],
            &mut d[start..end],
        ];
        osc_kernel.process(&[], &mut outputs, params);
        start = end;
    }
    outs
}

/// Run a single-output kernel for `len` samples.
fn render_mono(
    kernel: &mut dyn Kernel,
    input: Option<&[f32]>,
    params: &[ParamBlock<'_>],
    len: usize,
) -> Vec<f32> {
    let mut out = vec![0.0; len];
    let mut start = 0;
    while start < len {
        let end = (start + BLOCK).min(len);
        match input {
            Some(input) => {
                kernel.process(&[&input[start..end]], &mut [&mut out[start..end]], params)
            }
            None => kernel.process(&[], &mut [&mut out[start..end]], params),
        };
        start = end;
    }
    out
}

// ---------------------------------------------------------------------------
// 1. Phase coherence
// ---------------------------------------------------------------------------

#[test]
fn all_waveforms_peak_at_the_saw_wrap() {
    let mut o = PhaseOscillator::new(SR);
    let [sine, saw, tri, pulse] = render_oscillator(&mut o, &[ParamBlock::Constant(440.0)], 4800);

    let wraps = falling_jumps(&saw, 1.0);
    let sine_peaks = local_maxima(&sine, 0.5);
    let tri_peaks = local_maxima(&tri, 0.5);
    assert!(wraps.len() >= 40);

    let inverted: Vec<f32> = pulse.iter().map(|s| -s).collect();
    let rises = rising_crossings(&pulse, 0.0);
    let falls = rising_crossings(&inverted, 0.0);

    for &w in &wraps[1..wraps.len() - 1] {
        let near = |peaks: &[usize], tol: usize| peaks.iter().any(|&p| p.abs_diff(w) <= tol);
        assert!(near(&sine_peaks, 1), "sine peak misaligned at wrap {w}");
        assert!(near(&tri_peaks, 1), "triangle peak misaligned at wrap {w}");

        let rise = rises.iter().rev().find(|&&r| r <= w).copied();
        let fall = falls.iter().find(|&&f| f > w).copied();
        if let (Some(r), Some(f)) = (rise, fall) {
            let centre = (r + f) / 2;
            assert!(centre.abs_diff(w) <= 2, "pulse plateau centred at {centre}, wrap at {w}");
        }
    }
}

#[test]
fn waveforms_share_one_period_under_modulation() {
    let curve: Vec<f32> = (0..BLOCK).map(|i| 300.0 + i as f32).collect();
    let mut o = PhaseOscillator::new(SR);
    let mut outs = [vec![0.0; BLOCK], vec![0.0; BLOCK], vec![0.0; BLOCK], vec![0.0; BLOCK]];
    let [a, b, c, d] = &mut outs;
    o.process(
        &[],
        &mut [a.as_mut_slice(), b.as_mut_slice(), c.as_mut_slice(), d.as_mut_slice()],
        &[ParamBlock::PerSample(&curve)],
    );
    let expected: f32 = curve.iter().map(|f| f / SR).sum::<f32>().fract();
    assert!((o.phase() - expected).abs() < 1e-4);
}

// ---------------------------------------------------------------------------
// 2. Filter identity at the neutral position
// ---------------------------------------------------------------------------

#[test]
fn tone_filter_neutral_is_identity() {
    let mut filter = RcToneFilter::from_components(SR, 4700.0, 10e-9);
    for i in 0..1000 {
        let x = ((i * 7919) % 1000) as f32 / 500.0 - 1.0;
        assert!((filter.process(x, 0.0) - x).abs() < 1e-6);
    }
}

#[test]
fn output_stage_neutral_filter_matches_bypass() {
    let signal: Vec<f32> = (0..1024).map(|i| ((i * 31) % 97) as f32 / 48.5 - 1.0).collect();
    let neutral = vec![0.0f32; BLOCK];

    let mut filtered = OutputStage::new(SR);
    let mut bypassed = OutputStage::new(SR);
    bypassed.apply(KernelCommand::SetFilterBypassed(true));

    let a = render_mono(&mut filtered, Some(&signal), &[ParamBlock::PerSample(&neutral)], 1024);
    let b = render_mono(&mut bypassed, Some(&signal), &[], 1024);
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-6);
    }
}

#[test]
fn noise_neutral_filter_matches_bypass() {
    let neutral = vec![0.0f32; BLOCK];
    let mut filtered = ColourNoiseSource::new(SR);
    let mut bypassed = ColourNoiseSource::new(SR);
    let a = render_mono(&mut filtered, None, &[ParamBlock::PerSample(&neutral)], 2048);
    let b = render_mono(&mut bypassed, None, &[ParamBlock::Constant(0.0)], 2048);
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-6);
    }
}

#[test]
fn colour_shelf_keeps_dc() {
    // +1 shelves the top and passes DC at unity
    let mut filter = RcToneFilter::from_components(SR, 10_000.0, 33e-9);
    let mut y = 0.0;
    for _ in 0..20_000 {
        y = filter.process(1.0, 1.0);
    }
    assert!((y - 1.0).abs() < 1e-3);
}

// ---------------------------------------------------------------------------
// 3. VCA law
// ---------------------------------------------------------------------------

#[test]
fn dial_zero_is_exact_silence_for_any_cv() {
    let signal = vec![1.0f32; BLOCK];
    for step in 0..=48 {
        let cv_volts = -12.0 + step as f32 * 0.5;
        let cv = vec![cv_volts; BLOCK];
        let mut stage = OutputStage::new(SR);
        let mut mono = vec![0.5f32; BLOCK];
        stage.process(
            &[&signal, &cv],
            &mut [&mut mono],
            &[ParamBlock::Constant(0.0), ParamBlock::Constant(0.0)],
        );
        assert!(mono.iter().all(|&s| s == 0.0), "cv {cv_volts} leaked");
    }
}

#[test]
fn dial_five_plus_six_volts_is_unity() {
    let law = VcaLaw::default();
    assert!((law.gain(5.0, 6.0) - 1.0).abs() <= 1e-3);

    let signal = vec![1.0f32; BLOCK];
    let cv = vec![6.0f32; BLOCK];
    let mut stage = OutputStage::new(SR);
    let mut mono = vec![0.0f32; BLOCK];
    stage.process(
        &[&signal, &cv],
        &mut [&mut mono],
        &[ParamBlock::Constant(0.0), ParamBlock::Constant(5.0)],
    );
    assert!((mono[BLOCK - 1] - 1.0).abs() <= 1e-3);
}

#[test]
fn each_volt_down_scales_by_law() {
    let law = VcaLaw::default();
    let step = db_to_linear(-law.db_per_volt);
    for dial in [2.5f32, 5.0, 7.5, 10.0] {
        for v in 0..6 {
            let g0 = law.gain(dial, -(v as f32));
            let g1 = law.gain(dial, -(v as f32) - 1.0);
            if g1 > 0.0 {
                assert!((g1 / g0 - step).abs() < 1e-4, "dial {dial} cv -{v}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Equal-power pan
// ---------------------------------------------------------------------------

#[test]
fn pan_preserves_power() {
    let signal = vec![0.8f32; 16];
    for step in 0..=20 {
        let pan = -1.0 + step as f32 * 0.1;
        let mut stage = OutputStage::new(SR);
        let (mut mono, mut left, mut right) = (vec![0.0; 16], vec![0.0; 16], vec![0.0; 16]);
        stage.process(
            &[&signal],
            &mut [&mut mono, &mut left, &mut right],
            &[ParamBlock::Constant(0.0), ParamBlock::Constant(10.0), ParamBlock::Constant(pan)],
        );
        let power = left[15] * left[15] + right[15] * right[15];
        assert!((power - mono[15] * mono[15]).abs() < 1e-4, "pan {pan}");
    }
}

// ---------------------------------------------------------------------------
// 5. Anti-aliasing
// ---------------------------------------------------------------------------

#[test]
fn polyblep_pulse_has_less_high_band_energy_than_naive() {
    let len = 48000;
    let mut o = PhaseOscillator::new(SR);
    o.apply(KernelCommand::SetMode(OscillatorMode::Single));
    o.apply(KernelCommand::SetWaveform(Waveform::Pulse));
    let mut params = [ParamBlock::Constant(1.0); 8];
    params[osc::FREQUENCY] = ParamBlock::Constant(440.0);
    params[osc::DETUNE] = ParamBlock::Constant(0.0);
    params[osc::PULSE_WIDTH] = ParamBlock::Constant(0.5);
    params[osc::SYMMETRY] = ParamBlock::Constant(0.5);
    let band_limited = render_mono(&mut o, None, &params, len);

    let dt = 440.0 / SR;
    let mut phase = 0.0f32;
    let naive: Vec<f32> = (0..len)
        .map(|_| {
            let s = if phase < 0.5 { 1.0 } else { -1.0 };
            phase += dt;
            if phase >= 1.0 {
                phase -= 1.0;
            }
            s
        })
        .collect();

    let blep_db = band_energy_db(&band_limited, SR, 4096, 10_000.0, 24_000.0);
    let naive_db = band_energy_db(&naive, SR, 4096, 10_000.0, 24_000.0);
    assert!(naive_db - blep_db >= 1.0, "naive {naive_db:.2} dB, polyblep {blep_db:.2} dB");
}

// ---------------------------------------------------------------------------
// 6. Scope triggering
// ---------------------------------------------------------------------------

fn collect_frames(scope: &mut TriggerCapture, signal: &[f32]) -> Vec<ScopeFrame> {
    let mut frames = Vec::new();
    for block in signal.chunks(BLOCK) {
        scope.process(&[block, block], &mut [], &[]);
        let mut frame = ScopeFrame::for_any_window();
        if scope.take_snapshot(&mut frame) {
            frames.push(frame);
        }
    }
    frames
}

#[test]
fn triggered_frames_start_on_the_edge() {
    let mut o = PhaseOscillator::new(SR);
    let sine = render_mono(&mut o, None, &[ParamBlock::Constant(440.0)], 48000);
    let mut scope = TriggerCapture::new(SR, WindowSize::W1024);
    let frames = collect_frames(&mut scope, &sine);

    assert!(frames.len() >= 40);
    let step = std::f32::consts::TAU * 440.0 / SR;
    for frame in &frames[1..] {
        assert!(frame.triggered);
        assert_eq!(frame.len(), 1024);
        let first = frame.channel_a[0];
        assert!((0.0..=step).contains(&first), "window starts at {first}");
        assert!(frame.channel_a[1] > first);
    }
}

#[test]
fn untriggered_frames_drift() {
    let mut o = PhaseOscillator::new(SR);
    let sine = render_mono(&mut o, None, &[ParamBlock::Constant(440.0)], 48000);
    let mut scope = TriggerCapture::new(SR, WindowSize::W1024);
    scope.apply(KernelCommand::SetTriggerEnabled(false));
    let frames = collect_frames(&mut scope, &sine);

    assert!(frames.iter().all(|f| !f.triggered));
    let starts: Vec<f32> = frames.iter().map(|f| f.channel_a[0]).collect();
    let spread = starts.iter().fold(f32::MIN, |m, &s| m.max(s))
        - starts.iter().fold(f32::MAX, |m, &s| m.min(s));
    assert!(spread > 0.5, "start values barely move: {spread}");
}

// ---------------------------------------------------------------------------
// 7. Dormancy round trip
// ---------------------------------------------------------------------------

#[test]
fn dormant_oscillator_resumes_where_it_stopped() {
    let params = [ParamBlock::Constant(523.25)];
    let mut reference = PhaseOscillator::new(SR);
    let mut sleeper = PhaseOscillator::new(SR);

    render_mono(&mut reference, None, &params, 1000);
    render_mono(&mut sleeper, None, &params, 1000);

    sleeper.apply(KernelCommand::SetDormant(true));
    let silent = render_mono(&mut sleeper, None, &params, 4096);
    assert!(silent.iter().all(|&s| s == 0.0));
    sleeper.apply(KernelCommand::SetDormant(false));

    let a = render_mono(&mut reference, None, &params, 512);
    let b = render_mono(&mut sleeper, None, &params, 512);
    assert_eq!(a, b);
}

#[test]
fn dormant_output_stage_keeps_filter_history() {
    let signal: Vec<f32> = (0..2048).map(|i| if (i / 50) % 2 == 0 { 0.9 } else { -0.9 }).collect();
    let params = [ParamBlock::Constant(-0.7)];
    let mut reference = OutputStage::new(SR);
    let mut sleeper = OutputStage::new(SR);

    render_mono(&mut reference, Some(&signal[..1024]), &params, 1024);
    render_mono(&mut sleeper, Some(&signal[..1024]), &params, 1024);

    sleeper.apply(KernelCommand::SetDormant(true));
    render_mono(&mut sleeper, Some(&signal[..1024]), &params, 1024);
    sleeper.apply(KernelCommand::SetDormant(false));

    let a = render_mono(&mut reference, Some(&signal[1024..]), &params, 1024);
    let b = render_mono(&mut sleeper, Some(&signal[1024..]), &params, 1024);
    assert_eq!(a, b);
}

#[test]
fn dormant_noise_keeps_filter_history() {
    let params = [ParamBlock::Constant(-1.0)];
    let mut noise = ColourNoiseSource::new(SR);
    render_mono(&mut noise, None, &params, 512);
    let state = noise.filter_state();
    noise.apply(KernelCommand::SetDormant(true));
    render_mono(&mut noise, None, &params, 512);
    assert_eq!(noise.filter_state(), state);
}

// ---------------------------------------------------------------------------
// 8. End to end
// ---------------------------------------------------------------------------

#[test]
fn sine_through_output_stage_is_clean() {
    let len = SR as usize;
    let mut o = PhaseOscillator::new(SR);
    let mut stage = OutputStage::new(SR);

    let sine = render_mono(&mut o, None, &[ParamBlock::Constant(440.0)], len);
    let stage_params = [
        ParamBlock::Constant(0.0),
        ParamBlock::Constant(10.0),
        ParamBlock::Constant(0.0),
    ];
    let cv = vec![0.0f32; len];
    let mut mono = vec![0.0f32; len];
    for ((inp, cv), out) in sine.chunks(BLOCK).zip(cv.chunks(BLOCK)).zip(mono.chunks_mut(BLOCK)) {
        stage.process(&[inp, cv], &mut [out], &stage_params);
    }

    let peak = dynamics::peak(&mono);
    assert!((0.95..=1.05).contains(&peak), "peak {peak}");

    let thd = ThdAnalyzer::new(SR, 32768).analyze(&mono, 440.0);
    assert!(thd.thd_percent() < 1.0, "THD {:.3}%", thd.thd_percent());
}

#[test]
fn stop_is_observed_at_block_boundary() {
    let mut o = PhaseOscillator::new(SR);
    let mut out = vec![0.0f32; BLOCK];
    assert!(o.process(&[], &mut [&mut out], &[]));
    o.apply(KernelCommand::Stop);
    assert!(!o.process(&[], &mut [&mut out], &[]));
    assert!(out.iter().all(|&s| s == 0.0));
}
