//! Integration tests for synthi-io: real kernels driven through the host,
//! commands crossing the control channel, scope frames crossing the pool,
//! and rendered audio crossing the ring and a WAV file.

use synthi_core::{OscillatorMode, ParamBlock, Waveform, WindowSize};
use synthi_io::{
    KernelHost, RingConfig, SlotId, WavSpec, control_channel, interleaved_ring, read_wav,
    scope_channel, write_wav_stereo,
};
use synthi_kernels::{OutputStage, PhaseOscillator, TriggerCapture};
use tempfile::NamedTempFile;

const SR: f32 = 48000.0;
const BLOCK: usize = 128;

/// Oscillator (single sine) → output stage at full level, centre pan.
fn chain(host: &mut KernelHost) -> (SlotId, SlotId) {
    let mut osc = PhaseOscillator::new(SR);
    synthi_core::Kernel::apply(
        &mut osc,
        synthi_core::KernelCommand::SetMode(OscillatorMode::Single),
    );
    let osc = host.add(Box::new(osc));
    let stage = host.add(Box::new(OutputStage::new(SR)));
    (osc, stage)
}

fn render_block(
    host: &mut KernelHost,
    osc: SlotId,
    stage: SlotId,
    left: &mut [f32],
    right: &mut [f32],
) {
    let mut signal = [0.0f32; BLOCK];
    let mut mono = [0.0f32; BLOCK];
    host.begin_block();
    host.process(osc, &[], &mut [&mut signal], &[ParamBlock::Constant(440.0)]);
    host.process(
        stage,
        &[&signal],
        &mut [&mut mono, left, right],
        &[
            ParamBlock::Constant(0.0),
            ParamBlock::Constant(10.0),
            ParamBlock::Constant(0.0),
            ParamBlock::Constant(1.0),
        ],
    );
}

// ---------------------------------------------------------------------------
// Host + control channel
// ---------------------------------------------------------------------------

#[test]
fn waveform_change_lands_on_next_block() {
    let (tx, rx) = control_channel(16);
    let mut host = KernelHost::new(rx);
    let (osc, stage) = chain(&mut host);
    let (mut l, mut r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);

    for _ in 0..4 {
        render_block(&mut host, osc, stage, &mut l, &mut r);
    }
    tx.set_waveform(osc, Waveform::Pulse).unwrap();
    render_block(&mut host, osc, stage, &mut l, &mut r);

    // Pulse sits at ±1 (times the equal-power pan factor) away from edges.
    let plateau = l.iter().filter(|s| (s.abs() - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.05);
    assert!(plateau.count() > BLOCK / 2);
}

#[test]
fn stopped_oscillator_leaves_silence_downstream() {
    let (tx, rx) = control_channel(16);
    let mut host = KernelHost::new(rx);
    let (osc, stage) = chain(&mut host);
    let (mut l, mut r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);

    render_block(&mut host, osc, stage, &mut l, &mut r);
    assert!(l.iter().any(|s| s.abs() > 0.1));

    tx.stop(osc).unwrap();
    // Let the tone filter's tail settle.
    for _ in 0..8 {
        render_block(&mut host, osc, stage, &mut l, &mut r);
    }
    assert!(!host.is_running(osc));
    assert!(host.is_running(stage));
    assert!(l.iter().all(|s| s.abs() < 1e-6));
}

#[test]
fn rejected_buffer_size_keeps_window() {
    let (tx, rx) = control_channel(16);
    let mut host = KernelHost::new(rx);
    let scope = host.add(Box::new(TriggerCapture::new(SR, WindowSize::W1024)));

    assert!(tx.set_buffer_size(scope, 3000).is_err());
    tx.set_buffer_size(scope, 512).unwrap();
    assert_eq!(host.begin_block(), 1);
}

// ---------------------------------------------------------------------------
// Scope egress
// ---------------------------------------------------------------------------

#[test]
fn scope_frames_reach_reader_with_window_length() {
    let (tx, rx) = control_channel(16);
    let mut host = KernelHost::new(rx);
    let scope = host.add(Box::new(TriggerCapture::new(SR, WindowSize::W1024)));
    tx.set_buffer_size(scope, 512).unwrap();

    let (mut egress, reader) = scope_channel(4);
    let tone: Vec<f32> = (0..BLOCK * 40)
        .map(|i| (std::f32::consts::TAU * 300.0 * i as f32 / SR).sin())
        .collect();

    let mut frames = Vec::new();
    for block in tone.chunks(BLOCK) {
        host.begin_block();
        host.process(scope, &[block, block], &mut [], &[]);
        host.publish_snapshots(&mut egress);
        if let Some(frame) = reader.latest() {
            frames.push((frame.len(), frame.triggered, frame.sample_rate));
            reader.recycle(frame);
        }
    }

    assert!(frames.len() >= 8, "{} frames", frames.len());
    assert!(frames.iter().all(|&(len, _, sr)| len == 512 && sr == SR));
    assert!(frames.iter().skip(1).all(|&(_, triggered, _)| triggered));
    assert_eq!(egress.dropped(), 0);
}

// ---------------------------------------------------------------------------
// Ring bridge + WAV
// ---------------------------------------------------------------------------

#[test]
fn rendered_audio_survives_ring_and_wav() {
    let (_tx, rx) = control_channel(4);
    let mut host = KernelHost::new(rx);
    let (osc, stage) = chain(&mut host);
    let (mut producer, mut consumer) = interleaved_ring(RingConfig {
        channels: 2,
        capacity_frames: 1024,
        prebuffer_frames: 256,
    })
    .unwrap();

    let blocks = (SR as usize / 4) / BLOCK;
    let (mut l, mut r) = ([0.0f32; BLOCK], [0.0f32; BLOCK]);
    let mut interleaved = [0.0f32; BLOCK * 2];
    let mut device = [0.0f32; BLOCK * 2];
    let (mut left, mut right) = (Vec::new(), Vec::new());

    for _ in 0..blocks {
        render_block(&mut host, osc, stage, &mut l, &mut r);
        for (i, frame) in interleaved.chunks_exact_mut(2).enumerate() {
            frame[0] = l[i];
            frame[1] = r[i];
        }
        assert_eq!(producer.push(&interleaved), BLOCK);

        let delivered = consumer.pop(&mut device);
        for frame in device.chunks_exact(2).take(delivered) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
    }

    // Priming delays the first frames but nothing is lost or underflows
    // once playback has started.
    let stats = consumer.stats();
    assert_eq!(stats.overflow_frames, 0);
    assert_eq!(stats.underflow_events, 0);
    assert_eq!(left.len() + stats.buffered_frames, blocks * BLOCK);

    let file = NamedTempFile::new().unwrap();
    write_wav_stereo(file.path(), &left, &right, WavSpec::default()).unwrap();
    let (mono, info) = read_wav(file.path()).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(mono.len(), left.len());

    let peak = mono.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!((peak - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.05, "peak {peak}");
}
