//! Level, frequency and distortion measurement of a WAV file.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use synthi_analysis::{ThdAnalyzer, dynamics, waveform::estimate_frequency};
use synthi_io::read_wav;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input WAV file (multi-channel files are averaged to mono)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Fundamental for THD in Hz (default: strongest spectral peak)
    #[arg(long)]
    fundamental: Option<f32>,

    /// Largest FFT size used for THD
    #[arg(long, default_value = "32768")]
    fft_size: usize,

    /// Harmonics read for THD, fundamental included
    #[arg(long, default_value = "10")]
    harmonics: usize,
}

/// Largest power of two not above `min(requested, available)`.
fn fft_size_for(requested: usize, available: usize) -> usize {
    let limit = requested.min(available).max(2);
    1 << (usize::BITS - 1 - limit.leading_zeros())
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let (samples, info) =
        read_wav(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    if samples.is_empty() {
        anyhow::bail!("{} contains no samples", args.input.display());
    }
    let sr = info.sample_rate as f32;

    println!("File:        {}", args.input.display());
    println!(
        "Format:      {} ch, {} Hz, {}-bit {}",
        info.channels,
        info.sample_rate,
        info.bits_per_sample,
        if info.is_float { "float" } else { "PCM" }
    );
    println!("Duration:    {:.3} s", info.duration_secs());
    println!();
    println!(
        "Peak:        {:.4} ({:.2} dBFS)",
        dynamics::peak(&samples),
        dynamics::peak_db(&samples)
    );
    println!(
        "RMS:         {:.4} ({:.2} dBFS)",
        dynamics::rms(&samples),
        dynamics::rms_db(&samples)
    );
    println!("DC offset:   {:+.6}", dynamics::dc_offset(&samples));
    println!("Crest:       {:.3}", dynamics::crest_factor(&samples));
    match estimate_frequency(&samples, sr) {
        Some(f) => println!("Zero-cross:  {f:.2} Hz"),
        None => println!("Zero-cross:  (no periodic crossings)"),
    }

    let fft_size = fft_size_for(args.fft_size, samples.len());
    let analyzer = ThdAnalyzer::new(sr, fft_size).with_max_harmonics(args.harmonics);
    let thd = match args.fundamental {
        Some(f) => analyzer.analyze(&samples, f),
        None => analyzer.analyze_auto(&samples),
    };

    println!();
    println!("THD (FFT {fft_size}):");
    println!(
        "  Fundamental: {:.2} Hz, amplitude {:.4}",
        thd.fundamental_freq, thd.fundamental_amplitude
    );
    println!("  THD:         {:.4} % ({:.2} dB)", thd.thd_percent(), thd.thd_db);
    for (i, h) in thd.harmonics.iter().enumerate().skip(1) {
        println!("  H{:<2}         {:.6}", i + 1, h);
    }
    Ok(())
}
