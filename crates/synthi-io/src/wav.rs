//! WAV rendering targets and analysis input.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// Output encoding for rendered files.
///
/// 32 bits writes IEEE float; anything else writes integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth: 16, 24 or 32 (float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    fn to_hound(self, channels: u16) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
            sample_format: if self.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }

    /// Full-scale integer value, or `None` for float output.
    fn int_scale(self) -> Option<f32> {
        (self.bits_per_sample != 32).then(|| (1i32 << (self.bits_per_sample - 1)) as f32)
    }
}

/// Header details of a WAV file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    /// Channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth.
    pub bits_per_sample: u16,
    /// Whether samples are IEEE float.
    pub is_float: bool,
    /// Samples per channel.
    pub frames: u64,
}

impl WavInfo {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.sample_rate.max(1))
    }
}

/// Read only the header of a WAV file.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        is_float: spec.sample_format == SampleFormat::Float,
        frames: u64::from(reader.duration()),
    })
}

/// Read a WAV file as mono f32, averaging channels.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavInfo)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let info = WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        is_float: spec.sample_format == SampleFormat::Float,
        frames: u64::from(reader.duration()),
    };

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let mono = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };
    Ok((mono, info))
}

fn encode<W>(writer: &mut WavWriter<W>, spec: WavSpec, sample: f32) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    match spec.int_scale() {
        None => writer.write_sample(sample)?,
        Some(scale) => writer.write_sample((sample * scale).clamp(-scale, scale - 1.0) as i32)?,
    }
    Ok(())
}

/// Write a mono file.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mut writer = WavWriter::create(path, spec.to_hound(1))?;
    for &s in samples {
        encode(&mut writer, spec, s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Write an interleaved stereo file from separate channels.
pub fn write_wav_stereo<P: AsRef<Path>>(
    path: P,
    left: &[f32],
    right: &[f32],
    spec: WavSpec,
) -> Result<()> {
    if left.len() != right.len() {
        return Err(Error::ChannelLengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    let mut writer = WavWriter::create(path, spec.to_hound(2))?;
    for (&l, &r) in left.iter().zip(right) {
        encode(&mut writer, spec, l)?;
        encode(&mut writer, spec, r)?;
    }
    writer.finalize()?;
    Ok(())
}
