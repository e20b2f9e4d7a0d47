//! Minimal WAV container I/O: reads arbitrary PCM/float WAV files into
//! normalized per-channel `f32` buffers, and writes 32-bit PCM WAV files
//! back out. Parsing itself (RIFF chunk walking, subformat dispatch) is left
//! entirely to `hound` — this module only adapts its sample iterators to the
//! shape the codec wants.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Audio as the codec wants it: normalized `f32` samples in `[-1, 1]`,
/// de-interleaved into one `Vec` per channel.
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub samples_per_channel: u32,
    pub channels: Vec<Vec<f32>>,
}

#[derive(Debug)]
pub enum WavError {
    Io(std::io::Error),
    Hound(hound::Error),
    NoChannels,
    UnsupportedFormat {
        bits_per_sample: u16,
        sample_format: &'static str,
    },
}

impl fmt::Display for WavError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WavError::Io(e) => write!(f, "I/O error: {e}"),
            WavError::Hound(e) => write!(f, "WAV error: {e}"),
            WavError::NoChannels => write!(f, "WAV file declares zero channels"),
            WavError::UnsupportedFormat {
                bits_per_sample,
                sample_format,
            } => write!(
                f,
                "unsupported WAV sample format: {sample_format} at {bits_per_sample} bits/sample"
            ),
        }
    }
}

impl Error for WavError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WavError::Io(e) => Some(e),
            WavError::Hound(e) => Some(e),
            _ => None,
        }
    }
}

impl From<hound::Error> for WavError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => WavError::Io(io),
            other => WavError::Hound(other),
        }
    }
}

/// Reads `path` and normalizes every sample to `[-1, 1]`.
///
/// Supports 8/16/24/32-bit integer PCM and 32-bit float WAV files; anything
/// else is reported as [`WavError::UnsupportedFormat`].
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<AudioInfo, WavError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(WavError::NoChannels);
    }

    let channel_count = spec.channels as usize;
    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];

    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            for (i, sample) in reader.samples::<f32>().enumerate() {
                channels[i % channel_count].push(sample?);
            }
        }
        (SampleFormat::Int, bits @ (8 | 16 | 24 | 32)) => {
            let max = (1i64 << (bits - 1)) as f32;
            for (i, sample) in reader.samples::<i32>().enumerate() {
                channels[i % channel_count].push(sample? as f32 / max);
            }
        }
        (format, bits) => {
            return Err(WavError::UnsupportedFormat {
                bits_per_sample: bits,
                sample_format: if format == SampleFormat::Float {
                    "float"
                } else {
                    "int"
                },
            });
        }
    }

    let samples_per_channel = channels.iter().map(|c| c.len()).max().unwrap_or(0) as u32;
    Ok(AudioInfo {
        sample_rate: spec.sample_rate,
        samples_per_channel,
        channels,
    })
}

/// Writes `info` as a 32-bit PCM WAV file, matching the reference codec's
/// always-32-bit-output convention regardless of the source format.
pub fn write_wav<P: AsRef<Path>>(path: P, info: &AudioInfo) -> Result<(), WavError> {
    if info.channels.is_empty() {
        return Err(WavError::NoChannels);
    }

    let spec = WavSpec {
        channels: info.channels.len() as u16,
        sample_rate: info.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    let amount = info.samples_per_channel as usize;
    for i in 0..amount {
        for channel in &info.channels {
            let sample = channel.get(i).copied().unwrap_or(0.0).clamp(-1.0, 1.0);
            writer.write_sample((sample * i32::MAX as f32) as i32)?;
        }
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sine_wave(freq: f32, sample_rate: u32, seconds: f32, amplitude: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    #[test]
    fn round_trips_through_int_pcm() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let samples = sine_wave(440.0, 44100, 0.01, 0.5);
        let mut buf = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for &s in &samples {
                writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }

        let mut reader = WavReader::new(Cursor::new(&buf)).unwrap();
        let read_spec = reader.spec();
        assert_eq!(read_spec.channels, 1);
        assert_eq!(read_spec.sample_rate, 44100);

        let decoded: Vec<f32> = reader
            .samples::<i32>()
            .map(|s| s.unwrap() as f32 / i16::MAX as f32)
            .collect();

        assert_eq!(decoded.len(), samples.len());
        for (a, b) in samples.iter().zip(decoded.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn rejects_zero_channel_output() {
        let info = AudioInfo {
            sample_rate: 44100,
            samples_per_channel: 0,
            channels: Vec::new(),
        };
        assert!(matches!(
            write_wav("/tmp/zcac_wav_io_test_should_not_be_created.wav", &info),
            Err(WavError::NoChannels)
        ));
    }
}
