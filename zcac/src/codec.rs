//! The top-level encode/decode pipeline: framing, omission mask, entropy
//! coding of the coefficient stream, and container framing.

use crate::block::{FftBlock, B, INT_VAL_MAX, N, PAD, STORAGE_SIZE};
use crate::config::{Config, FLAG_OMIT_FFT_VALS, FLAG_ZLIB_COMPRESSION};
use crate::error::ZcacError;
use crate::header::{self, Header};
use bitstream::{BitReader, BitWriter};
use wav_io::AudioInfo;

const STEP: usize = N - PAD;

/// Splits one channel's samples into overlapping, zero-padded `N`-sample
/// frames advancing by `STEP` each time.
fn frame_channel(channel: &[f32]) -> Vec<FftBlock> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < channel.len() {
        let mut frame = [0.0f32; N];
        let available = channel.len() - i;
        if available >= N {
            frame.copy_from_slice(&channel[i..i + N]);
        } else {
            frame[..available].copy_from_slice(&channel[i..]);
        }
        blocks.push(FftBlock::from_audio(&frame));
        i += STEP;
    }
    blocks
}

/// Encodes `audio` into a ZCAC container byte stream.
pub fn encode(audio: &AudioInfo, config: &Config) -> Result<Vec<u8>, ZcacError> {
    let flags = config.to_flags();
    let omit = flags & FLAG_OMIT_FFT_VALS != 0;
    let mut body = BitWriter::new();

    for (ch_index, channel) in audio.channels.iter().enumerate() {
        let blocks = frame_channel(channel);
        log::debug!("channel {ch_index}: framed into {} blocks", blocks.len());

        body.write::<u32>(blocks.len() as u32);
        for block in &blocks {
            body.write::<f32>(block.range_min);
            body.write::<f32>(block.range_max);
        }

        if blocks.is_empty() {
            continue;
        }

        let mut values: Vec<u32> = Vec::with_capacity(STORAGE_SIZE * blocks.len() * 2);

        if omit {
            let stdv_div = config.stdv_div();
            let thresholds: Vec<(f32, f32)> = blocks
                .iter()
                .map(|b| (b.zero_vol_f(), b.standard_deviation_f() / stdv_div))
                .collect();

            let mut mask = BitWriter::new();
            let mut omitted_count = 0usize;
            for part in 0..2 {
                for (block, &(base, threshold)) in blocks.iter().zip(thresholds.iter()) {
                    for slot in 0..STORAGE_SIZE {
                        let raw = if part == 0 { block.data[slot].0 } else { block.data[slot].1 };
                        let norm = raw as f32 / INT_VAL_MAX as f32;
                        let skip = (norm - base).abs() < threshold;
                        mask.write_bit(skip);
                        if skip {
                            omitted_count += 1;
                        } else {
                            values.push(raw as u32);
                        }
                    }
                }
            }

            log::debug!(
                "channel {ch_index}: omitted {omitted_count}/{} coefficient components",
                STORAGE_SIZE * blocks.len() * 2
            );

            match bitrepeater::encode(&mask) {
                Some(compressed) => {
                    body.write_bit(true);
                    body.append(&compressed);
                }
                None => {
                    body.write_bit(false);
                    body.append(&mask);
                }
            }
        } else {
            for part in 0..2 {
                for block in &blocks {
                    for slot in 0..STORAGE_SIZE {
                        let raw = if part == 0 { block.data[slot].0 } else { block.data[slot].1 };
                        values.push(raw as u32);
                    }
                }
            }
        }

        if !value_array::encode(&values, B, &mut body) {
            log::error!("channel {ch_index}: value array encode failed (empty coefficient stream)");
            return Err(ZcacError::InvalidFrequencyMap);
        }
    }

    let original_bit_size = body.bit_size();
    if flags & FLAG_ZLIB_COMPRESSION != 0 {
        if !body.compress() {
            return Err(ZcacError::CompressionFailure);
        }
        log::info!(
            "outer compression: {} bytes -> {} bytes",
            original_bit_size.div_ceil(8),
            body.byte_size()
        );
    }
    let body_bytes = body.into_bytes();

    let head = Header {
        version: header::version(),
        channel_count: audio.channels.len() as u8,
        sample_rate: audio.sample_rate,
        samples_per_channel: audio.samples_per_channel as u64,
        flags,
    };

    let mut out = BitWriter::new();
    head.write(&mut out);
    out.write_bytes(&body_bytes);
    Ok(out.into_bytes())
}

/// Decodes a ZCAC container byte stream back into [`AudioInfo`].
pub fn decode(bytes: &[u8]) -> Result<AudioInfo, ZcacError> {
    let mut reader = BitReader::new(bytes);
    let head = Header::read(&mut reader).ok_or(ZcacError::InvalidContainer)?;
    if head.version != header::version() {
        log::error!("unsupported container version {:#x}", head.version);
        return Err(ZcacError::InvalidContainer);
    }

    let decompressed_storage;
    if head.flags & FLAG_ZLIB_COMPRESSION != 0 {
        let inflated = reader.decompress().ok_or(ZcacError::CompressionFailure)?;
        decompressed_storage = inflated;
        reader = BitReader::new(&decompressed_storage);
    }

    let omit = head.flags & FLAG_OMIT_FFT_VALS != 0;
    let mut channels = Vec::with_capacity(head.channel_count as usize);

    for ch_index in 0..head.channel_count {
        let block_count = reader.read::<u32>() as usize;
        if reader.overflowed() {
            return Err(ZcacError::OverflowRead);
        }

        if head.samples_per_channel == 0
            || head.samples_per_channel > (block_count as u64) * (N as u64)
        {
            return Err(ZcacError::InvalidSamples);
        }

        let mut blocks: Vec<FftBlock> = Vec::with_capacity(block_count);
        for _ in 0..block_count {
            let range_min = reader.read::<f32>();
            let range_max = reader.read::<f32>();
            blocks.push(FftBlock::with_range(range_min, range_max));
        }
        if reader.overflowed() {
            return Err(ZcacError::OverflowRead);
        }

        if block_count > 0 {
            decode_channel_body(&mut reader, &mut blocks, omit)?;
        }

        log::debug!("channel {ch_index}: reconstructed {block_count} blocks");
        channels.push(overlap_add(&blocks, head.samples_per_channel as usize));
    }

    Ok(AudioInfo {
        sample_rate: head.sample_rate,
        samples_per_channel: head.samples_per_channel as u32,
        channels,
    })
}

fn decode_channel_body(
    reader: &mut BitReader<'_>,
    blocks: &mut [FftBlock],
    omit: bool,
) -> Result<(), ZcacError> {
    let total_val_amount = STORAGE_SIZE * blocks.len() * 2;

    let omit_mask: Option<Vec<bool>> = if omit {
        let compressed = reader.read_bit();
        if reader.overflowed() {
            return Err(ZcacError::OverflowRead);
        }

        let mut mask_writer = BitWriter::new();
        if compressed {
            bitrepeater::decode(reader, &mut mask_writer).ok_or(ZcacError::InvalidContainer)?;
        } else {
            for _ in 0..total_val_amount {
                mask_writer.write_bit(reader.read_bit());
            }
            if reader.overflowed() {
                return Err(ZcacError::OverflowRead);
            }
        }

        if mask_writer.bit_size() != total_val_amount {
            return Err(ZcacError::InvalidContainer);
        }
        Some((0..total_val_amount).map(|i| mask_writer.get_bit_at(i)).collect())
    } else {
        None
    };

    let vals_to_read = match &omit_mask {
        Some(mask) => mask.iter().filter(|&&omitted| !omitted).count(),
        None => total_val_amount,
    };

    let decoded = value_array::decode(reader, B, vals_to_read).ok_or(ZcacError::InvalidFrequencyMap)?;
    for &v in &decoded {
        if v > INT_VAL_MAX as u32 {
            log::error!("stored coefficient {v} has nonzero upper bits for a {B}-bit field");
            return Err(ZcacError::InvalidContainer);
        }
    }

    let block_count = blocks.len();
    let mut decoded_iter = decoded.into_iter();
    for part in 0..2 {
        for (bi, block) in blocks.iter_mut().enumerate() {
            let placeholder = (block.zero_vol_f().clamp(0.0, 1.0) * INT_VAL_MAX as f32).round() as u16;
            for slot in 0..STORAGE_SIZE {
                let mask_index = part * block_count * STORAGE_SIZE + bi * STORAGE_SIZE + slot;
                let omitted = omit_mask.as_ref().map(|m| m[mask_index]).unwrap_or(false);
                let value = if omitted {
                    placeholder
                } else {
                    decoded_iter.next().ok_or(ZcacError::InvalidContainer)? as u16
                };
                if part == 0 {
                    block.data[slot].0 = value;
                } else {
                    block.data[slot].1 = value;
                }
            }
        }
    }

    Ok(())
}

/// Reconstructs a channel's samples from its decoded blocks, crossfading the
/// `PAD`-sample overlap between consecutive blocks.
fn overlap_add(blocks: &[FftBlock], samples_per_channel: usize) -> Vec<f32> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let total_len = (blocks.len() - 1) * STEP + N;
    let mut out = vec![0.0f32; total_len];

    for (i, block) in blocks.iter().enumerate() {
        let mut frame = block.to_audio();
        let offset = i * STEP;
        if i > 0 {
            for j in 0..PAD {
                let ratio = j as f32 / PAD as f32;
                frame[j] = frame[j] * ratio + out[offset + j] * (1.0 - ratio);
            }
        }
        out[offset..offset + N].copy_from_slice(&frame);
    }

    out.truncate(samples_per_channel);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_audio(freq: f32, sample_rate: u32, seconds: f32, amplitude: f32) -> AudioInfo {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect();
        AudioInfo {
            sample_rate,
            samples_per_channel: n as u32,
            channels: vec![samples],
        }
    }

    #[test]
    fn scenario_s5_container_starts_with_magic() {
        let audio = sine_audio(440.0, 44100, 0.05, 0.5);
        let bytes = encode(&audio, &Config::default()).unwrap();
        assert_eq!(&bytes[0..4], &[0x5A, 0x43, 0x41, 0x43]);
    }

    #[test]
    fn scenario_s6_bad_version_rejected_without_panic() {
        let audio = sine_audio(440.0, 44100, 0.05, 0.5);
        let mut bytes = encode(&audio, &Config::default()).unwrap();
        bytes[4..8].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        assert!(matches!(decode(&bytes), Err(ZcacError::InvalidContainer)));
    }

    #[test]
    fn property_10_sine_wave_round_trip_preserves_sample_count() {
        let audio = sine_audio(440.0, 44100, 1.0, 0.5);
        let encoded = encode(&audio, &Config::default()).unwrap();
        let decoded = decode(&encoded).unwrap();

        assert_eq!(decoded.samples_per_channel, audio.samples_per_channel);
        assert_eq!(decoded.channels.len(), 1);
        assert_eq!(decoded.channels[0].len(), audio.channels[0].len());

        let rms: f32 = (audio.channels[0]
            .iter()
            .zip(decoded.channels[0].iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            / audio.channels[0].len() as f32)
            .sqrt();
        assert!(rms < 0.15, "rms error too large: {rms}");
    }

    #[test]
    fn round_trip_without_omission_or_outer_compression() {
        let audio = sine_audio(220.0, 22050, 0.2, 0.3);
        let config = Config {
            quality: 5,
            omit_unimportant_freqs: false,
            outer_compression: false,
        };
        let encoded = encode(&audio, &config).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.channels[0].len(), audio.channels[0].len());
    }

    #[test]
    fn round_trip_multichannel() {
        let left = sine_audio(330.0, 44100, 0.1, 0.4);
        let right = sine_audio(550.0, 44100, 0.1, 0.4);
        let audio = AudioInfo {
            sample_rate: 44100,
            samples_per_channel: left.channels[0].len() as u32,
            channels: vec![left.channels[0].clone(), right.channels[0].clone()],
        };
        let encoded = encode(&audio, &Config::default()).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded.channels.len(), 2);
        for ch in &decoded.channels {
            assert_eq!(ch.len(), audio.samples_per_channel as usize);
        }
    }

    #[test]
    fn truncated_container_fails_cleanly() {
        let audio = sine_audio(440.0, 44100, 0.05, 0.5);
        let mut bytes = encode(&audio, &Config::default()).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(decode(&bytes).is_err());
    }
}
