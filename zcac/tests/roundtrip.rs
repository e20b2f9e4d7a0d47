//! Integration coverage spanning `wav_io` and the `zcac` codec together:
//! a synthetic WAV file in, a `.zcac` container, a decoded WAV back out.

use std::path::PathBuf;
use zcac::{Config, decode, encode};

fn sine_wav_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("zcac_roundtrip_{tag}.wav"))
}

fn sine_audio_info(freq: f32, sample_rate: u32, seconds: f32, amplitude: f32) -> wav_io::AudioInfo {
    let n = (sample_rate as f32 * seconds) as usize;
    let samples: Vec<f32> = (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect();
    wav_io::AudioInfo {
        sample_rate,
        samples_per_channel: n as u32,
        channels: vec![samples],
    }
}

#[test]
fn wav_to_zcac_to_wav_round_trip() {
    let path = sine_wav_path("pcm16");
    let source = sine_audio_info(440.0, 44100, 0.25, 0.5);
    wav_io::write_wav(&path, &source).unwrap();

    let read_back = wav_io::read_wav(&path).unwrap();
    let encoded = encode(&read_back, &Config::default()).unwrap();
    let decoded = decode(&encoded).unwrap();

    assert_eq!(decoded.samples_per_channel, read_back.samples_per_channel);
    assert_eq!(decoded.channels.len(), read_back.channels.len());

    std::fs::remove_file(&path).ok();
}

#[test]
fn higher_quality_omits_fewer_coefficients_and_grows_output() {
    let audio = sine_audio_info(1000.0, 44100, 0.5, 0.7);

    let low = encode(&audio, &Config::default().with_quality(1)).unwrap();
    let high = encode(&audio, &Config::default().with_quality(10)).unwrap();

    // Higher quality omits fewer (or equally many) coefficients, so its
    // compressed body is never smaller than the low-quality one's.
    assert!(high.len() >= low.len());
}

#[test]
fn outer_compression_flag_round_trips_through_container() {
    let audio = sine_audio_info(660.0, 44100, 0.1, 0.4);

    let compressed = encode(
        &audio,
        &Config {
            quality: 5,
            omit_unimportant_freqs: true,
            outer_compression: true,
        },
    )
    .unwrap();
    assert!(decode(&compressed).is_ok());

    let uncompressed = encode(
        &audio,
        &Config {
            quality: 5,
            omit_unimportant_freqs: true,
            outer_compression: false,
        },
    )
    .unwrap();
    assert!(decode(&uncompressed).is_ok());
}
