//! Quantization and dequantization of a single FFT frame.
//!
//! An [`FftBlock`] carries the quantized real/imag components of the first
//! `STORAGE_SIZE` FFT bins (the non-redundant half, by Hermitian symmetry for
//! a real-valued input) plus the affine range that maps a stored `B`-bit
//! integer back to the original coefficient component.

use fft::fft_in_place;
use num_complex::Complex32;

/// Samples per frame.
pub const N: usize = 1024;
/// Bits per stored coefficient component.
pub const B: u32 = 9;
/// `(1 << B) - 1`, the largest representable stored component.
pub const INT_VAL_MAX: u16 = (1 << B) - 1;
/// `N / 2 + 1`: bins 0..=N/2 are stored; the rest mirror by conjugation.
pub const STORAGE_SIZE: usize = N / 2 + 1;
/// Overlap between consecutive frames, per spec.md's `pad = N / 32`.
pub const PAD: usize = N / 32;

/// Smallest range width treated as nonzero; guards the affine mapping's
/// division against a degenerate (silent) block where rangeMin == rangeMax.
const MIN_RANGE_SCALE: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct FftBlock {
    /// `(real, imag)` quantized components for bins `0..STORAGE_SIZE`, each
    /// holding a value in `0..=INT_VAL_MAX`.
    pub data: [(u16, u16); STORAGE_SIZE],
    pub range_min: f32,
    pub range_max: f32,
    /// Floor-0.01 peak absolute sample value of the frame this came from.
    /// Not part of the wire format; kept for parity with the step the
    /// reference always performs before transforming.
    pub max_amplitude: f32,
}

impl FftBlock {
    /// Builds an empty block over a known range, for the decode side to fill
    /// in slot by slot.
    pub fn with_range(range_min: f32, range_max: f32) -> Self {
        FftBlock {
            data: [(0, 0); STORAGE_SIZE],
            range_min,
            range_max,
            max_amplitude: 0.0,
        }
    }

    pub fn from_audio(samples: &[f32; N]) -> Self {
        let mut max_amplitude = 0.0f32;
        let mut buf: Vec<Complex32> = samples
            .iter()
            .map(|&s| {
                max_amplitude = max_amplitude.max(s.abs());
                Complex32::new(s, 0.0)
            })
            .collect();
        max_amplitude = max_amplitude.max(0.01);

        fft_in_place(&mut buf);

        let mut range_min = f32::MAX;
        let mut range_max = f32::MIN;
        for c in &buf {
            range_min = range_min.min(c.re).min(c.im);
            range_max = range_max.max(c.re).max(c.im);
        }
        if range_max - range_min < MIN_RANGE_SCALE {
            range_max = range_min + 1.0;
        }

        let scale = range_max - range_min;
        let mut data = [(0u16, 0u16); STORAGE_SIZE];
        for (i, slot) in data.iter_mut().enumerate() {
            let c = buf[i];
            let quantize = |x: f32| -> u16 {
                (((x - range_min) / scale).clamp(0.0, 1.0) * INT_VAL_MAX as f32).round() as u16
            };
            *slot = (quantize(c.re), quantize(c.im));
        }

        FftBlock {
            data,
            range_min,
            range_max,
            max_amplitude,
        }
    }

    pub fn to_audio(&self) -> [f32; N] {
        let scale = self.range_max - self.range_min;
        let dequantize = |v: u16| -> f32 { (v as f32 / INT_VAL_MAX as f32) * scale + self.range_min };

        let mut buf = vec![Complex32::new(0.0, 0.0); N];
        for (i, &(real_i, imag_i)) in self.data.iter().enumerate() {
            let c = Complex32::new(dequantize(real_i), dequantize(imag_i));
            buf[i] = c;
            if i > 0 && i < N / 2 {
                buf[N - i] = c.conj();
            }
        }

        for c in buf.iter_mut() {
            *c = c.conj();
        }
        fft_in_place(&mut buf);

        let mut out = [0.0f32; N];
        for (k, v) in out.iter_mut().enumerate() {
            let magnitude = buf[k].norm() / N as f32;
            *v = if buf[k].re >= 0.0 { magnitude } else { -magnitude };
        }
        out
    }

    /// Position the value 0 occupies after normalization — the placeholder
    /// written for an omitted component.
    pub fn zero_vol_f(&self) -> f32 {
        -self.range_min / (self.range_max - self.range_min)
    }

    /// Mean of the stored, normalized components (both real and imag across
    /// every slot).
    pub fn average_f(&self) -> f32 {
        let mut total = 0.0f32;
        for &(r, i) in &self.data {
            total += r as f32 / INT_VAL_MAX as f32;
            total += i as f32 / INT_VAL_MAX as f32;
        }
        total / (STORAGE_SIZE * 2) as f32
    }

    /// Population standard deviation of the same normalized components.
    pub fn standard_deviation_f(&self) -> f32 {
        let avg = self.average_f();
        let mut sq_total = 0.0f32;
        for &(r, i) in &self.data {
            for raw in [r, i] {
                let delta = raw as f32 / INT_VAL_MAX as f32 - avg;
                sq_total += delta * delta;
            }
        }
        (sq_total / (STORAGE_SIZE * 2) as f32).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_frame(freq: f32, sample_rate: f32, amplitude: f32) -> [f32; N] {
        let mut out = [0.0f32; N];
        for (i, s) in out.iter_mut().enumerate() {
            let t = i as f32 / sample_rate;
            *s = amplitude * (2.0 * std::f32::consts::PI * freq * t).sin();
        }
        out
    }

    #[test]
    fn quantized_components_fit_in_b_bits() {
        let frame = sine_frame(440.0, 44100.0, 0.5);
        let block = FftBlock::from_audio(&frame);
        for &(r, i) in &block.data {
            assert!(r <= INT_VAL_MAX);
            assert!(i <= INT_VAL_MAX);
        }
    }

    #[test]
    fn silent_frame_does_not_divide_by_zero() {
        let frame = [0.0f32; N];
        let block = FftBlock::from_audio(&frame);
        assert!(block.range_max > block.range_min);
        assert!(block.zero_vol_f().is_finite());
    }

    #[test]
    fn round_trip_approximates_sine_wave() {
        let frame = sine_frame(440.0, 44100.0, 0.5);
        let block = FftBlock::from_audio(&frame);
        let decoded = block.to_audio();

        let rms: f32 = (frame
            .iter()
            .zip(decoded.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            / N as f32)
            .sqrt();
        assert!(rms < 0.1, "rms error too large: {rms}");
    }

    #[test]
    fn zero_vol_f_matches_midpoint_definition() {
        let block = FftBlock::with_range(-2.0, 2.0);
        assert!((block.zero_vol_f() - 0.5).abs() < 1e-6);
    }
}
