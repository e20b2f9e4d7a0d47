//! In-place, iterative radix-2 Cooley-Tukey FFT.
//!
//! Runs the butterfly passes directly on the input in natural order (no
//! pre-permutation), doubling the twiddle factor's angle at each halving of
//! `k`, then untangles the result with a single bit-reversal permutation
//! pass at the end. The transform is unnormalized: an inverse transform is
//! obtained by conjugating the input, running this forward, conjugating the
//! output, and dividing by `n` — callers needing that do it themselves.

use num_complex::Complex32;
use std::f32::consts::PI;

/// Runs the forward FFT over `data` in place.
///
/// # Panics
///
/// Panics if `data.len()` is not a power of two.
pub fn fft_in_place(data: &mut [Complex32]) {
    let n = data.len();
    assert!(n > 0 && n.is_power_of_two(), "fft size must be a nonzero power of two");
    if n == 1 {
        return;
    }

    let theta_t = PI / n as f32;
    let mut phi_t = Complex32::new(theta_t.cos(), -theta_t.sin());

    let mut k = n;
    while k > 1 {
        let prev_k = k;
        k >>= 1;
        phi_t *= phi_t;

        let mut t = Complex32::new(1.0, 0.0);
        for l in 0..k {
            let mut a = l;
            while a < n {
                let b = a + k;
                let diff = data[a] - data[b];
                data[a] += data[b];
                data[b] = diff * t;
                a += prev_k;
            }
            t *= phi_t;
        }
    }

    let m = n.trailing_zeros();
    for a in 0..n {
        let b = (reverse_bits32(a as u32) >> (32 - m)) as usize;
        if b > a {
            data.swap(a, b);
        }
    }
}

fn reverse_bits32(mut b: u32) -> u32 {
    b = ((b & 0xaaaa_aaaa) >> 1) | ((b & 0x5555_5555) << 1);
    b = ((b & 0xcccc_cccc) >> 2) | ((b & 0x3333_3333) << 2);
    b = ((b & 0xf0f0_f0f0) >> 4) | ((b & 0x0f0f_0f0f) << 4);
    b = ((b & 0xff00_ff00) >> 8) | ((b & 0x00ff_00ff) << 8);
    (b >> 16) | (b << 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: Complex32, b: Complex32) -> bool {
        (a - b).norm() < 1e-3
    }

    #[test]
    fn impulse_transforms_to_flat_spectrum() {
        let mut data = vec![
            Complex32::new(1.0, 0.0),
            Complex32::new(0.0, 0.0),
            Complex32::new(0.0, 0.0),
            Complex32::new(0.0, 0.0),
        ];
        fft_in_place(&mut data);
        for bin in data {
            assert!(approx_eq(bin, Complex32::new(1.0, 0.0)), "bin was {bin:?}");
        }
    }

    #[test]
    fn single_element_is_identity() {
        let mut data = vec![Complex32::new(3.5, -2.0)];
        fft_in_place(&mut data);
        assert_eq!(data[0], Complex32::new(3.5, -2.0));
    }

    #[test]
    fn forward_then_conjugate_inverse_round_trips() {
        let n = 8usize;
        let original: Vec<Complex32> = (0..n)
            .map(|i| Complex32::new((i as f32 * 0.37).sin(), 0.0))
            .collect();

        let mut freq = original.clone();
        fft_in_place(&mut freq);

        let mut inverse: Vec<Complex32> = freq.iter().map(|c| c.conj()).collect();
        fft_in_place(&mut inverse);
        for v in &mut inverse {
            *v = v.conj() / n as f32;
        }

        for (a, b) in original.iter().zip(inverse.iter()) {
            assert!(approx_eq(*a, *b), "{a:?} vs {b:?}");
        }
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn rejects_non_power_of_two_size() {
        let mut data = vec![Complex32::new(0.0, 0.0); 3];
        fft_in_place(&mut data);
    }
}
