//! ZCAC: a lossy audio codec built from overlap-add FFT framing, per-block
//! range quantization, optional omission of low-salience coefficients, and
//! Huffman entropy coding of the resulting integer stream.
//!
//! The layers below this crate (`bitstream`, `huffman`, `bitrepeater`,
//! `value_array`, `fft`) are generic; everything audio-specific lives here:
//! [`block`] quantizes one FFT frame, [`codec`] frames a whole channel and
//! assembles the container.

pub mod block;
pub mod codec;
pub mod config;
pub mod error;
pub mod header;

pub use block::FftBlock;
pub use codec::{decode, encode};
pub use config::Config;
pub use error::ZcacError;
