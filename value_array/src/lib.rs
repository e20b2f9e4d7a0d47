//! Compression of a fixed-bit-width integer array.
//!
//! Every value in the array is known ahead of time to fit in `bits_per_val`
//! bits (FFT coefficient components, typically). [`encode`] builds a
//! frequency map over the values themselves and Huffman-codes them, byte
//! aligning the output first so the self-describing frequency-map header
//! always starts on a clean byte boundary.

use bitstream::{BitReader, BitWriter};
use huffman::{FrequencyMap, Tree};

/// Widest bit width a single value may occupy.
pub const MAX_BITS_PER_VAL: u32 = 32;

/// Huffman-codes `values` into `writer`, byte-aligning first. `decode` must
/// be called with the same `bits_per_val` (recorded only for validation; the
/// wire form needs no fixed width since it's entirely Huffman-coded) and
/// `values.len()`.
///
/// Returns `false` if `values` is empty — an empty frequency map can't build
/// a tree — leaving `writer` unchanged.
pub fn encode(values: &[u32], bits_per_val: u32, writer: &mut BitWriter) -> bool {
    assert!(
        bits_per_val >= 1 && bits_per_val <= MAX_BITS_PER_VAL,
        "bits_per_val out of range"
    );
    debug_assert!(
        values.iter().all(|&v| bits_per_val == 32 || v < (1u32 << bits_per_val)),
        "value does not fit in bits_per_val bits"
    );

    let mut freqs: FrequencyMap = FrequencyMap::new();
    for &v in values {
        *freqs.entry(v).or_insert(0) += 1;
    }
    let tree = match Tree::build(&freqs) {
        Some(t) => t,
        None => return false,
    };

    writer.align_to_byte();
    Tree::serialize_freq_map(&freqs, writer);
    for &v in values {
        tree.encode_value(writer, v);
    }
    true
}

/// Reverses [`encode`]. `amount` must match the length originally encoded.
/// Returns `None` on a truncated or malformed stream.
pub fn decode(reader: &mut BitReader, bits_per_val: u32, amount: usize) -> Option<Vec<u32>> {
    assert!(
        bits_per_val >= 1 && bits_per_val <= MAX_BITS_PER_VAL,
        "bits_per_val out of range"
    );

    reader.align_to_byte();
    let freqs = Tree::deserialize_freq_map(reader)?;
    let tree = Tree::build(&freqs)?;

    let mut out = Vec::with_capacity(amount);
    for _ in 0..amount {
        out.push(tree.decode_value(reader)?);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s4_round_trip() {
        let values = [7u32, 7, 7, 0, 7];
        let mut w = BitWriter::new();
        assert!(encode(&values, 3, &mut w));
        let bytes = w.into_bytes();

        let mut r = BitReader::new(&bytes);
        let decoded = decode(&mut r, 3, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn empty_array_fails_to_encode() {
        let values: [u32; 0] = [];
        let mut w = BitWriter::new();
        assert!(!encode(&values, 9, &mut w));
        assert_eq!(w.bit_size(), 0);
    }

    #[test]
    fn uniform_values_compress_well() {
        let values = vec![42u32; 200];
        let mut w = BitWriter::new();
        assert!(encode(&values, 9, &mut w));
        // One bit per value plus a tiny single-entry freq map should easily
        // beat 200 * 9 raw bits.
        assert!(w.bit_size() < values.len() * 9);

        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        let decoded = decode(&mut r, 9, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn high_entropy_values_round_trip() {
        let values: Vec<u32> = (0u32..512).collect();
        let mut w = BitWriter::new();
        assert!(encode(&values, 9, &mut w));

        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        let decoded = decode(&mut r, 9, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn output_is_byte_aligned_even_after_odd_prefix() {
        let mut w = BitWriter::new();
        w.write_bits(0b101u8, 3);
        let values = [7u32, 7, 7, 0, 7];
        assert!(encode(&values, 3, &mut w));

        // The freq-map/code stream starts at byte 1, not bit 3.
        let mut r = BitReader::new(&w.clone().into_bytes());
        r.read_bits::<u8>(3);
        r.align_to_byte();
        let decoded = decode(&mut r, 3, values.len()).unwrap();
        assert_eq!(decoded, values);
    }
}
