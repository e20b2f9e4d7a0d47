//! Run-length compression of a bit stream's alternating runs of 0s and 1s.
//!
//! A stream is decomposed into runs (a starting bit plus a sequence of run
//! lengths). Run lengths are themselves either Huffman-coded, when enough of
//! them repeat, or written with an adaptive unary-prefixed bit width.
//! [`encode`] hands back `None` whenever the result isn't actually smaller —
//! callers fall back to storing the original bits uncompressed.

use bitstream::{BitReader, BitWriter};
use huffman::{FrequencyMap, Tree};

/// Smallest fixed bit width ever used to store a run length's value part.
pub const LENGTH_BITCOUNT_MIN: u32 = 1;
/// Largest allowed bit width; a prefix exceeding this marks a corrupt stream.
pub const LENGTH_BITCOUNT_MAX: u32 = 31;
/// Bits added to the width each time the unary prefix extends.
pub const LENGTH_BITCOUNT_STEP: u32 = 3;
/// Longest run length this scheme can represent.
pub const MAX_SEQ_LENGTH: u64 = 1 << 31;

/// Writes `length` (`>= 1`) as an extensible-width value: a unary prefix of
/// `1` bits signals each doubling of the bit width, a `0` bit terminates the
/// prefix, then `length - 1` is written in the settled width.
fn write_length(writer: &mut BitWriter, length: u32) {
    assert!(length >= 1, "run length must be at least 1");
    let val = (length - 1) as u64;

    let mut bit_count = LENGTH_BITCOUNT_MIN;
    while val >= (1u64 << bit_count) {
        writer.write_bit(true);
        bit_count += LENGTH_BITCOUNT_STEP;
    }
    writer.write_bit(false);
    writer.write_bits(val, bit_count);
}

/// Mirrors [`write_length`]. Returns `None` if the prefix runs past
/// [`LENGTH_BITCOUNT_MAX`] or the reader overflows.
fn read_length(reader: &mut BitReader) -> Option<u32> {
    let mut bit_count = LENGTH_BITCOUNT_MIN;
    while reader.read_bit() {
        if reader.overflowed() {
            return None;
        }
        bit_count += LENGTH_BITCOUNT_STEP;
        if bit_count > LENGTH_BITCOUNT_MAX {
            return None;
        }
    }
    if reader.overflowed() {
        return None;
    }

    let val: u64 = reader.read_bits(bit_count);
    if reader.overflowed() {
        return None;
    }
    Some(val as u32 + 1)
}

/// Splits `writer`'s bits into `(starting bit, run lengths)`. Empty input
/// yields `(false, [])`. Returns `None` if any run reaches past
/// [`MAX_SEQ_LENGTH`] — `write_length`'s adaptive width tops out at
/// [`LENGTH_BITCOUNT_MAX`] bits and can't represent a longer run.
fn extract_runs(writer: &BitWriter) -> Option<(bool, Vec<u32>)> {
    let total_bits = writer.bit_size();
    if total_bits == 0 {
        return Some((false, Vec::new()));
    }

    let start_bit = writer.get_bit_at(0);
    let mut cur_bit = start_bit;
    let mut run_len: u32 = 0;
    let mut runs = Vec::new();

    for i in 0..total_bits {
        let bit = writer.get_bit_at(i);
        if bit == cur_bit {
            run_len += 1;
            if run_len as u64 > MAX_SEQ_LENGTH {
                return None;
            }
        } else {
            runs.push(run_len);
            cur_bit = bit;
            run_len = 1;
        }
    }
    runs.push(run_len);

    Some((start_bit, runs))
}

/// Writes `length` copies of `bit`, using whole 16-bit blocks where possible.
fn write_run(out: &mut BitWriter, bit: bool, length: u32) {
    let block: u16 = if bit { 0xFFFF } else { 0 };
    let mut remaining = length;
    while remaining >= 16 {
        out.write::<u16>(block);
        remaining -= 16;
    }
    for _ in 0..remaining {
        out.write_bit(bit);
    }
}

/// Attempts to run-length-compress `writer`'s bits. Returns `None` if the
/// encoded form would be no smaller than the input.
pub fn encode(writer: &BitWriter) -> Option<BitWriter> {
    let total_bits = writer.bit_size();
    let (start_bit, runs) = extract_runs(writer)?;

    let mut freqs: FrequencyMap = FrequencyMap::new();
    for &r in &runs {
        *freqs.entry(r).or_insert(0) += 1;
    }

    let use_huffman = !runs.is_empty() && freqs.len() < runs.len() / 4;

    let mut out = BitWriter::new();
    out.write_bits(runs.len() as u64, 32);
    out.write_bit(use_huffman);

    let tree = if use_huffman {
        Tree::serialize_freq_map(&freqs, &mut out);
        Tree::build(&freqs)
    } else {
        None
    };

    if !runs.is_empty() {
        out.write_bit(start_bit);
    }

    for &r in &runs {
        match &tree {
            Some(t) => {
                t.encode_value(&mut out, r);
            }
            None => write_length(&mut out, r),
        }
    }

    if out.bit_size() >= total_bits {
        None
    } else {
        Some(out)
    }
}

/// Reverses [`encode`], appending the reconstructed bits onto `out`.
///
/// Returns `None` on a truncated or otherwise malformed stream.
pub fn decode(reader: &mut BitReader, out: &mut BitWriter) -> Option<()> {
    let seq_count = reader.read_bits::<u64>(32) as usize;
    if reader.overflowed() {
        return None;
    }
    if seq_count == 0 {
        return Some(());
    }

    let use_huffman = reader.read_bit();
    let tree = if use_huffman {
        let freqs = Tree::deserialize_freq_map(reader)?;
        Some(Tree::build(&freqs)?)
    } else {
        None
    };

    let mut cur_bit = reader.read_bit();
    if reader.overflowed() {
        return None;
    }

    for _ in 0..seq_count {
        let length = match &tree {
            Some(t) => t.decode_value(reader)?,
            None => read_length(reader)?,
        };
        write_run(out, cur_bit, length);
        cur_bit = !cur_bit;
    }

    Some(())
}
