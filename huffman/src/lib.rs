//! Canonical Huffman coding over an arbitrary unsigned-integer alphabet.
//!
//! Unlike a byte-oriented Huffman coder, [`Tree`] builds codes over any
//! `u32` value space (FFT coefficient magnitudes, run lengths, …), and
//! carries its own frequency-table (de)serialization so a decoder can
//! rebuild the same tree without a side channel.

use bitstream::{BitReader, BitWriter};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// The value type carried by the alphabet. Kept at `u32` — wide enough for
/// run lengths and 9-bit FFT coefficients alike.
pub type Val = u32;

/// Value → occurrence-count table. A `BTreeMap` rather than a hash map: its
/// ascending iteration order is what makes [`Tree::serialize_freq_map`]
/// canonical — the same map always serializes to the same bytes.
pub type FrequencyMap = BTreeMap<Val, u32>;

/// Maximum length, in bits, of any single Huffman code.
pub const MAX_CODE_BITS: usize = 256;

/// A Huffman code word: up to [`MAX_CODE_BITS`] bits, packed LSB-first.
#[derive(Debug, Clone, Copy)]
pub struct Code {
    data: [u8; MAX_CODE_BITS / 8],
    len: usize,
}

impl Code {
    fn new() -> Self {
        Code {
            data: [0; MAX_CODE_BITS / 8],
            len: 0,
        }
    }

    fn push_bit(&mut self, val: bool) {
        assert!(self.len < MAX_CODE_BITS, "huffman code exceeded max length");
        if val {
            self.data[self.len / 8] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    fn bit(&self, i: usize) -> bool {
        (self.data[i / 8] >> (i % 8)) & 1 != 0
    }

    /// Number of bits in this code.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn write_to(&self, writer: &mut BitWriter) {
        for i in 0..self.len {
            writer.write_bit(self.bit(i));
        }
    }
}

#[derive(Debug, Eq)]
struct Node {
    freq: u32,
    // Tie-break key on equal frequency: the leaf's own value, ascending.
    // Internal nodes carry 0 here, matching the reference's "value doesn't
    // matter for internal nodes" convention.
    tie_key: Val,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
    value: Option<Val>,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.tie_key == other.tie_key
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.freq.cmp(&other.freq).then(self.tie_key.cmp(&other.tie_key))
    }
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.value.is_some()
    }
}

/// A built Huffman tree: codes for each value in the alphabet, plus the root
/// for streaming decode.
pub struct Tree {
    root: Box<Node>,
    codes: BTreeMap<Val, Code>,
}

/// Returns 1 for `x <= 1`, else `floor(log2(x)) + 1`.
///
/// # Examples
///
/// ```
/// assert_eq!(huffman::min_bits_needed(0), 1);
/// assert_eq!(huffman::min_bits_needed(1), 1);
/// assert_eq!(huffman::min_bits_needed(2), 2);
/// assert_eq!(huffman::min_bits_needed(255), 8);
/// assert_eq!(huffman::min_bits_needed(256), 9);
/// ```
pub fn min_bits_needed(x: u32) -> u32 {
    if x <= 1 { 1 } else { 32 - x.leading_zeros() }
}

fn build_codes(node: &Node, prefix: Code, codes: &mut BTreeMap<Val, Code>) {
    match node.value {
        Some(v) => {
            let code = if prefix.is_empty() {
                // A single-leaf tree still needs a code to emit: `0`.
                let mut c = Code::new();
                c.push_bit(false);
                c
            } else {
                prefix
            };
            codes.insert(v, code);
        }
        None => {
            if let Some(left) = &node.left {
                let mut lp = prefix;
                lp.push_bit(false);
                build_codes(left, lp, codes);
            }
            if let Some(right) = &node.right {
                let mut rp = prefix;
                rp.push_bit(true);
                build_codes(right, rp, codes);
            }
        }
    }
}

impl Tree {
    /// Builds a tree from a non-empty frequency map.
    ///
    /// Repeatedly pops the two lowest-frequency nodes (ties broken by
    /// ascending value) and replaces them with a parent whose frequency is
    /// their sum, until one node — the root — remains.
    pub fn build(freq_map: &FrequencyMap) -> Option<Tree> {
        if freq_map.is_empty() {
            return None;
        }

        let mut heap: BinaryHeap<Reverse<Box<Node>>> = BinaryHeap::new();
        for (&value, &freq) in freq_map {
            heap.push(Reverse(Box::new(Node {
                freq,
                tie_key: value,
                left: None,
                right: None,
                value: Some(value),
            })));
        }

        while heap.len() > 1 {
            let Reverse(a) = heap.pop().unwrap();
            let Reverse(b) = heap.pop().unwrap();
            heap.push(Reverse(Box::new(Node {
                freq: a.freq + b.freq,
                tie_key: 0,
                left: Some(a),
                right: Some(b),
                value: None,
            })));
        }

        let root = heap.pop().unwrap().0;
        let mut codes = BTreeMap::new();
        build_codes(&root, Code::new(), &mut codes);

        Some(Tree { root, codes })
    }

    /// Writes `value`'s code to `writer`. Returns `false` if `value` isn't
    /// in this tree's alphabet.
    pub fn encode_value(&self, writer: &mut BitWriter, value: Val) -> bool {
        match self.codes.get(&value) {
            Some(code) => {
                code.write_to(writer);
                true
            }
            None => false,
        }
    }

    /// Decodes one value by walking from the root, one bit per step, until a
    /// leaf. Returns `None` if the reader overflows mid-walk.
    pub fn decode_value(&self, reader: &mut BitReader) -> Option<Val> {
        let mut node: &Node = &self.root;
        while !node.is_leaf() {
            let bit = reader.read_bit();
            if reader.overflowed() {
                return None;
            }
            node = if bit {
                node.right.as_deref().unwrap()
            } else {
                node.left.as_deref().unwrap()
            };
        }
        node.value
    }

    /// Serializes `freq_map` in the self-describing layout decoders expect:
    /// a width flag, an entry count, a per-value bit width, then the
    /// (value, count) pairs themselves in ascending key order.
    pub fn serialize_freq_map(freq_map: &FrequencyMap, writer: &mut BitWriter) {
        let use_wide =
            freq_map.len() > u16::MAX as usize || freq_map.values().any(|&c| c > u16::MAX as u32);
        writer.write_bit(use_wide);

        let num_bit_width: u32 = if use_wide { 32 } else { 16 };
        writer.write_bits(freq_map.len() as u64, num_bit_width);

        let highest_val = *freq_map.keys().next_back().unwrap();
        let value_bits = min_bits_needed(highest_val);
        writer.write::<u8>(value_bits as u8);

        for (&val, &count) in freq_map {
            writer.write_bits(val, value_bits);
            writer.write_bits(count as u64, num_bit_width);
        }
    }

    /// Mirrors [`Tree::serialize_freq_map`]. Rejects duplicate values, zero
    /// counts, and truncated input.
    pub fn deserialize_freq_map(reader: &mut BitReader) -> Option<FrequencyMap> {
        let use_wide = reader.read_bit();
        let num_bit_width: u32 = if use_wide { 32 } else { 16 };

        let entry_count = reader.read_bits::<u64>(num_bit_width) as usize;
        let value_bits = reader.read::<u8>() as u32;
        if value_bits > 32 {
            return None;
        }

        let mut map = FrequencyMap::new();
        for _ in 0..entry_count {
            let val = reader.read_bits::<Val>(value_bits);
            let count = reader.read_bits::<u64>(num_bit_width) as u32;

            if count == 0 {
                return None;
            }
            if map.contains_key(&val) {
                return None;
            }
            map.insert(val, count);

            if reader.overflowed() {
                return None;
            }
        }
        Some(map)
    }
}
