//! The dictionary module turns a huffman tree and its symbol strings into the table that
//! is stored in front of the bitstream, and walks that table again to decode.
//!
//! Two table layouts exist:
//! - Direct: the tree itself, with a skip distance in front of every branch so the
//!   decoder can hop to the right child. Fast to decode, the default.
//! - Canonical: a count of leaves per tree level followed by the strings in canonical
//!   code order. A few bytes smaller, but each symbol needs a linear scan of the string
//!   table to decode, so it is much slower.
//!
//! Both layouts share leaf strings with suffix references: a string whose tail is another
//! string in the table stores only its prefix plus a 16-bit pointer to that string.
//!
//! Every layout has two functions that must agree exactly: `table_bytes` predicts the
//! size of the table for a tree, and `build` emits it. The muncher relies on the
//! prediction to evaluate thousands of candidate dictionaries without building them, so
//! `build` checks its own output against the prediction every time.
//!

pub mod canonical;
pub mod direct;
pub mod intx;
pub mod suffix;

use std::fmt::{Display, Formatter};

use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffmunchError, Result};
use crate::huffman_coding::huffman::{HuffCode, HuffTree, SymbolId};

use canonical::CanonicalTree;
use direct::DirectTree;

/// Longest suffix chain a valid table can contain: every hop is to a strictly shorter
/// string, and strings are at most 255 bytes.
pub(crate) const MAX_SUFFIX_HOPS: usize = 256;

/// Placeholder bytes for a suffix reference that has not been resolved yet.
const FIXUP_MARK: [u8; 2] = [42, 43];

/// One string entry of a table, as found by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafEntry {
    /// Position of the first string byte stored in this entry.
    pub start: usize,
    /// Number of string bytes stored in this entry.
    pub len: usize,
    /// Position of the entry holding the rest of the string, if it is shared.
    pub link: Option<usize>,
}

/// A table layout. Encoding and decoding of one layout live behind this interface.
pub trait TreeCodec: Sync {
    /// Minimum shared suffix length worth a back reference in this layout.
    fn suffix_overhead(&self) -> usize;

    /// Number of bytes `build` will emit for this tree.
    fn table_bytes(&self, tree: &HuffTree, symbols: &[Vec<u8>]) -> Result<usize>;

    /// Append the table for this tree to output. Suffix references are absolute positions
    /// within output. Returns the huffman code of every symbol in the tree, indexed by
    /// symbol id.
    fn build(
        &self,
        tree: &HuffTree,
        symbols: &[Vec<u8>],
        output: &mut Vec<u8>,
    ) -> Result<Vec<Option<HuffCode>>>;

    /// Read bits until a leaf is reached. Returns the position of its string entry.
    fn walk(&self, packed: &[u8], table_pos: usize, bits: &mut BitReader<'_>) -> Result<usize>;

    /// Parse the string entry at pos.
    fn entry(&self, packed: &[u8], pos: usize) -> Result<LeafEntry>;
}

/// Selects the table layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TreeFormat {
    #[default]
    Direct,
    Canonical,
}

impl TreeFormat {
    pub fn codec(self) -> &'static dyn TreeCodec {
        match self {
            TreeFormat::Direct => &DirectTree,
            TreeFormat::Canonical => &CanonicalTree,
        }
    }
}

impl Display for TreeFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeFormat::Direct => write!(f, "direct"),
            TreeFormat::Canonical => write!(f, "canonical"),
        }
    }
}

/// Decode one symbol from the bitstream and append its bytes to out.
pub fn decode_symbol(
    codec: &dyn TreeCodec,
    packed: &[u8],
    table_pos: usize,
    bits: &mut BitReader<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut pos = codec.walk(packed, table_pos, bits)?;
    for _ in 0..MAX_SUFFIX_HOPS {
        let entry = codec.entry(packed, pos)?;
        out.extend_from_slice(entry_bytes(packed, &entry)?);
        match entry.link {
            Some(link) => pos = link,
            None => return Ok(()),
        }
    }
    Err(HuffmunchError::MalformedStream(format!(
        "suffix chain from {} does not end",
        pos
    )))
}

/// The string bytes stored directly in an entry.
pub(crate) fn entry_bytes<'a>(packed: &'a [u8], entry: &LeafEntry) -> Result<&'a [u8]> {
    packed
        .get(entry.start..entry.start + entry.len)
        .ok_or_else(|| out_of_bounds(entry.start + entry.len))
}

pub(crate) fn byte_at(packed: &[u8], pos: usize) -> Result<u8> {
    packed.get(pos).copied().ok_or_else(|| out_of_bounds(pos))
}

/// Little endian 16-bit value at pos.
pub(crate) fn u16_at(packed: &[u8], pos: usize) -> Result<usize> {
    Ok(byte_at(packed, pos)? as usize | (byte_at(packed, pos + 1)? as usize) << 8)
}

fn out_of_bounds(pos: usize) -> HuffmunchError {
    HuffmunchError::MalformedStream(format!("table read past end of data at {}", pos))
}

/// A suffix reference waiting for the position of the symbol it points to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fixup {
    pub position: usize,
    pub sym: SymbolId,
}

impl Fixup {
    /// Record a fixup at the end of output and reserve its two bytes.
    pub fn reserve(output: &mut Vec<u8>, sym: SymbolId) -> Self {
        let fixup = Fixup {
            position: output.len(),
            sym,
        };
        output.extend_from_slice(&FIXUP_MARK);
        fixup
    }
}

/// Second pass: fill in every suffix reference now that all entry positions are known.
pub(crate) fn apply_fixups(
    fixups: &[Fixup],
    positions: &[Option<usize>],
    output: &mut [u8],
) -> Result<()> {
    for f in fixups {
        let link = positions
            .get(f.sym as usize)
            .copied()
            .flatten()
            .ok_or_else(|| {
                HuffmunchError::Internal(format!("suffix symbol {} has no table entry", f.sym))
            })?;
        if link > 0xFFFF {
            return Err(HuffmunchError::FormatLimit(format!(
                "dictionary suffix reference {} too large",
                link
            )));
        }
        if output[f.position..f.position + 2] != FIXUP_MARK {
            return Err(HuffmunchError::Internal(format!(
                "fixup at {} overwritten",
                f.position
            )));
        }
        output[f.position] = (link & 0xFF) as u8;
        output[f.position + 1] = (link >> 8) as u8;
    }
    Ok(())
}

/// Check that the emitted table size matches the prediction.
pub(crate) fn check_size(what: &str, predicted: usize, emitted: usize) -> Result<()> {
    if predicted != emitted {
        return Err(HuffmunchError::Internal(format!(
            "{} predicted {} bytes but emitted {}",
            what, predicted, emitted
        )));
    }
    Ok(())
}
