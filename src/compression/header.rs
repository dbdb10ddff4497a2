//! The packed header: split count, then the packed start of every split, then the
//! unpacked length of every split. Each value is a little endian integer of
//! `header_width` bytes.

use crate::error::{HuffmunchError, Result};
use crate::tools::options::CodecOpts;

/// Write value into slot index of the header at the front of packed.
pub fn pack_header(value: usize, index: usize, packed: &mut [u8], width: usize) -> Result<()> {
    if width < 8 && (value as u64) >> (8 * width) != 0 {
        return Err(HuffmunchError::SplitOverflow { value, width });
    }
    let start = index * width;
    let slot = packed
        .get_mut(start..start + width)
        .ok_or_else(|| HuffmunchError::Internal(format!("header slot {} out of range", index)))?;
    for (i, b) in slot.iter_mut().enumerate() {
        *b = (value >> (8 * i)) as u8;
    }
    Ok(())
}

/// Read slot index of the header.
pub fn unpack_header(index: usize, packed: &[u8], width: usize) -> Result<usize> {
    let start = index * width;
    let slot = packed.get(start..start + width).ok_or_else(|| {
        HuffmunchError::MalformedStream(format!("header slot {} past end of data", index))
    })?;
    Ok(slot
        .iter()
        .rev()
        .fold(0, |v, &b| (v << 8) | b as usize))
}

/// Parsed header of a packed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Packed position of the first stream byte of each split
    pub starts: Vec<usize>,
    /// Unpacked length of each split
    pub lengths: Vec<usize>,
    /// Position of the table, right after the header
    pub table_pos: usize,
}

impl Header {
    pub fn read(packed: &[u8], opts: &CodecOpts) -> Result<Self> {
        let width = opts.header_width;
        let count = unpack_header(0, packed, width)?;
        // every split needs two header slots, so the count is bounded by the data
        if count > packed.len() / (2 * width) {
            return Err(HuffmunchError::MalformedStream(format!(
                "{} splits cannot fit in {} bytes",
                count,
                packed.len()
            )));
        }
        let mut starts = Vec::with_capacity(count);
        let mut lengths = Vec::with_capacity(count);
        for i in 0..count {
            starts.push(unpack_header(1 + i, packed, width)?);
            lengths.push(unpack_header(1 + count + i, packed, width)?);
        }
        Ok(Header {
            starts,
            lengths,
            table_pos: opts.header_bytes(count),
        })
    }

    pub fn split_count(&self) -> usize {
        self.starts.len()
    }

    /// Total unpacked length of all splits.
    pub fn total_length(&self) -> usize {
        self.lengths.iter().sum()
    }
}
