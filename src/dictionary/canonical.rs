//! Canonical table layout.
//!
//! Only the number of leaves on each level of the huffman tree is stored, followed by the
//! leaf strings in code order. Codes are handed out canonically: consecutive on a level,
//! then doubled when moving down a level. The decoder rebuilds a code from the level
//! counts alone, which saves the branch headers of the direct layout at the cost of a
//! linear scan through the strings for every symbol.
//!
//! Layout:
//! - level count (intx)
//! - leaves on each level, root level first (intx each)
//! - strings: `len, bytes` or `0, len, prefix bytes, 16-bit position` for a prefix
//!   followed by another string of the table

use log::trace;

use super::intx::{intx_size, read_intx, write_intx};
use super::suffix::suffix_table;
use super::{apply_fixups, byte_at, check_size, u16_at, Fixup, LeafEntry, TreeCodec};
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffmunchError, Result};
use crate::huffman_coding::huffman::{HuffCode, HuffTree, SymbolId, MAX_CODE_LEN};

const SUFFIX_OVERHEAD: usize = 3;
const MAX_STRING: usize = 255;
const TAG_SUFFIX: u8 = 0;

/// The canonical tree layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalTree;

/// Leaves of the tree grouped by depth, each level in left to right order.
fn levels(tree: &HuffTree) -> Vec<Vec<SymbolId>> {
    let mut levels: Vec<Vec<SymbolId>> = Vec::new();
    for (sym, depth) in tree.leaves() {
        if levels.len() <= depth {
            levels.resize_with(depth + 1, Vec::new);
        }
        levels[depth].push(sym);
    }
    levels
}

fn check_string(len: usize) -> Result<()> {
    if len == 0 || len > MAX_STRING {
        return Err(HuffmunchError::FormatLimit(format!(
            "dictionary string of {} bytes",
            len
        )));
    }
    Ok(())
}

fn malformed(what: &str, pos: usize) -> HuffmunchError {
    HuffmunchError::MalformedStream(format!("{} at {}", what, pos))
}

impl TreeCodec for CanonicalTree {
    fn suffix_overhead(&self) -> usize {
        SUFFIX_OVERHEAD
    }

    fn table_bytes(&self, tree: &HuffTree, symbols: &[Vec<u8>]) -> Result<usize> {
        if tree.root().is_none() {
            return Ok(0);
        }
        let levels = levels(tree);
        let mut bytes = intx_size(levels.len())?;
        for level in &levels {
            bytes += intx_size(level.len())?;
        }

        let suffixes = suffix_table(tree.visited(), symbols, SUFFIX_OVERHEAD);
        for (e, s) in symbols.iter().enumerate() {
            if !tree.is_visited(e as SymbolId) {
                continue;
            }
            check_string(s.len())?;
            bytes += match suffixes[e] {
                // tag, length, prefix, reference
                Some(x) => 1 + 1 + (s.len() - symbols[x as usize].len()) + 2,
                None => 1 + s.len(),
            };
        }
        Ok(bytes)
    }

    fn build(
        &self,
        tree: &HuffTree,
        symbols: &[Vec<u8>],
        output: &mut Vec<u8>,
    ) -> Result<Vec<Option<HuffCode>>> {
        let table_pos = output.len();
        let predicted = self.table_bytes(tree, symbols)?;
        let mut codes = vec![None; symbols.len()];
        if tree.root().is_none() {
            return Ok(codes);
        }

        let levels = levels(tree);
        if levels.len() > MAX_CODE_LEN + 1 {
            return Err(HuffmunchError::FormatLimit(format!(
                "canonical tree {} levels deep",
                levels.len()
            )));
        }
        write_intx(levels.len(), output)?;
        for level in &levels {
            write_intx(level.len(), output)?;
        }

        let suffixes = suffix_table(tree.visited(), symbols, SUFFIX_OVERHEAD);
        let mut positions = vec![None; symbols.len()];
        let mut fixups = Vec::new();
        let mut bitcode: u64 = 0;
        for (depth, level) in levels.iter().enumerate() {
            for &e in level {
                let code = HuffCode {
                    bits: bitcode,
                    len: depth as u8,
                };
                bitcode += 1;
                let idx = e as usize;
                if codes[idx].is_some() {
                    return Err(HuffmunchError::Internal(format!("symbol {} in tree twice", e)));
                }
                codes[idx] = Some(code);
                positions[idx] = Some(output.len());

                let s = &symbols[idx];
                check_string(s.len())?;
                match suffixes[idx] {
                    Some(x) => {
                        let emit = s.len() - symbols[x as usize].len();
                        output.push(TAG_SUFFIX);
                        output.push(emit as u8);
                        output.extend_from_slice(&s[..emit]);
                        fixups.push(Fixup::reserve(output, x));
                    }
                    None => {
                        output.push(s.len() as u8);
                        output.extend_from_slice(s);
                    }
                }
                trace!("symbol {}/{}: {} bytes, suffix {:?}", code.bits, depth, s.len(), suffixes[idx]);
            }
            // the next level starts after the internal nodes of this one
            bitcode *= 2;
        }

        apply_fixups(&fixups, &positions, output)?;
        check_size("canonical table", predicted, output.len() - table_pos)?;
        Ok(codes)
    }

    fn walk(&self, packed: &[u8], table_pos: usize, bits: &mut BitReader<'_>) -> Result<usize> {
        let (depth, mut pos) = read_intx(packed, table_pos)?;

        let mut fc: u64 = 0; // first code at current depth
        let mut fs: usize = 0; // first string at current depth
        let mut b: u64 = 0; // code read so far
        let mut found = None;
        for d in 0..depth {
            let (ds, next) = read_intx(packed, pos)?;
            pos = next;
            if found.is_some() {
                // skip to the end of the count table
                continue;
            }
            let dc = b
                .checked_sub(fc)
                .ok_or_else(|| malformed("code below level start", pos))?;
            if dc < ds as u64 {
                found = Some(fs + dc as usize);
                continue;
            }
            fs += ds;
            fc = (fc + ds as u64)
                .checked_mul(2)
                .ok_or_else(|| malformed("code too long", pos))?;
            b = b
                .checked_mul(2)
                .ok_or_else(|| malformed("code too long", pos))?
                | bits.bit() as u64;
            trace!("level {}: code {} first {}", d, b, fc);
        }
        let s = found.ok_or_else(|| malformed("code matches no string", table_pos))?;

        // linear scan for string s
        for _ in 0..s {
            let len = byte_at(packed, pos)? as usize;
            pos += if len != 0 {
                1 + len
            } else {
                2 + byte_at(packed, pos + 1)? as usize + 2
            };
        }
        Ok(pos)
    }

    fn entry(&self, packed: &[u8], pos: usize) -> Result<LeafEntry> {
        let len = byte_at(packed, pos)? as usize;
        if len != 0 {
            return Ok(LeafEntry {
                start: pos + 1,
                len,
                link: None,
            });
        }
        let len = byte_at(packed, pos + 1)? as usize;
        if len < 1 {
            return Err(malformed("empty suffixed string", pos));
        }
        Ok(LeafEntry {
            start: pos + 2,
            len,
            link: Some(u16_at(packed, pos + 2 + len)?),
        })
    }
}
