//! Direct table layout: the huffman tree written out node by node.
//!
//! Branch: a skip byte holding (left subtree bytes + 1), then the left subtree, then the
//! right subtree. A 0 bit continues to the left child right after the header, a 1 bit
//! skips over the left subtree. When the left subtree is 254 bytes or more the skip is
//! written as 255 followed by a 16-bit left subtree size. The smaller subtree always goes
//! on the left to keep skips short.
//!
//! Leaf: skip values 0-2 cannot occur for a branch (a leaf is at least 2 bytes), so they
//! tag leaves instead:
//! - 0, byte: a single byte string
//! - 1, length, bytes: a string
//! - 2, length, prefix bytes, 16-bit position: prefix followed by the string of the
//!   leaf at that position

use log::trace;

use super::suffix::suffix_table;
use super::{apply_fixups, byte_at, check_size, u16_at, Fixup, LeafEntry, TreeCodec};
use crate::bitstream::bitreader::BitReader;
use crate::error::{HuffmunchError, Result};
use crate::huffman_coding::huffman::{HuffCode, HuffTree, NodeData, SymbolId, MAX_CODE_LEN};

const SUFFIX_OVERHEAD: usize = 2;
const MAX_STRING: usize = 255;

const TAG_BYTE: u8 = 0;
const TAG_STRING: u8 = 1;
const TAG_SUFFIX: u8 = 2;
const LONG_SKIP: u8 = 255;

/// The direct tree layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectTree;

/// Size of a leaf holding a string of len bytes, sharing suffix_len of them if Some.
fn leaf_bytes(len: usize, suffix_len: Option<usize>) -> Result<usize> {
    if len == 0 || len > MAX_STRING {
        return Err(HuffmunchError::FormatLimit(format!(
            "dictionary string of {} bytes",
            len
        )));
    }
    Ok(match (len, suffix_len) {
        (1, _) => 2,
        (_, Some(shared)) => 2 + (len - shared) + 2,
        _ => 2 + len,
    })
}

/// Size of a branch header whose left subtree is left bytes long.
fn header_bytes(left: usize) -> Result<usize> {
    let skip = left + 1;
    if skip < LONG_SKIP as usize {
        Ok(1)
    } else if left > 0xFFFF {
        Err(HuffmunchError::FormatLimit(format!(
            "huffman tree branch of {} bytes",
            left
        )))
    } else {
        Ok(3)
    }
}

/// Everything both the estimator and the builder need: the suffix of each symbol and the
/// serialized size of each subtree.
struct Layout {
    suffixes: Vec<Option<SymbolId>>,
    sizes: Vec<usize>,
}

impl Layout {
    fn new(tree: &HuffTree, symbols: &[Vec<u8>]) -> Result<Self> {
        let suffixes = suffix_table(tree.visited(), symbols, SUFFIX_OVERHEAD);
        let mut sizes = vec![0; tree.node_count()];
        // Children come before parents in the arena, so one forward pass is enough.
        for idx in 0..tree.node_count() {
            sizes[idx] = match tree.node(idx).node_data {
                NodeData::Leaf(sym) => {
                    let shared = suffixes[sym as usize].map(|x| symbols[x as usize].len());
                    leaf_bytes(symbols[sym as usize].len(), shared)?
                }
                NodeData::Kids(a, b) => {
                    header_bytes(sizes[a].min(sizes[b]))? + sizes[a] + sizes[b]
                }
            };
        }
        Ok(Layout { suffixes, sizes })
    }
}

struct Builder<'a> {
    tree: &'a HuffTree,
    symbols: &'a [Vec<u8>],
    layout: Layout,
    codes: Vec<Option<HuffCode>>,
    positions: Vec<Option<usize>>,
    fixups: Vec<Fixup>,
    output: &'a mut Vec<u8>,
}

impl<'a> Builder<'a> {
    fn node(&mut self, idx: usize, depth: usize, code: u64) -> Result<()> {
        let start = self.output.len();
        match self.tree.node(idx).node_data {
            NodeData::Leaf(sym) => self.leaf(sym, depth, code)?,
            NodeData::Kids(c0, c1) => {
                if depth >= MAX_CODE_LEN {
                    return Err(HuffmunchError::FormatLimit(format!(
                        "huffman tree deeper than {}",
                        MAX_CODE_LEN
                    )));
                }
                // put the smaller branch on the left
                let (mut left, mut right) = (c0, c1);
                if self.layout.sizes[right] < self.layout.sizes[left] {
                    std::mem::swap(&mut left, &mut right);
                }
                let ta = self.layout.sizes[left];
                let tb = self.layout.sizes[right];

                let skip = ta + 1;
                if skip < LONG_SKIP as usize {
                    self.output.push(skip as u8);
                } else {
                    header_bytes(ta)?;
                    self.output.push(LONG_SKIP);
                    self.output.push((ta & 0xFF) as u8);
                    self.output.push((ta >> 8) as u8);
                }

                let pa = self.output.len();
                self.node(left, depth + 1, code << 1)?;
                check_size("left branch", ta, self.output.len() - pa)?;
                let pb = self.output.len();
                self.node(right, depth + 1, (code << 1) | 1)?;
                check_size("right branch", tb, self.output.len() - pb)?;
            }
        }
        check_size("subtree", self.layout.sizes[idx], self.output.len() - start)
    }

    fn leaf(&mut self, sym: SymbolId, depth: usize, code: u64) -> Result<()> {
        let e = sym as usize;
        if self.codes[e].is_some() {
            return Err(HuffmunchError::Internal(format!("symbol {} in tree twice", sym)));
        }
        self.codes[e] = Some(HuffCode {
            bits: code,
            len: depth as u8,
        });
        self.positions[e] = Some(self.output.len());

        let s = &self.symbols[e];
        let suffix = self.layout.suffixes[e];
        trace!(
            "code {:0width$b}/{} at {}: {} bytes{}",
            code,
            depth,
            self.output.len(),
            s.len(),
            if suffix.is_some() { " (suffix)" } else { "" },
            width = depth
        );

        match (s.len(), suffix) {
            (1, _) => {
                self.output.push(TAG_BYTE);
                self.output.push(s[0]);
            }
            (len, Some(x)) => {
                let emit = len - self.symbols[x as usize].len();
                self.output.push(TAG_SUFFIX);
                self.output.push(emit as u8);
                self.output.extend_from_slice(&s[..emit]);
                let fixup = Fixup::reserve(self.output, x);
                self.fixups.push(fixup);
            }
            (len, None) => {
                self.output.push(TAG_STRING);
                self.output.push(len as u8);
                self.output.extend_from_slice(s);
            }
        }
        Ok(())
    }
}

/// Read a node header at pos. Returns the skip value and the position after the header.
fn read_skip(packed: &[u8], pos: usize) -> Result<(usize, usize)> {
    let skip = byte_at(packed, pos)?;
    if skip == LONG_SKIP {
        Ok((u16_at(packed, pos + 1)? + 1, pos + 3))
    } else {
        Ok((skip as usize, pos + 1))
    }
}

impl TreeCodec for DirectTree {
    fn suffix_overhead(&self) -> usize {
        SUFFIX_OVERHEAD
    }

    fn table_bytes(&self, tree: &HuffTree, symbols: &[Vec<u8>]) -> Result<usize> {
        match tree.root() {
            Some(root) => Ok(Layout::new(tree, symbols)?.sizes[root]),
            None => Ok(0),
        }
    }

    fn build(
        &self,
        tree: &HuffTree,
        symbols: &[Vec<u8>],
        output: &mut Vec<u8>,
    ) -> Result<Vec<Option<HuffCode>>> {
        let table_pos = output.len();
        let mut builder = Builder {
            tree,
            symbols,
            layout: Layout::new(tree, symbols)?,
            codes: vec![None; symbols.len()],
            positions: vec![None; symbols.len()],
            fixups: Vec::new(),
            output,
        };
        let predicted = match tree.root() {
            Some(root) => {
                builder.node(root, 0, 0)?;
                builder.layout.sizes[root]
            }
            None => 0,
        };
        let Builder {
            codes,
            positions,
            fixups,
            output,
            ..
        } = builder;
        apply_fixups(&fixups, &positions, output)?;
        check_size("direct table", predicted, output.len() - table_pos)?;
        Ok(codes)
    }

    fn walk(&self, packed: &[u8], table_pos: usize, bits: &mut BitReader<'_>) -> Result<usize> {
        let mut pos = table_pos;
        loop {
            let (skip, next) = read_skip(packed, pos)?;
            if skip <= TAG_SUFFIX as usize {
                return Ok(pos);
            }
            pos = if bits.bool_bit() {
                // take right node
                next + skip - 1
            } else {
                next
            };
        }
    }

    fn entry(&self, packed: &[u8], pos: usize) -> Result<LeafEntry> {
        match byte_at(packed, pos)? {
            TAG_BYTE => Ok(LeafEntry {
                start: pos + 1,
                len: 1,
                link: None,
            }),
            TAG_STRING => Ok(LeafEntry {
                start: pos + 2,
                len: byte_at(packed, pos + 1)? as usize,
                link: None,
            }),
            TAG_SUFFIX => {
                let len = byte_at(packed, pos + 1)? as usize;
                if len < 1 {
                    return Err(HuffmunchError::MalformedStream(format!(
                        "empty suffixed string at {}",
                        pos
                    )));
                }
                Ok(LeafEntry {
                    start: pos + 2,
                    len,
                    link: Some(u16_at(packed, pos + 2 + len)?),
                })
            }
            tag => Err(HuffmunchError::MalformedStream(format!(
                "invalid suffix: branch {} where a leaf was expected at {}",
                tag, pos
            ))),
        }
    }
}
