//! Byte at a time decoder.
//!
//! Mirrors what a small playback decoder does: after loading a block it hands out one
//! unpacked byte per call, keeping only the bit cursor and the string segment it is in
//! the middle of. Nothing is decoded ahead.

use log::trace;

use super::header::Header;
use crate::bitstream::bitreader::BitReader;
use crate::dictionary::{byte_at, decode_symbol, TreeCodec, MAX_SUFFIX_HOPS};
use crate::error::{HuffmunchError, Result};
use crate::tools::options::CodecOpts;

pub struct StreamDecoder<'a> {
    packed: &'a [u8],
    codec: &'static dyn TreeCodec,
    header: Header,
    bits: BitReader<'a>,
    /// Next byte of the current string segment
    pos: usize,
    /// Bytes left in the current segment
    len: usize,
    /// Table entry holding the rest of the current string
    link: Option<usize>,
    /// Suffix links followed for the current string
    hops: usize,
    /// Bytes left in the loaded block
    remaining: usize,
}

impl<'a> StreamDecoder<'a> {
    /// Read the header of packed. No block is loaded yet.
    pub fn new(packed: &'a [u8], opts: &CodecOpts) -> Result<Self> {
        opts.validate()?;
        let header = Header::read(packed, opts)?;
        trace!(
            "{} blocks, {} bytes, table at {}",
            header.split_count(),
            header.total_length(),
            header.table_pos
        );
        Ok(StreamDecoder {
            packed,
            codec: opts.tree_format.codec(),
            header,
            bits: BitReader::new(packed),
            pos: 0,
            len: 0,
            link: None,
            hops: 0,
            remaining: 0,
        })
    }

    pub fn block_count(&self) -> usize {
        self.header.split_count()
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Start decoding block index. Returns its unpacked length.
    pub fn load(&mut self, index: usize) -> Result<usize> {
        let (start, length) = match (self.header.starts.get(index), self.header.lengths.get(index)) {
            (Some(&start), Some(&length)) => (start, length),
            _ => {
                return Err(HuffmunchError::MalformedStream(format!(
                    "block {} of {} requested",
                    index,
                    self.block_count()
                )))
            }
        };
        self.bits.seek(start, 0);
        self.len = 0;
        self.link = None;
        self.remaining = length;
        Ok(length)
    }

    /// Next unpacked byte of the loaded block.
    pub fn read(&mut self) -> Result<u8> {
        if self.remaining == 0 {
            return Err(HuffmunchError::MalformedStream(
                "read past the end of the block".to_string(),
            ));
        }
        while self.len == 0 {
            let entry_pos = match self.link.take() {
                Some(link) => {
                    self.hops += 1;
                    if self.hops >= MAX_SUFFIX_HOPS {
                        return Err(HuffmunchError::MalformedStream(format!(
                            "suffix chain at {} does not end",
                            link
                        )));
                    }
                    link
                }
                None => {
                    self.hops = 0;
                    self.codec
                        .walk(self.packed, self.header.table_pos, &mut self.bits)?
                }
            };
            let entry = self.codec.entry(self.packed, entry_pos)?;
            if entry.len == 0 && entry.link.is_none() {
                return Err(HuffmunchError::MalformedStream(format!(
                    "empty string at {}",
                    entry_pos
                )));
            }
            self.pos = entry.start;
            self.len = entry.len;
            self.link = entry.link;
        }
        let b = byte_at(self.packed, self.pos)?;
        self.pos += 1;
        self.len -= 1;
        self.remaining -= 1;
        Ok(b)
    }

    /// Decode all of block index at once, a whole symbol at a time.
    pub fn read_block(&mut self, index: usize) -> Result<Vec<u8>> {
        let length = self.load(index)?;
        let mut out = Vec::with_capacity(length);
        while out.len() < length {
            decode_symbol(
                self.codec,
                self.packed,
                self.header.table_pos,
                &mut self.bits,
                &mut out,
            )?;
        }
        self.remaining = 0;
        if out.len() != length {
            return Err(HuffmunchError::MalformedStream(format!(
                "block {} decoded to {} bytes, expected {}",
                index,
                out.len(),
                length
            )));
        }
        Ok(out)
    }
}
