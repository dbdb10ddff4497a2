//! BitReader: reads the huffman bitstream out of a packed huffmunch buffer.
//!
//! Bits are taken from each byte starting at the least significant bit. Reading past
//! the end of the buffer is not an error: the reader simply returns 0 bits, which lets
//! a decoder finish the last symbol of a block without bounds checks.
//!

/// Reads bits from an in-memory packed buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
    bit_index: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader positioned at the start of buffer.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// True once the cursor has moved past the last byte.
    pub fn end(&self) -> bool {
        self.cursor >= self.buffer.len()
    }

    /// Return the next bit (1 or 0). Returns 0 if there is no more data to read.
    pub fn bit(&mut self) -> u32 {
        if self.end() {
            return 0;
        }
        let bit = (self.buffer[self.cursor] >> self.bit_index) & 1;
        self.bit_index += 1;
        if self.bit_index >= 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        bit as u32
    }

    /// Return *true* if the next bit is 1, *false* if 0 (or past the end).
    pub fn bool_bit(&mut self) -> bool {
        self.bit() == 1
    }

    /// Move to a byte position plus a bit offset within that byte. Seeks only happen at
    /// split starts, so stepping over the bits one at a time is fine.
    pub fn seek(&mut self, byte: usize, bit: u8) {
        self.cursor = byte;
        self.bit_index = 0;
        for _ in 0..bit {
            self.bit();
        }
    }

    /// Skip the rest of a partially read byte.
    pub fn skip_flush(&mut self) {
        if self.end() {
            return;
        }
        if self.bit_index != 0 {
            self.bit_index = 0;
            self.cursor += 1;
        }
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}
