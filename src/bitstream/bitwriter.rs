/// Writes a bitstream onto the end of an existing byte buffer. Bits are packed into
/// each byte starting at the least significant bit. Multi-bit huffman codes are
/// written with their most significant code bit first, matching the order in which
/// the decoder walks the tree.
pub struct BitWriter<'a> {
    /// Output buffer the finished bytes are appended to.
    output: &'a mut Vec<u8>,
    /// Byte currently being assembled.
    queue: u8,
    /// Count of valid bits in the queue.
    q_bits: u8,
}

impl<'a> BitWriter<'a> {
    /// Create a new BitWriter that appends to output. Anything already in output is
    /// left untouched, so the header and table can be written before the stream.
    pub fn new(output: &'a mut Vec<u8>) -> Self {
        Self {
            output,
            queue: 0,
            q_bits: 0,
        }
    }

    /// Put a single bit on the stream.
    pub fn out1(&mut self, bit: bool) {
        self.queue |= (bit as u8) << self.q_bits;
        self.q_bits += 1;
        if self.q_bits >= 8 {
            self.flush();
        }
    }

    /// Put the low `len` bits of `code` on the stream, most significant first.
    pub fn out_code(&mut self, code: u64, len: u8) {
        for i in (0..len).rev() {
            self.out1((code >> i) & 1 == 1);
        }
    }

    /// Finish the current byte, padding with zeros. Flush MUST be called at the end of
    /// each split or the last partial byte is lost.
    pub fn flush(&mut self) {
        if self.q_bits > 0 {
            self.output.push(self.queue);
            self.q_bits = 0;
        }
        self.queue = 0;
    }

    /// Byte length of the output so far, not counting a partial byte.
    pub fn len(&self) -> usize {
        self.output.len()
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.output.len(), self.q_bits)
    }
}

#[cfg(test)]
mod test {
    use super::BitWriter;

    #[test]
    fn lsb_first_test() {
        let mut out = vec![];
        let mut bw = BitWriter::new(&mut out);
        bw.out1(true);
        bw.out1(false);
        bw.out1(false);
        bw.out1(true);
        bw.flush();
        assert_eq!(out, vec![0b0000_1001]);
    }

    #[test]
    fn out_code_msb_first_test() {
        let mut out = vec![0xAA];
        let mut bw = BitWriter::new(&mut out);
        // code 110 goes out as 1, 1, 0
        bw.out_code(0b110, 3);
        assert_eq!(bw.loc(), "[1.3]");
        bw.out_code(0b11111, 5);
        assert_eq!(bw.len(), 2);
        bw.flush();
        assert_eq!(out, vec![0xAA, 0b1111_1011]);
    }

    #[test]
    fn flush_empty_test() {
        let mut out = vec![];
        let mut bw = BitWriter::new(&mut out);
        bw.flush();
        bw.out_code(0, 0);
        bw.flush();
        assert!(out.is_empty());
    }
}
