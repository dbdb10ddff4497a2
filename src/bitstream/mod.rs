//! The bitstream module forms the bit level I/O subsystem for huffmunch.
//!
//! Huffmunch packs its huffman codes least significant bit first within each byte, and
//! byte-aligns the stream at the start of every split so a decoder can seek straight
//! to any block. The same bit order must be used by every decoder of the format,
//! including the minimal 8-bit runtime decoders, so both halves live here together.
//!
//! This I/O subsystem is designed to interface with the other modules within huffmunch.
//! It is not intended for more general use.
//!
pub mod bitreader;
pub mod bitwriter;
