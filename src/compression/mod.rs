//! The compression module holds the public entry points of huffmunch.
//!
//! Compression happens in the following steps:
//! - Split markers are put into the data at the start of every split.
//! - Muncher: build a dictionary of strings that makes the data as small as possible.
//! - Huffman coding: build the tree for the final symbol stream and write its table.
//! - Each split is huffman coded on its own, starting on a byte boundary.
//! - Header: the split count, where each split starts and how long it unpacks.
//!
//! Decompression reads the header, then decodes any split on its own by seeking to its
//! start and walking the table for each symbol.
//!
//! Packed layout:
//! - header: split count, split starts, split lengths (header_width bytes each)
//! - table: direct or canonical tree
//! - stream: one byte aligned huffman bitstream per split
//!

pub mod compress;
pub mod decompress;
pub mod header;
pub mod stream_decoder;
