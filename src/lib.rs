//! Huffmunch: dictionary compression for small playback decoders.
//!
//! Version 0.1.0
//!
//! Huffmunch builds a custom dictionary of strings for the data, huffman codes the
//! result, and stores the tree together with the dictionary strings in a compact table.
//! The data can be split into blocks that are each byte aligned, so a decoder can start
//! at any block and unpack it one byte at a time with almost no memory. This suits
//! 8-bit machines that need to pull text or level data out of a compressed bank on
//! demand. Compression is slow: the dictionary search recompresses the data many times.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> huffmunch -B in.bin out.hfm`
//!
//! From Rust:
//!
//! ```
//! use huffmunch::{compress, decompress, CodecOpts};
//!
//! let opts = CodecOpts::default();
//! let packed = compress(b"hello hello hello", None, &opts).unwrap();
//! assert_eq!(decompress(&packed, &opts).unwrap(), b"hello hello hello");
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod dictionary;
pub mod error;
pub mod huffman_coding;
pub mod muncher;
pub mod tools;

pub use compression::compress::{compress, compress_into};
pub use compression::decompress::{decompress, decompress_blocks, decompress_into};
pub use compression::stream_decoder::StreamDecoder;
pub use dictionary::TreeFormat;
pub use error::{HuffmunchError, Result, Status};
pub use tools::options::CodecOpts;
