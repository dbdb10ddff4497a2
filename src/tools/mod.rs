//! The tools module provides the pieces around the codec itself.
//!
//! The tools are:
//! - options: Codec options shared by compression and decompression.
//! - cli: Command line interface for huffmunch.
//! - freq_count: Frequency count of a symbol stream.
//! - list_file: Parser for list files describing a set of sources.
//! - bank: Packing a set of sources into fixed size banks.
//!
pub mod bank;
pub mod cli;
pub mod freq_count;
pub mod list_file;
pub mod options;
