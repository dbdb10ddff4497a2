//! Codec options - the knobs the compressor and decompressor share.
//!
//! Options are passed explicitly to every entry point. The packed data does not record
//! them, so a decoder must be handed the same tree format and header width that were
//! used to compress.

use crate::dictionary::TreeFormat;
use crate::error::{HuffmunchError, Result};

/// Longest dictionary string the table formats can store.
pub const MAX_SYMBOL_SIZE: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
/// All settings that control compression
pub struct CodecOpts {
    /// Table layout
    pub tree_format: TreeFormat,
    /// Bytes per header integer
    pub header_width: usize,
    /// Longest string (in symbols) searched for repeats on each pass
    pub search_width: usize,
    /// Failed trials allowed per pass before giving up, 0 for no limit
    pub cutoff: usize,
    /// Longest dictionary string allowed
    pub max_symbol_size: usize,
    /// Deepest tree allowed in canonical format
    pub canonical_depth: usize,
    /// Decode the result after compressing and check it
    pub verify: bool,
}

impl CodecOpts {
    pub fn new() -> Self {
        Self {
            tree_format: TreeFormat::Direct,
            header_width: 2,
            search_width: 3,
            cutoff: 100,
            max_symbol_size: MAX_SYMBOL_SIZE,
            canonical_depth: 24,
            verify: true,
        }
    }

    /// Check every setting is in range.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, value: usize, lo: usize, hi: usize| {
            if value < lo || value > hi {
                Err(HuffmunchError::InvalidConfig(format!(
                    "{} must be {}-{}, not {}",
                    name, lo, hi, value
                )))
            } else {
                Ok(())
            }
        };
        check("header width", self.header_width, 1, 4)?;
        check("search width", self.search_width, 2, 16)?;
        check("maximum symbol size", self.max_symbol_size, 1, MAX_SYMBOL_SIZE)?;
        check("canonical depth", self.canonical_depth, 1, 32)
    }

    /// Bytes of header in front of the table for split_count splits.
    pub fn header_bytes(&self, split_count: usize) -> usize {
        (1 + 2 * split_count) * self.header_width
    }
}

impl Default for CodecOpts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_valid_test() {
        let opts = CodecOpts::default();
        assert!(opts.validate().is_ok());
        assert_eq!(opts.header_bytes(1), 6);
    }

    #[test]
    fn out_of_range_test() {
        let bad = [
            CodecOpts { header_width: 0, ..CodecOpts::new() },
            CodecOpts { header_width: 5, ..CodecOpts::new() },
            CodecOpts { search_width: 1, ..CodecOpts::new() },
            CodecOpts { search_width: 17, ..CodecOpts::new() },
            CodecOpts { max_symbol_size: 256, ..CodecOpts::new() },
            CodecOpts { canonical_depth: 0, ..CodecOpts::new() },
        ];
        for opts in bad {
            assert!(matches!(opts.validate(), Err(HuffmunchError::InvalidConfig(_))));
        }
    }
}
