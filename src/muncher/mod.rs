//! The muncher builds the dictionary.
//!
//! Starting from a dictionary of single bytes, it repeatedly looks for repeated strings of
//! symbols, merges the most promising one into a new symbol, and keeps the merge only if
//! the huffman coded data plus its table got smaller. The table size used here is the
//! prediction from the dictionary module, so nothing is actually built until the search
//! is over.
//!
//! - rolling_hash: finds and counts repeated strings of a given width.
//! - munch: the search itself, and the size estimate it optimizes.

pub mod munch;
pub mod rolling_hash;
