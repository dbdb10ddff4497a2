//! The huffman module builds the prefix code trees for huffmunch and writes the coded
//! bitstream. Decoding the huffman data happens by walking the serialized tree in the
//! dictionary module.
//!
//! A huffman tree is rebuilt from scratch every time the muncher needs to know how big a
//! candidate dictionary would be, so the builder is kept simple: an arena of nodes, a
//! binary heap, and ties broken by insertion order.
//!
//! The canonical table format needs trees of bounded depth. `depth_limit` provides a
//! builder that flattens the symbol weights until the tree fits.
//!

pub mod depth_limit;
pub mod huffman;
