//! Depth-limited huffman tree construction.
//!
//! The canonical table format is decoded by arithmetic on the code of each level, and
//! its decoders keep that code in a fixed width register. The tree therefore has to be
//! kept to a maximum depth. If the frequencies supplied create a deeper tree, the
//! weights will be flattened and another attempt will be made, the same way bzip2
//! keeps its code lengths under 17 bits.
//!
//! Only the shape of the tree is affected: the leaves keep their true counts, so the
//! bit length reported by the tree is still exact for the data.

use log::debug;

use super::huffman::{HuffTree, SymbolId};
use crate::error::{HuffmunchError, Result};
use crate::tools::freq_count::symbol_freqs;

/// Build a huffman tree for data with no leaf deeper than max_depth.
pub fn build_limited(data: &[SymbolId], symbol_count: usize, max_depth: usize) -> Result<HuffTree> {
    let counts = symbol_freqs(data, symbol_count);
    let mut weights = counts.clone();

    loop {
        let tree = HuffTree::from_weights(&counts, &weights);
        let depth = tree.depth();
        if depth <= max_depth {
            return Ok(tree);
        }
        debug!("Tree depth {} exceeds {}, flattening weights", depth, max_depth);

        // Adjust weights by dividing each weight by 2 and adding 1.
        // This "flattens" the node tree. Then go try this again.
        let mut changed = false;
        for w in weights.iter_mut().filter(|w| **w > 0) {
            let flat = 1 + *w / 2;
            changed |= flat != *w;
            *w = flat;
        }
        if !changed {
            // Weights are stuck at 1 and 2. Equal weights give the shallowest tree possible.
            if weights.iter().all(|&w| w <= 1) {
                return Err(HuffmunchError::FormatLimit(format!(
                    "{} symbols cannot fit a tree of depth {}",
                    tree.visit_count(),
                    max_depth
                )));
            }
            weights.iter_mut().filter(|w| **w > 0).for_each(|w| *w = 1);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::huffman_coding::huffman::SPLIT;

    /// Fibonacci counts make the deepest possible huffman tree.
    fn fibonacci_data(n: usize) -> Vec<SymbolId> {
        let mut data = vec![SPLIT];
        let (mut a, mut b) = (1_usize, 1_usize);
        for sym in 0..n {
            data.extend(std::iter::repeat(sym as SymbolId).take(a));
            let c = a + b;
            a = b;
            b = c;
        }
        data
    }

    #[test]
    fn unlimited_is_deep_test() {
        let data = fibonacci_data(12);
        assert_eq!(HuffTree::build(&data, 12).depth(), 11);
    }

    #[test]
    fn limit_respected_test() {
        let data = fibonacci_data(12);
        let tree = build_limited(&data, 12, 5).unwrap();
        assert!(tree.depth() <= 5);
        assert_eq!(tree.visit_count(), 12);
        // limited tree can never beat the optimal one
        assert!(tree.bits() >= HuffTree::build(&data, 12).bits());
    }

    #[test]
    fn limit_already_met_test() {
        let data = fibonacci_data(4);
        let limited = build_limited(&data, 4, 24).unwrap();
        let free = HuffTree::build(&data, 4);
        assert_eq!(limited.bits(), free.bits());
    }

    #[test]
    fn impossible_limit_test() {
        let data: Vec<SymbolId> = vec![SPLIT, 0, 1, 2, 3, 4];
        assert!(build_limited(&data, 5, 2).is_err());
        assert_eq!(build_limited(&data, 5, 3).unwrap().depth(), 3);
    }
}
