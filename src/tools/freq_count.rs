use rayon::prelude::*;

use crate::huffman_coding::huffman::{SymbolId, SPLIT};

/// Returns a frequency count of the symbols in data, one slot per symbol id below
/// symbol_count. Split markers are not counted. Uses parallelism when data set is over 64k.
pub fn symbol_freqs(data: &[SymbolId], symbol_count: usize) -> Vec<u64> {
    let count = |mut freqs: Vec<u64>, chunk: &[SymbolId]| {
        chunk
            .iter()
            .filter(|&&el| el != SPLIT)
            .for_each(|&el| freqs[el as usize] += 1);
        freqs
    };
    if data.len() > 64_000 {
        // 16k is pretty much the sweet spot for chunk size.
        data.par_chunks(16_000)
            .fold(|| vec![0_u64; symbol_count], count)
            .reduce(
                || vec![0_u64; symbol_count],
                |s, f| s.iter().zip(&f).map(|(a, b)| a + b).collect::<Vec<u64>>(),
            )
    } else {
        count(vec![0_u64; symbol_count], data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skips_splits_test() {
        let data = [SPLIT, 0, 1, 1, SPLIT, 2, 1];
        assert_eq!(symbol_freqs(&data, 4), vec![1, 3, 1, 0]);
    }

    #[test]
    fn parallel_matches_sequential_test() {
        let data: Vec<SymbolId> = (0..100_000_u32).map(|i| i % 7).collect();
        let freqs = symbol_freqs(&data, 7);
        assert_eq!(freqs.iter().sum::<u64>(), 100_000);
        assert_eq!(freqs[0], 14_286);
        assert_eq!(freqs[6], 14_285);
    }
}
