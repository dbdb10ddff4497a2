//! Rolling hash over fixed width windows of a symbol stream, used to find repeated
//! strings worth turning into new symbols.

use rustc_hash::FxHashMap;

use crate::huffman_coding::huffman::{SymbolId, SPLIT};

/// Rolling hash multiplier. Not a factor of 2^32 - 1, and 111010011 in binary.
pub const RK_PRIME: u32 = 467;

/// Hashes of every window of one width.
#[derive(Debug)]
pub struct WindowHashes {
    width: usize,
    /// Hash of the window starting at each position. None for windows holding a split
    /// marker, which must never become part of a symbol.
    hashes: Vec<Option<u32>>,
    /// Non-overlapping occurrences of each hash, and the first position where the next
    /// occurrence may start.
    freq: FxHashMap<u32, (u64, usize)>,
}

impl WindowHashes {
    /// Hash all windows of width symbols in data.
    pub fn scan(data: &[SymbolId], width: usize) -> Self {
        let mut wh = WindowHashes {
            width,
            hashes: Vec::new(),
            freq: FxHashMap::default(),
        };
        if width == 0 || data.len() < width {
            return wh;
        }
        wh.hashes.reserve(data.len() - width + 1);

        // multiplier of the symbol rolling out of the window
        let erase = (1..width).fold(1_u32, |e, _| e.wrapping_mul(RK_PRIME));

        let mut hash = 0_u32;
        let mut splits = 0;
        for &sym in &data[..width - 1] {
            hash = hash.wrapping_mul(RK_PRIME).wrapping_add(sym);
            splits += (sym == SPLIT) as usize;
        }
        for i in 0..=data.len() - width {
            let incoming = data[i + width - 1];
            hash = hash.wrapping_mul(RK_PRIME).wrapping_add(incoming);
            splits += (incoming == SPLIT) as usize;

            if splits == 0 {
                wh.hashes.push(Some(hash));
                let entry = wh.freq.entry(hash).or_insert((0, 0));
                if i >= entry.1 {
                    entry.0 += 1;
                    entry.1 = i + width;
                }
            } else {
                wh.hashes.push(None);
            }

            // roll off
            let outgoing = data[i];
            hash = hash.wrapping_sub(outgoing.wrapping_mul(erase));
            splits -= (outgoing == SPLIT) as usize;
        }
        wh
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Every distinct hash with its non-overlapping occurrence count.
    pub fn frequencies(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.freq.iter().map(|(&hash, &(count, _))| (hash, count))
    }

    /// Start of every window with this hash.
    pub fn positions(&self, hash: u32) -> impl Iterator<Item = usize> + '_ {
        self.hashes
            .iter()
            .enumerate()
            .filter(move |(_, h)| **h == Some(hash))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn direct_hash(window: &[SymbolId]) -> u32 {
        window
            .iter()
            .fold(0_u32, |h, &s| h.wrapping_mul(RK_PRIME).wrapping_add(s))
    }

    fn window_is(wh: &WindowHashes, i: usize, hash: u32) -> bool {
        wh.hashes.get(i) == Some(&Some(hash))
    }

    #[test]
    fn rolling_matches_direct_test() {
        let data: Vec<SymbolId> = vec![5, 1, 200, 7, 7, 300, 1, 5, 1];
        for width in 2..=4 {
            let wh = WindowHashes::scan(&data, width);
            for (i, window) in data.windows(width).enumerate() {
                assert!(window_is(&wh, i, direct_hash(window)), "width {} at {}", width, i);
            }
        }
    }

    #[test]
    fn split_windows_skipped_test() {
        let data = [SPLIT, 1, 2, SPLIT, 1, 2];
        let wh = WindowHashes::scan(&data, 2);
        let h = direct_hash(&[1, 2]);
        assert_eq!(wh.positions(h).collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(wh.frequencies().count(), 1);
        assert!(!window_is(&wh, 0, direct_hash(&[SPLIT, 1])));
    }

    #[test]
    fn non_overlapping_count_test() {
        // "aaaa" holds three windows "aa" but only two that do not overlap
        let data = [SPLIT, 9, 9, 9, 9];
        let wh = WindowHashes::scan(&data, 2);
        let h = direct_hash(&[9, 9]);
        assert_eq!(wh.frequencies().collect::<Vec<_>>(), vec![(h, 2)]);
        assert_eq!(wh.positions(h).count(), 3);
    }

    #[test]
    fn short_data_test() {
        let wh = WindowHashes::scan(&[SPLIT, 1], 3);
        assert_eq!(wh.frequencies().count(), 0);
        assert_eq!(wh.width(), 3);
    }
}
