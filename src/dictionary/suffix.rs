//! Suffix sharing between dictionary strings.
//!
//! A long symbol whose tail is another symbol in the tree can be stored as its prefix
//! plus a 16-bit reference to that other symbol's table entry. The reference costs 2
//! bytes plus a tag, so only suffixes of at least `overhead` bytes are worth it.

use rustc_hash::FxHashMap;

use crate::huffman_coding::huffman::SymbolId;

/// Find the longest other visited symbol that is a byte suffix of symbol e, no shorter
/// than overhead and strictly shorter than e. Among equal lengths the last candidate
/// wins. Candidates are given in ascending id order.
pub fn best_suffix(
    e: SymbolId,
    overhead: usize,
    symbols: &[Vec<u8>],
    candidates: impl IntoIterator<Item = SymbolId>,
) -> Option<SymbolId> {
    let s = &symbols[e as usize];
    if s.len() < overhead + 2 {
        // too short for suffix
        return None;
    }

    let mut best = None;
    let mut best_len = overhead;
    for i in candidates {
        if i == e {
            continue;
        }
        let ns = &symbols[i as usize];
        if ns.len() < best_len || ns.len() >= s.len() {
            continue;
        }
        if s.ends_with(ns) {
            best = Some(i);
            best_len = ns.len();
        }
    }
    best
}

/// Best suffix of every visited symbol (None for unvisited ones). Candidates are grouped
/// by their final byte, since a suffix must end the same way as its host.
pub fn suffix_table(visited: &[bool], symbols: &[Vec<u8>], overhead: usize) -> Vec<Option<SymbolId>> {
    let is_visited = |id: usize| visited.get(id).copied().unwrap_or(false);

    let mut by_last: FxHashMap<u8, Vec<SymbolId>> = FxHashMap::default();
    for (id, s) in symbols.iter().enumerate() {
        if let (true, Some(&last)) = (is_visited(id), s.last()) {
            by_last.entry(last).or_default().push(id as SymbolId);
        }
    }

    symbols
        .iter()
        .enumerate()
        .map(|(id, s)| {
            if !is_visited(id) {
                return None;
            }
            let group = by_last.get(s.last()?)?;
            best_suffix(id as SymbolId, overhead, symbols, group.iter().copied())
        })
        .collect()
}
