use log::{debug, info, trace};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BTreeSet;

use super::rolling_hash::WindowHashes;
use crate::dictionary::TreeFormat;
use crate::error::Result;
use crate::huffman_coding::depth_limit::build_limited;
use crate::huffman_coding::huffman::{HuffTree, SymbolId, SPLIT};
use crate::tools::options::CodecOpts;

/// Trials evaluated together per worker thread.
const TRIALS_PER_THREAD: usize = 2;

/// A dictionary and the data written with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunchState {
    /// Symbol stream, with a split marker at the start of every split.
    pub data: Vec<SymbolId>,
    /// Bytes of every symbol, indexed by id.
    pub symbols: Vec<Vec<u8>>,
}

impl MunchState {
    /// The starting dictionary: one symbol per byte value up to the largest one present.
    pub fn new(data: Vec<SymbolId>) -> Self {
        let top = data.iter().filter(|&&s| s != SPLIT).max().copied().unwrap_or(0);
        let symbols = (0..=top).map(|b| vec![b as u8]).collect();
        MunchState { data, symbols }
    }

    /// Bytes of the string of symbols.
    fn flatten(&self, string: &[SymbolId]) -> Vec<u8> {
        string
            .iter()
            .flat_map(|&s| self.symbols[s as usize].iter().copied())
            .collect()
    }

    /// A new state with string merged into one new symbol holding bytes. Matches are
    /// replaced greedily from left to right.
    fn merge(&self, string: &[SymbolId], bytes: Vec<u8>) -> Self {
        let id = self.symbols.len() as SymbolId;
        let mut symbols = self.symbols.clone();
        symbols.push(bytes);

        let w = string.len();
        let mut data = Vec::with_capacity(self.data.len());
        let mut i = 0;
        while i < self.data.len() {
            if self.data[i..].starts_with(string) {
                data.push(id);
                i += w;
            } else {
                data.push(self.data[i]);
                i += 1;
            }
        }
        MunchState { data, symbols }
    }
}

/// Estimated packed size of a state: huffman stream plus table, without the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MunchSize {
    pub stream_bits: u64,
    pub table_bytes: usize,
}

impl MunchSize {
    pub fn bits(&self) -> u64 {
        self.stream_bits + self.table_bytes as u64 * 8
    }

    pub fn bytes(&self) -> u64 {
        (self.bits() + 7) / 8
    }
}

/// Huffman tree for the state, depth limited when the table format needs it.
pub fn state_tree(state: &MunchState, opts: &CodecOpts) -> Result<HuffTree> {
    match opts.tree_format {
        TreeFormat::Direct => Ok(HuffTree::build(&state.data, state.symbols.len())),
        TreeFormat::Canonical => {
            build_limited(&state.data, state.symbols.len(), opts.canonical_depth)
        }
    }
}

/// Size of the state once compressed, without building any of it.
pub fn munch_size(state: &MunchState, opts: &CodecOpts) -> Result<MunchSize> {
    let tree = state_tree(state, opts)?;
    Ok(MunchSize {
        stream_bits: tree.bits(),
        table_bytes: opts.tree_format.codec().table_bytes(&tree, &state.symbols)?,
    })
}

/// A repeated string to try as a new symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Task {
    /// Rough guess of symbols saved: occurrences times width
    saved: u64,
    width: usize,
    hash: u32,
}

/// Try every distinct string behind a task's hash. Returns the first one that makes the
/// state strictly smaller.
fn trial(
    best: &MunchState,
    best_size: MunchSize,
    scan: &WindowHashes,
    task: Task,
    opts: &CodecOpts,
) -> Result<Option<(MunchState, MunchSize)>> {
    // hashes can collide, so gather every string with this hash
    let strings: BTreeSet<&[SymbolId]> = scan
        .positions(task.hash)
        .map(|i| &best.data[i..i + task.width])
        .collect();

    for string in strings {
        let bytes = best.flatten(string);
        if bytes.len() > opts.max_symbol_size {
            continue;
        }
        let next = best.merge(string, bytes);
        let next_size = munch_size(&next, opts)?;
        if next_size.bits() < best_size.bits() {
            return Ok(Some((next, next_size)));
        }
    }
    Ok(None)
}

/// The dictionary search, one accepted symbol per pass.
///
/// Each pass hashes every window of 2 up to search_width symbols and ranks the repeated
/// strings by how many symbols they would replace. Candidates are tried in that order and
/// the first that shrinks the data is kept. A pass that finds nothing, or gives up after
/// `cutoff` failed candidates, ends the search. Candidates that failed are remembered and
/// not tried again in later passes.
///
/// Candidates are evaluated in parallel batches, but only ever accepted in rank order,
/// so the result is the same as trying them one by one.
pub struct Muncher<'a> {
    opts: &'a CodecOpts,
    best: MunchState,
    best_size: MunchSize,
    /// (hash, width) pairs known not to help. A new symbol could in theory create a
    /// colliding string that would, but skipping them is much faster.
    tried: FxHashSet<(u32, usize)>,
    /// Trials evaluated together
    batch: usize,
    symbols_added: usize,
}

impl<'a> Muncher<'a> {
    /// Start from the single byte dictionary of data.
    pub fn new(data: Vec<SymbolId>, opts: &'a CodecOpts) -> Result<Self> {
        Self::resume(MunchState::new(data), opts)
    }

    /// Continue the search from an existing state.
    pub fn resume(best: MunchState, opts: &'a CodecOpts) -> Result<Self> {
        let best_size = munch_size(&best, opts)?;
        Ok(Muncher {
            opts,
            best,
            best_size,
            tried: FxHashSet::default(),
            batch: rayon::current_num_threads().max(1) * TRIALS_PER_THREAD,
            symbols_added: 0,
        })
    }

    pub fn size(&self) -> MunchSize {
        self.best_size
    }

    pub fn into_state(self) -> MunchState {
        self.best
    }

    /// Hash windows of every searched width over the current data.
    fn scan(&self) -> Vec<WindowHashes> {
        (2..=self.opts.search_width)
            .into_par_iter()
            .map(|width| WindowHashes::scan(&self.best.data, width))
            .collect()
    }

    /// Untried candidates with the index of their scan, best first.
    fn tasks(&self, scans: &[WindowHashes]) -> Vec<(Task, usize)> {
        let mut tasks: Vec<(Task, usize)> = Vec::new();
        for (si, scan) in scans.iter().enumerate() {
            for (hash, count) in scan.frequencies() {
                if count < 1 || self.tried.contains(&(hash, scan.width())) {
                    continue;
                }
                let task = Task {
                    saved: count * scan.width() as u64,
                    width: scan.width(),
                    hash,
                };
                tasks.push((task, si));
            }
        }
        // most saved first, then shorter strings, then lower hash
        tasks.sort_unstable_by_key(|(t, _)| (Reverse(t.saved), t.width, t.hash));
        tasks
    }

    /// Run one pass. Returns the new size if a symbol was added, None when the search
    /// is over.
    pub fn pass(&mut self) -> Result<Option<MunchSize>> {
        let scans = self.scan();
        let tasks = self.tasks(&scans);
        trace!("{} candidate strings", tasks.len());

        let mut attempts = 0;
        let mut improved = None;
        'pass: for chunk in tasks.chunks(self.batch) {
            let limit = match self.opts.cutoff {
                0 => chunk.len(),
                cutoff => chunk.len().min(cutoff - attempts),
            };
            let chunk = &chunk[..limit];
            let (best, best_size, opts) = (&self.best, self.best_size, self.opts);
            let results: Vec<Result<Option<(MunchState, MunchSize)>>> = chunk
                .par_iter()
                .map(|&(task, si)| trial(best, best_size, &scans[si], task, opts))
                .collect();

            for (&(task, _), result) in chunk.iter().zip(results) {
                if let Some(found) = result? {
                    improved = Some((task, found));
                    break 'pass;
                }
                self.tried.insert((task.hash, task.width));
                attempts += 1;
                if self.opts.cutoff != 0 && attempts >= self.opts.cutoff {
                    debug!("Cutoff reached after {} attempts", attempts);
                    break 'pass;
                }
            }
        }

        let (task, (next, next_size)) = match improved {
            Some(found) => found,
            None => return Ok(None),
        };
        self.symbols_added += 1;
        debug!(
            "{}: {} bytes ({} stream bits + {} table bytes), {} saved bits, {}x{} after {} attempts",
            self.symbols_added,
            next_size.bytes(),
            next_size.stream_bits,
            next_size.table_bytes,
            self.best_size.bits() - next_size.bits(),
            task.saved / task.width as u64,
            task.width,
            attempts
        );
        self.best = next;
        self.best_size = next_size;
        Ok(Some(next_size))
    }
}

/// Grow the dictionary one symbol at a time for as long as the compressed size keeps
/// shrinking.
pub fn munch(data: Vec<SymbolId>, opts: &CodecOpts) -> Result<MunchState> {
    let data_bytes = data.iter().filter(|&&s| s != SPLIT).count();
    let mut muncher = Muncher::new(data, opts)?;
    info!(
        "Munching {} bytes, starting size {} bytes",
        data_bytes,
        muncher.size().bytes()
    );
    while muncher.pass()?.is_some() {}
    info!(
        "Munched {} symbols into the dictionary: {} of {} bytes",
        muncher.symbols_added,
        muncher.size().bytes(),
        data_bytes
    );
    Ok(muncher.into_state())
}

#[cfg(test)]
mod test {
    use super::*;

    fn stream(text: &[u8]) -> Vec<SymbolId> {
        let mut data = vec![SPLIT];
        data.extend(text.iter().map(|&b| b as SymbolId));
        data
    }

    #[test]
    fn initial_alphabet_test() {
        let state = MunchState::new(stream(b"\x02\x00"));
        assert_eq!(state.symbols, vec![vec![0], vec![1], vec![2]]);
        let empty = MunchState::new(vec![SPLIT]);
        assert_eq!(empty.symbols, vec![vec![0]]);
    }

    #[test]
    fn merge_is_greedy_test() {
        let state = MunchState::new(stream(b"aaaXaa"));
        let string = [b'a' as SymbolId; 2];
        let bytes = state.flatten(&string);
        assert_eq!(bytes, b"aa");
        let next = state.merge(&string, bytes);
        let id = (next.symbols.len() - 1) as SymbolId;
        let a = b'a' as SymbolId;
        assert_eq!(next.data, vec![SPLIT, id, a, b'X' as SymbolId, id]);
    }

    #[test]
    fn size_test() {
        let state = MunchState::new(stream(b"abab"));
        let size = munch_size(&state, &CodecOpts::default()).unwrap();
        // two leaves of depth 1: 4 bits, a branch byte and two 2 byte leaves
        assert_eq!(size, MunchSize { stream_bits: 4, table_bytes: 5 });
        assert_eq!(size.bits(), 44);
        assert_eq!(size.bytes(), 6);
        let empty = munch_size(&MunchState::new(vec![SPLIT]), &CodecOpts::default()).unwrap();
        assert_eq!(empty, MunchSize::default());
    }

    #[test]
    fn repeated_pair_becomes_symbol_test() {
        let state = munch(stream(b"ababababab"), &CodecOpts::default()).unwrap();
        let long: Vec<&Vec<u8>> = state
            .data
            .iter()
            .filter(|&&s| s != SPLIT)
            .map(|&s| &state.symbols[s as usize])
            .filter(|s| s.len() > 1)
            .collect();
        assert!(!long.is_empty());
        let text: Vec<u8> = state
            .data
            .iter()
            .filter(|&&s| s != SPLIT)
            .flat_map(|&s| state.symbols[s as usize].clone())
            .collect();
        assert_eq!(text, b"ababababab");
    }

    #[test]
    fn never_grows_test() {
        let text = b"the cat sat on the mat with the hat, then the cat sat again.";
        for format in [TreeFormat::Direct, TreeFormat::Canonical] {
            let opts = CodecOpts { tree_format: format, ..CodecOpts::default() };
            let start = munch_size(&MunchState::new(stream(text)), &opts).unwrap();
            let state = munch(stream(text), &opts).unwrap();
            let end = munch_size(&state, &opts).unwrap();
            assert!(end.bits() <= start.bits());
            assert!(state.data.len() <= text.len() + 1);
            assert_eq!(state.data[0], SPLIT);
        }
    }

    #[test]
    fn splits_never_merged_test() {
        let mut data = stream(b"xyxy");
        data.push(SPLIT);
        data.extend(b"xyxy".iter().map(|&b| b as SymbolId));
        let state = munch(data, &CodecOpts::default()).unwrap();
        assert_eq!(state.data.iter().filter(|&&s| s == SPLIT).count(), 2);
        assert!(state.symbols.iter().all(|s| s.len() <= 255));
    }

    #[test]
    fn max_symbol_size_respected_test() {
        let text = vec![b'z'; 200];
        let opts = CodecOpts { max_symbol_size: 4, ..CodecOpts::default() };
        let state = munch(stream(&text), &opts).unwrap();
        assert!(state.symbols.iter().all(|s| s.len() <= 4));
    }

    /// Repetitive text with enough distinct strings to fill several trial batches.
    fn verse() -> Vec<u8> {
        b"row row row your boat gently down the stream, merrily merrily merrily merrily \
life is but a dream. row row row your boat gently down the brook, if you see a \
little fish, do not forget to look."
            .to_vec()
    }

    fn search_opts(cutoff: usize) -> CodecOpts {
        CodecOpts { cutoff, max_symbol_size: 8, ..CodecOpts::default() }
    }

    #[test]
    fn every_symbol_shrinks_test() {
        let opts = search_opts(0);
        let mut muncher = Muncher::new(stream(&verse()), &opts).unwrap();
        let mut last = muncher.size();
        let mut added = 0;
        while let Some(size) = muncher.pass().unwrap() {
            assert!(size.bits() < last.bits(), "{:?} after {:?}", size, last);
            assert_eq!(size, munch_size(&muncher.best, &opts).unwrap());
            last = size;
            added += 1;
        }
        assert!(added > 0);
        assert_eq!(muncher.size(), last);
        assert_eq!(muncher.into_state(), munch(stream(&verse()), &opts).unwrap());
    }

    #[test]
    fn exhausted_search_test() {
        let opts = search_opts(0);
        let mut muncher = Muncher::new(stream(&verse()), &opts).unwrap();
        while muncher.pass().unwrap().is_some() {}

        // the last pass tried every candidate left and remembered them all
        assert!(!muncher.tried.is_empty());
        assert!(muncher.tasks(&muncher.scan()).is_empty());
        let done = muncher.best.clone();
        assert_eq!(muncher.pass().unwrap(), None);
        assert_eq!(muncher.into_state(), done);
    }

    #[test]
    fn cutoff_test() {
        let opts = search_opts(1);
        let mut muncher = Muncher::new(stream(&verse()), &opts).unwrap();
        while muncher.pass().unwrap().is_some() {
            // a pass that adds a symbol succeeded on its first candidate
            assert!(muncher.tried.is_empty());
        }
        // the last pass gave up after a single failed candidate
        assert_eq!(muncher.tried.len(), 1);

        // which later passes skip
        let fresh = Muncher::resume(muncher.best.clone(), &opts).unwrap();
        let all = fresh.tasks(&fresh.scan());
        let left = muncher.tasks(&muncher.scan());
        assert_eq!(left.len() + 1, all.len());
        let &(failed, _) = all.first().unwrap();
        assert!(muncher.tried.contains(&(failed.hash, failed.width)));
        assert!(left.iter().all(|(t, _)| *t != failed));
    }

    #[test]
    fn cutoff_limits_search_test() {
        let text = verse();
        let unlimited = munch(stream(&text), &search_opts(0)).unwrap();
        let unlimited = munch_size(&unlimited, &search_opts(0)).unwrap();
        let mut last = unlimited;
        for cutoff in [100, 10, 1] {
            let opts = search_opts(cutoff);
            let state = munch(stream(&text), &opts).unwrap();
            let size = munch_size(&state, &opts).unwrap();
            // a lower cutoff stops on the same path, only sooner
            assert!(size.bits() >= last.bits(), "cutoff {}", cutoff);
            last = size;
        }
        assert!(last.bits() >= unlimited.bits());
    }

    #[test]
    fn batch_size_does_not_matter_test() {
        let text = verse();
        for cutoff in [0, 5] {
            let opts = search_opts(cutoff);
            let run = |batch: usize| {
                let mut muncher = Muncher::new(stream(&text), &opts).unwrap();
                muncher.batch = batch;
                while muncher.pass().unwrap().is_some() {}
                muncher.into_state()
            };
            let one_by_one = run(1);
            for batch in [2, 7, 64] {
                assert_eq!(run(batch), one_by_one, "batch {} cutoff {}", batch, cutoff);
            }
        }
    }

    #[test]
    fn thread_count_does_not_matter_test() {
        let opts = search_opts(0);
        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let many = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
        let a = single.install(|| munch(stream(&verse()), &opts).unwrap());
        let b = many.install(|| munch(stream(&verse()), &opts).unwrap());
        assert_eq!(a, b);
    }
}
