use log::trace;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bitstream::bitwriter::BitWriter;
use crate::error::{HuffmunchError, Result};
use crate::tools::freq_count::symbol_freqs;

/// Dense id of a dictionary symbol.
pub type SymbolId = u32;

/// Marker placed in a symbol stream at the start of every split. Never a real symbol.
pub const SPLIT: SymbolId = u32::MAX;

/// Longest huffman code the encoder can carry.
pub const MAX_CODE_LEN: usize = 64;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NodeData {
    /// Indices of the two children within the tree arena.
    Kids(usize, usize),
    Leaf(SymbolId),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    /// Number of times the symbols under this node occur in the data.
    pub count: u64,
    pub node_data: NodeData,
}

/// A huffman code: the low `len` bits of `bits`, sent most significant bit first.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct HuffCode {
    pub bits: u64,
    pub len: u8,
}

/// Huffman tree held in an arena. All nodes live and die with the tree.
#[derive(Debug, Clone, Default)]
pub struct HuffTree {
    nodes: Vec<Node>,
    root: Option<usize>,
    /// One flag per symbol id: true if the symbol occurs in the data and so is in the tree.
    visited: Vec<bool>,
    visit_count: usize,
}

impl HuffTree {
    /// Build the huffman tree for a symbol stream over an alphabet of symbol_count symbols.
    pub fn build(data: &[SymbolId], symbol_count: usize) -> Self {
        let freqs = symbol_freqs(data, symbol_count);
        Self::from_weights(&freqs, &freqs)
    }

    /// Build a tree whose leaves carry `counts`, but whose shape is decided by `weights`.
    /// Symbols with a zero count are left out of the tree.
    pub(crate) fn from_weights(counts: &[u64], weights: &[u64]) -> Self {
        let mut tree = HuffTree {
            nodes: Vec::with_capacity(counts.len() * 2),
            root: None,
            visited: vec![false; counts.len()],
            visit_count: 0,
        };

        // Min-heap on weight. The node index breaks ties, so equal weights pop in
        // insertion order.
        let mut heap = BinaryHeap::with_capacity(counts.len());
        for (id, &count) in counts.iter().enumerate() {
            if count < 1 {
                continue;
            }
            tree.visited[id] = true;
            let idx = tree.add(count, NodeData::Leaf(id as SymbolId));
            heap.push(Reverse((weights[id].max(1), idx)));
        }
        tree.visit_count = heap.len();

        // Pull off the two lightest nodes and join them until one is left.
        while heap.len() > 1 {
            if let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) {
                let count = tree.nodes[a].count + tree.nodes[b].count;
                let idx = tree.add(count, NodeData::Kids(a, b));
                heap.push(Reverse((wa + wb, idx)));
            }
        }
        tree.root = heap.pop().map(|Reverse((_, idx))| idx);
        trace!(
            "Huffman tree built: {} leaves, {} nodes",
            tree.visit_count,
            tree.nodes.len()
        );
        tree
    }

    fn add(&mut self, count: u64, node_data: NodeData) -> usize {
        self.nodes.push(Node { count, node_data });
        self.nodes.len() - 1
    }

    /// Index of the root node, or None if the data had no symbols at all.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Number of nodes in the arena. Children always have lower indices than their parent.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if the symbol is a leaf of this tree.
    pub fn is_visited(&self, id: SymbolId) -> bool {
        self.visited.get(id as usize).copied().unwrap_or(false)
    }

    pub fn visited(&self) -> &[bool] {
        &self.visited
    }

    /// Number of leaves.
    pub fn visit_count(&self) -> usize {
        self.visit_count
    }

    /// Depth of the deepest leaf (0 for a single leaf or an empty tree).
    pub fn depth(&self) -> usize {
        match self.root {
            Some(root) => self.depth_node(root),
            None => 0,
        }
    }

    fn depth_node(&self, idx: usize) -> usize {
        match self.nodes[idx].node_data {
            NodeData::Leaf(_) => 0,
            NodeData::Kids(a, b) => 1 + self.depth_node(a).max(self.depth_node(b)),
        }
    }

    /// Total length in bits of the data encoded with this tree: the sum of count * depth
    /// over every leaf.
    pub fn bits(&self) -> u64 {
        match self.root {
            Some(root) => self.bits_node(root, 0),
            None => 0,
        }
    }

    fn bits_node(&self, idx: usize, depth: u64) -> u64 {
        let node = &self.nodes[idx];
        match node.node_data {
            NodeData::Leaf(_) => node.count * depth,
            NodeData::Kids(a, b) => self.bits_node(a, depth + 1) + self.bits_node(b, depth + 1),
        }
    }

    /// Recursively walk the tree and return in "leaves" each leaf symbol and how far
    /// (deep) from the root it is, in left to right order.
    pub fn leaves(&self) -> Vec<(SymbolId, usize)> {
        let mut leaves = Vec::with_capacity(self.visit_count);
        if let Some(root) = self.root {
            self.leaves_node(root, 0, &mut leaves);
        }
        leaves
    }

    fn leaves_node(&self, idx: usize, depth: usize, leaves: &mut Vec<(SymbolId, usize)>) {
        match self.nodes[idx].node_data {
            NodeData::Kids(a, b) => {
                self.leaves_node(a, depth + 1, leaves);
                self.leaves_node(b, depth + 1, leaves);
            }
            NodeData::Leaf(sym) => leaves.push((sym, depth)),
        }
    }
}

/// Encode a symbol stream with the given code table (indexed by symbol id). Each split
/// marker byte-aligns the stream and records where its split starts. Returns the split
/// start positions, as byte offsets into output.
pub fn huffman_encode(
    codes: &[Option<HuffCode>],
    data: &[SymbolId],
    output: &mut Vec<u8>,
) -> Result<Vec<usize>> {
    let mut splits = Vec::new();
    let mut bw = BitWriter::new(output);
    for &sym in data {
        if sym == SPLIT {
            // finish byte before starting new split
            bw.flush();
            splits.push(bw.len());
            continue;
        }
        let code = codes
            .get(sym as usize)
            .copied()
            .flatten()
            .ok_or_else(|| HuffmunchError::Internal(format!("no code for symbol {}", sym)))?;
        bw.out_code(code.bits, code.len);
    }
    bw.flush();
    Ok(splits)
}
