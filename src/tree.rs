//! Deterministic Huffman tree construction.
//!
//! The tree is never stored in the compressed file. Encoder and decoder each
//! rebuild it from the frequency header, so [`HuffmanTree::build`] must give
//! the same shape for the same table every time, down to which child sits on
//! the left.

use std::mem;

use tracing::{debug, trace};

use crate::frequency::FrequencyTable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn leaf(symbol: u8, weight: u64) -> Self {
        HuffNode::Leaf { symbol, weight }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    /// `left` gets bit 0, `right` gets bit 1.
    pub fn merge(left: Self, right: Self) -> Self {
        HuffNode::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Returns `None` when the table has no nonzero counts.
    ///
    /// Candidates start as one leaf per present symbol in ascending symbol
    /// order. Each round scans the list for the two lightest candidates
    /// (strict `<`, so earlier slots win ties), merges them as
    /// `left = min1, right = min2`, stores the merged node at `min1` and
    /// fills `min2` with the last candidate before shrinking the list.
    pub fn build(frequencies: &FrequencyTable) -> Option<Self> {
        let mut nodes: Vec<HuffNode> = frequencies
            .present()
            .map(|(symbol, weight)| HuffNode::leaf(symbol, weight))
            .collect();

        if nodes.is_empty() {
            return None;
        }
        debug!(leaves = nodes.len(), "building huffman tree");

        while nodes.len() > 1 {
            let (min1, min2) = two_lightest(&nodes);
            trace!(
                min1,
                min2,
                left = nodes[min1].weight(),
                right = nodes[min2].weight(),
                "merging"
            );

            let last = nodes.len() - 1;
            let right = nodes.swap_remove(min2);
            // swap_remove moved the last candidate into min2; if that was min1
            // the merged node belongs there too.
            let slot = if min1 == last { min2 } else { min1 };
            let left = mem::replace(&mut nodes[slot], HuffNode::leaf(0, 0));
            nodes[slot] = HuffNode::merge(left, right);
        }

        nodes.pop().map(|root| HuffmanTree { root })
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn print_structure(&self) -> String {
        let mut out = String::new();
        print_node(&self.root, 0, "root", &mut out);
        out
    }
}

fn two_lightest(nodes: &[HuffNode]) -> (usize, usize) {
    let (mut min1, mut min2) = (0, 1);
    if nodes[min2].weight() < nodes[min1].weight() {
        mem::swap(&mut min1, &mut min2);
    }
    for (i, node) in nodes.iter().enumerate().skip(2) {
        if node.weight() < nodes[min1].weight() {
            min2 = min1;
            min1 = i;
        } else if node.weight() < nodes[min2].weight() {
            min2 = i;
        }
    }
    (min1, min2)
}

fn print_node(node: &HuffNode, depth: usize, label: &str, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        HuffNode::Leaf { symbol, weight } => {
            out.push_str(&format!("{}{} -> leaf {:#04x} [weight: {}]\n", indent, label, symbol, weight));
        }
        HuffNode::Internal { weight, left, right } => {
            out.push_str(&format!("{}{} -> internal [weight: {}]\n", indent, label, weight));
            print_node(left, depth + 1, "L", out);
            print_node(right, depth + 1, "R", out);
        }
    }
}

impl Drop for HuffmanTree {
    // Post-order teardown with an explicit stack instead of nested Box drops.
    fn drop(&mut self) {
        let mut stack = vec![mem::replace(&mut self.root, HuffNode::leaf(0, 0))];
        while let Some(mut node) = stack.pop() {
            if let HuffNode::Internal { left, right, .. } = &mut node {
                stack.push(mem::replace(&mut **left, HuffNode::leaf(0, 0)));
                stack.push(mem::replace(&mut **right, HuffNode::leaf(0, 0)));
            }
        }
    }
}
