// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Huffman prefix codes for turning text into a compact payload.
//!
//! The tree is an arena of [`Node`]s addressed by index. Construction uses a
//! min-heap keyed by `(frequency, creation order)`: leaves are created in the
//! order their symbol first appears in the text and every merged node takes
//! the next order number, so the tree shape is a pure function of the input.
//! When two nodes are merged the second one popped (the heavier, or the
//! later on a tie) becomes the `0` branch.
//!
//! Decoding works from the [`Codebook`] alone (greedy prefix matching), so a
//! codebook rebuilt from a dictionary file decodes without the tree.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use std::path::Path;

use crate::stego::error::StegoError;
use crate::stego::payload::PayloadBits;

/// One arena entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Leaf { symbol: char, freq: usize },
    Internal { freq: usize, left: usize, right: usize },
}

impl Node {
    pub fn freq(&self) -> usize {
        match *self {
            Node::Leaf { freq, .. } | Node::Internal { freq, .. } => freq,
        }
    }
}

/// Huffman tree over the characters of a source text.
#[derive(Debug, Clone, Default)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl HuffmanTree {
    /// Build the tree for `text`. Empty text gives an empty tree.
    pub fn from_text(text: &str) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut leaf_of: HashMap<char, usize> = HashMap::new();
        for symbol in text.chars() {
            let idx = *leaf_of.entry(symbol).or_insert_with(|| {
                nodes.push(Node::Leaf { symbol, freq: 0 });
                nodes.len() - 1
            });
            if let Node::Leaf { freq, .. } = &mut nodes[idx] {
                *freq += 1;
            }
        }

        // Node index doubles as creation order.
        let mut heap: BinaryHeap<Reverse<(usize, usize)>> =
            nodes.iter().enumerate().map(|(i, n)| Reverse((n.freq(), i))).collect();

        while heap.len() > 1 {
            let (Some(Reverse((f1, right))), Some(Reverse((f2, left)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            nodes.push(Node::Internal { freq: f1 + f2, left, right });
            heap.push(Reverse((f1 + f2, nodes.len() - 1)));
        }

        let root = heap.pop().map(|Reverse((_, idx))| idx);
        Self { nodes, root }
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.map(|i| &self.nodes[i])
    }

    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Number of distinct symbols (leaves).
    pub fn symbol_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    /// Read codes off root-to-leaf paths, left = `0`, right = `1`.
    pub fn codebook(&self) -> Codebook {
        let mut codes = BTreeMap::new();
        let Some(root) = self.root else {
            return Codebook { codes };
        };
        if let Node::Leaf { symbol, .. } = self.nodes[root] {
            codes.insert(symbol, "0".to_string());
            return Codebook { codes };
        }

        let mut stack = vec![(root, String::new())];
        while let Some((idx, prefix)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { symbol, .. } => {
                    codes.insert(*symbol, prefix);
                }
                Node::Internal { left, right, .. } => {
                    stack.push((*right, format!("{prefix}1")));
                    stack.push((*left, format!("{prefix}0")));
                }
            }
        }
        Codebook { codes }
    }
}

/// Build the tree and codebook for `text` in one step.
pub fn build(text: &str) -> (HuffmanTree, Codebook) {
    let tree = HuffmanTree::from_text(text);
    let codebook = tree.codebook();
    tracing::debug!(symbols = codebook.len(), chars = text.chars().count(), "codebook built");
    (tree, codebook)
}

/// Symbol to bit-string mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codebook {
    codes: BTreeMap<char, String>,
}

impl Codebook {
    pub fn from_text(text: &str) -> Self {
        build(text).1
    }

    /// Assemble a codebook without a tree.
    ///
    /// # Errors
    /// [`StegoError::InvalidCodebook`] if a code is empty, contains anything
    /// but `0`/`1`, a symbol repeats, or the codes are not prefix-free.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, StegoError>
    where
        I: IntoIterator<Item = (char, S)>,
        S: Into<String>,
    {
        let mut codes = BTreeMap::new();
        for (symbol, code) in entries {
            let code = code.into();
            if code.is_empty() || !code.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(StegoError::InvalidCodebook(format!(
                    "bad code {code:?} for {symbol:?}"
                )));
            }
            if codes.insert(symbol, code).is_some() {
                return Err(StegoError::InvalidCodebook(format!("duplicate symbol {symbol:?}")));
            }
        }
        let book = Self { codes };
        if !book.is_prefix_free() {
            return Err(StegoError::InvalidCodebook("codes are not prefix-free".into()));
        }
        Ok(book)
    }

    pub fn get(&self, symbol: char) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.codes.iter().map(|(c, code)| (*c, code.as_str()))
    }

    /// True if no code is a prefix of (or equal to) another.
    pub fn is_prefix_free(&self) -> bool {
        let mut sorted: Vec<&str> = self.codes.values().map(String::as_str).collect();
        sorted.sort_unstable();
        // Lexicographic order puts any prefix right before a code extending it.
        sorted.windows(2).all(|w| !w[1].starts_with(w[0]))
    }

    /// Concatenate the codes of every character in `text`.
    ///
    /// # Errors
    /// [`StegoError::UnknownSymbol`] for a character without a code.
    pub fn encode(&self, text: &str) -> Result<PayloadBits, StegoError> {
        let mut bits = Vec::new();
        for c in text.chars() {
            let code = self.codes.get(&c).ok_or(StegoError::UnknownSymbol(c))?;
            bits.extend(code.bytes().map(|b| b - b'0'));
        }
        Ok(PayloadBits::from_bits(bits))
    }

    /// Greedy decode: emit a symbol whenever the accumulated bits match a
    /// code exactly.
    ///
    /// # Errors
    /// [`StegoError::UndecodableResidue`] if bits are left over at the end.
    pub fn decode(&self, bits: &PayloadBits) -> Result<String, StegoError> {
        let reverse: HashMap<&str, char> =
            self.codes.iter().map(|(c, code)| (code.as_str(), *c)).collect();

        let mut text = String::new();
        let mut candidate = String::new();
        for &b in bits.as_bits() {
            candidate.push(if b == 1 { '1' } else { '0' });
            if let Some(&symbol) = reverse.get(candidate.as_str()) {
                text.push(symbol);
                candidate.clear();
            }
        }
        if !candidate.is_empty() {
            return Err(StegoError::UndecodableResidue(candidate));
        }
        Ok(text)
    }
}

/// Encoder/decoder that may exist before any codebook is known.
#[derive(Debug, Clone, Default)]
pub struct HuffmanCoder {
    codebook: Option<Codebook>,
}

impl HuffmanCoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codebook(codebook: Codebook) -> Self {
        Self { codebook: Some(codebook) }
    }

    /// Replace the codebook with one built from `text`.
    pub fn build(&mut self, text: &str) -> &Codebook {
        self.codebook.insert(Codebook::from_text(text))
    }

    /// Build the codebook from a dictionary file. The file's own character
    /// frequencies define the code.
    ///
    /// # Errors
    /// [`StegoError::NotFound`] if the file does not exist.
    pub fn load_dictionary(&mut self, path: &Path) -> Result<&Codebook, StegoError> {
        if !path.exists() {
            return Err(StegoError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), "dictionary loaded");
        Ok(self.build(&text))
    }

    pub fn codebook(&self) -> Option<&Codebook> {
        self.codebook.as_ref()
    }

    pub fn encode(&self, text: &str) -> Result<PayloadBits, StegoError> {
        self.codebook.as_ref().ok_or(StegoError::UninitializedCodebook)?.encode(text)
    }

    pub fn decode(&self, bits: &PayloadBits) -> Result<String, StegoError> {
        self.codebook.as_ref().ok_or(StegoError::UninitializedCodebook)?.decode(bits)
    }
}
