//! Static Huffman code construction with a steppable builder.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]s handed out in
//! creation order: leaves first, in the frequency table's order, then one
//! internal node per merge. The builder keeps the current forest as a list of
//! ids in left-to-right display order, which is what the
//! [`TieBreak::MinimizeReorder`] policy reasons about.
//!
//! Codeword assignment: at every internal node the child that sorts first by
//! `(weight, creation id)` takes the `0` edge and the other takes `1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::cs::compression::analysis::CodewordSet;
use crate::cs::compression::statistics::{self, FrequencyTable};
use crate::error::{Error, Result};

/// Stable handle of a node in a builder's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// A node of the arena: a weighted leaf or the parent of two earlier nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf { symbol: char, weight: usize },
    /// `left` is the child on the `0` edge; `weight` is the children's sum.
    Internal {
        weight: usize,
        left: NodeId,
        right: NodeId,
    },
}

impl HuffmanNode {
    pub fn weight(&self) -> usize {
        match self {
            HuffmanNode::Leaf { weight, .. } => *weight,
            HuffmanNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }
}

/// How the two nodes of a merge step are chosen among equal weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Min-priority order: lowest weight first, ties go to the earlier-created node.
    #[default]
    Classic,
    /// Prefer the leftmost adjacent pair in display order whose weights sum to the
    /// minimal achievable pair weight; fall back to [`TieBreak::Classic`] when no
    /// such pair exists.
    ///
    /// The leftmost pair is taken even when several qualify, so on a layout of
    /// weights `[3, 2, 2, 2]` the first two `2`s merge, not the last two.
    MinimizeReorder,
}

impl FromStr for TieBreak {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classic" => Ok(TieBreak::Classic),
            "minimize-reorder" => Ok(TieBreak::MinimizeReorder),
            other => Err(Error::invalid_input(format!(
                "unknown tie-break policy {:?}, expected \"classic\" or \"minimize-reorder\"",
                other
            ))),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Classic => write!(f, "classic"),
            TieBreak::MinimizeReorder => write!(f, "minimize-reorder"),
        }
    }
}

/// Record of one merge step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    /// The internal node created by the step.
    pub parent: NodeId,
    /// Child on the `0` edge.
    pub left: NodeId,
    /// Child on the `1` edge.
    pub right: NodeId,
    /// Whether the display order had to change beyond replacing the merged
    /// pair by its parent in place.
    pub relocated: bool,
}

/// Incremental Huffman tree construction.
///
/// Not meant to be shared between callers: every `step` mutates the forest.
///
/// # Example
///
/// ```
/// use textcoding::compression::huffman::{HuffmanBuilder, TieBreak};
/// use textcoding::compression::statistics::FrequencyTable;
///
/// let freq = FrequencyTable::from_counts([('A', 1), ('B', 1), ('C', 2), ('D', 4)]).unwrap();
/// let mut builder = HuffmanBuilder::new(&freq, TieBreak::Classic).unwrap();
/// assert!(builder.step());
/// assert_eq!(builder.current_forest().len(), 3);
/// builder.run_to_completion();
/// let table = builder.code_table().unwrap();
/// assert_eq!(table.get('D'), Some("0"));
/// ```
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    nodes: Vec<HuffmanNode>,
    forest: Vec<NodeId>,
    policy: TieBreak,
    merges: Vec<Merge>,
}

impl HuffmanBuilder {
    /// Creates one leaf per symbol of `frequencies`.
    ///
    /// Fails with [`Error::DegenerateInput`] when there are fewer than two
    /// distinct symbols; use [`huffman_code`] for the trivial one-symbol code.
    pub fn new(frequencies: &FrequencyTable, policy: TieBreak) -> Result<Self> {
        if frequencies.len() < 2 {
            return Err(Error::DegenerateInput {
                distinct: frequencies.len(),
            });
        }
        let nodes: Vec<HuffmanNode> = frequencies
            .iter()
            .map(|(symbol, weight)| HuffmanNode::Leaf { symbol, weight })
            .collect();
        let mut builder = HuffmanBuilder {
            forest: (0..nodes.len()).map(NodeId).collect(),
            nodes,
            policy,
            merges: Vec::new(),
        };
        builder.relayout();
        log::trace!(
            "huffman builder ({}) initialized with {} leaves",
            policy,
            builder.forest.len()
        );
        Ok(builder)
    }

    /// Discards all progress and starts over from `frequencies` under `policy`.
    ///
    /// On error the builder is left unchanged.
    pub fn initialize(&mut self, frequencies: &FrequencyTable, policy: TieBreak) -> Result<()> {
        *self = HuffmanBuilder::new(frequencies, policy)?;
        Ok(())
    }

    pub fn policy(&self) -> TieBreak {
        self.policy
    }

    /// Performs one merge. Returns whether more merges remain afterwards.
    ///
    /// Calling `step` on a finished builder does nothing and returns `false`.
    pub fn step(&mut self) -> bool {
        if self.forest.len() < 2 {
            return false;
        }
        let merge = match self.policy {
            TieBreak::Classic => self.merge_classic(),
            TieBreak::MinimizeReorder => match self.adjacent_minimal_pair() {
                Some(pos) => self.merge_adjacent(pos),
                None => self.merge_classic(),
            },
        };
        log::trace!(
            "merged {:?} + {:?} -> {:?} (weight {}, relocated: {})",
            merge.left,
            merge.right,
            merge.parent,
            self.nodes[merge.parent.0].weight(),
            merge.relocated
        );
        self.merges.push(merge);
        if self.forest.len() == 1 {
            log::debug!(
                "huffman tree complete after {} merges, root weight {}",
                self.merges.len(),
                self.nodes[self.forest[0].0].weight()
            );
        }
        self.forest.len() > 1
    }

    /// Performs up to `n` merges. Returns whether more merges remain.
    pub fn step_n(&mut self, n: usize) -> bool {
        for _ in 0..n {
            if !self.step() {
                break;
            }
        }
        self.remaining_merges() > 0
    }

    /// Merges until a single root remains.
    pub fn run_to_completion(&mut self) {
        while self.step() {}
    }

    pub fn is_complete(&self) -> bool {
        self.forest.len() == 1
    }

    /// Number of merges still needed to reach a single root.
    pub fn remaining_merges(&self) -> usize {
        self.forest.len().saturating_sub(1)
    }

    /// The forest's root ids in display order.
    pub fn forest(&self) -> &[NodeId] {
        &self.forest
    }

    /// The forest's root nodes in display order.
    pub fn current_forest(&self) -> Vec<&HuffmanNode> {
        self.forest.iter().map(|id| &self.nodes[id.0]).collect()
    }

    /// Looks up any node created so far.
    pub fn node(&self, id: NodeId) -> Option<&HuffmanNode> {
        self.nodes.get(id.0)
    }

    /// The root, once construction is complete.
    pub fn root(&self) -> Option<NodeId> {
        if self.is_complete() {
            Some(self.forest[0])
        } else {
            None
        }
    }

    /// Every merge performed so far, in order.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// A copy of the finished tree.
    pub fn tree(&self) -> Result<HuffmanTree> {
        let root = self.root().ok_or(Error::ConstructionIncomplete {
            remaining: self.remaining_merges(),
        })?;
        Ok(HuffmanTree {
            nodes: self.nodes.clone(),
            root,
        })
    }

    /// The code table of the finished tree.
    pub fn code_table(&self) -> Result<CodeTable> {
        Ok(self.tree()?.code_table())
    }

    /// The two lowest `(weight, id)` nodes of the forest, lowest first.
    fn classic_pair(&self) -> (NodeId, NodeId) {
        let key = |id: &NodeId| (self.nodes[id.0].weight(), *id);
        let mut sorted: Vec<NodeId> = self.forest.clone();
        sorted.sort_by_key(key);
        (sorted[0], sorted[1])
    }

    /// Leftmost display position `i` such that `forest[i]` and `forest[i + 1]`
    /// weigh as much together as the two lightest nodes of the forest.
    fn adjacent_minimal_pair(&self) -> Option<usize> {
        let (a, b) = self.classic_pair();
        let minimal = self.nodes[a.0].weight() + self.nodes[b.0].weight();
        self.forest.windows(2).position(|pair| {
            self.nodes[pair[0].0].weight() + self.nodes[pair[1].0].weight() == minimal
        })
    }

    fn merge_classic(&mut self) -> Merge {
        let (a, b) = self.classic_pair();
        let pos_a = self.position(a);
        let pos_b = self.position(b);
        let parent = self.push_internal(a, b);

        // What an in-place replacement would have produced, if the pair is adjacent.
        let in_place = if pos_a.abs_diff(pos_b) == 1 {
            let slot = pos_a.min(pos_b);
            let mut layout = self.forest.clone();
            layout.remove(slot + 1);
            layout[slot] = parent;
            Some(layout)
        } else {
            None
        };

        self.forest.retain(|&id| id != a && id != b);
        self.forest.push(parent);
        self.relayout();

        let relocated = in_place.as_deref() != Some(self.forest.as_slice());
        self.merge_record(parent, a, b, relocated)
    }

    fn merge_adjacent(&mut self, pos: usize) -> Merge {
        let a = self.forest[pos];
        let b = self.forest[pos + 1];
        let parent = self.push_internal(a, b);
        self.forest.remove(pos + 1);
        self.forest[pos] = parent;
        self.merge_record(parent, a, b, false)
    }

    fn push_internal(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (left, right) = self.edge_order(a, b);
        let weight = self.nodes[a.0].weight() + self.nodes[b.0].weight();
        let id = NodeId(self.nodes.len());
        self.nodes.push(HuffmanNode::Internal {
            weight,
            left,
            right,
        });
        id
    }

    fn merge_record(&self, parent: NodeId, a: NodeId, b: NodeId, relocated: bool) -> Merge {
        let (left, right) = self.edge_order(a, b);
        Merge {
            parent,
            left,
            right,
            relocated,
        }
    }

    /// Orders two children so the `(weight, id)`-smaller one is on the `0` edge.
    fn edge_order(&self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        let ka = (self.nodes[a.0].weight(), a);
        let kb = (self.nodes[b.0].weight(), b);
        match ka.cmp(&kb) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        }
    }

    fn position(&self, id: NodeId) -> usize {
        self.forest
            .iter()
            .position(|&x| x == id)
            .unwrap_or(self.forest.len())
    }

    /// Stable sort of the display order by decreasing weight.
    fn relayout(&mut self) {
        let nodes = &self.nodes;
        self.forest
            .sort_by(|a, b| nodes[b.0].weight().cmp(&nodes[a.0].weight()));
    }
}

/// A finished Huffman tree (possibly a single leaf).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: NodeId,
}

impl HuffmanTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&HuffmanNode> {
        self.nodes.get(id.0)
    }

    /// Derives the codewords by walking root to leaf.
    ///
    /// A tree made of a single leaf gives its symbol the code `"0"`.
    pub fn code_table(&self) -> CodeTable {
        let mut leaves = Vec::new();
        self.collect_codes(self.root, String::new(), &mut leaves);
        // Leaf ids follow the frequency table's order.
        leaves.sort_by_key(|&(id, ..)| id);
        CodeTable {
            entries: leaves
                .into_iter()
                .map(|(_, symbol, weight, code)| CodeEntry {
                    symbol,
                    weight,
                    code,
                })
                .collect(),
        }
    }

    fn collect_codes(
        &self,
        id: NodeId,
        prefix: String,
        out: &mut Vec<(NodeId, char, usize, String)>,
    ) {
        match &self.nodes[id.0] {
            HuffmanNode::Leaf { symbol, weight } => {
                let code = if prefix.is_empty() {
                    "0".to_string()
                } else {
                    prefix
                };
                out.push((id, *symbol, *weight, code));
            }
            HuffmanNode::Internal { left, right, .. } => {
                let mut left_prefix = prefix.clone();
                left_prefix.push('0');
                self.collect_codes(*left, left_prefix, out);
                let mut right_prefix = prefix;
                right_prefix.push('1');
                self.collect_codes(*right, right_prefix, out);
            }
        }
    }

    /// Turns a bit string produced by [`CodeTable::encode`] back into text.
    ///
    /// Fails with [`Error::InvalidInput`] on a character other than `0`/`1` and
    /// with [`Error::CorruptStream`] if the bits stop inside a codeword.
    pub fn decode(&self, encoded: &str) -> Result<String> {
        let mut result = String::new();

        // One-leaf tree: every `0` is one occurrence.
        if let HuffmanNode::Leaf { symbol, .. } = self.nodes[self.root.0] {
            for bit in encoded.chars() {
                if bit != '0' {
                    return Err(Error::invalid_input(format!("unexpected bit {:?}", bit)));
                }
                result.push(symbol);
            }
            return Ok(result);
        }

        let mut current = self.root;
        for bit in encoded.chars() {
            if let HuffmanNode::Internal { left, right, .. } = &self.nodes[current.0] {
                current = match bit {
                    '0' => *left,
                    '1' => *right,
                    other => {
                        return Err(Error::invalid_input(format!("unexpected bit {:?}", other)))
                    }
                };
            }
            if let HuffmanNode::Leaf { symbol, .. } = &self.nodes[current.0] {
                result.push(*symbol);
                current = self.root;
            }
        }
        if current != self.root {
            return Err(Error::corrupt("bit string ends inside a codeword"));
        }
        Ok(result)
    }
}

/// One row of a [`CodeTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub symbol: char,
    pub weight: usize,
    pub code: String,
}

/// Symbol to codeword mapping, in the frequency table's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
}

impl CodeTable {
    pub fn get(&self, symbol: char) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.code.as_str())
    }

    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn total_weight(&self) -> usize {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Expected codeword length in bits per symbol.
    pub fn average_length(&self) -> f64 {
        let total = self.total_weight() as f64;
        self.entries
            .iter()
            .map(|e| e.weight as f64 * e.code.len() as f64)
            .sum::<f64>()
            / total
    }

    /// Entropy of the symbol weights, the lower bound for [`Self::average_length`].
    pub fn entropy(&self) -> f64 {
        let total = self.total_weight() as f64;
        statistics::entropy(self.entries.iter().map(|e| e.weight as f64 / total))
    }

    /// The codewords alone, in table order.
    pub fn codewords(&self) -> CodewordSet {
        CodewordSet::from_trusted(self.entries.iter().map(|e| e.code.clone()).collect())
    }

    /// Replaces each character of `input` with its codeword.
    pub fn encode(&self, input: &str) -> Result<String> {
        input
            .chars()
            .map(|ch| self.get(ch).ok_or(Error::UnknownSymbol(ch)))
            .collect()
    }
}

/// Builds the complete Huffman tree for `frequencies`.
///
/// Unlike [`HuffmanBuilder::new`], a single distinct symbol is accepted and
/// yields a one-leaf tree whose code is `"0"`.
pub fn huffman_code(frequencies: &FrequencyTable, policy: TieBreak) -> Result<HuffmanTree> {
    if frequencies.len() == 1 {
        let (symbol, weight) = frequencies
            .iter()
            .next()
            .ok_or(Error::EmptyInput)?;
        return Ok(HuffmanTree {
            nodes: vec![HuffmanNode::Leaf { symbol, weight }],
            root: NodeId(0),
        });
    }
    let mut builder = HuffmanBuilder::new(frequencies, policy)?;
    builder.run_to_completion();
    builder.tree()
}

/// Convenience function: builds the tree for `input` and returns the encoded
/// bit string together with the tree needed to decode it.
pub fn huffman_encode(input: &str, policy: TieBreak) -> Result<(String, HuffmanTree)> {
    let freq = FrequencyTable::from_text(input)?;
    let tree = huffman_code(&freq, policy)?;
    let encoded = tree.code_table().encode(input)?;
    Ok((encoded, tree))
}
