//! Text coding algorithms.
//!
//! This module provides implementations of classic entropy and dictionary coders
//! over character text, plus tools for inspecting the codes they produce:
//! - Symbol statistics (frequencies, probabilities, entropy)
//! - Huffman coding with a steppable builder and two tie-break policies
//! - Code analysis (prefix freedom, Kraft–McMillan sum, Sardinas–Patterson)
//! - Dictionary coding (LZW, LZ78)
//! - Arithmetic coding
//!
//! The LZW, LZ78 and arithmetic coders each expose their own `compress` /
//! `decompress` or `encode` / `decode` functions and are used through their
//! modules.
//!
//! # Examples
//!
//! ```rust
//! use textcoding::compression::{analyze, huffman_code, FrequencyTable, TieBreak};
//!
//! let freq = FrequencyTable::from_text("ABRACADABRA").unwrap();
//! let tree = huffman_code(&freq, TieBreak::Classic).unwrap();
//! let report = analyze(&tree.code_table().codewords()).unwrap();
//! assert!(report.is_prefix_free);
//! assert!(report.kraft_sum.is_one());
//! ```

pub use crate::error::{Error, Result};

pub mod analysis;
pub mod arithmetic;
pub mod huffman;
pub mod lz78;
pub mod lzw;
pub mod statistics;

pub use analysis::{analyze, sardinas_patterson, Analysis, CodewordSet, KraftSum};
pub use arithmetic::Interval;
pub use huffman::{
    huffman_code, huffman_encode, CodeTable, HuffmanBuilder, HuffmanNode, HuffmanTree, Merge,
    NodeId, TieBreak,
};
pub use statistics::{compute_frequencies, FrequencyTable, ProbabilityTable, SymbolStatistics};
