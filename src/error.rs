//! Error types shared by every coding algorithm in the crate.

use thiserror::Error;

/// Validation failures raised by the statistics, Huffman, analysis and codec modules.
///
/// All of these are detected synchronously on caller-supplied data; none of them
/// is transient, so retrying the same call always yields the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input sequence (or codeword list) contained nothing.
    #[error("input is empty")]
    EmptyInput,

    /// A Huffman tree needs at least two distinct symbols to merge.
    #[error("need at least two distinct symbols, found {distinct}")]
    DegenerateInput { distinct: usize },

    /// A symbol was not part of the model, alphabet or code table.
    #[error("symbol {0:?} is not in the model")]
    UnknownSymbol(char),

    /// A dictionary codec received an index it could not have produced.
    #[error("corrupt stream: {0}")]
    CorruptStream(String),

    /// The arithmetic decoder's value left the current interval.
    #[error("value {value} lies outside [{low}, {high})")]
    ValueOutOfRange { value: f64, low: f64, high: f64 },

    /// Arithmetic decoding was requested without an output length.
    #[error("decode length must be provided")]
    DecodeLengthMismatch,

    /// The Sardinas-Patterson rounds did not reach a fixed point in time.
    #[error("unique decodability undecided after {rounds} rounds")]
    AnalysisInconclusive { rounds: usize },

    /// A code table was requested before the Huffman tree had a single root.
    #[error("huffman construction incomplete, {remaining} merges remaining")]
    ConstructionIncomplete { remaining: usize },

    /// Textual input or a model parameter could not be accepted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Builds an [`Error::InvalidInput`] from anything string-like.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Builds an [`Error::CorruptStream`] from anything string-like.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptStream(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
