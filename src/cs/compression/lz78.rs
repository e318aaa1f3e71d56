use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Textual form of the end-of-input sentinel.
pub const END_OF_INPUT: &str = "<EOF>";

/// An LZ78 token.
///
/// Each token is a pair (index, symbol), where:
/// - `index` is the dictionary index of the longest previously seen phrase that is a prefix of the current input.
/// - `symbol` is the next symbol that did not match, or `None` (the end-of-input
///   sentinel) if the input ended inside a known phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    pub symbol: Option<char>,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.symbol {
            Some(ch) => write!(f, "({},{})", self.index, ch),
            None => write!(f, "({},{})", self.index, END_OF_INPUT),
        }
    }
}

/// Symbol that stands in for a space in the classic token notation.
pub const SPACE_SUBSTITUTE: char = '_';

/// One row of an LZ78 compression trace.
///
/// The last row has `symbol: None`; it only emits a token when the input ended
/// inside a known phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressStep {
    pub symbol: Option<char>,
    /// Phrase matched before reading `symbol`.
    pub previous: String,
    pub previous_index: usize,
    /// Whether `previous` extended by `symbol` was already an entry.
    pub in_dictionary: bool,
    /// New entry and its index.
    pub added: Option<(String, usize)>,
    pub emitted: Option<Token>,
}

/// Compress text using the LZ78 algorithm.
///
/// # Algorithm
///
/// 1. Start with a trie containing only the empty phrase at index 0.
/// 2. Walk the trie along the input for as long as the next symbol has an edge.
/// 3. At the first symbol `c` without an edge from node `w`, output `(index(w), c)`
///    and insert `w+c` as a new node with the next free index.
/// 4. Restart from the root with the following symbol. If the input ends while
///    inside a non-root node, output `(index(w), <EOF>)`.
///
/// # Example
///
/// ```
/// use textcoding::compression::lz78::{compress, Token};
///
/// let tokens = compress("ABA");
/// assert_eq!(tokens[2], Token { index: 1, symbol: None });
/// ```
pub fn compress(input: &str) -> Vec<Token> {
    compress_with(input.chars(), None)
}

/// Compresses with spaces written as [`SPACE_SUBSTITUTE`], so that every token
/// symbol is visible in the textual notation.
pub fn compress_classic(input: &str) -> Vec<Token> {
    compress_with(input.chars().map(underscore_space), None)
}

/// Like [`compress`], also returning one [`CompressStep`] per input symbol
/// plus the end-of-input row.
pub fn compress_steps(input: &str) -> (Vec<Token>, Vec<CompressStep>) {
    let mut steps = Vec::new();
    let tokens = compress_with(input.chars(), Some(&mut steps));
    (tokens, steps)
}

fn underscore_space(ch: char) -> char {
    if ch == ' ' {
        SPACE_SUBSTITUTE
    } else {
        ch
    }
}

fn compress_with<I>(input: I, mut trace: Option<&mut Vec<CompressStep>>) -> Vec<Token>
where
    I: Iterator<Item = char>,
{
    // Child links keyed by (parent index, symbol).
    let mut trie: HashMap<(usize, char), usize> = HashMap::new();
    let mut next_index = 1;
    let mut tokens = Vec::new();
    let mut consumed = 0usize;

    let mut node = 0;
    // Phrase of `node`; only maintained while tracing.
    let mut phrase = String::new();
    for ch in input {
        consumed += 1;
        let previous_index = node;
        let (in_dictionary, added) = match trie.get(&(node, ch)) {
            Some(&child) => {
                node = child;
                (true, None)
            }
            None => {
                tokens.push(Token {
                    index: node,
                    symbol: Some(ch),
                });
                trie.insert((node, ch), next_index);
                log::trace!("lz78: ({}, {:?}) => {}", node, ch, next_index);
                let added = next_index;
                next_index += 1;
                node = 0;
                (false, Some(added))
            }
        };
        if let Some(steps) = trace.as_deref_mut() {
            let previous = std::mem::take(&mut phrase);
            let mut extended = previous.clone();
            extended.push(ch);
            if in_dictionary {
                phrase = extended.clone();
            }
            steps.push(CompressStep {
                symbol: Some(ch),
                previous,
                previous_index,
                in_dictionary,
                emitted: added.and(tokens.last().copied()),
                added: added.map(|index| (extended, index)),
            });
        }
    }
    let sentinel = (node != 0).then_some(Token {
        index: node,
        symbol: None,
    });
    if let Some(token) = sentinel {
        tokens.push(token);
    }
    if let Some(steps) = trace {
        if consumed > 0 {
            steps.push(CompressStep {
                symbol: None,
                previous: phrase,
                previous_index: node,
                in_dictionary: false,
                added: None,
                emitted: sentinel,
            });
        }
    }
    log::debug!("lz78: {} symbols -> {} tokens", consumed, tokens.len());
    tokens
}

/// One row of an LZ78 decompression trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressStep {
    pub token: Token,
    /// Phrase of the entry the token refers to.
    pub prefix: String,
    /// New entry and its index; `None` for the end-of-input token.
    pub added: Option<(usize, String)>,
    /// Text this token contributes.
    pub output: String,
}

/// Decompress a sequence of LZ78 tokens back into text.
///
/// Each token's phrase is its referenced entry, expanded by following parent
/// links back to the root, followed by the token's symbol. Every token with a
/// symbol becomes the next entry.
///
/// Fails with [`Error::CorruptStream`] if a token refers to an entry that does
/// not exist yet, or if an end-of-input token is not the last one.
pub fn decompress(tokens: &[Token]) -> Result<String> {
    decompress_with(tokens, None)
}

/// Inverse of [`compress_classic`]: every [`SPACE_SUBSTITUTE`] comes back as a space.
pub fn decompress_classic(tokens: &[Token]) -> Result<String> {
    Ok(decompress_with(tokens, None)?
        .chars()
        .map(|ch| if ch == SPACE_SUBSTITUTE { ' ' } else { ch })
        .collect())
}

/// Like [`decompress`], also returning one [`DecompressStep`] per token.
pub fn decompress_steps(tokens: &[Token]) -> Result<(String, Vec<DecompressStep>)> {
    let mut steps = Vec::new();
    let text = decompress_with(tokens, Some(&mut steps))?;
    Ok((text, steps))
}

fn decompress_with(
    tokens: &[Token],
    mut trace: Option<&mut Vec<DecompressStep>>,
) -> Result<String> {
    // entries[i - 1] = (parent index, symbol) of entry i; index 0 is the root.
    let mut entries: Vec<(usize, char)> = Vec::new();
    let mut output = String::new();

    for (pos, token) in tokens.iter().enumerate() {
        if token.index > entries.len() {
            return Err(Error::corrupt(format!(
                "token {} refers to entry {} but only {} exist",
                pos,
                token.index,
                entries.len()
            )));
        }
        let prefix = expand(&entries, token.index);
        output.push_str(&prefix);
        match token.symbol {
            Some(ch) => {
                output.push(ch);
                entries.push((token.index, ch));
            }
            None if pos + 1 != tokens.len() => {
                return Err(Error::corrupt(format!(
                    "end-of-input token at position {} is followed by more tokens",
                    pos
                )));
            }
            None => {}
        }
        if let Some(steps) = trace.as_deref_mut() {
            let mut phrase = prefix.clone();
            phrase.extend(token.symbol);
            steps.push(DecompressStep {
                token: *token,
                added: token.symbol.map(|_| (entries.len(), phrase.clone())),
                prefix,
                output: phrase,
            });
        }
    }
    Ok(output)
}

/// Spells out entry `index` by walking parent links up to the root.
fn expand(entries: &[(usize, char)], mut index: usize) -> String {
    let mut reversed = Vec::new();
    while index != 0 {
        let (parent, ch) = entries[index - 1];
        reversed.push(ch);
        index = parent;
    }
    reversed.iter().rev().collect()
}

/// A token list in its textual form, e.g. `"(0,H)(0,E)(1,_)"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tokens(pub Vec<Token>);

/// Parses `(index,symbol)` groups, optionally separated by whitespace. The
/// symbol is exactly one character, which may itself be `,` or `)`, or the
/// literal `<EOF>`.
impl FromStr for Tokens {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = Vec::new();
        let mut rest = s.trim_start();
        while !rest.is_empty() {
            let body = rest
                .strip_prefix('(')
                .ok_or_else(|| Error::invalid_input(format!("expected '(' at {:?}", rest)))?;
            let (index, after) = body
                .split_once(',')
                .ok_or_else(|| Error::invalid_input(format!("token {:?} lacks ','", body)))?;
            let index: usize = index.trim().parse().map_err(|_| {
                Error::invalid_input(format!("{:?} is not a token index", index))
            })?;
            let (symbol, after) = match after.strip_prefix(END_OF_INPUT) {
                Some(after) => (None, after),
                None => {
                    let mut chars = after.chars();
                    let ch = chars
                        .next()
                        .ok_or_else(|| Error::invalid_input("unterminated token"))?;
                    (Some(ch), chars.as_str())
                }
            };
            rest = after
                .strip_prefix(')')
                .ok_or_else(|| {
                    Error::invalid_input(format!(
                        "token {} must hold a single symbol followed by ')'",
                        tokens.len()
                    ))
                })?
                .trim_start();
            tokens.push(Token { index, symbol });
        }
        Ok(Tokens(tokens))
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}
