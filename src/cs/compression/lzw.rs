use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The initial LZW dictionary: single-symbol entries with consecutive codes.
///
/// An alphabet may also name a substitute for the space character. Spaces are
/// then coded as that symbol, and the substitute decompresses back to a space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    first_code: u32,
    space_as: Option<char>,
}

impl Alphabet {
    /// Assigns `first_code`, `first_code + 1`, ... to `symbols` in the given order.
    pub fn new<I>(symbols: I, first_code: u32) -> Result<Self>
    where
        I: IntoIterator<Item = char>,
    {
        let mut list: Vec<char> = Vec::new();
        for ch in symbols {
            if list.contains(&ch) {
                return Err(Error::invalid_input(format!(
                    "symbol {:?} listed twice in alphabet",
                    ch
                )));
            }
            list.push(ch);
        }
        if list.is_empty() {
            return Err(Error::EmptyInput);
        }
        u32::try_from(list.len())
            .ok()
            .and_then(|n| first_code.checked_add(n))
            .ok_or_else(|| Error::invalid_input("alphabet does not fit the code space"))?;
        Ok(Alphabet {
            symbols: list,
            first_code,
            space_as: None,
        })
    }

    /// Upper-case letters `A`..`Z` as codes 1..26 and `_` as 27, with spaces
    /// travelling as `_`.
    pub fn classic() -> Self {
        Alphabet {
            symbols: ('A'..='Z').chain(std::iter::once('_')).collect(),
            first_code: 1,
            space_as: Some('_'),
        }
    }

    /// The distinct symbols of `text` in ascending order, coded from 0.
    pub fn discover(text: &str) -> Result<Self> {
        let mut symbols: Vec<char> = text.chars().collect();
        symbols.sort_unstable();
        symbols.dedup();
        Alphabet::new(symbols, 0)
    }

    /// Codes spaces as `symbol`, or stops substituting them when `None`.
    ///
    /// The substitute must belong to the alphabet, and the alphabet must not
    /// contain a space of its own.
    pub fn with_space_as(mut self, symbol: Option<char>) -> Result<Self> {
        if let Some(sub) = symbol {
            if self.code_of(sub).is_none() {
                return Err(Error::UnknownSymbol(sub));
            }
            if self.code_of(' ').is_some() {
                return Err(Error::invalid_input(
                    "alphabet already codes spaces directly",
                ));
            }
        }
        self.space_as = symbol;
        Ok(self)
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn first_code(&self) -> u32 {
        self.first_code
    }

    pub fn space_as(&self) -> Option<char> {
        self.space_as
    }

    /// Code of a single symbol, if it belongs to the alphabet.
    pub fn code_of(&self, symbol: char) -> Option<u32> {
        self.symbols
            .iter()
            .position(|&c| c == symbol)
            .map(|i| self.first_code + i as u32)
    }

    /// First code handed out to a learned entry.
    pub fn next_code(&self) -> u32 {
        self.first_code + self.symbols.len() as u32
    }

    fn to_coded(&self, ch: char) -> char {
        match self.space_as {
            Some(sub) if ch == ' ' => sub,
            _ => ch,
        }
    }

    fn to_plain(&self, ch: char) -> char {
        match self.space_as {
            Some(sub) if ch == sub => ' ',
            _ => ch,
        }
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Alphabet::classic()
    }
}

/// One row of an LZW compression trace.
///
/// Symbols appear as coded, i.e. after space substitution. The last row has
/// `symbol: None` and flushes the word still pending at the end of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressStep {
    pub symbol: Option<char>,
    /// Word matched before reading `symbol`.
    pub previous: String,
    /// Whether `previous` extended by `symbol` was already in the dictionary.
    pub in_dictionary: bool,
    /// Word matched after this step.
    pub word: String,
    pub emitted: Option<u32>,
    /// New dictionary entry and its code.
    pub added: Option<(String, u32)>,
}

/// Compresses `input` using the LZW algorithm.
///
/// # Details
///
/// The dictionary starts with the single-symbol entries of `alphabet`.
/// Then, the algorithm finds the longest sequence `w` present in the dictionary that
/// is a prefix of the remaining input. It outputs the code for `w`, adds `w` concatenated
/// with the next symbol to the dictionary, and continues from that symbol.
///
/// Spaces are coded as the alphabet's substitute when it has one. Fails with
/// [`Error::UnknownSymbol`] on any other symbol outside the alphabet.
///
/// # Example
///
/// ```
/// use textcoding::compression::lzw::{compress, Alphabet};
///
/// let codes = compress("TOBEORNOTTOBE", &Alphabet::classic()).unwrap();
/// assert_eq!(&codes[..4], &[20, 15, 2, 5]);
/// ```
pub fn compress(input: &str, alphabet: &Alphabet) -> Result<Vec<u32>> {
    compress_with(input, alphabet, None)
}

/// Like [`compress`], also returning one [`CompressStep`] per input symbol
/// plus the final flush.
pub fn compress_steps(input: &str, alphabet: &Alphabet) -> Result<(Vec<u32>, Vec<CompressStep>)> {
    let mut steps = Vec::new();
    let codes = compress_with(input, alphabet, Some(&mut steps))?;
    Ok((codes, steps))
}

fn compress_with(
    input: &str,
    alphabet: &Alphabet,
    mut trace: Option<&mut Vec<CompressStep>>,
) -> Result<Vec<u32>> {
    // Learned entries keyed by (code of the prefix, appended symbol).
    let mut dict: HashMap<(u32, char), u32> = HashMap::new();
    let mut next_code = alphabet.next_code();

    let mut result = Vec::new();
    let mut w: Option<u32> = None;
    // `w` spelled out; only maintained while tracing.
    let mut word = String::new();
    for ch in input.chars() {
        let ch = alphabet.to_coded(ch);
        let single = alphabet.code_of(ch).ok_or(Error::UnknownSymbol(ch))?;
        let (next, emitted, added) = match w {
            None => (single, None, None),
            Some(prefix) => match dict.get(&(prefix, ch)) {
                Some(&code) => (code, None, None),
                None => {
                    result.push(prefix);
                    dict.insert((prefix, ch), next_code);
                    log::trace!("lzw: {} + {:?} => {}", prefix, ch, next_code);
                    let added = next_code;
                    next_code = next_code
                        .checked_add(1)
                        .ok_or_else(|| Error::invalid_input("LZW code space exhausted"))?;
                    (single, Some(prefix), Some(added))
                }
            },
        };
        if let Some(steps) = trace.as_deref_mut() {
            let previous = std::mem::take(&mut word);
            let mut extended = previous.clone();
            extended.push(ch);
            word = if emitted.is_some() {
                ch.to_string()
            } else {
                extended.clone()
            };
            steps.push(CompressStep {
                symbol: Some(ch),
                previous,
                in_dictionary: emitted.is_none(),
                word: word.clone(),
                emitted,
                added: added.map(|code| (extended, code)),
            });
        }
        w = Some(next);
    }
    // Output remaining code.
    if let Some(prefix) = w {
        result.push(prefix);
        if let Some(steps) = trace {
            steps.push(CompressStep {
                symbol: None,
                previous: word,
                in_dictionary: false,
                word: String::new(),
                emitted: Some(prefix),
                added: None,
            });
        }
    }
    log::debug!(
        "lzw: {} symbols -> {} codes, {} learned entries",
        input.chars().count(),
        result.len(),
        dict.len()
    );
    Ok(result)
}

/// One row of an LZW decompression trace, in coded symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressStep {
    pub code: u32,
    /// The text this code stands for.
    pub entry: String,
    /// The code named the entry learned in this very step, so `entry` was
    /// rebuilt as the previous entry plus its own first symbol.
    pub learned_on_use: bool,
    /// Entry learned in this step, with its code. `None` for the first code.
    pub added: Option<(u32, String)>,
}

/// Decompresses a sequence of LZW codes back into text.
///
/// # Details
///
/// The dictionary is rebuilt exactly as [`compress`] grew it: for each code read,
/// the corresponding entry is output and the previous entry extended by the
/// first symbol of the current one is learned. A code equal to the next free
/// code refers to the entry being learned right now, which must be the previous
/// entry plus its own first symbol.
///
/// The alphabet's space substitute, if any, comes back as a space.
///
/// Fails with [`Error::CorruptStream`] on a code outside the currently known range.
///
/// # Example
///
/// ```
/// use textcoding::compression::lzw::{compress, decompress, Alphabet};
///
/// let alphabet = Alphabet::classic();
/// let codes = compress("TO BE OR NOT", &alphabet).unwrap();
/// assert_eq!(decompress(&codes, &alphabet).unwrap(), "TO BE OR NOT");
/// ```
pub fn decompress(codes: &[u32], alphabet: &Alphabet) -> Result<String> {
    decompress_with(codes, alphabet, None)
}

/// Like [`decompress`], also returning one [`DecompressStep`] per code.
pub fn decompress_steps(
    codes: &[u32],
    alphabet: &Alphabet,
) -> Result<(String, Vec<DecompressStep>)> {
    let mut steps = Vec::new();
    let text = decompress_with(codes, alphabet, Some(&mut steps))?;
    Ok((text, steps))
}

fn decompress_with(
    codes: &[u32],
    alphabet: &Alphabet,
    mut trace: Option<&mut Vec<DecompressStep>>,
) -> Result<String> {
    let mut dict: Vec<String> = alphabet.symbols().iter().map(|c| c.to_string()).collect();
    let mut result = String::new();

    // Handle first code.
    let mut w = match codes.first() {
        Some(&first) => {
            let idx = index_of(first, alphabet, dict.len())?;
            dict[idx].clone()
        }
        None => return Ok(result),
    };
    result.push_str(&w);
    if let Some(steps) = trace.as_deref_mut() {
        steps.push(DecompressStep {
            code: codes[0],
            entry: w.clone(),
            learned_on_use: false,
            added: None,
        });
    }

    for &code in &codes[1..] {
        let idx = index_of(code, alphabet, dict.len() + 1)?;
        let learned_on_use = idx == dict.len();
        let entry = if learned_on_use {
            let mut temp = w.clone();
            temp.push(first_symbol(&w)?);
            temp
        } else {
            dict[idx].clone()
        };
        result.push_str(&entry);
        // Add new dictionary entry: w + first symbol of entry.
        let mut new_entry = w;
        new_entry.push(first_symbol(&entry)?);
        let new_code = alphabet.first_code() as usize + dict.len();
        log::trace!("lzw: learned {:?} as {}", new_entry, new_code);
        if let Some(steps) = trace.as_deref_mut() {
            steps.push(DecompressStep {
                code,
                entry: entry.clone(),
                learned_on_use,
                added: Some((new_code as u32, new_entry.clone())),
            });
        }
        dict.push(new_entry);
        w = entry;
    }
    Ok(result.chars().map(|ch| alphabet.to_plain(ch)).collect())
}

/// Maps `code` to a dictionary slot, requiring it to be below `limit`.
fn index_of(code: u32, alphabet: &Alphabet, limit: usize) -> Result<usize> {
    match code.checked_sub(alphabet.first_code()) {
        Some(idx) if (idx as usize) < limit => Ok(idx as usize),
        _ => Err(Error::corrupt(format!(
            "code {} outside the known range {}..{}",
            code,
            alphabet.first_code(),
            alphabet.first_code() as usize + limit
        ))),
    }
}

fn first_symbol(entry: &str) -> Result<char> {
    entry
        .chars()
        .next()
        .ok_or_else(|| Error::corrupt("empty dictionary entry"))
}

/// A list of LZW codes in its textual form, e.g. `"20,15,2,5"`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Codes(pub Vec<u32>);

/// Accepts codes separated by commas, whitespace, or both.
impl FromStr for Codes {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| Error::invalid_input(format!("{:?} is not a code", part)))
            })
            .collect::<Result<Vec<u32>>>()
            .map(Codes)
    }
}

impl fmt::Display for Codes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", code)?;
        }
        Ok(())
    }
}
