//! Analysis of arbitrary binary codeword sets.
//!
//! Three questions are answered for a list of codewords:
//! - is the code prefix-free,
//! - what is its Kraft–McMillan sum `Σ 2^(-len)` (computed exactly),
//! - is it uniquely decodable (trivially so when prefix-free, otherwise
//!   decided by the Sardinas–Patterson construction).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive};

use crate::error::{Error, Result};

/// An ordered list of binary codewords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodewordSet {
    words: Vec<String>,
}

impl CodewordSet {
    /// Validates that every word is a non-empty string of `0`s and `1`s.
    ///
    /// Duplicates are kept: they are a property of the code to report on, not a
    /// malformed input.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        if words.is_empty() {
            return Err(Error::EmptyInput);
        }
        for word in &words {
            if word.is_empty() {
                return Err(Error::invalid_input("empty codeword"));
            }
            if let Some(bad) = word.chars().find(|&c| c != '0' && c != '1') {
                return Err(Error::invalid_input(format!(
                    "codeword {:?} contains non-binary digit {:?}",
                    word, bad
                )));
            }
        }
        Ok(CodewordSet { words })
    }

    /// Wraps codewords already known to be valid binary strings.
    pub(crate) fn from_trusted(words: Vec<String>) -> Self {
        CodewordSet { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn max_len(&self) -> usize {
        self.words.iter().map(String::len).max().unwrap_or(0)
    }
}

/// Parses `"0, 10, 110"`: comma separated, whitespace trimmed, empty parts skipped.
impl FromStr for CodewordSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CodewordSet::new(s.split(',').map(str::trim).filter(|w| !w.is_empty()))
    }
}

impl fmt::Display for CodewordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words.join(","))
    }
}

/// Exact Kraft–McMillan sum as a reduced fraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KraftSum {
    numerator: BigUint,
    denominator: BigUint,
}

impl KraftSum {
    /// `Σ 2^(-len(w))` over `words`, computed over the common denominator `2^max_len`.
    pub fn of(words: &[String]) -> Self {
        let max_len = words.iter().map(String::len).max().unwrap_or(0);
        let numerator = words
            .iter()
            .map(|w| BigUint::one() << (max_len - w.len()))
            .fold(BigUint::from(0u32), |acc, term| acc + term);
        let denominator = BigUint::one() << max_len;
        let gcd = numerator.gcd(&denominator);
        KraftSum {
            numerator: numerator / &gcd,
            denominator: denominator / gcd,
        }
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    /// Exactly one: the code is complete.
    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }

    /// Above one: no prefix code with these lengths exists.
    pub fn exceeds_one(&self) -> bool {
        self.numerator > self.denominator
    }

    /// Floating approximation, for display only.
    pub fn to_f64(&self) -> f64 {
        match (self.numerator.to_f64(), self.denominator.to_f64()) {
            (Some(n), Some(d)) => n / d,
            _ => f64::NAN,
        }
    }
}

impl fmt::Display for KraftSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Everything [`analyze`] finds out about a codeword set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub is_prefix_free: bool,
    /// The first `(prefix, longer)` pair found when the code is not prefix-free.
    pub prefix_violation: Option<(String, String)>,
    pub kraft_sum: KraftSum,
    /// The Kraft–McMillan sum is exactly one.
    pub is_huffman_compatible: bool,
    pub is_uniquely_decodable: bool,
    /// Suffixes first discovered in each Sardinas–Patterson round; empty for
    /// prefix-free codes.
    pub dangling_suffixes: Vec<BTreeSet<String>>,
}

impl Analysis {
    /// Prefix-free with a Kraft sum of one, i.e. a code a Huffman construction
    /// could have produced.
    pub fn is_complete_prefix_code(&self) -> bool {
        self.is_prefix_free && self.is_huffman_compatible
    }
}

/// Analyzes a codeword set.
///
/// # Example
///
/// ```
/// use textcoding::compression::analysis::{analyze, CodewordSet};
///
/// let code: CodewordSet = "0, 01, 011".parse().unwrap();
/// let report = analyze(&code).unwrap();
/// assert!(!report.is_prefix_free);
/// assert!(report.is_uniquely_decodable);
/// ```
pub fn analyze(code: &CodewordSet) -> Result<Analysis> {
    if code.is_empty() {
        return Err(Error::EmptyInput);
    }
    let prefix_violation = find_prefix_violation(code.words());
    let is_prefix_free = prefix_violation.is_none();
    let kraft_sum = KraftSum::of(code.words());
    let is_huffman_compatible = kraft_sum.is_one();

    let (is_uniquely_decodable, dangling_suffixes) = if is_prefix_free {
        (true, Vec::new())
    } else {
        let sp = sardinas_patterson(code)?;
        (sp.uniquely_decodable, sp.rounds)
    };

    log::debug!(
        "code {}: prefix-free {}, kraft sum {}, uniquely decodable {}",
        code,
        is_prefix_free,
        kraft_sum,
        is_uniquely_decodable
    );

    Ok(Analysis {
        is_prefix_free,
        prefix_violation,
        kraft_sum,
        is_huffman_compatible,
        is_uniquely_decodable,
        dangling_suffixes,
    })
}

/// Returns the first pair `(a, b)` where codeword `a` is a prefix of (or equal
/// to) a different entry `b`, scanning pairs in list order.
pub fn find_prefix_violation(words: &[String]) -> Option<(String, String)> {
    for (i, a) in words.iter().enumerate() {
        for b in &words[i + 1..] {
            if b.starts_with(a.as_str()) {
                return Some((a.clone(), b.clone()));
            }
            if a.starts_with(b.as_str()) {
                return Some((b.clone(), a.clone()));
            }
        }
    }
    None
}

/// Outcome of the Sardinas–Patterson test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SardinasPatterson {
    pub uniquely_decodable: bool,
    /// Newly discovered dangling suffixes per round.
    pub rounds: Vec<BTreeSet<String>>,
}

/// Decides unique decodability with the Sardinas–Patterson construction.
///
/// Round 1 holds the dangling suffixes `s` with `c1 = c2 + s` for distinct
/// codewords. Each following round holds the suffixes left when a member of
/// the previous round is a proper prefix of a codeword, or a codeword is a
/// proper prefix of the member. The code is not uniquely decodable as soon as
/// a round contains a codeword; it is uniquely decodable once a round finds
/// nothing new. Only unseen suffixes are carried forward, so the number of
/// rounds is bounded by the number of distinct codeword suffixes.
pub fn sardinas_patterson(code: &CodewordSet) -> Result<SardinasPatterson> {
    let words: BTreeSet<&str> = code.words().iter().map(String::as_str).collect();

    // A repeated codeword is ambiguous on its own.
    if words.len() < code.len() {
        log::debug!("duplicate codeword in {}", code);
        return Ok(SardinasPatterson {
            uniquely_decodable: false,
            rounds: Vec::new(),
        });
    }

    let cap = code.len() * code.max_len() + 1;
    let mut rounds: Vec<BTreeSet<String>> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    let mut frontier: BTreeSet<String> = BTreeSet::new();
    for &x in &words {
        for &y in &words {
            if x != y {
                if let Some(suffix) = y.strip_prefix(x) {
                    frontier.insert(suffix.to_string());
                }
            }
        }
    }

    while !frontier.is_empty() {
        if rounds.len() >= cap {
            return Err(Error::AnalysisInconclusive {
                rounds: rounds.len(),
            });
        }
        log::trace!("sardinas-patterson round {}: {:?}", rounds.len() + 1, frontier);
        let hit = frontier.iter().any(|s| words.contains(s.as_str()));
        rounds.push(frontier.clone());
        if hit {
            return Ok(SardinasPatterson {
                uniquely_decodable: false,
                rounds,
            });
        }
        seen.extend(frontier.iter().cloned());

        let mut next = BTreeSet::new();
        for s in &frontier {
            for &w in &words {
                if let Some(suffix) = w.strip_prefix(s.as_str()) {
                    next.insert(suffix.to_string());
                }
                if let Some(suffix) = s.strip_prefix(w) {
                    next.insert(suffix.to_string());
                }
            }
        }
        frontier = next.difference(&seen).cloned().collect();
    }

    Ok(SardinasPatterson {
        uniquely_decodable: true,
        rounds,
    })
}
