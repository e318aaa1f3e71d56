//! Symbol statistics: frequency tables, probability tables and Shannon entropy.
//!
//! These are the inputs shared by the Huffman builder (which consumes a
//! [`FrequencyTable`]) and the arithmetic codec (which consumes a
//! [`ProbabilityTable`]).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use approx::relative_eq;

use crate::error::{Error, Result};

/// Largest distance from 1.0 a probability table's sum may have.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Occurrence counts per symbol, kept in first-occurrence order.
///
/// The order matters: the Huffman builder breaks weight ties by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(char, usize)>,
    index: HashMap<char, usize>,
    total: usize,
}

impl FrequencyTable {
    /// Counts every character of `text`.
    ///
    /// # Example
    ///
    /// ```
    /// use textcoding::compression::statistics::FrequencyTable;
    ///
    /// let table = FrequencyTable::from_text("abracadabra").unwrap();
    /// assert_eq!(table.count('a'), 5);
    /// assert_eq!(table.total(), 11);
    /// ```
    pub fn from_text(text: &str) -> Result<Self> {
        let mut entries: Vec<(char, usize)> = Vec::new();
        let mut index: HashMap<char, usize> = HashMap::new();
        for ch in text.chars() {
            match index.get(&ch) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(ch, entries.len());
                    entries.push((ch, 1));
                }
            }
        }
        if entries.is_empty() {
            return Err(Error::EmptyInput);
        }
        let total = text.chars().count();
        Ok(FrequencyTable {
            entries,
            index,
            total,
        })
    }

    /// Builds a table from explicit counts, keeping the given order.
    ///
    /// Zero counts, repeated symbols and counts whose sum overflows are rejected.
    pub fn from_counts<I>(counts: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, usize)>,
    {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        let mut total = 0usize;
        for (ch, count) in counts {
            if count == 0 {
                return Err(Error::invalid_input(format!(
                    "symbol {:?} has a zero count",
                    ch
                )));
            }
            if index.insert(ch, entries.len()).is_some() {
                return Err(Error::invalid_input(format!(
                    "symbol {:?} listed twice",
                    ch
                )));
            }
            entries.push((ch, count));
            total = total.checked_add(count).ok_or_else(|| {
                Error::invalid_input(format!("counts overflow at symbol {:?}", ch))
            })?;
        }
        if entries.is_empty() {
            return Err(Error::EmptyInput);
        }
        Ok(FrequencyTable {
            entries,
            index,
            total,
        })
    }

    /// Count for `symbol`, zero when it never occurred.
    pub fn count(&self, symbol: char) -> usize {
        self.index
            .get(&symbol)
            .map(|&i| self.entries[i].1)
            .unwrap_or(0)
    }

    /// Sum of all counts, i.e. the input length.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(symbol, count)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Relative frequencies `count / total`.
    pub fn probabilities(&self) -> ProbabilityTable {
        let total = self.total as f64;
        ProbabilityTable {
            probs: self
                .entries
                .iter()
                .map(|&(ch, count)| (ch, count as f64 / total))
                .collect(),
        }
    }
}

/// Probability per symbol, ordered by symbol.
///
/// The ascending `char` order is the order cumulative ranges are laid out in
/// by the arithmetic codec.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    probs: BTreeMap<char, f64>,
}

impl ProbabilityTable {
    /// Validates and wraps `(symbol, probability)` pairs.
    ///
    /// Every probability must be finite and in `(0, 1]`, symbols must be
    /// distinct, and the sum must be 1 within [`PROBABILITY_TOLERANCE`].
    pub fn new<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, f64)>,
    {
        let mut probs = BTreeMap::new();
        for (ch, p) in pairs {
            if !p.is_finite() || p <= 0.0 || p > 1.0 {
                return Err(Error::invalid_input(format!(
                    "probability {} for {:?} is not in (0, 1]",
                    p, ch
                )));
            }
            if probs.insert(ch, p).is_some() {
                return Err(Error::invalid_input(format!(
                    "symbol {:?} listed twice",
                    ch
                )));
            }
        }
        if probs.is_empty() {
            return Err(Error::EmptyInput);
        }
        let sum: f64 = probs.values().sum();
        if !relative_eq!(sum, 1.0, epsilon = PROBABILITY_TOLERANCE) {
            return Err(Error::invalid_input(format!(
                "probabilities sum to {}, not 1",
                sum
            )));
        }
        Ok(ProbabilityTable { probs })
    }

    /// Probability of `symbol`, if it is in the table.
    pub fn get(&self, symbol: char) -> Option<f64> {
        self.probs.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// `(symbol, probability)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
        self.probs.iter().map(|(&ch, &p)| (ch, p))
    }

    /// Shannon entropy of the distribution in bits per symbol.
    pub fn entropy(&self) -> f64 {
        entropy(self.probs.values().copied())
    }
}

/// Parses `"A:0.2, B:0.3, C:0.5"`.
impl FromStr for ProbabilityTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (sym, prob) = part.split_once(':').ok_or_else(|| {
                Error::invalid_input(format!("expected 'Symbol:Probability', got {:?}", part))
            })?;
            let mut chars = sym.trim().chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(Error::invalid_input(format!(
                        "symbol {:?} is not a single character",
                        sym
                    )))
                }
            };
            let p: f64 = prob.trim().parse().map_err(|_| {
                Error::invalid_input(format!("cannot parse probability {:?}", prob))
            })?;
            pairs.push((ch, p));
        }
        ProbabilityTable::new(pairs)
    }
}

impl fmt::Display for ProbabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (ch, p)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", ch, p)?;
        }
        Ok(())
    }
}

/// Shannon entropy `H = -sum p log2 p` over a set of probabilities.
///
/// Zero probabilities contribute nothing.
pub fn entropy<I>(probabilities: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    probabilities
        .into_iter()
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.log2())
        .sum()
}

/// Frequencies, probabilities and entropy of one input sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolStatistics {
    pub frequencies: FrequencyTable,
    pub probabilities: ProbabilityTable,
    /// Bits per symbol.
    pub entropy: f64,
}

/// Computes the statistics of `text`. Fails with [`Error::EmptyInput`] on an empty string.
pub fn compute_frequencies(text: &str) -> Result<SymbolStatistics> {
    let frequencies = FrequencyTable::from_text(text)?;
    let probabilities = frequencies.probabilities();
    let entropy = probabilities.entropy();
    log::debug!(
        "{} symbols, {} distinct, entropy {:.4} bits/symbol",
        frequencies.total(),
        frequencies.len(),
        entropy
    );
    Ok(SymbolStatistics {
        frequencies,
        probabilities,
        entropy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_table() {
        let freq = FrequencyTable::from_text("aabccc").unwrap();
        assert_eq!(freq.count('a'), 2);
        assert_eq!(freq.count('b'), 1);
        assert_eq!(freq.count('c'), 3);
        assert_eq!(freq.count('z'), 0);
        assert_eq!(freq.total(), 6);
        assert_eq!(freq.len(), 3);
    }

    #[test]
    fn test_first_occurrence_order() {
        let freq = FrequencyTable::from_text("cabbac").unwrap();
        let order: Vec<char> = freq.iter().map(|(ch, _)| ch).collect();
        assert_eq!(order, vec!['c', 'a', 'b']);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(FrequencyTable::from_text(""), Err(Error::EmptyInput));
        assert!(matches!(compute_frequencies(""), Err(Error::EmptyInput)));
        assert_eq!(
            FrequencyTable::from_counts(Vec::new()),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn test_from_counts_rejects_bad_entries() {
        assert!(matches!(
            FrequencyTable::from_counts([('a', 1), ('b', 0)]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            FrequencyTable::from_counts([('a', 1), ('a', 2)]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_counts_rejects_overflowing_total() {
        assert!(matches!(
            FrequencyTable::from_counts([('a', usize::MAX), ('b', 1)]),
            Err(Error::InvalidInput(_))
        ));
        let max = FrequencyTable::from_counts([('a', usize::MAX - 1), ('b', 1)]).unwrap();
        assert_eq!(max.total(), usize::MAX);
    }

    #[test]
    fn test_from_text_accumulates_repeats() {
        let freq = FrequencyTable::from_text("ééaé").unwrap();
        assert_eq!(freq.iter().collect::<Vec<_>>(), vec![('é', 3), ('a', 1)]);
        assert_eq!(freq.total(), 4);
    }

    #[test]
    fn test_total_matches_input_length() {
        let text = "this is an example for huffman encoding";
        let stats = compute_frequencies(text).unwrap();
        let sum: usize = stats.frequencies.iter().map(|(_, c)| c).sum();
        assert_eq!(sum, text.chars().count());
        assert_eq!(stats.frequencies.total(), sum);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let stats = compute_frequencies("mississippi river").unwrap();
        let sum: f64 = stats.probabilities.iter().map(|(_, p)| p).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_entropy_values() {
        let uniform = compute_frequencies("abcd").unwrap();
        assert_relative_eq!(uniform.entropy, 2.0, epsilon = 1e-12);

        let single = compute_frequencies("aaaa").unwrap();
        assert_relative_eq!(single.entropy, 0.0);

        assert_relative_eq!(entropy([0.5, 0.25, 0.25, 0.0]), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_probability_table_validation() {
        assert!(ProbabilityTable::new([('A', 0.2), ('B', 0.3), ('C', 0.5)]).is_ok());
        assert!(matches!(
            ProbabilityTable::new([('A', 0.2), ('B', 0.3)]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            ProbabilityTable::new([('A', 0.0), ('B', 1.0)]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            ProbabilityTable::new([('A', f64::NAN), ('B', 1.0)]),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(
            ProbabilityTable::new(Vec::<(char, f64)>::new()),
            Err(Error::EmptyInput)
        );
    }

    #[test]
    fn test_probability_table_parse_and_display() {
        let table: ProbabilityTable = "C:0.5, A:0.2,B:0.3".parse().unwrap();
        let symbols: Vec<char> = table.iter().map(|(ch, _)| ch).collect();
        assert_eq!(symbols, vec!['A', 'B', 'C']);
        assert_eq!(table.get('B'), Some(0.3));
        assert_eq!(table.to_string(), "A:0.2,B:0.3,C:0.5");

        assert!("A=0.5,B:0.5".parse::<ProbabilityTable>().is_err());
        assert!("AB:0.5,C:0.5".parse::<ProbabilityTable>().is_err());
        assert!("A:x,B:0.5".parse::<ProbabilityTable>().is_err());
    }
}
