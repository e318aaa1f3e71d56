//! Arithmetic coding over a fixed probability table.
//!
//! A message is mapped to a sub-interval of `[0, 1)`: starting from the unit
//! interval, each symbol narrows the current interval to the slice matching
//! that symbol's cumulative probability range. Any number inside the final
//! interval identifies the message, given its length.
//!
//! Cumulative ranges are laid out in ascending symbol order. The last range is
//! closed off at exactly 1.0 so rounding in the table's sum cannot leave a gap
//! at the top. All arithmetic is `f64`; messages are limited to what keeps the
//! final interval's width representable, which for typical tables is a few
//! dozen symbols.

use std::fmt;

use crate::cs::compression::statistics::ProbabilityTable;
use crate::error::{Error, Result};

/// A half-open interval `[low, high)` with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    /// `[0, 1)`.
    pub const UNIT: Interval = Interval {
        low: 0.0,
        high: 1.0,
    };

    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Midpoint, or `low` if rounding would push the midpoint onto `high`.
    pub fn midpoint(&self) -> f64 {
        let mid = self.low + self.width() / 2.0;
        if mid < self.high {
            mid
        } else {
            self.low
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value < self.high
    }

    /// The slice `[low + width * from, low + width * to)` of this interval.
    fn narrow(&self, from: f64, to: f64) -> Interval {
        let width = self.width();
        Interval {
            low: self.low + width * from,
            high: self.low + width * to,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.low, self.high)
    }
}

/// `(symbol, cumulative low, cumulative high)` in ascending symbol order.
fn cumulative_ranges(table: &ProbabilityTable) -> Vec<(char, f64, f64)> {
    let mut ranges = Vec::with_capacity(table.len());
    let mut running = 0.0;
    for (symbol, p) in table.iter() {
        let low = running;
        running += p;
        ranges.push((symbol, low, running));
    }
    if let Some(last) = ranges.last_mut() {
        last.2 = 1.0;
    }
    ranges
}

/// Encodes `input` and returns the interval after every symbol, in order.
///
/// Fails with [`Error::UnknownSymbol`] for a symbol missing from `table`, and
/// with [`Error::ValueOutOfRange`] if the interval collapses under `f64`
/// precision.
pub fn encode_steps(input: &str, table: &ProbabilityTable) -> Result<Vec<Interval>> {
    let ranges = cumulative_ranges(table);
    let mut interval = Interval::UNIT;
    let mut steps = Vec::new();

    for sym in input.chars() {
        let &(_, cum_low, cum_high) = ranges
            .iter()
            .find(|(s, ..)| *s == sym)
            .ok_or(Error::UnknownSymbol(sym))?;
        let next = interval.narrow(cum_low, cum_high);
        if next.low >= next.high {
            return Err(Error::ValueOutOfRange {
                value: next.low,
                low: interval.low,
                high: interval.high,
            });
        }
        log::trace!("arithmetic: {:?} narrows {} to {}", sym, interval, next);
        interval = next;
        steps.push(interval);
    }
    Ok(steps)
}

/// Encodes `input` into its final interval. An empty input yields `[0, 1)`.
///
/// # Example
///
/// ```
/// use textcoding::compression::arithmetic::{decode, encode};
/// use textcoding::compression::statistics::ProbabilityTable;
///
/// let table: ProbabilityTable = "A:0.2,B:0.3,C:0.5".parse().unwrap();
/// let interval = encode("AB", &table).unwrap();
/// assert!(interval.contains(0.07));
/// assert_eq!(decode(interval.midpoint(), &table, Some(2)).unwrap(), "AB");
/// ```
pub fn encode(input: &str, table: &ProbabilityTable) -> Result<Interval> {
    let interval = encode_steps(input, table)?
        .last()
        .copied()
        .unwrap_or(Interval::UNIT);
    log::debug!(
        "arithmetic: {} symbols -> {}",
        input.chars().count(),
        interval
    );
    Ok(interval)
}

/// Encodes `input` into a single number: the midpoint of its final interval.
pub fn encode_value(input: &str, table: &ProbabilityTable) -> Result<f64> {
    Ok(encode(input, table)?.midpoint())
}

/// One row of an arithmetic decoding trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeStep {
    /// Interval before this symbol was read.
    pub before: Interval,
    pub symbol: char,
    /// The symbol's slice of `before`, which contains the decoded value.
    pub after: Interval,
}

/// Decodes `length` symbols from `value`.
///
/// At each step the symbol whose slice of the current interval contains
/// `value` is emitted and the interval narrowed to that slice, exactly as the
/// encoder did.
///
/// Fails with [`Error::DecodeLengthMismatch`] when `length` is `None`, since the
/// code carries no terminator, and with [`Error::ValueOutOfRange`] if `value` is
/// outside `[0, 1)` or no slice contains it.
pub fn decode(value: f64, table: &ProbabilityTable, length: Option<usize>) -> Result<String> {
    Ok(decode_steps(value, table, length)?
        .iter()
        .map(|step| step.symbol)
        .collect())
}

/// Like [`decode`], returning the interval before and after every symbol.
pub fn decode_steps(
    value: f64,
    table: &ProbabilityTable,
    length: Option<usize>,
) -> Result<Vec<DecodeStep>> {
    let length = length.ok_or(Error::DecodeLengthMismatch)?;
    if !Interval::UNIT.contains(value) {
        return Err(Error::ValueOutOfRange {
            value,
            low: 0.0,
            high: 1.0,
        });
    }

    let ranges = cumulative_ranges(table);
    let mut interval = Interval::UNIT;
    let mut steps = Vec::with_capacity(length);

    for _ in 0..length {
        let (symbol, next) = ranges
            .iter()
            .map(|&(sym, cum_low, cum_high)| (sym, interval.narrow(cum_low, cum_high)))
            .find(|(_, slice)| slice.contains(value))
            .ok_or(Error::ValueOutOfRange {
                value,
                low: interval.low,
                high: interval.high,
            })?;
        log::trace!("arithmetic: {} in {} decodes {:?}", value, next, symbol);
        steps.push(DecodeStep {
            before: interval,
            symbol,
            after: next,
        });
        interval = next;
    }
    Ok(steps)
}
