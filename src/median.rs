//! Exact running median over a stream of decimals

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rust_decimal::Decimal;

use crate::error::ReportError;

/// Running median state for a stream of [`Decimal`] values
///
/// The [`Self::new`] constructor creates an empty engine.
/// Values are admitted with [`Self::insert`], and the median of everything
/// inserted so far can be read at any time with [`Self::median`].
///
/// Values are split across two heaps: `lower` holds the smaller half with its
/// maximum on top, `upper` holds the larger half with its minimum on top.
/// After every insertion `lower` is the same size as `upper` or one larger,
/// and every value in `lower` is `<=` every value in `upper`.
#[derive(Debug, Clone, Default)]
pub struct RunningMedian {
    /// Smaller half of the stream, max on top
    lower: BinaryHeap<Decimal>,
    /// Larger half of the stream, min on top
    upper: BinaryHeap<Reverse<Decimal>>,

    /// Total values inserted
    count: u64,
}

impl RunningMedian {
    /// Constructs a new [`Self`] with no values
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of values inserted so far
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Whether no values have been inserted yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Admits a value into the stream, rebalancing the halves
    pub fn insert(&mut self, value: Decimal) {
        self.count += 1;

        match self.lower.peek() {
            Some(&max_lower) if value > max_lower => self.upper.push(Reverse(value)),
            _ => self.lower.push(value),
        }

        self.rebalance();
    }

    fn rebalance(&mut self) {
        if self.lower.len() > self.upper.len() + 1 {
            if let Some(moved) = self.lower.pop() {
                self.upper.push(Reverse(moved));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(moved)) = self.upper.pop() {
                self.lower.push(moved);
            }
        }
    }

    /// Gets the median of every value inserted so far
    ///
    /// With an odd count this is the middle value. With an even count it is the
    /// exact midpoint of the two middle values. Returns [`None`] if nothing has
    /// been inserted, which callers must not confuse with a median of zero.
    pub fn median(&self) -> Option<Decimal> {
        let max_lower = *self.lower.peek()?;

        if self.lower.len() > self.upper.len() {
            return Some(max_lower);
        }

        let Reverse(min_upper) = *self.upper.peek()?;
        Some(midpoint(max_lower, min_upper))
    }

    /// Checks the size and ordering invariants between the two halves
    pub fn check_invariants(&self) -> Result<(), ReportError> {
        let (lower, upper) = (self.lower.len(), self.upper.len());

        if lower != upper && lower != upper + 1 {
            return Err(ReportError::InvariantViolation(format!(
                "median halves out of balance: lower holds {lower}, upper holds {upper}"
            )));
        }

        if (lower + upper) as u64 != self.count {
            return Err(ReportError::InvariantViolation(format!(
                "median count is {} but halves hold {} values",
                self.count,
                lower + upper
            )));
        }

        if let (Some(max_lower), Some(Reverse(min_upper))) = (self.lower.peek(), self.upper.peek())
        {
            if max_lower > min_upper {
                return Err(ReportError::InvariantViolation(format!(
                    "median halves overlap: lower max {max_lower} exceeds upper min {min_upper}"
                )));
            }
        }

        Ok(())
    }
}

/// Exact midpoint of `lo <= hi` without overflowing
///
/// The sum of two same-signed values can overflow but their gap cannot, and
/// the reverse holds for values of opposite sign.
fn midpoint(lo: Decimal, hi: Decimal) -> Decimal {
    if lo.is_sign_negative() == hi.is_sign_negative() {
        lo + (hi - lo) / Decimal::TWO
    } else {
        (lo + hi) / Decimal::TWO
    }
}
