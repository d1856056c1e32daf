//! Bracketing search over monotonic tables.
//!
//! Given a strictly ascending or strictly descending sequence `x` and a target
//! value $t$, a search returns the index $i$ such that $x_i$ and $x_{i+1}$
//! bracket $t$. Two strategies implement [`TableSearch`]:
//!
//! - [`BracketSearch`] keeps the last bracket as a cursor, hunts outward from
//!   it with doubling steps, then bisects. Sequential queries (advancing
//!   simulation time) cost O(1) amortised.
//! - [`BisectionSearch`] always bisects from the full range.
//!
//! Both return the same [`Bracket`] for the same input. Ties follow a single
//! convention so the cursor never changes the answer:
//!
//! | Direction  | Returned `i` satisfies          |
//! |------------|---------------------------------|
//! | ascending  | $x_i \le t < x_{i+1}$           |
//! | descending | $x_i > t \ge x_{i+1}$           |

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplingError};

/// Ordering of a monotonic sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Direction as decided by the search: ascending iff `x[last] > x[first]`.
    ///
    /// A single-element (or constant) sequence counts as descending, which is
    /// harmless because no interior bracket exists.
    pub fn of(x: &[f64]) -> Self {
        match (x.first(), x.last()) {
            (Some(first), Some(last)) if last > first => Direction::Ascending,
            _ => Direction::Descending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Direction::Ascending
    }
}

/// Result of a bracketing search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    /// The target lies before the first element.
    BeforeStart,
    /// `x[i]` and `x[i + 1]` bracket the target.
    Between(usize),
    /// The target lies at or beyond the last element; holds `len - 1`.
    AtOrAfterEnd(usize),
}

impl Bracket {
    /// Integer form of the bracket: `-1` before the start, otherwise the
    /// lower index of the bracketing pair (or `len - 1` past the end).
    pub fn as_index(self) -> isize {
        match self {
            Bracket::BeforeStart => -1,
            Bracket::Between(i) | Bracket::AtOrAfterEnd(i) => i as isize,
        }
    }

    fn from_index(index_low: isize, len: usize) -> Self {
        if index_low < 0 {
            Bracket::BeforeStart
        } else if index_low as usize >= len - 1 {
            Bracket::AtOrAfterEnd(len - 1)
        } else {
            Bracket::Between(index_low as usize)
        }
    }
}

/// A strategy for locating the bracket of a target in a monotonic table.
///
/// Implementations may keep internal state between calls but must never let
/// that state change the result.
pub trait TableSearch: Send + Sync + std::fmt::Debug {
    /// Find the bracket of `x_target` in `x`.
    fn find(&mut self, x_target: f64, x: &[f64]) -> Result<Bracket>;

    /// The lower index found by the last call (`-1` before the start).
    fn index_low(&self) -> isize;

    /// Forget any cached position.
    fn reset(&mut self);

    /// Clone into a fresh box, keeping the cached position.
    fn box_clone(&self) -> Box<dyn TableSearch>;
}

impl Clone for Box<dyn TableSearch> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Narrow `(low, high)` until they are adjacent.
///
/// `low` may be `-1` and `high` may be `x.len()`; every probed midpoint lies
/// strictly between them and is therefore a valid index.
fn bisect(x_target: f64, x: &[f64], ascending: bool, mut low: isize, mut high: isize) -> (isize, isize) {
    while high - low != 1 {
        let middle = (high + low) >> 1;
        if (x_target >= x[middle as usize]) == ascending {
            low = middle;
        } else {
            high = middle;
        }
    }
    (low, high)
}

/// Hunt-then-bisect search with a retained cursor.
#[derive(Debug, Clone)]
pub struct BracketSearch {
    index_low: isize,
    index_high: isize,
    ascending: bool,
    /// Length of the sequence the cursor was computed for.
    size: usize,
}

impl Default for BracketSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl BracketSearch {
    pub fn new() -> Self {
        Self {
            index_low: 0,
            index_high: 0,
            ascending: true,
            size: 0,
        }
    }

    /// The upper index of the last bracket.
    pub fn index_high(&self) -> isize {
        self.index_high
    }

    fn hunt_up(&mut self, x_target: f64, x: &[f64]) {
        let size = x.len() as isize;
        let mut increment = 1;
        self.index_high = self.index_low + 1;

        while (x_target >= x[self.index_high as usize]) == self.ascending {
            self.index_low = self.index_high;
            increment += increment;
            self.index_high = self.index_low + increment;

            if self.index_high > size - 1 {
                self.index_high = size;
                break;
            }
        }
    }

    fn hunt_down(&mut self, x_target: f64, x: &[f64]) {
        let mut increment = 1;
        self.index_high = self.index_low;
        self.index_low -= 1;

        while (x_target < x[self.index_low as usize]) == self.ascending {
            self.index_high = self.index_low;
            increment += increment;
            self.index_low = self.index_high - increment;

            if self.index_low < 0 {
                self.index_low = -1;
                break;
            }
        }
    }
}

impl TableSearch for BracketSearch {
    fn find(&mut self, x_target: f64, x: &[f64]) -> Result<Bracket> {
        if x.is_empty() {
            return Err(SamplingError::EmptySequence);
        }
        let len = x.len();
        let size = len as isize;
        self.ascending = Direction::of(x).is_ascending();

        let stale = self.size != len || self.index_low < 0 || self.index_low > size - 1;
        self.size = len;

        if stale {
            trace!(
                "search cursor reset (cached low {} for {} samples)",
                self.index_low,
                len
            );
            self.index_low = -1;
            self.index_high = size;
        } else if (x_target >= x[self.index_low as usize]) == self.ascending {
            if self.index_low == size - 1 {
                self.index_high = size;
                return Ok(Bracket::AtOrAfterEnd(len - 1));
            }
            self.hunt_up(x_target, x);
        } else {
            if self.index_low == 0 {
                self.index_low = -1;
                self.index_high = 0;
                return Ok(Bracket::BeforeStart);
            }
            self.hunt_down(x_target, x);
        }

        let (low, high) = bisect(x_target, x, self.ascending, self.index_low, self.index_high);
        self.index_low = low;
        self.index_high = high;
        Ok(Bracket::from_index(low, len))
    }

    fn index_low(&self) -> isize {
        self.index_low
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn box_clone(&self) -> Box<dyn TableSearch> {
        Box::new(self.clone())
    }
}

/// Plain bisection over the full range on every call.
#[derive(Debug, Clone, Default)]
pub struct BisectionSearch {
    index_low: isize,
}

impl BisectionSearch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableSearch for BisectionSearch {
    fn find(&mut self, x_target: f64, x: &[f64]) -> Result<Bracket> {
        if x.is_empty() {
            return Err(SamplingError::EmptySequence);
        }
        let ascending = Direction::of(x).is_ascending();
        let (low, _) = bisect(x_target, x, ascending, -1, x.len() as isize);
        self.index_low = low;
        Ok(Bracket::from_index(low, x.len()))
    }

    fn index_low(&self) -> isize {
        self.index_low
    }

    fn reset(&mut self) {
        self.index_low = 0;
    }

    fn box_clone(&self) -> Box<dyn TableSearch> {
        Box::new(self.clone())
    }
}

/// Verify that `x` is strictly monotonic and report its direction.
///
/// The search itself never validates ordering; this is the check callers use
/// to detect a table that would silently produce wrong brackets.
pub fn check_monotonic(x: &[f64]) -> Result<Direction> {
    if x.is_empty() {
        return Err(SamplingError::EmptySequence);
    }
    let direction = Direction::of(x);
    for (i, pair) in x.windows(2).enumerate() {
        let ordered = match direction {
            Direction::Ascending => pair[1] > pair[0],
            Direction::Descending => pair[1] < pair[0],
        };
        if !ordered {
            return Err(SamplingError::NonMonotonic {
                index: i + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    Ok(direction)
}
