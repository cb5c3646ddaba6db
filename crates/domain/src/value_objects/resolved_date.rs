//! Resolved calendar date value object
//!
//! The concrete outcome of resolving a temporal expression such as
//! "tomorrow" or "this weekend" against a reference time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A single calendar day or an inclusive range of days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedDate {
    /// One calendar day
    Single { date: NaiveDate },
    /// Inclusive range of calendar days
    Range { start: NaiveDate, end: NaiveDate },
}

impl ResolvedDate {
    /// A single calendar day
    #[must_use]
    pub const fn single(date: NaiveDate) -> Self {
        Self::Single { date }
    }

    /// An inclusive range of days
    ///
    /// A range whose start equals its end collapses to a single day.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateRange` if `start` is after `end`.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::invalid_range(start, end));
        }
        if start == end {
            return Ok(Self::single(start));
        }
        Ok(Self::Range { start, end })
    }

    /// First day covered
    #[must_use]
    pub const fn first(&self) -> NaiveDate {
        match self {
            Self::Single { date } => *date,
            Self::Range { start, .. } => *start,
        }
    }

    /// Last day covered
    #[must_use]
    pub const fn last(&self) -> NaiveDate {
        match self {
            Self::Single { date } => *date,
            Self::Range { end, .. } => *end,
        }
    }

    /// Whether this is a single day
    #[must_use]
    pub const fn is_single(&self) -> bool {
        matches!(self, Self::Single { .. })
    }

    /// Number of days covered (at least 1)
    #[must_use]
    pub fn len_days(&self) -> u32 {
        let span = (self.last() - self.first()).num_days();
        u32::try_from(span).unwrap_or(0) + 1
    }

    /// Whether the given day falls within this date or range
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first() <= date && date <= self.last()
    }
}

impl fmt::Display for ResolvedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { date } => write!(f, "{date}"),
            Self::Range { start, end } => write!(f, "{start} to {end}"),
        }
    }
}
