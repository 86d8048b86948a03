use std::fmt::Display;

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("invalid period format: expected MM-YYYY, got {0:?}")]
    InvalidFormat(String),
    #[error("month out of range: {0}")]
    MonthOutOfRange(u32),
    #[error("period overflow")]
    Overflow,
}

const MAX_YEAR: i32 = 9999;

/// A calendar month, written `MM-YYYY` on the wire and stored as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    pub fn parse(raw: &str) -> Result<Self, PeriodError> {
        let invalid = || PeriodError::InvalidFormat(raw.to_string());

        let (month_part, year_part) = raw.split_once('-').ok_or_else(invalid)?;
        if month_part.len() != 2
            || year_part.len() != 4
            || !month_part.bytes().all(|b| b.is_ascii_digit())
            || !year_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }

        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Period)
            .ok_or(PeriodError::Overflow)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// Fails once the result no longer fits the four-digit year of `MM-YYYY`.
    pub fn add_one_month(&self) -> Result<Self, PeriodError> {
        self.0
            .checked_add_months(Months::new(1))
            .filter(|next| next.year() <= MAX_YEAR)
            .map(Period)
            .ok_or(PeriodError::Overflow)
    }

    pub fn format(&self) -> String {
        format!("{:02}-{:04}", self.0.month(), self.0.year())
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
