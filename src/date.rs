use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use std::{
    fmt::{Debug, Display},
    sync::LazyLock,
};

use crate::error::{Error, Result};

static ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid regex"));
static DAY_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("valid regex"));

/// The date of a sale, as a calendar day.
///
/// A `SaleDate` always names a day that exists, leap years included, and
/// orders chronologically, whatever textual form it was read from.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SaleDate(NaiveDate);

impl SaleDate {
    /// Creates the date `year`-`month`-`day`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_ledger::SaleDate;
    /// assert!(SaleDate::new(2024, 2, 29).is_ok());
    /// assert!(SaleDate::new(1900, 2, 29).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCalendarDate`] if there is no such day.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(Error::InvalidCalendarDate { year, month, day })
    }

    /// Today's date, in local time.
    #[must_use]
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

/// Always `YYYY-MM-DD`, which is also how reports show dates.
impl Display for SaleDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&DateFormat::Iso.format(*self))
    }
}

impl Debug for SaleDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// How dates are written in a ledger file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `DD/MM/YYYY`
    DayFirst,
}

impl DateFormat {
    /// A human-readable template for this format, such as `YYYY-MM-DD`.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            DateFormat::Iso => "YYYY-MM-DD",
            DateFormat::DayFirst => "DD/MM/YYYY",
        }
    }

    /// Reads a date written in this format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_ledger::{DateFormat, SaleDate};
    /// let iso = DateFormat::Iso.parse("2023-12-31").unwrap();
    /// let day_first = DateFormat::DayFirst.parse("31/12/2023").unwrap();
    /// assert_eq!(iso, day_first);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadDateFormat`] if `text` isn't shaped like this
    /// format, or [`Error::InvalidCalendarDate`] if it names a day that
    /// doesn't exist.
    pub fn parse(self, text: &str) -> Result<SaleDate> {
        let bad_format = || Error::BadDateFormat {
            text: text.to_string(),
            expected: self.template(),
        };
        let (regex, year, month, day) = match self {
            DateFormat::Iso => (&*ISO, 1, 2, 3),
            DateFormat::DayFirst => (&*DAY_FIRST, 3, 2, 1),
        };
        let caps = regex.captures(text).ok_or_else(bad_format)?;
        let field = |i: usize| caps[i].parse::<u32>().map_err(|_| bad_format());
        let year = i32::try_from(field(year)?).map_err(|_| bad_format())?;
        SaleDate::new(year, field(month)?, field(day)?)
    }

    /// Writes `date` in this format.
    #[must_use]
    pub fn format(self, date: SaleDate) -> String {
        match self {
            DateFormat::Iso => date.0.format("%Y-%m-%d").to_string(),
            DateFormat::DayFirst => date.0.format("%d/%m/%Y").to_string(),
        }
    }
}

/// The inclusive range of years the ledger accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: 1900,
            max: 2100,
        }
    }
}

impl YearRange {
    /// Checks that `date` falls within the range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DateOutOfRange`] if it doesn't.
    pub fn check(&self, date: SaleDate) -> Result<SaleDate> {
        let year = date.year();
        if year < self.min || year > self.max {
            return Err(Error::DateOutOfRange {
                year,
                min: self.min,
                max: self.max,
            });
        }
        Ok(date)
    }
}
