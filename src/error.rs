use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Everything that can go wrong while reading, validating, changing, or
/// writing sales records.
///
/// None of these are fatal: callers decide whether to skip a row, ask the
/// user again, or give up on the current command.
#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: expected 5 fields, found {found}")]
    MalformedRow { line: u64, found: usize },

    #[error("{field}: can't parse {value:?} as a number")]
    NumericParse { field: &'static str, value: String },

    #[error("{field} must not be negative (got {value})")]
    NegativeValue { field: &'static str, value: String },

    #[error("{field} must be at most {max} (got {value})")]
    TooLarge {
        field: &'static str,
        value: String,
        max: i64,
    },

    #[error("{text:?} is not a date in {expected} form")]
    BadDateFormat { text: String, expected: &'static str },

    #[error("{year:04}-{month:02}-{day:02} is not a real calendar date")]
    InvalidCalendarDate { year: i32, month: u32, day: u32 },

    #[error("year {year} is outside the accepted range {min}..={max}")]
    DateOutOfRange { year: i32, min: i32, max: i32 },

    #[error("sale ID must not be empty")]
    EmptyId,

    #[error("no sale with ID {0}")]
    IdNotFound(String),

    #[error("sale {id}: {field} contains a comma or line break, which can't be stored")]
    UnencodableField { id: String, field: &'static str },

    #[error("{count} unreadable row(s) would be lost by rewriting the ledger")]
    UnreadRows { count: usize },

    #[error("can't write {}: {source}", path.display())]
    DestinationUnwritable { path: PathBuf, source: io::Error },

    #[error("input closed before a value was entered")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Wraps an I/O failure on `path` as [`Error::DestinationUnwritable`].
    pub(crate) fn unwritable(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Error::DestinationUnwritable { path, source }
    }

    /// Reattributes a write failure to `path`; other errors pass through.
    pub(crate) fn at(self, path: &Path) -> Self {
        let path = path.to_path_buf();
        match self {
            Error::Io(source) => Error::DestinationUnwritable { path, source },
            Error::Csv(err) if err.is_io_error() => Error::DestinationUnwritable {
                path,
                source: io::Error::other(err),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
