#![doc = include_str!("../README.md")]

mod codec;
mod date;
mod error;
mod prompt;
mod record;
mod report;
mod sort;
mod store;
mod usd;

pub use codec::{Codec, Decoded, Rejected, HEADER};
pub use date::{DateFormat, SaleDate, YearRange};
pub use error::{Error, Result};
pub use prompt::Prompter;
pub use record::{Record, Sale, SaleId};
pub use report::Report;
pub use sort::sorted_by_date;
pub use store::Store;
pub use usd::Usd;
