use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Write},
    path::Path,
};

use crate::{
    date::{DateFormat, YearRange},
    error::{Error, Result},
    record::{Record, Sale, SaleId},
    usd::{Usd, MAX_PRICE_DOLLARS},
};

/// The header line of every ledger file.
pub const HEADER: [&str; 5] = [
    "date",
    "sales_id",
    "item_name",
    "item_quantity",
    "unit_price",
];

/// Reads and writes the ledger's comma-separated format.
///
/// Fields are separated by a literal comma with no quoting, so item names
/// and IDs must not contain commas or line breaks. Writing such a record
/// fails with [`Error::UnencodableField`] rather than producing a row that
/// would read back differently.
#[derive(Clone, Copy, Debug, Default)]
pub struct Codec {
    /// How dates are written on disk.
    pub format: DateFormat,
    /// Rows dated outside this range are rejected on reading.
    pub years: YearRange,
}

/// A row that couldn't be read, and why.
#[derive(Debug)]
pub struct Rejected {
    /// 1-based line number in the input, counting the header.
    pub line: u64,
    pub error: Error,
}

/// The result of reading a ledger: every good record, plus the rows that
/// were skipped.
#[derive(Debug, Default)]
pub struct Decoded {
    pub records: Vec<Record>,
    pub rejected: Vec<Rejected>,
}

#[derive(Serialize)]
struct Row<'a> {
    date: String,
    sales_id: &'a str,
    item_name: &'a str,
    item_quantity: u32,
    unit_price: Usd,
}

impl Codec {
    #[must_use]
    pub fn new(format: DateFormat, years: YearRange) -> Self {
        Self { format, years }
    }

    /// Parses ledger text.
    ///
    /// The first line is the header, and is skipped. A row with the wrong
    /// number of fields, or with a field that doesn't parse, is left out of
    /// the records and listed in [`Decoded::rejected`] instead; one bad row
    /// never spoils the rest.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_ledger::Codec;
    /// let text = "date,sales_id,item_name,item_quantity,unit_price\n\
    ///             2024-01-15,SID1000,Widget,3,10.00\n\
    ///             2024-01-16,SID1001,Gadget,2\n";
    /// let decoded = Codec::default().decode(text).unwrap();
    /// assert_eq!(decoded.records.len(), 1);
    /// assert_eq!(decoded.rejected[0].line, 3);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error only if the text can't be read as CSV at all.
    pub fn decode(&self, text: &str) -> Result<Decoded> {
        self.read(text.as_bytes())
    }

    /// Like [`Codec::decode`], but reads from `rdr`.
    ///
    /// # Errors
    ///
    /// Returns any errors from reading `rdr`.
    pub fn read(&self, rdr: impl Read) -> Result<Decoded> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(rdr);
        let mut decoded = Decoded::default();
        for result in rdr.records() {
            let row = result?;
            let line = row.position().map_or(0, csv::Position::line);
            match self.decode_row(&row) {
                Ok(record) => decoded.records.push(record),
                Err(error) => decoded.rejected.push(Rejected { line, error }),
            }
        }
        Ok(decoded)
    }

    /// Reads the ledger file at `path`.
    ///
    /// # Errors
    ///
    /// Returns any errors from opening or reading the file.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Decoded> {
        let decoded = self.read(File::open(&path)?)?;
        debug!(
            path = %path.as_ref().display(),
            records = decoded.records.len(),
            rejected = decoded.rejected.len(),
            "read ledger"
        );
        Ok(decoded)
    }

    fn decode_row(&self, row: &StringRecord) -> Result<Record> {
        if row.len() != HEADER.len() {
            return Err(Error::MalformedRow {
                line: row.position().map_or(0, csv::Position::line),
                found: row.len(),
            });
        }
        let date = self.years.check(self.format.parse(&row[0])?)?;
        let id = SaleId::new(&row[1])?;
        let quantity = parse_quantity(&row[3])?;
        let unit_price = parse_price(&row[4])?;
        Record::new(
            id,
            Sale {
                date,
                item_name: row[2].to_string(),
                quantity,
                unit_price,
            },
        )
    }

    /// Renders `records` as ledger text, header first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnencodableField`] if any record can't be stored.
    pub fn encode(&self, records: &[Record]) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf, records)?;
        String::from_utf8(buf).map_err(|e| Error::Io(io::Error::other(e)))
    }

    /// Writes `records` to `wtr`, header first.
    ///
    /// Every record is checked before anything is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnencodableField`] if any record can't be stored, or
    /// any errors from writing.
    pub fn write(&self, wtr: impl Write, records: &[Record]) -> Result<()> {
        check_encodable(records)?;
        self.write_rows(wtr, records, true)
    }

    /// Replaces the file at `path` with `records`.
    ///
    /// If writing fails partway, the file is left incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnencodableField`] if any record can't be stored
    /// (the file is then left untouched), or
    /// [`Error::DestinationUnwritable`] if the file can't be written.
    pub fn write_path(&self, path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
        let path = path.as_ref();
        check_encodable(records)?;
        let file = File::create(path).map_err(Error::unwritable(path))?;
        self.write_rows(file, records, true).map_err(|e| e.at(path))?;
        debug!(path = %path.display(), records = records.len(), "wrote ledger");
        Ok(())
    }

    /// Adds `records` to the end of the file at `path`, creating it (with
    /// its header) if it doesn't exist or is empty.
    ///
    /// # Errors
    ///
    /// As for [`Codec::write_path`].
    pub fn append_path(&self, path: impl AsRef<Path>, records: &[Record]) -> Result<()> {
        let path = path.as_ref();
        check_encodable(records)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(Error::unwritable(path))?;
        let new_file = file.metadata().map_err(Error::unwritable(path))?.len() == 0;
        self.write_rows(file, records, new_file).map_err(|e| e.at(path))?;
        debug!(path = %path.display(), records = records.len(), "appended to ledger");
        Ok(())
    }

    fn write_rows(&self, wtr: impl Write, records: &[Record], header: bool) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(wtr);
        if header {
            wtr.write_record(HEADER)?;
        }
        for record in records {
            wtr.serialize(Row {
                date: self.format.format(record.date()),
                sales_id: record.id().as_str(),
                item_name: record.item_name(),
                item_quantity: record.quantity(),
                unit_price: record.unit_price(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Reads a quantity, telling a non-number apart from a negative number.
pub(crate) fn parse_quantity(field: &str) -> Result<u32> {
    let parse_error = || Error::NumericParse {
        field: "item_quantity",
        value: field.to_string(),
    };
    let quantity: i64 = field.trim().parse().map_err(|_| parse_error())?;
    if quantity < 0 {
        return Err(Error::NegativeValue {
            field: "item_quantity",
            value: field.to_string(),
        });
    }
    u32::try_from(quantity).map_err(|_| parse_error())
}

/// Reads a unit price, rounded to whole cents, telling a non-number apart
/// from a negative or oversized one.
pub(crate) fn parse_price(field: &str) -> Result<Usd> {
    let price: Usd = field.trim().parse()?;
    if price.is_negative() {
        return Err(Error::NegativeValue {
            field: "unit_price",
            value: field.to_string(),
        });
    }
    if price.exceeds_max_price() {
        return Err(Error::TooLarge {
            field: "unit_price",
            value: field.to_string(),
            max: MAX_PRICE_DOLLARS,
        });
    }
    Ok(price)
}

fn check_encodable(records: &[Record]) -> Result<()> {
    let unencodable = |s: &str| s.contains([',', '\n', '\r']);
    for record in records {
        let field = if unencodable(record.id().as_str()) {
            "sales_id"
        } else if unencodable(record.item_name()) {
            "item_name"
        } else {
            continue;
        };
        return Err(Error::UnencodableField {
            id: record.id().to_string(),
            field,
        });
    }
    Ok(())
}
