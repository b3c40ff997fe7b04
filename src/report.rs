use tracing::debug;

use std::{collections::BTreeMap, fmt::Display, fs, path::Path};

use crate::{
    date::SaleDate,
    error::{Error, Result},
    record::Record,
    usd::Usd,
};

const DATE: usize = 10;
const ID: usize = 14;
const NAME: usize = 20;
const QTY: usize = 8;
const MONEY: usize = 12;
const WIDTH: usize = DATE + ID + NAME + QTY + MONEY * 2 + 5;

/// Daily sales, grouped for reporting.
///
/// To build a `Report`, use [`Report::new`].
///
/// To get a printable version of the report, use its [`Display`]
/// implementation, or write it to a file with [`Report::write_to`].
#[derive(Debug)]
pub struct Report {
    generated_on: SaleDate,
    days: BTreeMap<SaleDate, Vec<Record>>,
}

impl Report {
    /// Groups `records` by date. Within each day, records keep the order
    /// they have in `records`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_ledger::{Codec, Report, SaleDate, Usd};
    /// let text = "date,sales_id,item_name,item_quantity,unit_price\n\
    ///             2024-01-15,SID1,Widget,3,10.00\n\
    ///             2024-01-15,SID2,Gadget,2,5.50\n";
    /// let records = Codec::default().decode(text).unwrap().records;
    /// let report = Report::new(&records, SaleDate::today());
    /// assert_eq!(report.grand_total(), Usd::from_cents(4100));
    /// ```
    #[must_use]
    pub fn new(records: &[Record], generated_on: SaleDate) -> Self {
        let mut days: BTreeMap<SaleDate, Vec<Record>> = BTreeMap::new();
        for record in records {
            days.entry(record.date()).or_default().push(record.clone());
        }
        Self { generated_on, days }
    }

    /// The days with sales, earliest first, each with its records.
    pub fn buckets(&self) -> impl Iterator<Item = (SaleDate, &[Record])> {
        self.days.iter().map(|(date, records)| (*date, records.as_slice()))
    }

    /// Total sales on `date`, or `None` if there were none.
    #[must_use]
    pub fn subtotal(&self, date: SaleDate) -> Option<Usd> {
        self.days.get(&date).map(|records| total(records))
    }

    /// Total sales across all days.
    #[must_use]
    pub fn grand_total(&self) -> Usd {
        self.days.values().map(|records| total(records)).sum()
    }

    /// Writes the report to `path`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DestinationUnwritable`] if the file can't be
    /// written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string()).map_err(Error::unwritable(path))?;
        debug!(path = %path.display(), days = self.days.len(), "wrote report");
        Ok(())
    }
}

fn total(records: &[Record]) -> Usd {
    records.iter().map(Record::sales_amount).sum()
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SALES REPORT")?;
        writeln!(f, "Generated on: {}", self.generated_on)?;
        writeln!(f, "{:=<WIDTH$}", "")?;
        for (date, records) in self.buckets() {
            writeln!(f)?;
            writeln!(
                f,
                "{:DATE$} {:ID$} {:NAME$} {:>QTY$} {:>MONEY$} {:>MONEY$}",
                "Date", "SaleID", "ItemName", "Quantity", "Price", "SalesAmount"
            )?;
            writeln!(f, "{:-<WIDTH$}", "")?;
            for r in records {
                writeln!(
                    f,
                    "{:DATE$} {:ID$} {:NAME$} {:>QTY$} {:>MONEY$} {:>MONEY$}",
                    r.date(),
                    r.id(),
                    r.item_name(),
                    r.quantity(),
                    r.unit_price(),
                    r.sales_amount(),
                )?;
            }
            writeln!(f, "{:-<WIDTH$}", "")?;
            let label = format!("Subtotal for {date}");
            writeln!(f, "{label:<LABEL$}{:>MONEY$}", total(records))?;
        }
        writeln!(f)?;
        writeln!(f, "{:=<WIDTH$}", "")?;
        writeln!(f, "{:<LABEL$}{:>MONEY$}", "Grand total", self.grand_total())?;
        writeln!(f, "END OF REPORT")?;
        Ok(())
    }
}

const LABEL: usize = WIDTH - MONEY;
