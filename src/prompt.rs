use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use crate::{
    codec::{parse_price, parse_quantity, Codec},
    date::SaleDate,
    error::{Error, Result},
    record::{Record, Sale, SaleId},
    store::Store,
    usd::Usd,
};

/// Asks the user for the details of a sale, one field at a time.
///
/// Each answer is checked as it is given; an invalid answer gets an error
/// message and the question is asked again. Running out of input ends with
/// [`Error::InputClosed`].
///
/// # Examples
///
/// ```
/// # use sales_ledger::{Codec, Prompter};
/// let input = "2024-13-01\n2024-01-15\nWidget\n3\n10.00\n";
/// let mut output = Vec::new();
/// let mut prompter = Prompter::new(input.as_bytes(), &mut output, Codec::default());
/// let sale = prompter.sale().unwrap();
/// assert_eq!(sale.item_name, "Widget");
/// ```
pub struct Prompter<R, W> {
    input: R,
    output: W,
    codec: Codec,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Reads answers from `input` and writes questions to `output`. Dates
    /// are asked for in the codec's format and range.
    pub fn new(input: R, output: W, codec: Codec) -> Self {
        Self {
            input,
            output,
            codec,
        }
    }

    /// Asks for every field of a sale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] if input runs out, or any errors from
    /// reading or writing.
    pub fn sale(&mut self) -> Result<Sale> {
        Ok(Sale {
            date: self.date()?,
            item_name: self.item_name()?,
            quantity: self.quantity()?,
            unit_price: self.unit_price()?,
        })
    }

    /// Asks for sales, adding each to `store` under a fresh ID, until the
    /// user declines another or input runs out. Returns how many were added.
    ///
    /// Running out of input ends the session rather than failing it; a sale
    /// that was only partly entered is discarded.
    ///
    /// # Errors
    ///
    /// Returns any errors from reading or writing, other than
    /// [`Error::InputClosed`].
    pub fn add_sales(&mut self, store: &mut Store) -> Result<usize> {
        let mut added = 0;
        loop {
            let sale = match self.sale() {
                Ok(sale) => sale,
                Err(Error::InputClosed) => break,
                Err(e) => return Err(e),
            };
            let record = Record::new(SaleId::generate(), sale)?;
            writeln!(self.output, "Recorded sale {}", record.id())?;
            store.append(record);
            added += 1;
            match self.confirm("Add another sale?") {
                Ok(true) => {}
                Ok(false) | Err(Error::InputClosed) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }

    /// # Errors
    ///
    /// As for [`Prompter::sale`].
    pub fn date(&mut self) -> Result<SaleDate> {
        let codec = self.codec;
        let question = format!("Enter date ({})", codec.format.template());
        self.ask_until(&question, |answer| {
            codec.years.check(codec.format.parse(answer.trim())?)
        })
    }

    /// # Errors
    ///
    /// As for [`Prompter::sale`].
    pub fn item_name(&mut self) -> Result<String> {
        self.ask_until("Enter item name", |answer| {
            if answer.trim().is_empty() {
                Err("item name must not be empty")
            } else if answer.contains(',') {
                Err("item name must not contain a comma")
            } else {
                Ok(answer.to_string())
            }
        })
    }

    /// # Errors
    ///
    /// As for [`Prompter::sale`].
    pub fn quantity(&mut self) -> Result<u32> {
        self.ask_until("Enter item quantity", parse_quantity)
    }

    /// # Errors
    ///
    /// As for [`Prompter::sale`].
    pub fn unit_price(&mut self) -> Result<Usd> {
        self.ask_until("Enter unit price", parse_price)
    }

    /// Asks a yes/no question, accepting `y`, `yes`, `n`, or `no` in any
    /// case.
    ///
    /// # Errors
    ///
    /// As for [`Prompter::sale`].
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let question = format!("{question} (y/n)");
        self.ask_until(&question, |answer| {
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => Ok(true),
                "n" | "no" => Ok(false),
                _ => Err("please answer y or n"),
            }
        })
    }

    fn ask_until<T, E: Display>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> std::result::Result<T, E>,
    ) -> Result<T> {
        loop {
            let answer = self.ask(question)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.output, "Invalid input: {e}. Please try again.")?,
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}: ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{DateFormat, YearRange};

    type TestPrompter = Prompter<&'static [u8], Vec<u8>>;

    fn run<T>(
        input: &'static str,
        f: impl FnOnce(&mut TestPrompter) -> Result<T>,
    ) -> (Result<T>, String) {
        let mut prompter = Prompter::new(input.as_bytes(), Vec::new(), Codec::default());
        let result = f(&mut prompter);
        (result, String::from_utf8(prompter.output).unwrap())
    }

    #[test]
    fn sale_fn_collects_every_field() {
        let (sale, output) = run("2024-02-29\nWidget Deluxe\n3\n10.5\n", Prompter::sale);
        let sale = sale.unwrap();
        assert_eq!(sale.date, SaleDate::new(2024, 2, 29).unwrap());
        assert_eq!(sale.item_name, "Widget Deluxe");
        assert_eq!(sale.quantity, 3);
        assert_eq!(sale.unit_price, Usd::from_cents(1050));
        assert!(output.contains("Enter date (YYYY-MM-DD): "));
        assert!(!output.contains("Invalid input"));
    }

    #[test]
    fn date_fn_asks_again_until_valid() {
        let (date, output) = run("15/01/2024\n2023-02-29\n2024-01-15\n", Prompter::date);
        assert_eq!(date.unwrap(), SaleDate::new(2024, 1, 15).unwrap());
        assert_eq!(output.matches("Invalid input").count(), 2);
    }

    #[test]
    fn date_fn_uses_configured_format_and_range() {
        let mut output = Vec::new();
        let codec = Codec::new(DateFormat::DayFirst, YearRange { min: 2020, max: 2030 });
        let input = "01/01/2019\n01/01/2024\n";
        let mut prompter = Prompter::new(input.as_bytes(), &mut output, codec);
        assert_eq!(prompter.date().unwrap(), SaleDate::new(2024, 1, 1).unwrap());
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("DD/MM/YYYY"));
        assert!(output.contains("outside the accepted range"));
    }

    #[test]
    fn quantity_fn_rejects_negative_and_non_numbers() {
        let (qty, output) = run("-1\nlots\n4\n", Prompter::quantity);
        assert_eq!(qty.unwrap(), 4);
        assert!(output.contains("must not be negative"));
        assert!(output.contains("can't parse"));
    }

    #[test]
    fn unit_price_fn_rejects_negative_price() {
        let (price, output) = run("-0.01\n0\n", Prompter::unit_price);
        assert_eq!(price.unwrap(), Usd::default());
        assert_eq!(output.matches("Invalid input").count(), 1);
    }

    #[test]
    fn item_name_fn_rejects_commas_and_blanks() {
        let (name, output) = run("\nNuts, salted\nNuts\n", Prompter::item_name);
        assert_eq!(name.unwrap(), "Nuts");
        assert_eq!(output.matches("Invalid input").count(), 2);
    }

    #[test]
    fn confirm_fn_accepts_yes_and_no_in_any_case() {
        let (answer, _) = run("maybe\nYES\n", |p| p.confirm("Add another?"));
        assert!(answer.unwrap());
        let (answer, _) = run("n\n", |p| p.confirm("Add another?"));
        assert!(!answer.unwrap());
    }

    #[test]
    fn add_sales_fn_stops_when_user_declines() {
        let mut store = Store::new();
        let input = "2024-01-15\nWidget\n3\n10\ny\n2024-01-16\nGadget\n1\n2.5\nn\n";
        let (added, output) = run(input, |p| p.add_sales(&mut store));
        assert_eq!(added.unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(output.matches("Recorded sale SID").count(), 2);
    }

    #[test]
    fn add_sales_fn_keeps_finished_sales_when_input_runs_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let mut store = Store::new();
        let (added, _) = run("2024-01-15\nWidget\n3\n10\ny\n", |p| {
            p.add_sales(&mut store)
        });
        assert_eq!(added.unwrap(), 1);
        store.persist(&path, &Codec::default()).unwrap();
        let (saved, _) = Store::load(&path, &Codec::default()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved.all()[0].item_name(), "Widget");
    }

    #[test]
    fn add_sales_fn_discards_partly_entered_sale() {
        let mut store = Store::new();
        let (added, _) = run("2024-01-15\nWidget\n3\n10\ny\n2024-01-16\nGadget\n", |p| {
            p.add_sales(&mut store)
        });
        assert_eq!(added.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sale_fn_fails_when_input_runs_out() {
        let (sale, _) = run("2024-01-15\nWidget\n", Prompter::sale);
        assert!(matches!(sale, Err(Error::InputClosed)));
    }
}
