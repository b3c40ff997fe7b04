use chrono::Utc;

use std::fmt::Display;

use crate::{
    date::SaleDate,
    error::{Error, Result},
    usd::{Usd, MAX_PRICE_DOLLARS},
};

/// Identifies a sale. Never empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SaleId(String);

impl SaleId {
    /// Wraps an existing ID, such as one read back from the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyId`] if `id` is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::EmptyId);
        }
        Ok(Self(id))
    }

    /// Generates a fresh ID from the current time: `SID` followed by the
    /// Unix timestamp in seconds.
    ///
    /// Two sales generated in the same second share an ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("SID{}", Utc::now().timestamp()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SaleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl PartialEq<str> for SaleId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// The details of a sale: everything about it except its ID.
///
/// Updating a record replaces its `Sale` wholesale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sale {
    pub date: SaleDate,
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Usd,
}

impl Sale {
    fn validate(&self) -> Result<()> {
        if self.unit_price.is_negative() {
            return Err(Error::NegativeValue {
                field: "unit_price",
                value: self.unit_price.to_string(),
            });
        }
        if self.unit_price.exceeds_max_price() {
            return Err(Error::TooLarge {
                field: "unit_price",
                value: self.unit_price.to_string(),
                max: MAX_PRICE_DOLLARS,
            });
        }
        Ok(())
    }
}

/// One sale, as stored in the ledger.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    id: SaleId,
    sale: Sale,
}

impl Record {
    /// Creates a record for `sale` under `id`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sales_ledger::{Record, Sale, SaleDate, SaleId, Usd};
    /// let sale = Sale {
    ///     date: SaleDate::new(2024, 1, 15).unwrap(),
    ///     item_name: "Widget".into(),
    ///     quantity: 3,
    ///     unit_price: "10.00".parse().unwrap(),
    /// };
    /// let record = Record::new(SaleId::new("SID1000").unwrap(), sale).unwrap();
    /// assert_eq!(record.sales_amount(), Usd::from_cents(3000));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::NegativeValue`] if the unit price is below zero, or
    /// [`Error::TooLarge`] if it is above [`MAX_PRICE_DOLLARS`].
    pub fn new(id: SaleId, sale: Sale) -> Result<Self> {
        sale.validate()?;
        Ok(Self { id, sale })
    }

    /// Replaces everything but the ID.
    pub(crate) fn replace(&mut self, sale: Sale) -> Result<()> {
        sale.validate()?;
        self.sale = sale;
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &SaleId {
        &self.id
    }

    #[must_use]
    pub fn sale(&self) -> &Sale {
        &self.sale
    }

    #[must_use]
    pub fn date(&self) -> SaleDate {
        self.sale.date
    }

    #[must_use]
    pub fn item_name(&self) -> &str {
        &self.sale.item_name
    }

    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.sale.quantity
    }

    #[must_use]
    pub fn unit_price(&self) -> Usd {
        self.sale.unit_price
    }

    /// The quantity sold multiplied by the unit price.
    #[must_use]
    pub fn sales_amount(&self) -> Usd {
        self.sale.unit_price * self.sale.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(price: &str) -> Sale {
        Sale {
            date: SaleDate::new(2024, 1, 15).unwrap(),
            item_name: "Widget".into(),
            quantity: 2,
            unit_price: price.parse().unwrap(),
        }
    }

    #[test]
    fn new_fn_rejects_negative_price() {
        let id = SaleId::new("SID1").unwrap();
        assert!(matches!(
            Record::new(id, sale("-1.00")),
            Err(Error::NegativeValue { field: "unit_price", .. })
        ));
    }

    #[test]
    fn new_fn_rejects_price_above_limit() {
        let id = SaleId::new("SID1").unwrap();
        assert!(matches!(
            Record::new(id.clone(), sale("1000000000.01")),
            Err(Error::TooLarge { field: "unit_price", .. })
        ));
        let record = Record::new(id, sale("1000000000.00")).unwrap();
        assert_eq!(record.sales_amount(), Usd::from_cents(200_000_000_000));
    }

    #[test]
    fn new_fn_accepts_free_price() {
        let id = SaleId::new("SID1").unwrap();
        let record = Record::new(id, sale("0")).unwrap();
        assert_eq!(record.sales_amount(), Usd::default());
    }

    #[test]
    fn sale_id_new_fn_rejects_empty_id() {
        assert!(matches!(SaleId::new(""), Err(Error::EmptyId)));
    }

    #[test]
    fn generate_fn_makes_timestamp_ids() {
        let id = SaleId::generate();
        let digits = id.as_str().strip_prefix("SID").unwrap();
        assert!(digits.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn replace_fn_keeps_id_and_rejects_invalid_sale() {
        let mut record = Record::new(SaleId::new("SID1").unwrap(), sale("5.00")).unwrap();
        assert!(record.replace(sale("-5.00")).is_err());
        assert_eq!(record.unit_price(), Usd::from_cents(500));
        record.replace(sale("7.25")).unwrap();
        assert_eq!(record.id().as_str(), "SID1");
        assert_eq!(record.unit_price(), Usd::from_cents(725));
    }
}
