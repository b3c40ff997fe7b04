use crate::record::Record;

/// Returns a copy of `records` in ascending date order.
///
/// Records with the same date keep their relative order.
///
/// # Examples
///
/// ```
/// # use sales_ledger::{sorted_by_date, Codec};
/// let text = "date,sales_id,item_name,item_quantity,unit_price\n\
///             2024-01-15,SID1,Widget,1,1.00\n\
///             2023-12-31,SID2,Gadget,1,1.00\n";
/// let records = Codec::default().decode(text).unwrap().records;
/// let sorted = sorted_by_date(&records);
/// assert_eq!(sorted[0].id().as_str(), "SID2");
/// ```
#[must_use]
pub fn sorted_by_date(records: &[Record]) -> Vec<Record> {
    let mut sorted = records.to_vec();
    sorted.sort_by_key(Record::date);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::Codec,
        date::{DateFormat, SaleDate, YearRange},
    };

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id().as_str()).collect()
    }

    #[test]
    fn sorted_by_date_fn_orders_chronologically() {
        let records = Codec::default().read_path("testdata/sales.csv").unwrap().records;
        let dates: Vec<String> = sorted_by_date(&records)
            .iter()
            .map(|r| r.date().to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2023-12-31", "2024-01-01", "2024-01-15", "2024-01-15"]
        );
    }

    #[test]
    fn sorted_by_date_fn_orders_day_first_dates_by_calendar() {
        let codec = Codec::new(DateFormat::DayFirst, YearRange::default());
        let records = codec.read_path("testdata/sales_day_first.csv").unwrap().records;
        let sorted = sorted_by_date(&records);
        assert_eq!(sorted[0].date(), SaleDate::new(2023, 12, 31).unwrap());
        assert_eq!(sorted[1].date(), SaleDate::new(2024, 1, 1).unwrap());
        assert_eq!(sorted[2].date(), SaleDate::new(2024, 1, 15).unwrap());
    }

    #[test]
    fn sorted_by_date_fn_keeps_order_of_same_day_sales() {
        let records = Codec::default().read_path("testdata/sales.csv").unwrap().records;
        assert_eq!(
            ids(&sorted_by_date(&records)),
            vec!["SID1001", "SID1002", "SID1000", "SID1003"]
        );
    }

    #[test]
    fn sorted_by_date_fn_leaves_input_alone() {
        let records = Codec::default().read_path("testdata/sales.csv").unwrap().records;
        let before = records.clone();
        let _ = sorted_by_date(&records);
        assert_eq!(records, before);
    }
}
