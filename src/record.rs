use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_with::{serde_as, NoneAsEmptyString};

use crate::brl::Brl;

/// Customer name used when a row has no `cliente`.
pub const UNKNOWN_CUSTOMER: &str = "Desconhecido";

/// Placeholder for a missing city or state, and for missing codes in the
/// printed report.
pub const NOT_AVAILABLE: &str = "N/A";

/// The only date format accepted in `data_venda` and in date bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns an error naming `s` if it is not a valid date in [`DATE_FORMAT`].
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("invalid date {s:?} (expected YYYY-MM-DD)"))
}

/// Defines the CSV format for sales data.
///
/// Every column is optional at this level: empty cells and absent columns
/// both read as `None`. Required fields are enforced by
/// [`Record::sale_date`] and by converting into a [`Sale`].
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "numero_venda")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub sale_id: Option<String>,
    #[serde(rename = "produto")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub product: Option<String>,
    #[serde(rename = "codigo_produto")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub product_code: Option<String>,
    #[serde(rename = "unidade")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub unit: Option<String>,
    #[serde(rename = "valor_venda")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub amount: Option<String>,
    #[serde(rename = "data_venda")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub date: Option<String>,
    #[serde(rename = "cliente")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub customer: Option<String>,
    #[serde(rename = "codigo_cliente")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub customer_code: Option<String>,
    #[serde(rename = "cidade_cliente")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub city: Option<String>,
    #[serde(rename = "estado_cliente")]
    #[serde_as(as = "NoneAsEmptyString")]
    pub state: Option<String>,
}

impl Record {
    /// Returns the parsed `data_venda` of this row.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is missing or not in [`DATE_FORMAT`].
    pub fn sale_date(&self) -> Result<NaiveDate> {
        let Some(date) = &self.date else {
            bail!("missing field data_venda");
        };
        parse_date(date)
    }
}

/// A validated sale: required fields present, amount parsed, defaults applied.
#[derive(Clone, Debug, PartialEq)]
pub struct Sale {
    pub sale_id: Option<String>,
    pub product: String,
    pub product_code: Option<String>,
    pub unit: Option<String>,
    pub amount: Brl,
    pub customer: String,
    pub customer_code: Option<String>,
    pub city: String,
    pub state: String,
}

impl TryFrom<&Record> for Sale {
    type Error = anyhow::Error;

    fn try_from(record: &Record) -> Result<Self> {
        let Some(product) = &record.product else {
            bail!("missing field produto");
        };
        let Some(amount) = &record.amount else {
            bail!("missing field valor_venda");
        };
        let or_default = |field: &Option<String>, default: &str| {
            field.clone().unwrap_or_else(|| default.to_string())
        };
        Ok(Self {
            sale_id: record.sale_id.clone(),
            product: product.clone(),
            product_code: record.product_code.clone(),
            unit: record.unit.clone(),
            amount: amount.parse()?,
            customer: or_default(&record.customer, UNKNOWN_CUSTOMER),
            customer_code: record.customer_code.clone(),
            city: or_default(&record.city, NOT_AVAILABLE),
            state: or_default(&record.state, NOT_AVAILABLE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> Vec<Record> {
        csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_bytes())
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn record_reads_named_columns() {
        let records = read(
            "numero_venda,produto,codigo_produto,unidade,valor_venda,data_venda,cliente,codigo_cliente,cidade_cliente,estado_cliente\n\
             001,Caneta,P001,un,10.00,2025-01-01,Lucas,C123,Aracaju,SE\n",
        );
        assert_eq!(
            records,
            vec![Record {
                sale_id: Some("001".into()),
                product: Some("Caneta".into()),
                product_code: Some("P001".into()),
                unit: Some("un".into()),
                amount: Some("10.00".into()),
                date: Some("2025-01-01".into()),
                customer: Some("Lucas".into()),
                customer_code: Some("C123".into()),
                city: Some("Aracaju".into()),
                state: Some("SE".into()),
            }]
        );
    }

    #[test]
    fn record_treats_empty_and_absent_columns_as_none() {
        let records = read("produto,valor_venda,cliente\nCaneta,5,\n");
        assert_eq!(records[0].product.as_deref(), Some("Caneta"));
        assert_eq!(records[0].customer, None);
        assert_eq!(records[0].city, None);
        assert_eq!(records[0].date, None);
    }

    #[test]
    fn sale_date_parses_fixed_format() {
        let record = Record {
            date: Some("2025-02-28".into()),
            ..Record::default()
        };
        assert_eq!(
            record.sale_date().unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn sale_date_rejects_missing_and_malformed_dates() {
        assert!(Record::default().sale_date().is_err());
        for bad in ["28/02/2025", "2025-02-30", "yesterday"] {
            let record = Record {
                date: Some(bad.into()),
                ..Record::default()
            };
            assert!(record.sale_date().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn sale_applies_named_defaults() {
        let sale = Sale::try_from(&Record {
            product: Some("Lápis".into()),
            amount: Some("2.50".into()),
            ..Record::default()
        })
        .unwrap();
        assert_eq!(sale.customer, UNKNOWN_CUSTOMER);
        assert_eq!(sale.city, NOT_AVAILABLE);
        assert_eq!(sale.state, NOT_AVAILABLE);
        assert_eq!(sale.product_code, None);
        assert_eq!(sale.amount, Brl::new(2.5));
    }

    #[test]
    fn sale_requires_product_and_numeric_amount() {
        let no_product = Record {
            amount: Some("1".into()),
            ..Record::default()
        };
        let err = Sale::try_from(&no_product).unwrap_err();
        assert!(err.to_string().contains("produto"));

        let bad_amount = Record {
            product: Some("Caneta".into()),
            amount: Some("abc".into()),
            ..Record::default()
        };
        assert!(Sale::try_from(&bad_amount).is_err());

        let no_amount = Record {
            product: Some("Caneta".into()),
            ..Record::default()
        };
        assert!(Sale::try_from(&no_amount).is_err());
    }
}
