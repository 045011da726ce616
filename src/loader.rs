use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use std::{fmt::Display, path::Path};

use crate::record::{parse_date, Record};

/// An inclusive range of sale dates. A `None` bound is unbounded on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parses the optional `YYYY-MM-DD` bounds given on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not a valid date.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: start.map(parse_date).transpose().context("bad start date")?,
            end: end.map(parse_date).transpose().context("bad end date")?,
        })
    }

    /// Reports whether `date` lies within the range, bounds included.
    ///
    /// ```
    /// # use vendas_cli::DateRange;
    /// let range = DateRange::parse(Some("2025-01-01"), Some("2025-01-31")).unwrap();
    /// assert!(range.contains("2025-01-31".parse().unwrap()));
    /// assert!(!range.contains("2025-02-01".parse().unwrap()));
    /// ```
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && self.end.map_or(true, |end| date <= end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |d: Option<NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
        write!(f, "{} .. {}", bound(self.start), bound(self.end))
    }
}

/// Reads the sales ledger at `path`, keeping the rows whose `data_venda`
/// falls within `range`, in file order.
///
/// Rows with a missing or malformed date are dropped with a warning; rows
/// outside the range are dropped silently.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, or if a row cannot be read
/// as CSV at all.
pub fn load_sales(path: impl AsRef<Path>, range: &DateRange) -> Result<Vec<Record>> {
    let path = path.as_ref();
    info!("loading sales from {} (dates {range})", path.display());
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut sales = Vec::new();
    let mut rows_read = 0;
    for result in rdr.deserialize() {
        rows_read += 1;
        let record: Record =
            result.with_context(|| format!("{}: reading row {rows_read}", path.display()))?;
        match record.sale_date() {
            Ok(date) if range.contains(date) => sales.push(record),
            Ok(_) => {}
            Err(e) => warn!("skipping row {rows_read}: {record:?}: {e:#}"),
        }
    }
    info!("rows read: {rows_read}, rows kept: {}", sales.len());
    Ok(sales)
}
