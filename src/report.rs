use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use std::{collections::HashSet, fmt::Display};

use crate::{
    brl::Brl,
    record::{Record, Sale, NOT_AVAILABLE},
};

/// Holds the aggregated sales data.
///
/// To build a `Report`, use [`Report::from_records`], or feed rows to an
/// [`Aggregator`] one at a time and call [`Aggregator::finish`].
///
/// To get a printable version of the report, use its [`Display`]
/// implementation. To get JSON, use [`crate::render::to_json`].
///
/// Products and customers are kept in order of first appearance.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Report {
    #[serde(rename = "total_por_produto")]
    product_totals: IndexMap<String, Brl>,
    #[serde(rename = "produtos_info")]
    products: IndexMap<String, ProductInfo>,
    #[serde(rename = "total_por_cliente")]
    customer_totals: IndexMap<String, Brl>,
    #[serde(rename = "clientes_info")]
    customers: IndexMap<String, CustomerInfo>,
    #[serde(rename = "total_geral")]
    total: Brl,
    #[serde(rename = "produto_mais_vendido")]
    top_product: Option<String>,
    #[serde(rename = "cliente_mais_comprou")]
    top_customer: Option<String>,
    #[serde(rename = "numero_total_vendas")]
    sale_count: usize,
    #[serde(rename = "vendas_ignoradas", default)]
    skipped: usize,
}

/// Product attributes, as first seen in the ledger.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ProductInfo {
    #[serde(rename = "codigo_produto")]
    pub code: Option<String>,
    #[serde(rename = "unidade")]
    pub unit: Option<String>,
}

/// Customer attributes, as first seen in the ledger.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CustomerInfo {
    #[serde(rename = "codigo_cliente")]
    pub code: Option<String>,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
}

impl Report {
    /// Aggregates `records` in a single pass.
    ///
    /// Rows that fail validation (no product, or a non-numeric amount) are
    /// logged, skipped and counted in [`Report::skipped`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use vendas_cli::{Record, Report};
    /// let report = Report::from_records(vec![Record {
    ///     product: Some("Caneta".into()),
    ///     amount: Some("10.00".into()),
    ///     ..Record::default()
    /// }]);
    /// assert_eq!(report.total().value(), 10.0);
    /// assert_eq!(report.top_product(), Some("Caneta"));
    /// ```
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Report {
        let mut aggregator = Aggregator::new();
        for record in records {
            aggregator.add(record);
        }
        aggregator.finish()
    }

    /// Running totals per product, in order of first appearance.
    #[must_use]
    pub fn product_totals(&self) -> &IndexMap<String, Brl> {
        &self.product_totals
    }

    /// Code and unit first seen for product `name`.
    #[must_use]
    pub fn product_info(&self, name: &str) -> Option<&ProductInfo> {
        self.products.get(name)
    }

    /// Running totals per customer, in order of first appearance.
    #[must_use]
    pub fn customer_totals(&self) -> &IndexMap<String, Brl> {
        &self.customer_totals
    }

    /// Code, city and state first seen for customer `name`.
    #[must_use]
    pub fn customer_info(&self, name: &str) -> Option<&CustomerInfo> {
        self.customers.get(name)
    }

    /// Sum of all aggregated amounts.
    #[must_use]
    pub fn total(&self) -> Brl {
        self.total
    }

    /// The product with the highest total. The earliest product wins ties.
    #[must_use]
    pub fn top_product(&self) -> Option<&str> {
        self.top_product.as_deref()
    }

    /// The customer with the highest total. The earliest customer wins ties.
    #[must_use]
    pub fn top_customer(&self) -> Option<&str> {
        self.top_customer.as_deref()
    }

    /// Number of distinct non-empty sale identifiers.
    #[must_use]
    pub fn sale_count(&self) -> usize {
        self.sale_count
    }

    /// Number of rows left out because they failed validation.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Yields `(name, info, total)` for each product, in report order.
    pub fn products(&self) -> impl Iterator<Item = (&str, Option<&ProductInfo>, Brl)> {
        self.product_totals
            .iter()
            .map(|(name, &total)| (name.as_str(), self.products.get(name), total))
    }

    /// Yields `(name, info, total)` for each customer, in report order.
    pub fn customers(&self) -> impl Iterator<Item = (&str, Option<&CustomerInfo>, Brl)> {
        self.customer_totals
            .iter()
            .map(|(name, &total)| (name.as_str(), self.customers.get(name), total))
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "RELATORIO DE VENDAS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "\n>> Total por produto:")?;
        for (name, info, total) in self.products() {
            let code = info.and_then(|i| i.code.as_deref()).unwrap_or(NOT_AVAILABLE);
            let unit = info.and_then(|i| i.unit.as_deref()).unwrap_or(NOT_AVAILABLE);
            writeln!(f, "{name:<20} ({code}, {unit}) - R$ {total:>12}")?;
        }
        writeln!(f, "\n>> Total por cliente:")?;
        for (name, info, total) in self.customers() {
            let code = info.and_then(|i| i.code.as_deref()).unwrap_or(NOT_AVAILABLE);
            let city = info.map_or(NOT_AVAILABLE, |i| i.city.as_str());
            let state = info.map_or(NOT_AVAILABLE, |i| i.state.as_str());
            writeln!(
                f,
                "{name:<20} (Cod: {code}, {city}/{state}) - R$ {total:>12}"
            )?;
        }
        writeln!(f, "\n{rule}")?;
        writeln!(f, "TOTAL DE VENDAS REALIZADAS: {}", self.sale_count)?;
        writeln!(f, "TOTAL GERAL:                R$ {}", self.total)?;
        writeln!(
            f,
            "PRODUTO MAIS VENDIDO:       {}",
            self.top_product().unwrap_or(NOT_AVAILABLE)
        )?;
        write!(
            f,
            "CLIENTE QUE MAIS COMPROU:   {}",
            self.top_customer().unwrap_or(NOT_AVAILABLE)
        )?;
        if self.skipped > 0 {
            write!(f, "\nVENDAS IGNORADAS:           {}", self.skipped)?;
        }
        Ok(())
    }
}

/// Accumulates sales rows into a [`Report`].
///
/// Each call to [`Aggregator::add`] updates the running totals; nothing is
/// ever removed. [`Aggregator::finish`] picks the top product and customer
/// and hands over the finished report.
#[derive(Debug, Default)]
pub struct Aggregator {
    report: Report,
    sale_ids: HashSet<String>,
    rows: usize,
}

impl Aggregator {
    /// Creates an aggregator with no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one ledger row.
    ///
    /// A row that cannot be validated into a [`Sale`] is logged and counted
    /// as skipped; it contributes nothing else.
    pub fn add(&mut self, record: Record) {
        self.rows += 1;
        match Sale::try_from(&record) {
            Ok(sale) => self.add_sale(sale),
            Err(e) => {
                warn!("skipping sale #{}: {record:?}: {e:#}", self.rows);
                self.report.skipped += 1;
            }
        }
    }

    fn add_sale(&mut self, sale: Sale) {
        let report = &mut self.report;
        if let Some(id) = sale.sale_id {
            self.sale_ids.insert(id);
        }
        if !report.products.contains_key(&sale.product) {
            let info = ProductInfo {
                code: sale.product_code,
                unit: sale.unit,
            };
            debug!("new product {}: {info:?}", sale.product);
            report.products.insert(sale.product.clone(), info);
        }
        if !report.customers.contains_key(&sale.customer) {
            let info = CustomerInfo {
                code: sale.customer_code,
                city: sale.city,
                state: sale.state,
            };
            debug!("new customer {}: {info:?}", sale.customer);
            report.customers.insert(sale.customer.clone(), info);
        }
        *report.product_totals.entry(sale.product).or_default() += sale.amount;
        *report.customer_totals.entry(sale.customer).or_default() += sale.amount;
        report.total += sale.amount;
    }

    /// Completes the aggregation.
    #[must_use]
    pub fn finish(self) -> Report {
        let mut report = self.report;
        report.top_product = arg_max(&report.product_totals);
        report.top_customer = arg_max(&report.customer_totals);
        report.sale_count = self.sale_ids.len();
        info!(
            "report calculated from {} rows ({} skipped): total {}, top product {:?}, top customer {:?}",
            self.rows, report.skipped, report.total, report.top_product, report.top_customer
        );
        report
    }
}

/// Returns the key with the largest total, scanning in insertion order and
/// replacing the candidate only on a strictly greater total.
fn arg_max(totals: &IndexMap<String, Brl>) -> Option<String> {
    let mut best: Option<(&String, Brl)> = None;
    for (name, &total) in totals {
        if best.map_or(true, |(_, max)| total > max) {
            best = Some((name, total));
        }
    }
    best.map(|(name, _)| name.clone())
}
