#![doc = include_str!("../README.md")]
mod brl;
mod loader;
mod logging;
pub mod pdf;
mod record;
pub mod render;
mod report;

pub use brl::Brl;
pub use loader::{load_sales, DateRange};
pub use logging::{LogGuard, Logging, DEFAULT_LOG_FILE};
pub use record::{parse_date, Record, Sale, DATE_FORMAT, NOT_AVAILABLE, UNKNOWN_CUSTOMER};
pub use render::{render, Format};
pub use report::{Aggregator, CustomerInfo, ProductInfo, Report};
