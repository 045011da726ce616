use anyhow::{Context, Result};
use clap::ValueEnum;

use std::path::Path;

use crate::{pdf, report::Report};

/// The presentation forms a [`Report`] can be rendered to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Fixed-layout plain text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Paginated PDF document
    Pdf,
}

/// Renders `report` in `format` and returns what should be printed.
///
/// For [`Format::Pdf`] the document is written to `name` (or
/// [`pdf::DEFAULT_NAME`]) and the returned string confirms where.
///
/// # Errors
///
/// Returns any error from serializing or writing the document.
pub fn render(report: &Report, format: Format, name: Option<&Path>) -> Result<String> {
    match format {
        Format::Text => Ok(to_text(report)),
        Format::Json => to_json(report),
        Format::Pdf => {
            let path = pdf::export(report, name)?;
            Ok(format!("Relatório PDF gerado em: {}", path.display()))
        }
    }
}

/// Renders the fixed-layout text block of [`Report`]'s `Display`.
#[must_use]
pub fn to_text(report: &Report) -> String {
    report.to_string()
}

/// Serializes the whole report as indented JSON, preserving the order of
/// products and customers.
///
/// # Errors
///
/// Returns any error from [`serde_json`].
pub fn to_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("serializing report as JSON")
}

/// Reads back a report produced by [`to_json`].
///
/// # Errors
///
/// Returns an error if `json` is not a valid report.
pub fn from_json(json: &str) -> Result<Report> {
    serde_json::from_str(json).context("parsing report JSON")
}
