use anyhow::{anyhow, Context, Result};
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use tracing::{debug, info};

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{record::NOT_AVAILABLE, report::Report};

/// File written when no output name is given.
pub const DEFAULT_NAME: &str = "relatorio_vendas.pdf";

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN: f32 = 20.0;
const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 6.0;
const LAYER_NAME: &str = "Relatório";

/// Writes `report` as A4 pages to `path`, or to [`DEFAULT_NAME`], and
/// returns the path written.
///
/// The document holds a title, a section listing the products, one listing
/// the customers, and a summary section. Lines that reach the bottom margin
/// continue on a new page.
///
/// # Errors
///
/// Returns an error if the document cannot be built or the file cannot be
/// written.
pub fn export(report: &Report, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_NAME), Path::to_path_buf);
    let (doc, layout) = build(report)?;
    let bytes = doc
        .save_to_bytes()
        .map_err(|e| anyhow!("building PDF document: {e}"))?;
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(
        "PDF report written to {} ({} pages, {} lines)",
        path.display(),
        layout.pages,
        layout.lines
    );
    Ok(path)
}

/// How much of the document was laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Layout {
    pages: usize,
    lines: usize,
}

fn build(report: &Report) -> Result<(PdfDocumentReference, Layout)> {
    let (doc, page, layer) =
        PdfDocument::new("Relatório de Vendas", PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("loading PDF font: {e}"))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("loading PDF font: {e}"))?;
    let layout = {
        let mut writer = PageWriter {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            regular,
            bold,
            y: PAGE_HEIGHT.0 - MARGIN,
            layout: Layout { pages: 1, lines: 0 },
        };

        writer.title("Relatório de Vendas");

        writer.heading("Total por produto");
        for (name, info, total) in report.products() {
            let code = info.and_then(|i| i.code.as_deref()).unwrap_or(NOT_AVAILABLE);
            let unit = info.and_then(|i| i.unit.as_deref()).unwrap_or(NOT_AVAILABLE);
            writer.line(&format!("{name} ({code}, {unit}) - R$ {total}"));
        }

        writer.heading("Total por cliente");
        for (name, info, total) in report.customers() {
            let code = info.and_then(|i| i.code.as_deref()).unwrap_or(NOT_AVAILABLE);
            let city = info.map_or(NOT_AVAILABLE, |i| i.city.as_str());
            let state = info.map_or(NOT_AVAILABLE, |i| i.state.as_str());
            writer.line(&format!(
                "{name} (Cod: {code}, {city}/{state}) - R$ {total}"
            ));
        }

        writer.heading("Resumo");
        writer.line(&format!("Total de vendas realizadas: {}", report.sale_count()));
        writer.line(&format!("Total geral: R$ {}", report.total()));
        writer.line(&format!(
            "Produto mais vendido: {}",
            report.top_product().unwrap_or(NOT_AVAILABLE)
        ));
        writer.line(&format!(
            "Cliente que mais comprou: {}",
            report.top_customer().unwrap_or(NOT_AVAILABLE)
        ));
        if report.skipped() > 0 {
            writer.line(&format!("Vendas ignoradas: {}", report.skipped()));
        }
        writer.layout
    };
    Ok((doc, layout))
}

/// Lays out text top to bottom, starting a new page at the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    layout: Layout,
}

impl PageWriter<'_> {
    fn title(&mut self, text: &str) {
        self.write(text, TITLE_SIZE, true);
        self.y -= LINE_HEIGHT;
    }

    fn heading(&mut self, text: &str) {
        self.y -= LINE_HEIGHT / 2.0;
        self.write(text, HEADING_SIZE, true);
    }

    fn line(&mut self, text: &str) {
        self.write(text, BODY_SIZE, false);
    }

    fn write(&mut self, text: &str, size: f32, bold: bool) {
        if self.y < MARGIN {
            self.new_page();
        }
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= LINE_HEIGHT;
        self.layout.lines += 1;
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT.0 - MARGIN;
        self.layout.pages += 1;
        debug!("PDF page {} started", self.layout.pages);
    }
}
