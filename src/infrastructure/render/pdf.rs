use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use serde_json::json;

use super::{ReportDocument, Table};
use crate::error::AppError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 18.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 13.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.0;

/// Approximate Helvetica glyph width at 10pt, used for wrapping.
const CHAR_WIDTH_MM: f32 = 1.9;

/// Renders an A4 PDF using the built-in Helvetica fonts.
pub fn render_pdf(doc: &ReportDocument) -> Result<Vec<u8>, AppError> {
    let (pdf, page, layer) =
        PdfDocument::new(&doc.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = pdf
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = pdf
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let layer = pdf.get_page(page).get_layer(layer);

    let mut writer = PdfWriter {
        pdf: &pdf,
        layer,
        regular,
        bold,
        y: PAGE_HEIGHT - MARGIN,
    };

    writer.line(&doc.title, TITLE_SIZE, true);
    writer.gap(2.0);
    writer.line(
        &format!("{} - {} - {} report", doc.business_name, doc.industry, doc.tier),
        BODY_SIZE,
        false,
    );
    writer.line(
        &format!("Prepared for {} on {}", doc.prepared_for, doc.generated_at),
        BODY_SIZE,
        false,
    );

    for section in &doc.sections {
        writer.gap(6.0);
        writer.ensure_space(LINE_HEIGHT * 4.0);
        writer.line(&section.heading, HEADING_SIZE, true);
        writer.gap(1.0);
        for paragraph in &section.paragraphs {
            writer.paragraph(paragraph);
            writer.gap(1.5);
        }
        if let Some(table) = &section.table {
            writer.table(table);
        }
    }

    drop(writer);
    pdf.save_to_bytes().map_err(pdf_error)
}

struct PdfWriter<'a> {
    pdf: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PdfWriter<'_> {
    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            let (page, layer) = self.pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.pdf.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn text_at(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(sanitize(text), size, Mm(x), Mm(self.y), font);
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let height = LINE_HEIGHT * size / BODY_SIZE;
        self.ensure_space(height);
        self.y -= height;
        self.text_at(text, size, MARGIN, bold);
    }

    fn paragraph(&mut self, text: &str) {
        let max_chars = (CONTENT_WIDTH / CHAR_WIDTH_MM) as usize;
        for line in wrap(text, max_chars) {
            self.line(&line, BODY_SIZE, false);
        }
    }

    fn table(&mut self, table: &Table) {
        let columns = table.headers.len().max(1);
        let column_width = CONTENT_WIDTH / columns as f32;
        let max_chars = ((column_width / CHAR_WIDTH_MM) as usize).saturating_sub(1).max(4);

        let draw_row = |writer: &mut Self, cells: &[String], bold: bool| {
            writer.ensure_space(LINE_HEIGHT);
            writer.y -= LINE_HEIGHT;
            for (i, cell) in cells.iter().enumerate() {
                let x = MARGIN + column_width * i as f32;
                writer.text_at(&truncate(cell, max_chars), BODY_SIZE, x, bold);
            }
        };

        draw_row(self, &table.headers, true);
        for row in &table.rows {
            draw_row(self, row, false);
        }
    }
}

/// Built-in fonts are limited to a single-byte encoding; keep printable ASCII.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::internal(
        "Failed to render report",
        json!({ "format": "pdf", "reason": e.to_string() }),
    )
}
