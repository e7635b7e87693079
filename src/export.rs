//! PDF and CSV exporters.
//!
//! Both take the session's report as an `Option` and refuse to write
//! anything when no report has been assembled yet.

use crate::error::{Error, Result};
use crate::report::Report;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// File name of the CSV export inside the export directory.
pub const CSV_FILE: &str = "report.csv";

/// File name of the PDF export inside the export directory.
pub const PDF_FILE: &str = "report.pdf";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 10.0;
const FONT_SIZE: f32 = 12.0;
/// Characters per line at 12pt Helvetica across the printable width.
const WRAP_WIDTH: usize = 90;

/// The downloadable formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Csv,
}

impl ExportFormat {
    /// Write `report` into `dir` in this format.
    pub fn export(self, report: Option<&Report>, dir: &Path) -> Result<PathBuf> {
        match self {
            ExportFormat::Pdf => export_pdf(report, dir),
            ExportFormat::Csv => export_csv(report, dir),
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Pdf => PDF_FILE,
            ExportFormat::Csv => CSV_FILE,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// Write the report as a header row plus exactly one data row.
pub fn export_csv(report: Option<&Report>, dir: &Path) -> Result<PathBuf> {
    let report = report.ok_or(Error::NoData)?;
    let fields = report.export_fields();
    let path = dir.join(CSV_FILE);

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(fields.iter().map(|(key, _)| *key))?;
    writer.write_record(fields.iter().map(|(_, value)| value.as_str()))?;
    writer.flush()?;

    tracing::debug!(path = %path.display(), "exported csv");
    Ok(path)
}

/// One `key: value` line per report field.
pub fn pdf_lines(report: &Report) -> Vec<String> {
    report
        .export_fields()
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect()
}

/// Write the report as a PDF with one wrapped `key: value` entry per field.
pub fn export_pdf(report: Option<&Report>, dir: &Path) -> Result<PathBuf> {
    let report = report.ok_or(Error::NoData)?;
    let path = dir.join(PDF_FILE);

    let (doc, page, layer) = PdfDocument::new(
        format!("Report: {}", report.subject),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Layer 1".to_string(),
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| Error::Pdf(format!("{:?}", e)))?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;

    for line in pdf_lines(report) {
        for row in wrap(&line, WRAP_WIDTH) {
            if y < MARGIN {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                current = doc.get_page(page).get_layer(layer);
                y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;
            }
            current.use_text(row, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
            y -= LINE_HEIGHT;
        }
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    doc.save(&mut writer)
        .map_err(|e| Error::Pdf(format!("{:?}", e)))?;

    tracing::debug!(path = %path.display(), "exported pdf");
    Ok(path)
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut row = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
            }
            rows.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }

        let row_len = row.chars().count();
        if row_len > 0 && row_len + 1 + word.len() > width {
            rows.push(std::mem::take(&mut row));
        }
        if !row.is_empty() {
            row.push(' ');
        }
        row.extend(word);
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}
