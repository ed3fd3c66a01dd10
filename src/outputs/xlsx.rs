//! Spreadsheet export.
//!
//! One workbook per run: a bold header row followed by the exported articles
//! in extraction order.

use crate::error::ExportError;
use crate::models::{EXPORT_HEADERS, ExportRow};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Path of the spreadsheet for a run started at `timestamp`.
pub fn export_path(output_dir: &str, timestamp: &str) -> PathBuf {
    Path::new(output_dir).join(format!("news_data_{timestamp}.xlsx"))
}

/// Write `rows` under the standard header to `path`.
///
/// An empty slice produces a header-only workbook.
#[instrument(level = "info", skip(rows), fields(path = %path.display(), rows = rows.len()))]
pub fn write_rows(path: &Path, rows: &[ExportRow]) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Articles")?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, row.title.as_str())?;
        worksheet.write_string(r, 1, row.date.as_str())?;
        worksheet.write_string(r, 2, row.description.as_str())?;
        if let Some(filename) = &row.image_filename {
            worksheet.write_string(r, 3, filename.as_str())?;
        }
        worksheet.write_number(r, 4, row.keyword_count as f64)?;
        worksheet.write_boolean(r, 5, row.has_money)?;
    }

    workbook.save(path)?;
    info!("Wrote spreadsheet");
    Ok(())
}
