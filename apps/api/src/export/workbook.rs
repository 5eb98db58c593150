//! Workbook writing — serializes the synthesized table to an in-memory `.xlsx`.
//!
//! Every cell is written with `set_value_string` so Excel treats the content
//! as text: leading zeros in codes and compact dates must survive round trips
//! through spreadsheet software.

use std::io::Cursor;

use anyhow::{anyhow, Result};

const SHEET_NAME: &str = "근로자명부";

/// Builds a single-sheet workbook from a header row plus data rows and
/// returns the serialized `.xlsx` bytes.
pub fn build_workbook(header: &[String], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut book = umya_spreadsheet::new_file();

    // new_file() seeds "Sheet1"; rename it rather than carrying two sheets.
    if let Some(sheet) = book.get_sheet_by_name_mut("Sheet1") {
        sheet.set_name(SHEET_NAME);
    }
    let sheet = book
        .get_sheet_by_name_mut(SHEET_NAME)
        .ok_or_else(|| anyhow!("workbook has no sheet named {SHEET_NAME}"))?;

    for (col, value) in header.iter().enumerate() {
        sheet
            .get_cell_mut((col as u32 + 1, 1))
            .set_value_string(value);
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .get_cell_mut((col as u32 + 1, row_idx as u32 + 2))
                .set_value_string(value);
        }
    }

    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor)
        .map_err(|e| anyhow!("xlsx serialization failed: {e}"))?;
    Ok(cursor.into_inner())
}
