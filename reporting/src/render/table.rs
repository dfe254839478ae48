//! Metrics spreadsheet

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

use report_agent::metrics::{MetricRecord, MetricValue};

use super::{ensure_parent, RenderError, RenderOutcome};

/// Name of the only worksheet
pub const SHEET_NAME: &str = "Report Metrics";

/// Header row plus data rows, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<MetricValue>>,
}

/// Headers come from the first record; each row is that record's values in its own order
///
/// Records with a different key set end up misaligned with the headers.
pub fn build_grid(records: &[MetricRecord]) -> Option<SheetGrid> {
    let first = records.first()?;

    Some(SheetGrid {
        headers: first.keys().map(str::to_string).collect(),
        rows: records
            .iter()
            .map(|record| record.values().cloned().collect())
            .collect(),
    })
}

/// Write the records to a single-sheet workbook at `path`
///
/// An empty record set is skipped without creating a file.
pub fn render_table(records: &[MetricRecord], path: &Path) -> RenderOutcome {
    let Some(grid) = build_grid(records) else {
        tracing::info!("No data provided for spreadsheet, skipping");
        return RenderOutcome::Skipped("no data".to_string());
    };

    RenderOutcome::from_result("spreadsheet", write_grid(&grid, path))
}

fn write_grid(grid: &SheetGrid, path: &Path) -> Result<PathBuf, RenderError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, header) in grid.headers.iter().enumerate() {
            sheet.write_string_with_format(0, column(col)?, header, &header_format)?;
        }

        for (i, row) in grid.rows.iter().enumerate() {
            let row_num = (i + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                let col = column(col)?;
                match value {
                    MetricValue::Number(n) => sheet.write_number(row_num, col, *n)?,
                    MetricValue::Text(s) => sheet.write_string(row_num, col, s)?,
                };
            }
        }
    }

    ensure_parent(path)?;
    workbook.save(path)?;
    Ok(path.to_path_buf())
}

fn column(index: usize) -> Result<u16, RenderError> {
    u16::try_from(index)
        .map_err(|_| RenderError::Spreadsheet(rust_xlsxwriter::XlsxError::RowColumnLimitError))
}
