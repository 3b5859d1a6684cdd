//! Tabular output: HTML, CSV and spreadsheet rendering, chosen by output file
//! extension.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use askama::Template;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use tracing::{info, warn};

use crate::models::{cell_text, FlatRow};

/// Column names plus rows of rendered cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded, long rows truncated, to the column count.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// A single-row table from column/value pairs.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let (columns, row): (Vec<String>, Vec<String>) = pairs.into_iter().unzip();
        Self {
            columns,
            rows: vec![row],
        }
    }

    /// Table over flattened rows. Columns are the union of all row keys, in
    /// order of first appearance.
    pub fn from_flat_rows(rows: &[FlatRow]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in rows {
            for column in row.keys() {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).map(cell_text).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Render as an HTML table, in the layout pandas' `to_html` produces.
    pub fn to_html(&self) -> Result<String> {
        HtmlTable {
            columns: &self.columns,
            rows: &self.rows,
        }
        .render()
        .context("Failed to render HTML table")
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e.error()))?;
        String::from_utf8(bytes).context("CSV output is not UTF-8")
    }

    /// Render as an `.xlsx` workbook with one sheet and a bold header row.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, column) in self.columns.iter().enumerate() {
            sheet.write_string_with_format(0, sheet_col(col)?, column, &header)?;
        }
        for (row, cells) in self.rows.iter().enumerate() {
            let row = RowNum::try_from(row + 1).context("Too many rows for a worksheet")?;
            for (col, cell) in cells.iter().enumerate() {
                sheet.write_string(row, sheet_col(col)?, cell)?;
            }
        }

        workbook
            .save_to_buffer()
            .context("Failed to build workbook")
    }
}

#[derive(Template)]
#[template(path = "table.html")]
struct HtmlTable<'a> {
    columns: &'a [String],
    rows: &'a [Vec<String>],
}

fn sheet_col(col: usize) -> Result<ColNum> {
    ColNum::try_from(col).context("Too many columns for a worksheet")
}

/// File formats a table can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Html,
    Csv,
    Xlsx,
}

impl OutputFormat {
    /// Format for a file extension, `None` if unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "html" => Some(Self::Html),
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn render(&self, table: &Table) -> Result<Vec<u8>> {
        match self {
            Self::Html => table.to_html().map(String::into_bytes),
            Self::Csv => table.to_csv().map(String::into_bytes),
            Self::Xlsx => table.to_xlsx(),
        }
    }
}

/// Write `table` to `output_file`, or as HTML to `stdout` when there is no
/// file or its extension is unsupported.
pub fn write_table<W: Write>(table: &Table, output_file: Option<&Path>, stdout: &mut W) -> Result<()> {
    if let Some(path) = output_file {
        match OutputFormat::from_path(path) {
            Some(format) => {
                std::fs::write(path, format.render(table)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("wrote {} rows to {}", table.rows.len(), path.display());
                return Ok(());
            }
            None => {
                let extension = path
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                warn!("Extension {} not supported", extension);
            }
        }
    }

    stdout
        .write_all(table.to_html()?.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}
