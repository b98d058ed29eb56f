use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};
use tracing::debug;

use crate::error::{StageError, StageResult};

const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
const DATE_FORMAT: &str = "yyyy-mm-dd";
const DURATION_FORMAT: &str = "[h]:mm:ss";

/// One spreadsheet cell, kept close enough to the source that it can be
/// written back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date.
    DateTime(f64),
    Duration(f64),
    /// Formula error such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// The cell rendered as a string, or `None` when it is empty.
    pub fn as_display(&self) -> Option<String> {
        match self {
            CellValue::Missing => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) | CellValue::DateTime(n) | CellValue::Duration(n) => {
                Some(n.to_string())
            }
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Error(e) => Some(e.clone()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Missing,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) if dt.is_duration() => CellValue::Duration(dt.as_f64()),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

/// A sheet loaded into memory: a header row plus rectangular data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(sheet: impl Into<String>, headers: Vec<String>) -> Self {
        Table {
            sheet: sheet.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like `column_index`, but reports the lookup failure against `source`.
    pub fn require_column(&self, name: &str, source: &Path) -> StageResult<usize> {
        self.column_index(name).ok_or_else(|| StageError::MissingColumn {
            column: name.to_string(),
            path: source.to_path_buf(),
        })
    }

    pub fn column(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    /// Pushes a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Missing);
        self.rows.push(row);
    }

    /// Stores `values` under `header`: in place when the column exists,
    /// otherwise as a new last column. `values` must have one entry per row.
    pub fn set_column(&mut self, header: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(header) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(header.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }
}

/// Loads `sheet` (or the first sheet) from `path`. The first row becomes the
/// header; blank header cells are named `Unnamed: <index>`.
pub fn read_table(path: &Path, sheet: Option<&str>) -> StageResult<Table> {
    if !path.exists() {
        return Err(StageError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| StageError::SheetNotFound {
                sheet: wanted.to_string(),
                path: path.to_path_buf(),
            })?,
        None => names.first().cloned().ok_or_else(|| StageError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?,
    };

    let range = workbook.worksheet_range(&name)?;
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(idx, cell)| match CellValue::from(cell).as_display() {
                    Some(h) if !h.trim().is_empty() => h,
                    _ => format!("Unnamed: {idx}"),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut table = Table::new(name, headers);
    for row in rows {
        table.push_row(row.iter().map(CellValue::from).collect());
    }

    debug!(
        path = %path.display(),
        sheet = %table.sheet,
        columns = table.headers.len(),
        rows = table.len(),
        "loaded sheet"
    );
    Ok(table)
}

/// Writes the table as a single-sheet workbook, replacing any file at `path`.
/// No index column is written. The workbook creation time is pinned so equal
/// tables produce identical files.
pub fn write_table(table: &Table, path: &Path) -> StageResult<()> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let duration_format = Format::new().set_num_format(DURATION_FORMAT);

    let worksheet = workbook.add_worksheet();
    if !table.sheet.is_empty() {
        worksheet.set_name(&table.sheet)?;
    }

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            let c = c as u16;
            match cell {
                CellValue::Missing => {}
                CellValue::Text(s) => {
                    worksheet.write_string(r, c, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                // the source number format is not kept; whole-day serials
                // are written as plain dates
                CellValue::DateTime(n) if n.fract() == 0.0 => {
                    worksheet.write_number_with_format(r, c, *n, &date_format)?;
                }
                CellValue::DateTime(n) => {
                    worksheet.write_number_with_format(r, c, *n, &datetime_format)?;
                }
                CellValue::Duration(n) => {
                    worksheet.write_number_with_format(r, c, *n, &duration_format)?;
                }
                // formula errors keep their text (`#DIV/0!`), not the formula
                CellValue::Error(e) => {
                    worksheet.write_string(r, c, e)?;
                }
            }
        }
    }

    workbook.save(path)?;
    debug!(path = %path.display(), rows = table.len(), "wrote sheet");
    Ok(())
}
