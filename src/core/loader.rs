use crate::core::columns::autodetect_columns;
use crate::domain::model::{Candidate, CandidateTable, LoadReport, LoadedTable, SkippedRow};
use crate::utils::error::{FinderError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, Trim};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    /// First worksheet of an xlsx / xls / xlsb / ods workbook.
    Excel,
}

impl TableFormat {
    /// Format implied by the file extension, `None` when the extension says nothing.
    pub fn from_name(name: &str) -> Option<Self> {
        // URL 可能帶 query string，只看路徑部分
        let path_part = name.split(['?', '#']).next().unwrap_or(name);
        let extension = Path::new(path_part)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("csv") => Some(TableFormat::Csv),
            Some("tsv") | Some("tab") => Some(TableFormat::Tsv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods") => {
                Some(TableFormat::Excel)
            }
            _ => None,
        }
    }

    /// Workbook when the bytes carry a zip or OLE signature, otherwise tab
    /// separated when the header line has tabs but no commas.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            return TableFormat::Excel;
        }
        let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or(&[]);
        let tabs = first_line.iter().filter(|b| **b == b'\t').count();
        let commas = first_line.iter().filter(|b| **b == b',').count();
        if tabs > 0 && commas == 0 {
            TableFormat::Tsv
        } else {
            TableFormat::Csv
        }
    }

    pub fn detect(name: &str, bytes: &[u8]) -> Self {
        Self::from_name(name).unwrap_or_else(|| Self::sniff(bytes))
    }
}

pub fn parse_table(source_name: &str, bytes: &[u8], format: TableFormat) -> Result<LoadedTable> {
    match format {
        TableFormat::Csv => parse_delimited(source_name, bytes, b','),
        TableFormat::Tsv => parse_delimited(source_name, bytes, b'\t'),
        TableFormat::Excel => parse_workbook(source_name, bytes),
    }
}

fn empty_file(source_name: &str) -> FinderError {
    FinderError::ParseError {
        source_name: source_name.to_string(),
        message: "the file is empty".to_string(),
    }
}

/// Header and rows go through the same clean-up whatever the file format:
/// cells trimmed, short rows padded, rows with extra values skipped.
struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Candidate>,
    report: LoadReport,
}

impl TableBuilder {
    fn new(source_name: &str, headers: Vec<String>) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(FinderError::ParseError {
                source_name: source_name.to_string(),
                message: "the first row must contain column names".to_string(),
            });
        }

        Ok(Self {
            headers,
            rows: Vec::new(),
            report: LoadReport {
                source_name: source_name.to_string(),
                ..Default::default()
            },
        })
    }

    fn push(&mut self, line: u64, cells: Vec<String>) {
        let width = self.headers.len();
        if cells.len() > width && cells[width..].iter().any(|c| !c.trim().is_empty()) {
            let reason = format!("expected {} fields, found {}", width, cells.len());
            self.reject(line, reason);
            return;
        }

        self.report.rows_read += 1;
        let mut cells: Vec<String> = cells
            .iter()
            .take(width)
            .map(|c| c.trim().to_string())
            .collect();
        // 欄位不足視為缺值
        cells.resize(width, String::new());
        self.rows.push(Candidate::new(line, cells));
    }

    fn reject(&mut self, line: u64, reason: String) {
        tracing::debug!("Skipping line {}: {}", line, reason);
        self.report.rows_read += 1;
        self.report.skipped.push(SkippedRow { line, reason });
    }

    fn finish(self) -> LoadedTable {
        let mapping = autodetect_columns(&self.headers);
        tracing::debug!(
            "Loaded {} rows from {} ({} skipped, {} known columns)",
            self.rows.len(),
            self.report.source_name,
            self.report.skipped.len(),
            mapping.len()
        );

        LoadedTable {
            table: Arc::new(CandidateTable::new(self.headers, self.rows, mapping)),
            report: self.report,
        }
    }
}

fn parse_delimited(source_name: &str, bytes: &[u8], delimiter: u8) -> Result<LoadedTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let mut records = reader.byte_records();

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(empty_file(source_name)),
    };
    let mut builder = TableBuilder::new(
        source_name,
        header
            .iter()
            .map(|h| String::from_utf8_lossy(h).to_string())
            .collect(),
    )?;

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                if let csv::ErrorKind::Io(_) = e.kind() {
                    return Err(e.into());
                }
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                builder.reject(line, e.to_string());
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cells: std::result::Result<Vec<String>, _> = record
            .iter()
            .map(|raw| std::str::from_utf8(raw).map(str::to_string))
            .collect();
        match cells {
            Ok(cells) => builder.push(line, cells),
            Err(_) => builder.reject(line, "invalid UTF-8 text".to_string()),
        }
    }

    Ok(builder.finish())
}

fn parse_workbook(source_name: &str, bytes: &[u8]) -> Result<LoadedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(empty_file(source_name)),
    };

    // Range 從第一個有值的儲存格開始，行號要加回位移
    let header_line = range.start().map(|(row, _)| u64::from(row) + 1).unwrap_or(1);
    let mut rows = range.rows();

    let header = rows.next().ok_or_else(|| empty_file(source_name))?;
    let mut builder = TableBuilder::new(source_name, header.iter().map(Data::to_string).collect())?;

    for (offset, row) in rows.enumerate() {
        // 整列空白是表格中的間隔，不算資料列
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let line = header_line + 1 + offset as u64;
        builder.push(line, row.iter().map(Data::to_string).collect());
    }

    Ok(builder.finish())
}
