use crate::domain::model::CandidateView;
use crate::utils::error::{FinderError, Result};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
    Zip,
}

impl OutputFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("csv") | None => Ok(OutputFormat::Csv),
            Some("tsv") => Ok(OutputFormat::Tsv),
            Some("json") => Ok(OutputFormat::Json),
            Some("zip") => Ok(OutputFormat::Zip),
            Some(other) => Err(FinderError::UnsupportedFormatError {
                format: other.to_string(),
            }),
        }
    }
}

pub fn to_delimited(view: &CandidateView, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(view.headers())?;
    for row in view.rows() {
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| FinderError::IoError(e.into_error()))
}

pub fn to_csv(view: &CandidateView) -> Result<Vec<u8>> {
    to_delimited(view, b',')
}

/// Array of objects keyed by header, keys in display order.
pub fn to_json(view: &CandidateView) -> Result<Vec<u8>> {
    let headers = view.headers();
    let records: Vec<Value> = view
        .rows()
        .map(|row| {
            let object: Map<String, Value> = headers
                .iter()
                .zip(row)
                .map(|(h, cell)| (h.to_string(), Value::String(cell.to_string())))
                .collect();
            Value::Object(object)
        })
        .collect();

    Ok(serde_json::to_vec_pretty(&records)?)
}

/// CSV, TSV and JSON of the same shortlist in one archive.
pub fn to_zip(view: &CandidateView) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>("candidates.csv", FileOptions::default())?;
    zip.write_all(&to_csv(view)?)?;

    zip.start_file::<_, ()>("candidates.tsv", FileOptions::default())?;
    zip.write_all(&to_delimited(view, b'\t')?)?;

    zip.start_file::<_, ()>("candidates.json", FileOptions::default())?;
    zip.write_all(&to_json(view)?)?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

pub fn render(view: &CandidateView, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => to_csv(view),
        OutputFormat::Tsv => to_delimited(view, b'\t'),
        OutputFormat::Json => to_json(view),
        OutputFormat::Zip => to_zip(view),
    }
}
