use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Canonical candidate attributes, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    City,
    Neighborhood,
    Price,
    Currency,
    Rating,
    Reviews,
    Modalities,
    Gender,
    Languages,
    MobileService,
    Availability,
    YearsExperience,
    Credentials,
    Bio,
}

impl Field {
    pub const ALL: [Field; 15] = [
        Field::Name,
        Field::City,
        Field::Neighborhood,
        Field::Price,
        Field::Currency,
        Field::Rating,
        Field::Reviews,
        Field::Modalities,
        Field::Gender,
        Field::Languages,
        Field::MobileService,
        Field::Availability,
        Field::YearsExperience,
        Field::Credentials,
        Field::Bio,
    ];

    pub fn canonical(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::City => "city",
            Field::Neighborhood => "neighborhood",
            Field::Price => "price",
            Field::Currency => "currency",
            Field::Rating => "rating",
            Field::Reviews => "reviews",
            Field::Modalities => "modalities",
            Field::Gender => "gender",
            Field::Languages => "languages",
            Field::MobileService => "mobileservice",
            Field::Availability => "availability",
            Field::YearsExperience => "yearsexperience",
            Field::Credentials => "credentials",
            Field::Bio => "bio",
        }
    }

    /// Header names recognised for this field, lowercase, in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Name => &["name", "therapist", "provider"],
            Field::City => &["city", "location_city", "town"],
            Field::Neighborhood => &["neighborhood", "area", "district", "borough"],
            Field::Price => &["price", "rate", "fee", "session_cost"],
            Field::Currency => &["currency", "price_currency"],
            Field::Rating => &["rating", "score", "stars"],
            Field::Reviews => &["reviews", "review_count"],
            Field::Modalities => &["modalities", "techniques", "specialties", "services"],
            Field::Gender => &["gender", "therapist_gender"],
            Field::Languages => &["languages", "language"],
            Field::MobileService => &["mobileservice", "mobile", "in_home", "house_call"],
            Field::Availability => &["availability", "hours", "schedule"],
            Field::YearsExperience => &[
                "yearsexperience",
                "experience_years",
                "yrs_exp",
                "experience",
            ],
            Field::Credentials => &["credentials", "license", "certifications"],
            Field::Bio => &["bio", "about", "description", "summary"],
        }
    }

    pub fn from_canonical(name: &str) -> Option<Field> {
        let lower = name.to_lowercase();
        Field::ALL.into_iter().find(|f| f.canonical() == lower)
    }
}

/// Canonical field → column index in the loaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    columns: BTreeMap<Field, usize>,
}

impl ColumnMapping {
    pub fn insert(&mut self, field: Field, column: usize) {
        self.columns.insert(field, column);
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains_column(&self, column: usize) -> bool {
        self.columns.values().any(|&c| c == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Mapped fields in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, usize)> + '_ {
        self.columns.iter().map(|(f, c)| (*f, *c))
    }
}

/// One uploaded row. Cells are trimmed and never modified after load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    line: u64,
    cells: Vec<String>,
}

impl Candidate {
    pub fn new(line: u64, cells: Vec<String>) -> Self {
        Self { line, cells }
    }

    /// 1-based line in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateTable {
    headers: Vec<String>,
    rows: Vec<Candidate>,
    mapping: ColumnMapping,
}

impl CandidateTable {
    pub fn new(headers: Vec<String>, rows: Vec<Candidate>, mapping: ColumnMapping) -> Self {
        Self {
            headers,
            rows,
            mapping,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Candidate] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Candidate> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn column_of(&self, field: Field) -> Option<usize> {
        self.mapping.get(field)
    }

    /// `None` when the table has no column for `field`.
    pub fn value<'a>(&self, row: &'a Candidate, field: Field) -> Option<&'a str> {
        self.column_of(field).map(|c| row.cell(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub source_name: String,
    pub rows_read: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn rows_loaded(&self) -> usize {
        self.rows_read - self.skipped.len()
    }
}

/// Filtered, sorted, read-only projection of a table.
#[derive(Debug, Clone)]
pub struct CandidateView {
    table: Arc<CandidateTable>,
    rows: Vec<usize>,
    columns: Vec<usize>,
}

impl CandidateView {
    pub fn new(table: Arc<CandidateTable>, rows: Vec<usize>, columns: Vec<usize>) -> Self {
        Self {
            table,
            rows,
            columns,
        }
    }

    pub fn table(&self) -> &CandidateTable {
        &self.table
    }

    pub fn matched(&self) -> usize {
        self.rows.len()
    }

    pub fn total(&self) -> usize {
        self.table.len()
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|&c| self.table.headers()[c].as_str())
            .collect()
    }

    /// Matching rows with cells in display column order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.rows.iter().filter_map(move |&r| {
            let row = self.table.row(r)?;
            Some(self.columns.iter().map(|&c| row.cell(c)).collect())
        })
    }
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub view: CandidateView,
    pub report: LoadReport,
    pub ignored_sort_keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Arc<CandidateTable>,
    pub report: LoadReport,
}
