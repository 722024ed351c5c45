use crate::core::filter::{is_missing, parse_number};
use crate::domain::model::{CandidateTable, Field};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

/// Parse "price,-rating" into sort keys. A leading `-` means descending.
pub fn parse_sort_keys(spec: &str) -> Vec<SortKey> {
    spec.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .filter_map(|k| {
            let (descending, name) = match k.strip_prefix('-') {
                Some(rest) => (true, rest.trim()),
                None => (false, k),
            };
            (!name.is_empty()).then(|| SortKey {
                column: name.to_string(),
                descending,
            })
        })
        .collect()
}

/// Exact header, then canonical field name, then case-insensitive header.
pub fn resolve_column(table: &CandidateTable, key: &str) -> Option<usize> {
    let headers = table.headers();
    if let Some(idx) = headers.iter().position(|h| h == key) {
        return Some(idx);
    }
    if let Some(idx) = Field::from_canonical(key).and_then(|f| table.column_of(f)) {
        return Some(idx);
    }
    let lower = key.to_lowercase();
    headers.iter().position(|h| h.to_lowercase() == lower)
}

enum ColumnKind {
    Numeric,
    Text,
}

struct ResolvedKey {
    column: usize,
    descending: bool,
    kind: ColumnKind,
}

/// Numeric when every cell holding a value parses as a number.
/// Placeholders such as `n/a` count as no value, not as text.
fn column_kind(table: &CandidateTable, column: usize) -> ColumnKind {
    let mut values = table
        .rows()
        .iter()
        .map(|r| r.cell(column))
        .filter(|c| !is_missing(c))
        .peekable();
    let numeric = values.peek().is_some() && values.all(|c| parse_number(c).is_some());
    if numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

// 空值一律排最後，不受升降序影響
fn compare_option<T>(a: Option<T>, b: Option<T>, descending: bool, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = cmp(&a, &b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable multi-key sort of `rows` (indices into `table`).
///
/// Returns the keys that did not resolve to any column; they are skipped.
pub fn sort_rows(table: &CandidateTable, rows: &mut [usize], keys: &[SortKey]) -> Vec<String> {
    let mut ignored = Vec::new();
    let mut resolved = Vec::new();

    for key in keys {
        match resolve_column(table, &key.column) {
            Some(column) => resolved.push(ResolvedKey {
                column,
                descending: key.descending,
                kind: column_kind(table, column),
            }),
            None => {
                tracing::warn!("Sort key '{}' not found; ignored.", key.column);
                ignored.push(key.column.clone());
            }
        }
    }

    if resolved.is_empty() {
        return ignored;
    }

    rows.sort_by(|&a, &b| {
        let (row_a, row_b) = (&table.rows()[a], &table.rows()[b]);
        resolved
            .iter()
            .map(|key| {
                let (cell_a, cell_b) = (row_a.cell(key.column), row_b.cell(key.column));
                match key.kind {
                    ColumnKind::Numeric => compare_option(
                        parse_number(cell_a),
                        parse_number(cell_b),
                        key.descending,
                        |x, y| x.total_cmp(y),
                    ),
                    ColumnKind::Text => compare_option(
                        Some(cell_a).filter(|c| !is_missing(c)),
                        Some(cell_b).filter(|c| !is_missing(c)),
                        key.descending,
                        |x, y| x.cmp(y),
                    ),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    ignored
}
