use crate::domain::model::{CandidateTable, ColumnMapping, Field};
use std::collections::HashMap;

/// Map canonical fields onto header positions by case-insensitive alias match.
pub fn autodetect_columns(headers: &[String]) -> ColumnMapping {
    // 同名欄位以第一個出現的為準
    let mut by_lower: HashMap<String, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        by_lower.entry(header.trim().to_lowercase()).or_insert(idx);
    }

    let mut mapping = ColumnMapping::default();
    for field in Field::ALL {
        if let Some(&idx) = field.aliases().iter().find_map(|a| by_lower.get(*a)) {
            mapping.insert(field, idx);
        }
    }
    mapping
}

/// Mapped canonical columns first, then the rest in file order.
pub fn display_columns(table: &CandidateTable) -> Vec<usize> {
    let mapping = table.mapping();
    let mut columns: Vec<usize> = Vec::with_capacity(table.headers().len());

    for (_, column) in mapping.iter() {
        if !columns.contains(&column) {
            columns.push(column);
        }
    }
    columns.extend((0..table.headers().len()).filter(|c| !mapping.contains_column(*c)));
    columns
}
