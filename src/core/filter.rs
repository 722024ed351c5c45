//! Conjunctive row filter over a [`CandidateTable`].
//!
//! Each active criterion becomes one [`Predicate`] bound to a column. A row is
//! kept when every predicate holds; input order is never changed. Criteria
//! whose column the table lacks are dropped, so they impose no constraint.

use crate::domain::criteria::{non_blank, FilterCriteria};
use crate::domain::model::{Candidate, CandidateTable, Field};

const TRUTHY: [&str; 4] = ["true", "yes", "y", "1"];

/// Spreadsheet placeholders for "no value".
const MISSING: [&str; 9] = ["n/a", "na", "#n/a", "<na>", "null", "none", "nan", "-", "--"];

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Equals { column: usize, value: String },
    Contains { column: usize, value: String },
    AtLeast { column: usize, min: f64 },
    AtMost { column: usize, max: f64 },
    Truthy { column: usize },
    ContainsAll { column: usize, needles: Vec<String> },
    ContainsAny { column: usize, needles: Vec<String> },
    TextContainsAll { columns: Vec<usize>, needles: Vec<String> },
}

impl Predicate {
    fn matches(&self, row: &Candidate) -> bool {
        match self {
            Predicate::Equals { column, value } => row.cell(*column).to_lowercase() == *value,
            Predicate::Contains { column, value } => {
                row.cell(*column).to_lowercase().contains(value.as_str())
            }
            Predicate::AtLeast { column, min } => {
                parse_number(row.cell(*column)).is_some_and(|v| v >= *min)
            }
            Predicate::AtMost { column, max } => {
                parse_number(row.cell(*column)).is_some_and(|v| v <= *max)
            }
            Predicate::Truthy { column } => is_truthy(row.cell(*column)),
            Predicate::ContainsAll { column, needles } => {
                contains_all(&row.cell(*column).to_lowercase(), needles)
            }
            Predicate::ContainsAny { column, needles } => {
                let haystack = row.cell(*column).to_lowercase();
                needles.iter().any(|n| haystack.contains(n.as_str()))
            }
            Predicate::TextContainsAll { columns, needles } => {
                let block = columns
                    .iter()
                    .map(|c| row.cell(*c))
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                contains_all(&block, needles)
            }
        }
    }
}

/// Numeric coercion: blank or unparseable cells are unknown.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Blank cell or a placeholder such as `n/a`.
pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || MISSING.contains(&trimmed.to_lowercase().as_str())
}

pub fn is_truthy(cell: &str) -> bool {
    let lower = cell.trim().to_lowercase();
    TRUTHY.contains(&lower.as_str()) || parse_number(&lower).is_some_and(|v| v != 0.0)
}

fn contains_all(haystack: &str, needles: &[String]) -> bool {
    needles.iter().all(|n| haystack.contains(n.as_str()))
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub struct FilterEngine<'a> {
    table: &'a CandidateTable,
    predicates: Vec<Predicate>,
}

impl<'a> FilterEngine<'a> {
    pub fn new(table: &'a CandidateTable, criteria: &FilterCriteria) -> Self {
        let mut engine = Self {
            table,
            predicates: Vec::new(),
        };
        engine.compile(criteria);
        engine
    }

    /// Number of criteria that actually constrain this table.
    pub fn active_predicates(&self) -> usize {
        self.predicates.len()
    }

    pub fn matches(&self, row: &Candidate) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }

    /// Indices of matching rows, in input order.
    pub fn apply(&self) -> Vec<usize> {
        self.table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn column(&self, field: Field) -> Option<usize> {
        let column = self.table.column_of(field);
        if column.is_none() {
            tracing::debug!(
                "Ignoring '{}' filter: no matching column",
                field.canonical()
            );
        }
        column
    }

    fn push(&mut self, field: Field, build: impl FnOnce(usize) -> Predicate) {
        if let Some(column) = self.column(field) {
            self.predicates.push(build(column));
        }
    }

    fn compile(&mut self, criteria: &FilterCriteria) {
        if let Some(city) = non_blank(&criteria.city) {
            let value = city.to_lowercase();
            self.push(Field::City, |column| Predicate::Equals { column, value });
        }
        if let Some(area) = non_blank(&criteria.neighborhood) {
            let value = area.to_lowercase();
            self.push(Field::Neighborhood, |column| Predicate::Contains {
                column,
                value,
            });
        }
        if let Some(gender) = non_blank(&criteria.gender) {
            let value = gender.to_lowercase();
            self.push(Field::Gender, |column| Predicate::Equals { column, value });
        }

        if let Some(min) = criteria.price_min {
            self.push(Field::Price, |column| Predicate::AtLeast { column, min });
        }
        if let Some(max) = criteria.price_max {
            self.push(Field::Price, |column| Predicate::AtMost { column, max });
        }
        if let Some(min) = criteria.rating_min {
            self.push(Field::Rating, |column| Predicate::AtLeast { column, min });
        }
        if let Some(min) = criteria.reviews_min {
            let min = min as f64;
            self.push(Field::Reviews, |column| Predicate::AtLeast { column, min });
        }
        if let Some(min) = criteria.years_min {
            self.push(Field::YearsExperience, |column| Predicate::AtLeast {
                column,
                min,
            });
        }

        if criteria.mobile_only {
            self.push(Field::MobileService, |column| Predicate::Truthy { column });
        }

        let modalities = lowered(&criteria.modalities);
        if !modalities.is_empty() {
            self.push(Field::Modalities, |column| Predicate::ContainsAll {
                column,
                needles: modalities,
            });
        }
        let languages = lowered(&criteria.languages);
        if !languages.is_empty() {
            self.push(Field::Languages, |column| Predicate::ContainsAll {
                column,
                needles: languages,
            });
        }
        let days = lowered(&criteria.days);
        if !days.is_empty() {
            self.push(Field::Availability, |column| Predicate::ContainsAny {
                column,
                needles: days,
            });
        }

        // 關鍵字搜尋 bio + credentials，兩欄都沒有時沒有任何列符合
        let keywords = lowered(&criteria.keywords);
        if !keywords.is_empty() {
            let columns: Vec<usize> = [Field::Bio, Field::Credentials]
                .into_iter()
                .filter_map(|f| self.table.column_of(f))
                .collect();
            self.predicates.push(Predicate::TextContainsAll {
                columns,
                needles: keywords,
            });
        }
    }
}

/// Convenience wrapper: indices of rows matching `criteria`.
pub fn filter_rows(table: &CandidateTable, criteria: &FilterCriteria) -> Vec<usize> {
    FilterEngine::new(table, criteria).apply()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::{parse_table, TableFormat};
    use std::sync::Arc;

    const SAMPLE: &str = "\
Name,City,Neighborhood,Price,Rating,Reviews,Modalities,Gender,Languages,Mobile,Availability,Experience,Credentials,Bio
Ana Silva,Vancouver,Kitsilano,95,4.8,120,Deep Tissue; Sports,Female,English; Portuguese,yes,Mon Tue Sat,8,RMT,Athletes welcome
Ben Cho,Vancouver,Downtown,130,4.9,300,Swedish,Male,English; Korean,no,Wed Thu,12,RMT,Relaxation focus
Cleo Roy,Toronto,Annex,85,4.5,40,Deep Tissue; Thai,Female,French,1,Sat Sun,3,,Thai massage certified
Dev Patel,vancouver,Mount Pleasant,n/a,,15,Sports; Myofascial,Male,English; Hindi,0,Mon,,RMT CMT,
";

    fn table() -> Arc<CandidateTable> {
        parse_table("sample.csv", SAMPLE.as_bytes(), TableFormat::Csv)
            .unwrap()
            .table
    }

    fn names(table: &CandidateTable, rows: &[usize]) -> Vec<String> {
        rows.iter()
            .map(|&r| table.rows()[r].cell(0).to_string())
            .collect()
    }

    #[test]
    fn test_no_criteria_returns_everything() {
        let table = table();
        let engine = FilterEngine::new(&table, &FilterCriteria::default());
        assert_eq!(engine.active_predicates(), 0);
        assert_eq!(engine.apply(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_city_is_case_insensitive_exact() {
        let table = table();
        let criteria = FilterCriteria {
            city: Some("VANCOUVER".to_string()),
            ..Default::default()
        };
        assert_eq!(
            names(&table, &filter_rows(&table, &criteria)),
            vec!["Ana Silva", "Ben Cho", "Dev Patel"]
        );

        let partial = FilterCriteria {
            city: Some("Van".to_string()),
            ..Default::default()
        };
        assert!(filter_rows(&table, &partial).is_empty());
    }

    #[test]
    fn test_neighborhood_contains() {
        let table = table();
        let criteria = FilterCriteria {
            neighborhood: Some("pleasant".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&table, &filter_rows(&table, &criteria)), vec!["Dev Patel"]);
    }

    #[test]
    fn test_unparseable_price_fails_numeric_filters() {
        let table = table();
        let criteria = FilterCriteria {
            price_max: Some(1000.0),
            ..Default::default()
        };
        // Dev 的價格是 "n/a"
        assert_eq!(filter_rows(&table, &criteria), vec![0, 1, 2]);

        let range = FilterCriteria {
            price_min: Some(90.0),
            price_max: Some(100.0),
            ..Default::default()
        };
        assert_eq!(names(&table, &filter_rows(&table, &range)), vec!["Ana Silva"]);
    }

    #[test]
    fn test_missing_value_placeholders() {
        for cell in ["", "  ", "n/a", "N/A", "NaN", "null", "-", "#N/A"] {
            assert!(is_missing(cell), "{:?}", cell);
            assert_eq!(parse_number(cell), None);
        }
        assert!(!is_missing("0"));
        assert!(!is_missing("call for price"));
    }

    #[test]
    fn test_rating_reviews_and_years() {
        let table = table();
        let criteria = FilterCriteria {
            rating_min: Some(4.6),
            reviews_min: Some(100),
            years_min: Some(10.0),
            ..Default::default()
        };
        assert_eq!(names(&table, &filter_rows(&table, &criteria)), vec!["Ben Cho"]);
    }

    #[test]
    fn test_mobile_truthy_values() {
        let table = table();
        let criteria = FilterCriteria {
            mobile_only: true,
            ..Default::default()
        };
        assert_eq!(
            names(&table, &filter_rows(&table, &criteria)),
            vec!["Ana Silva", "Cleo Roy"]
        );
        assert!(is_truthy("Y"));
        assert!(is_truthy("2.0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_modalities_and_languages_require_all() {
        let table = table();
        let criteria = FilterCriteria {
            modalities: vec!["deep tissue".to_string(), "Sports".to_string()],
            ..Default::default()
        };
        assert_eq!(names(&table, &filter_rows(&table, &criteria)), vec!["Ana Silva"]);

        let languages = FilterCriteria {
            languages: vec!["English".to_string()],
            ..Default::default()
        };
        assert_eq!(filter_rows(&table, &languages), vec![0, 1, 3]);
    }

    #[test]
    fn test_days_match_any() {
        let table = table();
        let criteria = FilterCriteria {
            days: vec!["sat".to_string(), "thu".to_string()],
            ..Default::default()
        };
        assert_eq!(filter_rows(&table, &criteria), vec![0, 1, 2]);
    }

    #[test]
    fn test_keywords_search_bio_and_credentials() {
        let table = table();
        let criteria = FilterCriteria {
            keywords: vec!["rmt".to_string(), "athletes".to_string()],
            ..Default::default()
        };
        assert_eq!(names(&table, &filter_rows(&table, &criteria)), vec!["Ana Silva"]);

        let cmt = FilterCriteria {
            keywords: vec!["CMT".to_string()],
            ..Default::default()
        };
        assert_eq!(names(&table, &filter_rows(&table, &cmt)), vec!["Dev Patel"]);
    }

    #[test]
    fn test_keywords_without_text_columns_match_nothing() {
        let loaded = parse_table("t.csv", b"Name,City\nAna,Vancouver\n", TableFormat::Csv).unwrap();
        let criteria = FilterCriteria {
            keywords: vec!["rmt".to_string()],
            ..Default::default()
        };
        assert!(filter_rows(&loaded.table, &criteria).is_empty());
    }

    #[test]
    fn test_missing_column_imposes_no_constraint() {
        let loaded = parse_table("t.csv", b"Name,City\nAna,Vancouver\nBen,Toronto\n", TableFormat::Csv)
            .unwrap();
        let criteria = FilterCriteria {
            rating_min: Some(4.0),
            gender: Some("female".to_string()),
            ..Default::default()
        };
        let engine = FilterEngine::new(&loaded.table, &criteria);
        assert_eq!(engine.active_predicates(), 0);
        assert_eq!(engine.apply(), vec![0, 1]);
    }

    #[test]
    fn test_result_is_conjunction_of_single_filters() {
        let table = table();
        let singles = [
            FilterCriteria {
                city: Some("vancouver".to_string()),
                ..Default::default()
            },
            FilterCriteria {
                languages: vec!["english".to_string()],
                ..Default::default()
            },
            FilterCriteria {
                days: vec!["mon".to_string()],
                ..Default::default()
            },
        ];
        let combined = FilterCriteria {
            city: Some("vancouver".to_string()),
            languages: vec!["english".to_string()],
            days: vec!["mon".to_string()],
            ..Default::default()
        };

        let expected: Vec<usize> = (0..table.len())
            .filter(|r| singles.iter().all(|c| filter_rows(&table, c).contains(r)))
            .collect();
        assert_eq!(filter_rows(&table, &combined), expected);
        assert_eq!(expected, vec![0, 3]);
    }

    #[test]
    fn test_repeating_a_criterion_is_idempotent() {
        let table = table();
        let once = FilterCriteria {
            modalities: vec!["sports".to_string()],
            ..Default::default()
        };
        let twice = FilterCriteria {
            modalities: vec!["sports".to_string(), "Sports".to_string()],
            ..Default::default()
        };
        assert_eq!(filter_rows(&table, &once), filter_rows(&table, &twice));
    }
}
