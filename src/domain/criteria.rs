use crate::utils::error::{FinderError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[;,]").expect("static separator pattern"));

/// 把 "Deep Tissue, Sports; Thai" 拆成清單，去空白、去空項
pub fn split_list(input: &str) -> Vec<String> {
    LIST_SEPARATOR
        .split(input)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// User supplied filters. `None` / empty lists impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub gender: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub rating_min: Option<f64>,
    pub reviews_min: Option<u64>,
    pub years_min: Option<f64>,
    #[serde(default)]
    pub mobile_only: bool,
    /// Every listed modality must appear.
    #[serde(default)]
    pub modalities: Vec<String>,
    /// Every listed language must appear.
    #[serde(default)]
    pub languages: Vec<String>,
    /// At least one listed day must appear in availability.
    #[serde(default)]
    pub days: Vec<String>,
    /// Every keyword must appear in bio or credentials.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.city).is_none()
            && non_blank(&self.neighborhood).is_none()
            && non_blank(&self.gender).is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.rating_min.is_none()
            && self.reviews_min.is_none()
            && self.years_min.is_none()
            && !self.mobile_only
            && self.modalities.is_empty()
            && self.languages.is_empty()
            && self.days.is_empty()
            && self.keywords.is_empty()
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn check_number(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(FinderError::InvalidCriteriaError {
            field: field.to_string(),
            value: v.to_string(),
            reason: "must be a number".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Only values that are not numbers are rejected. Ranges are left to the
/// filter: an inverted price range simply matches nothing.
impl Validate for FilterCriteria {
    fn validate(&self) -> Result<()> {
        check_number("price_min", self.price_min)?;
        check_number("price_max", self.price_max)?;
        check_number("rating_min", self.rating_min)?;
        check_number("years_min", self.years_min)
    }
}
