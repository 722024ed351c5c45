use crate::domain::criteria::{split_list, FilterCriteria};
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

/// Sidebar filter form as submitted by the browser (query string).
///
/// Blank inputs and zero-valued numbers mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterForm {
    pub city: String,
    pub neighborhood: String,
    pub gender: String,
    pub price_min: String,
    pub price_max: String,
    pub rating_min: String,
    pub reviews_min: String,
    pub years_min: String,
    pub mobile: Option<String>,
    pub modalities: String,
    pub languages: String,
    pub days: String,
    pub keywords: String,
    pub sort: String,
}

fn text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn number(field: &str, value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed = trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FinderError::InvalidCriteriaError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be a number".to_string(),
        })?;
    // 表單欄位下限是 0，0 以下都當作不限
    Ok((parsed > 0.0).then_some(parsed))
}

impl FilterForm {
    pub fn to_criteria(&self) -> Result<FilterCriteria> {
        let reviews_min = number("reviews_min", &self.reviews_min)?.map(|v| v.ceil() as u64);

        let criteria = FilterCriteria {
            city: text(&self.city),
            neighborhood: text(&self.neighborhood),
            gender: text(&self.gender),
            price_min: number("price_min", &self.price_min)?,
            price_max: number("price_max", &self.price_max)?,
            rating_min: number("rating_min", &self.rating_min)?,
            reviews_min,
            years_min: number("years_min", &self.years_min)?,
            mobile_only: self.mobile_only(),
            modalities: split_list(&self.modalities),
            languages: split_list(&self.languages),
            days: split_list(&self.days),
            keywords: split_list(&self.keywords),
        };
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn mobile_only(&self) -> bool {
        self.mobile
            .as_deref()
            .is_some_and(|v| !v.is_empty() && v != "off" && v != "false")
    }

    pub fn sort_spec(&self) -> Option<&str> {
        let trimmed = self.sort.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Query string reproducing this form, without blank fields.
    pub fn query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let fields = [
            ("city", &self.city),
            ("neighborhood", &self.neighborhood),
            ("gender", &self.gender),
            ("price_min", &self.price_min),
            ("price_max", &self.price_max),
            ("rating_min", &self.rating_min),
            ("reviews_min", &self.reviews_min),
            ("years_min", &self.years_min),
            ("modalities", &self.modalities),
            ("languages", &self.languages),
            ("days", &self.days),
            ("keywords", &self.keywords),
            ("sort", &self.sort),
        ];
        for (name, value) in fields {
            if !value.trim().is_empty() {
                serializer.append_pair(name, value);
            }
        }
        if self.mobile_only() {
            serializer.append_pair("mobile", "on");
        }
        serializer.finish()
    }
}
