pub mod storage;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::core::preview::DEFAULT_PREVIEW_ROWS;
    use crate::core::ConfigProvider;
    use crate::domain::criteria::{split_list, FilterCriteria};
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "therapist-finder")]
    #[command(about = "Filter a list of massage therapist candidates stored in CSV/TSV or Excel")]
    pub struct CliConfig {
        /// Input CSV/TSV/Excel file or http(s) URL
        #[arg(long = "in", value_name = "PATH|URL")]
        pub input: String,

        /// Write filtered results here (.csv, .tsv, .json or .zip)
        #[arg(long)]
        pub out: Option<String>,

        /// City (case-insensitive exact match)
        #[arg(long)]
        pub city: Option<String>,

        /// Neighborhood (case-insensitive contains)
        #[arg(long)]
        pub neighborhood: Option<String>,

        /// Therapist gender (case-insensitive exact match)
        #[arg(long)]
        pub gender: Option<String>,

        /// Require ALL these modalities (comma/semicolon separated)
        #[arg(long)]
        pub modalities: Option<String>,

        /// Require ALL these languages (comma/semicolon separated)
        #[arg(long)]
        pub languages: Option<String>,

        #[arg(long)]
        pub price_min: Option<f64>,

        #[arg(long)]
        pub price_max: Option<f64>,

        #[arg(long)]
        pub rating_min: Option<f64>,

        #[arg(long)]
        pub reviews_min: Option<u64>,

        /// Minimum years of experience
        #[arg(long)]
        pub years_min: Option<f64>,

        /// Require mobile / in-home service
        #[arg(long)]
        pub mobile: bool,

        /// Keyword(s) that must appear in Bio/Credentials (comma separated)
        #[arg(long)]
        pub text: Option<String>,

        /// Day(s) to look for in availability, e.g. "Mon, Tue, Sat"
        #[arg(long)]
        pub available: Option<String>,

        /// Comma separated sort keys, '-' prefix for descending, e.g. "price,-rating"
        #[arg(long, allow_hyphen_values = true)]
        pub sort: Option<String>,

        /// Rows to print when no --out is given
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        pub limit: usize,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    fn list(value: &Option<String>) -> Vec<String> {
        value.as_deref().map(split_list).unwrap_or_default()
    }

    impl ConfigProvider for CliConfig {
        fn source(&self) -> &str {
            &self.input
        }

        fn output(&self) -> Option<&str> {
            self.out.as_deref()
        }

        fn criteria(&self) -> Result<FilterCriteria> {
            Ok(FilterCriteria {
                city: self.city.clone(),
                neighborhood: self.neighborhood.clone(),
                gender: self.gender.clone(),
                price_min: self.price_min,
                price_max: self.price_max,
                rating_min: self.rating_min,
                reviews_min: self.reviews_min,
                years_min: self.years_min,
                mobile_only: self.mobile,
                modalities: list(&self.modalities),
                languages: list(&self.languages),
                days: list(&self.available),
                keywords: list(&self.text),
            })
        }

        fn sort_spec(&self) -> Option<&str> {
            self.sort.as_deref()
        }

        fn preview_limit(&self) -> usize {
            self.limit
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_source("in", &self.input)?;
            if let Some(out) = &self.out {
                validation::validate_path("out", out)?;
            }
            validation::validate_positive_number("limit", self.limit, 1)?;
            self.criteria()?.validate()
        }
    }

}
