pub mod config;
pub mod core;
pub mod domain;
pub mod utils;
#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::storage::LocalStorage;
pub use config::toml_config::ServerConfig;
pub use core::{engine::FinderEngine, pipeline::FinderPipeline};
pub use domain::criteria::FilterCriteria;
pub use domain::model::{Candidate, CandidateTable, CandidateView, Field};
pub use utils::error::{FinderError, Result};
