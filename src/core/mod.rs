pub mod columns;
pub mod engine;
pub mod export;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod preview;
pub mod sort;

pub use crate::domain::model::{FilterOutcome, LoadedTable};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
