use crate::domain::criteria::FilterCriteria;
use crate::domain::model::{FilterOutcome, LoadedTable};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Local path or http(s) URL of the candidate table.
    fn source(&self) -> &str;
    fn output(&self) -> Option<&str>;
    fn criteria(&self) -> Result<FilterCriteria>;
    fn sort_spec(&self) -> Option<&str>;
    fn preview_limit(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<LoadedTable>;
    async fn transform(&self, loaded: LoadedTable) -> Result<FilterOutcome>;
    async fn load(&self, outcome: FilterOutcome) -> Result<String>;
}
