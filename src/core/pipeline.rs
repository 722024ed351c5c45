use crate::core::columns::display_columns;
use crate::core::export::{render, OutputFormat};
use crate::core::filter::FilterEngine;
use crate::core::loader::{parse_table, TableFormat};
use crate::core::preview::render_text_table;
use crate::core::sort::{parse_sort_keys, sort_rows};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::criteria::FilterCriteria;
use crate::domain::model::{CandidateView, FilterOutcome, LoadedTable};
use crate::utils::error::{FinderError, Result};
use crate::utils::validation::Validate;
use reqwest::Client;

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Filter, sort and order columns of a loaded table.
pub fn build_shortlist(
    loaded: &LoadedTable,
    criteria: &FilterCriteria,
    sort_spec: Option<&str>,
) -> FilterOutcome {
    let table = &loaded.table;
    let mut rows = FilterEngine::new(table, criteria).apply();

    let ignored_sort_keys = match sort_spec {
        Some(spec) => sort_rows(table, &mut rows, &parse_sort_keys(spec)),
        None => Vec::new(),
    };

    let columns = display_columns(table);
    FilterOutcome {
        view: CandidateView::new(table.clone(), rows, columns),
        report: loaded.report.clone(),
        ignored_sort_keys,
    }
}

pub struct FinderPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> FinderPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Downloading candidates from: {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        tracing::debug!("Source response status: {}", status);

        if !status.is_success() {
            return Err(FinderError::SourceStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for FinderPipeline<S, C> {
    async fn extract(&self) -> Result<LoadedTable> {
        let source = self.config.source();

        let bytes = if is_remote(source) {
            self.fetch_remote(source).await?
        } else {
            self.storage.read_file(source).await?
        };

        // 副檔名優先，沒有副檔名才看內容
        let format = TableFormat::detect(source, &bytes);
        tracing::debug!("Reading {} as {:?}", source, format);
        parse_table(source, &bytes, format)
    }

    async fn transform(&self, loaded: LoadedTable) -> Result<FilterOutcome> {
        let criteria = self.config.criteria()?;
        criteria.validate()?;
        tracing::debug!("Filter criteria: {:?}", criteria);

        Ok(build_shortlist(&loaded, &criteria, self.config.sort_spec()))
    }

    async fn load(&self, outcome: FilterOutcome) -> Result<String> {
        match self.config.output() {
            Some(path) => {
                let format = OutputFormat::from_path(path)?;
                let data = render(&outcome.view, format)?;
                tracing::debug!("Writing {} bytes ({:?}) to {}", data.len(), format, path);
                self.storage.write_file(path, &data).await?;
                Ok(format!("Wrote {} rows to {}", outcome.view.matched(), path))
            }
            None => Ok(render_text_table(
                &outcome.view,
                self.config.preview_limit(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const SAMPLE: &str = "\
Name,City,Price,Rating
Ana,Vancouver,95,4.8
Ben,Vancouver,130,4.9
Cleo,Toronto,85,4.5
";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                FinderError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        source: String,
        output: Option<String>,
        criteria: FilterCriteria,
        sort: Option<String>,
    }

    impl MockConfig {
        fn new(source: &str) -> Self {
            Self {
                source: source.to_string(),
                output: None,
                criteria: FilterCriteria::default(),
                sort: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source(&self) -> &str {
            &self.source
        }

        fn output(&self) -> Option<&str> {
            self.output.as_deref()
        }

        fn criteria(&self) -> Result<FilterCriteria> {
            Ok(self.criteria.clone())
        }

        fn sort_spec(&self) -> Option<&str> {
            self.sort.as_deref()
        }

        fn preview_limit(&self) -> usize {
            30
        }
    }

    #[tokio::test]
    async fn test_extract_from_storage() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let pipeline = FinderPipeline::new(storage, MockConfig::new("candidates.csv"));

        let loaded = pipeline.extract().await.unwrap();
        assert_eq!(loaded.table.len(), 3);
        assert_eq!(loaded.report.source_name, "candidates.csv");
    }

    #[tokio::test]
    async fn test_extract_reads_first_worksheet() {
        let workbook = include_bytes!("../../data/sample_candidates.xlsx");
        let storage = MockStorage::with_file("candidates.xlsx", workbook);
        let pipeline = FinderPipeline::new(storage, MockConfig::new("candidates.xlsx"));

        let loaded = pipeline.extract().await.unwrap();
        assert_eq!(loaded.table.len(), 6);
        assert_eq!(loaded.table.rows()[0].cell(0), "Ana Silva");
    }

    #[tokio::test]
    async fn test_extract_sniffs_workbook_without_extension() {
        let workbook = include_bytes!("../../data/sample_candidates.xlsx");
        let storage = MockStorage::with_file("export", workbook);
        let pipeline = FinderPipeline::new(storage, MockConfig::new("export"));

        let loaded = pipeline.extract().await.unwrap();
        assert_eq!(loaded.table.len(), 6);
    }

    #[tokio::test]
    async fn test_extract_from_url() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/candidates.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(SAMPLE);
        });

        let storage = MockStorage::with_file("unused", b"");
        let pipeline = FinderPipeline::new(storage, MockConfig::new(&server.url("/candidates.csv")));

        let loaded = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(loaded.table.len(), 3);
    }

    #[tokio::test]
    async fn test_extract_url_failure_status() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let storage = MockStorage::with_file("unused", b"");
        let pipeline = FinderPipeline::new(storage, MockConfig::new(&server.url("/missing.csv")));

        let result = pipeline.extract().await;

        api_mock.assert();
        assert!(matches!(
            result,
            Err(FinderError::SourceStatusError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_transform_filters_and_sorts() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let mut config = MockConfig::new("candidates.csv");
        config.criteria.city = Some("vancouver".to_string());
        config.sort = Some("-price".to_string());
        let pipeline = FinderPipeline::new(storage, config);

        let loaded = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(loaded).await.unwrap();

        let names: Vec<String> = outcome.view.rows().map(|r| r[0].to_string()).collect();
        assert_eq!(names, vec!["Ben", "Ana"]);
        assert_eq!(outcome.view.total(), 3);
    }

    #[tokio::test]
    async fn test_transform_inverted_price_range_matches_nothing() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let mut config = MockConfig::new("candidates.csv");
        config.criteria.price_min = Some(200.0);
        config.criteria.price_max = Some(100.0);
        let pipeline = FinderPipeline::new(storage, config);

        let loaded = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(loaded).await.unwrap();
        assert_eq!(outcome.view.matched(), 0);
        assert_eq!(outcome.view.total(), 3);
    }

    #[tokio::test]
    async fn test_transform_negative_minimum_is_no_constraint() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let mut config = MockConfig::new("candidates.csv");
        config.criteria.rating_min = Some(-1.0);
        let pipeline = FinderPipeline::new(storage, config);

        let loaded = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(loaded).await.unwrap();
        assert_eq!(outcome.view.matched(), 3);
    }

    #[tokio::test]
    async fn test_transform_rejects_non_finite_numbers() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let mut config = MockConfig::new("candidates.csv");
        config.criteria.price_max = Some(f64::NAN);
        let pipeline = FinderPipeline::new(storage, config);

        let loaded = pipeline.extract().await.unwrap();
        assert!(matches!(
            pipeline.transform(loaded).await,
            Err(FinderError::InvalidCriteriaError { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_writes_output_file() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let mut config = MockConfig::new("candidates.csv");
        config.output = Some("results.csv".to_string());
        config.criteria.rating_min = Some(4.8);
        let pipeline = FinderPipeline::new(storage.clone(), config);

        let loaded = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(loaded).await.unwrap();
        let message = pipeline.load(outcome).await.unwrap();

        assert_eq!(message, "Wrote 2 rows to results.csv");
        let written = storage.get_file("results.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "Name,City,Price,Rating\nAna,Vancouver,95,4.8\nBen,Vancouver,130,4.9\n"
        );
    }

    #[tokio::test]
    async fn test_load_without_output_renders_preview() {
        let storage = MockStorage::with_file("candidates.csv", SAMPLE.as_bytes());
        let pipeline = FinderPipeline::new(storage, MockConfig::new("candidates.csv"));

        let loaded = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(loaded).await.unwrap();
        let preview = pipeline.load(outcome).await.unwrap();

        assert!(preview.starts_with("Name"));
        assert!(preview.ends_with("Matched 3 of 3 candidates."));
    }
}
