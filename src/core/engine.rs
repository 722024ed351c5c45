use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct FinderEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> FinderEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("📥 Loading candidates...");
        let loaded = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} of {} rows from {}",
            loaded.report.rows_loaded(),
            loaded.report.rows_read,
            loaded.report.source_name
        );
        for skipped in &loaded.report.skipped {
            tracing::warn!("⚠️ Skipped line {}: {}", skipped.line, skipped.reason);
        }

        tracing::info!("🔍 Filtering candidates...");
        let outcome = self.pipeline.transform(loaded).await?;
        tracing::info!(
            "Matched {} of {} candidates",
            outcome.view.matched(),
            outcome.view.total()
        );

        let output = self.pipeline.load(outcome).await?;
        tracing::info!("✅ Done");

        Ok(output)
    }
}
