use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::fmt;

/// Outcome of one extract → transform → load run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub extracted: usize,
    pub saved: usize,
    /// Set when the run degraded to "no new rows" because of a failure.
    pub error: Option<String>,
}

impl RunSummary {
    pub fn failed(reason: String) -> Self {
        Self {
            error: Some(reason),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(reason) => write!(f, "failed ({reason})"),
            None => write!(f, "{} extracted, {} saved", self.extracted, self.saved),
        }
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs every phase and propagates the first failure.
    pub async fn try_run(&self) -> Result<RunSummary> {
        tracing::info!("🍱 Starting menu crawl");

        tracing::debug!("Extracting menu page...");
        let markup = self.pipeline.extract().await?;
        tracing::debug!("Fetched {} bytes", markup.len());

        tracing::debug!("Transforming menu table...");
        let entries = self.pipeline.transform(markup).await?;
        let extracted = entries.len();
        tracing::info!("Extracted {} menu entries", extracted);

        // 빈 결과로 기존 데이터를 덮어쓰지 않음
        if entries.is_empty() {
            tracing::warn!("⚠️ No menu entries found, nothing to save");
            return Ok(RunSummary::default());
        }

        tracing::debug!("Loading menu entries...");
        let saved = self.pipeline.load(entries).await?;
        tracing::info!("✅ Crawl complete: {} menu entries updated", saved);

        Ok(RunSummary {
            extracted,
            saved,
            error: None,
        })
    }

    /// Never fails: any error is logged and reported in the summary.
    pub async fn run(&self) -> RunSummary {
        match self.try_run().await {
            Ok(summary) => summary,
            // 호출자에게는 요약만 전달
            Err(e) => {
                tracing::error!(
                    "❌ Menu crawl failed: {} (Category: {:?}, Severity: {:?})",
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                RunSummary::failed(e.to_string())
            }
        }
    }
}
