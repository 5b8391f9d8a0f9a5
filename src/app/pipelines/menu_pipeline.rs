use crate::core::extractor;
use crate::domain::model::MenuEntry;
use crate::domain::ports::{ConfigProvider, MenuRepository, PageFetcher, Pipeline};
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;

/// Cafeteria page → menu table → menu store.
pub struct MenuPipeline<F: PageFetcher, C: ConfigProvider> {
    pub(crate) fetcher: F,
    pub(crate) config: C,
    pub(crate) repository: Arc<dyn MenuRepository>,
}

impl<F: PageFetcher, C: ConfigProvider> MenuPipeline<F, C> {
    pub fn new(fetcher: F, config: C, repository: Arc<dyn MenuRepository>) -> Self {
        Self {
            fetcher,
            config,
            repository,
        }
    }
}

#[async_trait::async_trait]
impl<F: PageFetcher, C: ConfigProvider> Pipeline for MenuPipeline<F, C> {
    async fn extract(&self) -> Result<String> {
        tracing::info!("🌐 Fetching menu page: {}", self.config.source_url());
        self.fetcher.fetch(self.config.source_url()).await
    }

    async fn transform(&self, markup: String) -> Result<Vec<MenuEntry>> {
        let entries = extractor::parse_menu_table(&markup)?;
        Ok(entries)
    }

    async fn load(&self, entries: Vec<MenuEntry>) -> Result<usize> {
        let repository = Arc::clone(&self.repository);
        tokio::task::spawn_blocking(move || repository.save(&entries))
            .await
            .map_err(|e| EtlError::Internal {
                message: format!("menu save task failed: {}", e),
            })?
    }
}
