use crate::domain::model::{MenuEntry, StoredMenu};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Durable menu store keyed by `(date, meal_type)`.
pub trait MenuRepository: Send + Sync {
    /// Creates the backing table if absent. Never touches existing rows.
    fn initialize(&self) -> Result<()>;
    /// Upserts every entry and returns how many were written.
    fn save(&self, entries: &[MenuEntry]) -> Result<usize>;
    fn read_all(&self) -> Result<Vec<StoredMenu>>;
    /// Rows whose date label starts with the given `YYYY.MM.DD` day.
    fn read_day(&self, day: &str) -> Result<Vec<StoredMenu>>;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, markup: String) -> Result<Vec<MenuEntry>>;
    async fn load(&self, entries: Vec<MenuEntry>) -> Result<usize>;
}
