pub mod etl;
pub mod extractor;
pub mod pipeline;
pub mod scheduler;

pub use crate::domain::model::{MealType, MenuDate, MenuEntry, StoredMenu};
pub use crate::domain::ports::{ConfigProvider, MenuRepository, PageFetcher, Pipeline};
pub use crate::utils::error::Result;
