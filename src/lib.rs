pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{Cli, Command};
pub use crate::config::AppConfig;

pub use crate::adapters::{http::HttpFetcher, storage::SqliteMenuRepository};
pub use crate::core::{
    etl::{EtlEngine, RunSummary},
    pipeline::MenuPipeline,
    scheduler::WeeklySchedule,
};
pub use crate::utils::error::{EtlError, Result};
