pub mod config;
pub mod core;
pub mod domain;
pub mod fetch;
pub mod store;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::TrackerConfig, CliConfig};
pub use core::engine::TrackerEngine;
pub use domain::model::{RecordFields, SeriesReport, TrackedSeries};
pub use domain::ports::{PageFetcher, RecordStore, Storage};
pub use fetch::ChromeFetcher;
pub use store::NotionStore;
pub use utils::error::{Result, TrackerError};
