pub mod engine;
pub mod extract;
pub mod ranges;
pub mod reconcile;
pub mod report;

pub use crate::domain::model::{RecordFields, SeriesReport, TrackedSeries};
pub use crate::domain::ports::{PageFetcher, RecordStore, Storage};
pub use crate::utils::error::Result;
