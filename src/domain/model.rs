use serde::{Deserialize, Serialize};

/// One followed series: a display name, the page advertising its volumes,
/// and the volumes already on the shelf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedSeries {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub owned: Vec<u32>,
}

/// Outcome of checking one series against its page.
///
/// Invariants: `existing`, `missing` and `owned` are sorted ascending,
/// `missing` is `existing` minus `owned`, and `missing_count == missing.len()`.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub name: String,
    pub url: String,
    pub owned: Vec<u32>,
    pub existing: Vec<u32>,
    pub missing: Vec<u32>,
    pub missing_count: usize,
}

/// Field values pushed to the external record store for one series.
/// The property names they land under are configuration, not part of this model.
#[derive(Debug, Clone)]
pub struct RecordFields {
    pub url: String,
    pub missing_count: usize,
    pub missing_volumes: String,
    pub owned_volumes: String,
    pub existing_volumes: String,
    pub checked_at: String,
    pub status: String,
}
