use crate::config::toml_config::TrackerConfig;
use crate::core::extract::extract_volumes;
use crate::core::reconcile::reconcile;
use crate::core::report;
use crate::core::{PageFetcher, RecordStore, SeriesReport, Storage};
use crate::utils::error::{Result, TrackerError};

/// Drives the check for every tracked series, strictly sequentially:
/// fetch → extract → reconcile → optional record-store sync, then writes
/// the aggregated reports through the storage port.
///
/// A fetch failure aborts the whole run; record-store failures are logged
/// per series and the remaining series are still processed.
pub struct TrackerEngine<F: PageFetcher, S: Storage, R: RecordStore> {
    fetcher: F,
    storage: S,
    store: Option<R>,
    config: TrackerConfig,
}

impl<F: PageFetcher, S: Storage, R: RecordStore> TrackerEngine<F, S, R> {
    pub fn new(fetcher: F, storage: S, store: Option<R>, config: TrackerConfig) -> Self {
        Self {
            fetcher,
            storage,
            store,
            config,
        }
    }

    pub async fn run(&self) -> Result<Vec<SeriesReport>> {
        let mut reports = Vec::with_capacity(self.config.series.len());
        let mut sync_failures = 0usize;

        for series in &self.config.series {
            tracing::info!("Checking '{}' ({})", series.name, series.url);

            let text = self.fetcher.fetch_text(&series.url).await?;
            let existing = extract_volumes(&text);
            let missing = reconcile(&series.owned, &existing);

            tracing::info!(
                "'{}': {} volumes on page, {} missing",
                series.name,
                existing.len(),
                missing.len()
            );

            let report = SeriesReport {
                name: series.name.clone(),
                url: series.url.clone(),
                owned: series.owned.clone(),
                missing_count: missing.len(),
                existing,
                missing,
            };

            if let Some(store) = &self.store {
                if !self.sync_record(store, &report).await {
                    sync_failures += 1;
                }
            }

            reports.push(report);
        }

        if sync_failures > 0 {
            tracing::warn!(
                "{} of {} series failed to sync to the record store",
                sync_failures,
                reports.len()
            );
        }

        self.write_reports(&reports).await?;
        Ok(reports)
    }

    /// Pushes one series' result to the record store. Returns false only on
    /// a store failure; a missing record is a skip, not a failure.
    async fn sync_record(&self, store: &R, report: &SeriesReport) -> bool {
        let record_id = match store.find_record_by_url(&report.url).await {
            Ok(id) => id,
            Err(TrackerError::RecordNotFound { url }) => {
                tracing::warn!("⚠️ No record with URL == '{}', skipping record sync", url);
                return true;
            }
            Err(e) => {
                tracing::error!("Record lookup failed for '{}': {}", report.name, e);
                return false;
            }
        };

        let fields = report::record_fields(report, report::checked_at_timestamp());
        match store.update_record(&record_id, &fields).await {
            Ok(()) => {
                tracing::debug!("Record {} updated for '{}'", record_id, report.name);
                true
            }
            Err(e) => {
                tracing::error!("Record update failed for '{}': {}", report.name, e);
                false
            }
        }
    }

    async fn write_reports(&self, reports: &[SeriesReport]) -> Result<()> {
        let json = report::render_json(reports)?;
        self.storage
            .write_file(&self.config.report.json_filename, json.as_bytes())
            .await?;

        let markdown = report::render_markdown(reports);
        self.storage
            .write_file(&self.config.report.markdown_filename, markdown.as_bytes())
            .await?;

        Ok(())
    }
}
