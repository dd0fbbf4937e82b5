use crate::domain::model::RecordFields;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Retrieves the rendered plain-text content of one page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// External record store keyed by page URL.
///
/// `find_record_by_url` returns `TrackerError::RecordNotFound` when no
/// record matches, so callers can tell "absent" apart from transport errors.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_record_by_url(&self, url: &str) -> Result<String>;
    async fn update_record(&self, record_id: &str, fields: &RecordFields) -> Result<()>;
}
