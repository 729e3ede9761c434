use std::future::Future;

use url::Url;

use crate::error::AppError;
use crate::models::Record;

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Site-specific markup-to-record parser.
pub trait SiteExtractor: Send + Sync {
    /// URL of the site's search results page for `query`.
    fn search_url(&self, query: &str) -> Result<Url, AppError>;

    /// Parse at most `limit` records out of a search results page.
    fn extract(&self, html: &str, query: &str, limit: usize) -> Result<Vec<Record>, AppError>;
}

/// Durable destination for a batch of records.
pub trait RecordSink: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Persist the batch. Returns the number of rows written.
    fn write_batch(&self, records: &[Record]) -> impl Future<Output = Result<u64, AppError>> + Send;
}

/// Sends the operator a completion message.
pub trait Notifier: Send + Sync {
    fn notify(&self, subject: &str, body: &str) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// A no-op Notifier for runs without email notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    async fn notify(&self, _subject: &str, _body: &str) -> Result<(), AppError> {
        Ok(())
    }
}
