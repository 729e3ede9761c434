//! Test utilities: mock implementations of the core traits and HTML fixtures.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::Record;
use crate::traits::{Fetcher, Notifier, RecordSink};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Trimmed arXiv search results page: one complete hit, one with a relative
/// link and no authors/abstract, one with only a title.
pub const ARXIV_RESULTS_PAGE: &str = r#"
<html><body><ol class="breathe-horizontal">
  <li class="arxiv-result">
    <div class="is-marginless">
      <p class="list-title is-inline-block">
        <a href="https://arxiv.org/abs/1706.03762">arXiv:1706.03762</a>
      </p>
    </div>
    <p class="title is-5 mathjax">
      Attention Is All
      You Need
    </p>
    <p class="authors"><span>Authors:</span> <a>Ashish Vaswani</a>, <a>Noam Shazeer</a></p>
    <p class="abstract mathjax">The dominant sequence transduction models...</p>
  </li>
  <li class="arxiv-result">
    <p class="list-title"><a href="/abs/1810.04805">arXiv:1810.04805</a></p>
    <p class="title">BERT</p>
  </li>
  <li class="arxiv-result">
    <p class="title">Third paper</p>
  </li>
</ol></body></html>
"#;

/// Trimmed Papers with Code search results page.
pub const PWC_RESULTS_PAGE: &str = r#"
<html><body><div class="infinite-container">
  <div class="row infinite-item item paper-card">
    <div class="col-lg-9 item-content">
      <h1><a href="/paper/segment-anything">Segment Anything</a></h1>
      <p class="authors">Alexander Kirillov, Eric Mintun</p>
    </div>
  </div>
  <div class="row infinite-item item paper-card">
    <a href="/paper/u-net"><img src="/thumb.png"></a>
  </div>
</div></body></html>
"#;

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that answers by URL substring and records every request.
#[derive(Clone)]
pub struct MockFetcher {
    /// (URL substring, response). The first route contained in the URL wins.
    routes: Arc<Mutex<Vec<(String, Result<String, AppError>)>>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    /// Answers every request with the same HTML.
    pub fn new(html: &str) -> Self {
        Self::with_routes(vec![("", Ok(html.to_string()))])
    }

    /// Fails every request with the same error.
    pub fn with_error(error: AppError) -> Self {
        Self::with_routes(vec![("", Err(error))])
    }

    pub fn with_routes(routes: Vec<(&str, Result<String, AppError>)>) -> Self {
        Self {
            routes: Arc::new(Mutex::new(
                routes
                    .into_iter()
                    .map(|(pattern, response)| (pattern.to_string(), response))
                    .collect(),
            )),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        let routes = self.routes.lock().unwrap();
        routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok("<html><body>default</body></html>".to_string()))
    }
}

// ---------------------------------------------------------------------------
// MockSink
// ---------------------------------------------------------------------------

/// Mock sink that records every batch it receives.
#[derive(Clone)]
pub struct MockSink {
    name: &'static str,
    pub batches: Arc<Mutex<Vec<Vec<Record>>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockSink {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            batches: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Sink whose next write fails.
    pub fn with_error(name: &'static str, error: AppError) -> Self {
        Self {
            name,
            batches: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl RecordSink for MockSink {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn write_batch(&self, records: &[Record]) -> Result<u64, AppError> {
        let mut err = self.error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        self.batches.lock().unwrap().push(records.to_vec());
        Ok(records.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// MockNotifier
// ---------------------------------------------------------------------------

/// Mock notifier that records (subject, body) pairs.
#[derive(Clone, Default)]
pub struct MockNotifier {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(error: AppError) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Notifier for MockNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), AppError> {
        let mut err = self.error.lock().unwrap();
        if let Some(e) = err.take() {
            return Err(e);
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}
