//! Papers with Code search results.
//!
//! Each hit is a `div.infinite-item`; the first `h1` holds the title, the
//! first link points at the paper page and `p.authors` lists the authors.

use scraper::Html;
use url::Url;

use super::{create_selector, link_or_sentinel, text_or_sentinel};
use crate::error::AppError;
use crate::models::Record;
use crate::traits::SiteExtractor;

#[derive(Debug, Clone)]
pub struct PapersWithCodeExtractor {
    base: Url,
}

impl PapersWithCodeExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl SiteExtractor for PapersWithCodeExtractor {
    fn search_url(&self, query: &str) -> Result<Url, AppError> {
        let mut url = self.base.join("/search").map_err(|e| {
            AppError::ConfigError(format!("Invalid Papers with Code base URL: {e}"))
        })?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn extract(&self, html: &str, query: &str, limit: usize) -> Result<Vec<Record>, AppError> {
        let doc = Html::parse_document(html);

        let item_selector = create_selector("div.infinite-item")?;
        let title_selector = create_selector("h1")?;
        let authors_selector = create_selector("p.authors")?;
        let link_selector = create_selector("a[href]")?;

        let records = doc
            .select(&item_selector)
            .take(limit)
            .map(|paper| {
                Record::new(
                    query,
                    text_or_sentinel(paper, &title_selector),
                    link_or_sentinel(paper, &link_selector, &self.base),
                )
                .with_authors(text_or_sentinel(paper, &authors_selector))
            })
            .collect();

        Ok(records)
    }
}
