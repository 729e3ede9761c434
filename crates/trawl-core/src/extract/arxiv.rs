//! arXiv search results.
//!
//! The results page lists one `li.arxiv-result` per paper with the title,
//! authors and abstract in `p.title`, `p.authors` and `p.abstract`, and the
//! abstract page link under `p.list-title`.

use scraper::Html;
use url::Url;

use super::{create_selector, link_or_sentinel, text_or_sentinel};
use crate::error::AppError;
use crate::models::Record;
use crate::traits::SiteExtractor;

#[derive(Debug, Clone)]
pub struct ArxivExtractor {
    base: Url,
}

impl ArxivExtractor {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl SiteExtractor for ArxivExtractor {
    fn search_url(&self, query: &str) -> Result<Url, AppError> {
        let mut url = self
            .base
            .join("/search/")
            .map_err(|e| AppError::ConfigError(format!("Invalid arXiv base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("searchtype", "all");
        Ok(url)
    }

    fn extract(&self, html: &str, query: &str, limit: usize) -> Result<Vec<Record>, AppError> {
        let doc = Html::parse_document(html);

        let result_selector = create_selector("li.arxiv-result")?;
        let title_selector = create_selector("p.title")?;
        let authors_selector = create_selector("p.authors")?;
        let abstract_selector = create_selector("p.abstract")?;
        let link_selector = create_selector("p.list-title a[href]")?;

        let records = doc
            .select(&result_selector)
            .take(limit)
            .map(|paper| {
                Record::new(
                    query,
                    text_or_sentinel(paper, &title_selector),
                    link_or_sentinel(paper, &link_selector, &self.base),
                )
                .with_authors(text_or_sentinel(paper, &authors_selector))
                .with_abstract(text_or_sentinel(paper, &abstract_selector))
            })
            .collect();

        Ok(records)
    }
}
