use crate::error::AppError;
use crate::extract::SiteKind;
use crate::models::{CrawlPlan, Record, SiteConfig};
use crate::traits::Fetcher;

/// Walks every (site, query) pair of a [`CrawlPlan`] and merges the results.
///
/// Sites are visited in configuration order and, for each site, queries in
/// configuration order. Pairs run one after another. A failure on one pair
/// is logged and skipped; it never aborts the batch.
pub struct Aggregator<F>
where
    F: Fetcher,
{
    fetcher: F,
}

impl<F> Aggregator<F>
where
    F: Fetcher,
{
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Collect one batch for the plan.
    pub async fn collect(&self, plan: &CrawlPlan) -> Vec<Record> {
        let mut batch = Vec::new();

        if plan.sites.is_empty() || plan.queries.is_empty() {
            tracing::warn!(
                sites = plan.sites.len(),
                queries = plan.queries.len(),
                "Nothing to crawl"
            );
            return batch;
        }

        'sites: for site in &plan.sites {
            for query in &plan.queries {
                match self.scrape_site(site, query, plan.per_query_limit).await {
                    Ok(records) => {
                        tracing::info!(
                            site = %site.url,
                            %query,
                            count = records.len(),
                            "Scraped site"
                        );
                        batch.extend(records);
                    }
                    Err(e) => {
                        tracing::error!(
                            site = %site.url,
                            %query,
                            category = e.category(),
                            error = %e,
                            "Error scraping site"
                        );
                    }
                }

                if let Some(max) = plan.max_records {
                    if batch.len() >= max {
                        batch.truncate(max);
                        tracing::info!(max, "Batch limit reached");
                        break 'sites;
                    }
                }
            }
        }

        tracing::info!(
            pairs = plan.pair_count(),
            records = batch.len(),
            "Aggregation complete"
        );
        batch
    }

    /// Scrape a single (site, query) pair.
    ///
    /// Unrecognized and unsupported sites produce no records rather than an error.
    pub async fn scrape_site(
        &self,
        site: &SiteConfig,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Record>, AppError> {
        let Some(kind) = SiteKind::detect(&site.url) else {
            tracing::error!(site = %site.url, %query, "No extractor for unrecognized site");
            return Ok(Vec::new());
        };

        let Some(extractor) = kind.extractor(&site.url)? else {
            tracing::error!(
                site = %site.url,
                kind = %kind,
                "Scraping not implemented for site"
            );
            return Ok(Vec::new());
        };

        let url = extractor.search_url(query)?;
        tracing::info!(site = %kind, mode = %site.mode, %url, "Fetching");
        let html = self.fetcher.fetch(url.as_str()).await?;
        tracing::debug!(bytes = html.len(), "Fetched search page");

        extractor.extract(&html, query, limit)
    }
}
