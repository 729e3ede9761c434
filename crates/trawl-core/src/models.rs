use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder stored when an extractor cannot find a sub-field.
pub const NOT_AVAILABLE: &str = "N/A";

/// One normalized result item from a single site/query scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub query: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Record {
    pub fn new(query: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            title: title.into(),
            authors: None,
            abstract_text: None,
            url: url.into(),
            size: None,
            format: None,
        }
    }

    pub fn with_authors(mut self, authors: impl Into<String>) -> Self {
        self.authors = Some(authors.into());
        self
    }

    pub fn with_abstract(mut self, abstract_text: impl Into<String>) -> Self {
        self.abstract_text = Some(abstract_text.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Value of a single column, `None` when the record does not carry it.
    pub fn get(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Query => Some(&self.query),
            RecordField::Title => Some(&self.title),
            RecordField::Authors => self.authors.as_deref(),
            RecordField::Abstract => self.abstract_text.as_deref(),
            RecordField::Url => Some(&self.url),
            RecordField::Size => self.size.as_deref(),
            RecordField::Format => self.format.as_deref(),
        }
    }
}

/// Record columns in their canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Query,
    Title,
    Authors,
    Abstract,
    Url,
    Size,
    Format,
}

impl RecordField {
    pub const ALL: [RecordField; 7] = [
        RecordField::Query,
        RecordField::Title,
        RecordField::Authors,
        RecordField::Abstract,
        RecordField::Url,
        RecordField::Size,
        RecordField::Format,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Query => "query",
            RecordField::Title => "title",
            RecordField::Authors => "authors",
            RecordField::Abstract => "abstract",
            RecordField::Url => "url",
            RecordField::Size => "size",
            RecordField::Format => "format",
        }
    }

    /// Union of the fields carried by at least one record, in canonical order.
    pub fn present_in(records: &[Record]) -> Vec<RecordField> {
        RecordField::ALL
            .into_iter()
            .filter(|field| records.iter().any(|r| r.get(*field).is_some()))
            .collect()
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of material a site is crawled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    Images,
    Datasets,
}

impl ScrapeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeMode::Images => "images",
            ScrapeMode::Datasets => "datasets",
        }
    }
}

impl fmt::Display for ScrapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScrapeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "images" => Ok(ScrapeMode::Images),
            "datasets" => Ok(ScrapeMode::Datasets),
            _ => Err(format!("Unknown scrape mode: {}", s)),
        }
    }
}

/// A configured site: base URL plus the mode it is crawled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteConfig {
    pub url: String,
    pub mode: ScrapeMode,
}

impl SiteConfig {
    pub fn new(url: impl Into<String>, mode: ScrapeMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }
}

/// Everything one aggregation run needs, fixed for the duration of the run.
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub sites: Vec<SiteConfig>,
    pub queries: Vec<String>,
    /// Maximum records taken from a single (site, query) page.
    pub per_query_limit: usize,
    /// Optional cap on the whole batch.
    pub max_records: Option<usize>,
}

impl CrawlPlan {
    pub fn new(sites: Vec<SiteConfig>, queries: Vec<String>, per_query_limit: usize) -> Self {
        Self {
            sites,
            queries,
            per_query_limit,
            max_records: None,
        }
    }

    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Number of (site, query) pairs the plan will visit.
    pub fn pair_count(&self) -> usize {
        self.sites.len() * self.queries.len()
    }
}
