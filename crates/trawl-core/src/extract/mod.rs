//! Site extractors.
//!
//! Each supported site has one [`SiteExtractor`] that turns a search results
//! page into [`Record`]s. Sites are identified by [`SiteKind::detect`], which
//! checks the host of the configured URL against a fixed list of markers in
//! order; the first marker contained in the host wins. Paths and query
//! strings are never consulted.
//!
//! | Site              | Marker               | Extractor                  |
//! |-------------------|----------------------|----------------------------|
//! | arXiv             | `arxiv.org`          | [`ArxivExtractor`]         |
//! | Papers with Code  | `paperswithcode.com` | [`PapersWithCodeExtractor`] |
//! | Google            | `google.com`         | none (declared unsupported) |
//!
//! Adding a site means adding a module, a [`SiteKind`] variant and its marker.

mod arxiv;
mod paperswithcode;

use std::fmt;

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::AppError;
use crate::models::NOT_AVAILABLE;
use crate::traits::SiteExtractor;

pub use arxiv::ArxivExtractor;
pub use paperswithcode::PapersWithCodeExtractor;

/// Sites the crawler knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteKind {
    Arxiv,
    PapersWithCode,
    /// Recognized, but no extractor exists.
    Google,
}

impl SiteKind {
    const MARKERS: [(&'static str, SiteKind); 3] = [
        ("arxiv.org", SiteKind::Arxiv),
        ("paperswithcode.com", SiteKind::PapersWithCode),
        ("google.com", SiteKind::Google),
    ];

    /// Identify the site behind a configured URL from its host.
    ///
    /// `None` means unrecognized, including URLs that do not parse.
    pub fn detect(site_url: &str) -> Option<SiteKind> {
        let url = Url::parse(site_url).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        Self::MARKERS
            .iter()
            .find(|(marker, _)| host.contains(marker))
            .map(|(_, kind)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SiteKind::Arxiv => "arxiv",
            SiteKind::PapersWithCode => "paperswithcode",
            SiteKind::Google => "google",
        }
    }

    /// Build the extractor for this site, rooted at `site_url`.
    ///
    /// Returns `Ok(None)` for sites without an extractor.
    pub fn extractor(&self, site_url: &str) -> Result<Option<Box<dyn SiteExtractor>>, AppError> {
        let base = parse_site_url(site_url)?;
        let extractor: Option<Box<dyn SiteExtractor>> = match self {
            SiteKind::Arxiv => Some(Box::new(ArxivExtractor::new(base))),
            SiteKind::PapersWithCode => Some(Box::new(PapersWithCodeExtractor::new(base))),
            SiteKind::Google => None,
        };
        Ok(extractor)
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn parse_site_url(site_url: &str) -> Result<Url, AppError> {
    Url::parse(site_url)
        .map_err(|e| AppError::ConfigError(format!("Invalid site URL '{site_url}': {e}")))
}

#[inline]
pub(crate) fn create_selector(sel_str: &str) -> Result<Selector, AppError> {
    Selector::parse(sel_str)
        .map_err(|e| AppError::ParseError(format!("Invalid selector '{sel_str}': {e}")))
}

/// Whitespace-normalized text of the first match, or the sentinel.
pub(crate) fn text_or_sentinel(parent: ElementRef<'_>, selector: &Selector) -> String {
    parent
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(el.text()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Absolute `href` of the first match, or the sentinel.
pub(crate) fn link_or_sentinel(parent: ElementRef<'_>, selector: &Selector, base: &Url) -> String {
    parent
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| base.join(href.trim()).ok())
        .map(|url| url.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
