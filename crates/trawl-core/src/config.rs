//! JSON configuration document.
//!
//! The file is read once at startup into a [`CrawlConfig`]. The command-line
//! query replaces the file's `queries` through [`CrawlConfig::with_queries`];
//! after that the value is only ever borrowed.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{CrawlPlan, ScrapeMode, SiteConfig};

pub const DEFAULT_CSV_FILENAME: &str = "output.csv";
pub const DEFAULT_LOG_FILENAME: &str = "crawler.log";

/// `db_config` section.
#[derive(Clone, Deserialize)]
pub struct DbSettings {
    pub host: String,
    pub database: String,
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_pg_port")]
    pub port: u16,
}

fn default_pg_port() -> u16 {
    5432
}

impl std::fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

/// `email_notifications` section.
#[derive(Clone, Default, Deserialize)]
pub struct EmailSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub email_from: String,
    #[serde(default)]
    pub email_password: Option<String>,
    #[serde(default)]
    pub email_to: String,
}

fn default_smtp_port() -> u16 {
    587
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("enabled", &self.enabled)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("email_from", &self.email_from)
            .field("email_to", &self.email_to)
            .finish_non_exhaustive()
    }
}

/// A `websites` entry: either a bare URL or an object with an explicit mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SiteEntry {
    Url(String),
    Detailed {
        url: String,
        #[serde(default)]
        mode: Option<ScrapeMode>,
    },
}

impl SiteEntry {
    pub fn url(&self) -> &str {
        match self {
            SiteEntry::Url(url) | SiteEntry::Detailed { url, .. } => url,
        }
    }

    /// Resolve to a [`SiteConfig`], using `default_mode` when the entry has none.
    pub fn resolve(&self, default_mode: ScrapeMode) -> SiteConfig {
        match self {
            SiteEntry::Url(url) => SiteConfig::new(url.clone(), default_mode),
            SiteEntry::Detailed { url, mode } => {
                SiteConfig::new(url.clone(), mode.unwrap_or(default_mode))
            }
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    db_config: Option<DbSettings>,
    #[serde(default)]
    websites: Option<Vec<SiteEntry>>,
    #[serde(default)]
    queries: Option<Vec<String>>,
    #[serde(default)]
    csv_filename: Option<PathBuf>,
    #[serde(default)]
    log_filename: Option<PathBuf>,
    #[serde(default)]
    email_notifications: Option<EmailSettings>,
    #[serde(default)]
    max_records: Option<usize>,
}

/// Validated crawler configuration.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub db: Option<DbSettings>,
    pub websites: Vec<SiteEntry>,
    /// `None` when neither the file nor the command line supplied queries.
    pub queries: Option<Vec<String>>,
    pub csv_filename: PathBuf,
    pub log_filename: PathBuf,
    pub email: Option<EmailSettings>,
    pub max_records: Option<usize>,
}

impl CrawlConfig {
    /// Read and validate the configuration file at `path`.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let file: ConfigFile = serde_json::from_str(raw)
            .map_err(|e| AppError::ConfigError(format!("Invalid config JSON: {e}")))?;

        let websites = file.websites.ok_or_else(|| {
            AppError::ConfigError("Configuration missing 'websites' key".into())
        })?;

        Ok(Self {
            db: file.db_config,
            websites,
            queries: file.queries,
            csv_filename: file
                .csv_filename
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_FILENAME)),
            log_filename: file
                .log_filename
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILENAME)),
            email: file.email_notifications,
            max_records: file.max_records,
        })
    }

    /// Replace the configured queries (the command line wins over the file).
    pub fn with_queries(mut self, queries: Vec<String>) -> Self {
        self.queries = Some(queries);
        self
    }

    /// Resolve every site entry, filling in `default_mode` where needed.
    pub fn sites(&self, default_mode: ScrapeMode) -> Vec<SiteConfig> {
        self.websites
            .iter()
            .map(|entry| entry.resolve(default_mode))
            .collect()
    }

    /// Build the aggregation plan for one run.
    pub fn plan(&self, default_mode: ScrapeMode, per_query_limit: usize) -> Result<CrawlPlan, AppError> {
        let queries = self
            .queries
            .clone()
            .ok_or_else(|| AppError::ConfigError("Configuration missing 'queries' key".into()))?;

        let plan = CrawlPlan::new(self.sites(default_mode), queries, per_query_limit);
        Ok(match self.max_records {
            Some(max) => plan.with_max_records(max),
            None => plan,
        })
    }

    /// Database settings, required by the relational sink.
    pub fn db(&self) -> Result<&DbSettings, AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::ConfigError("Configuration missing 'db_config' key".into()))
    }

    /// Email settings when notifications are enabled, validated.
    pub fn notifications(&self) -> Result<Option<&EmailSettings>, AppError> {
        let Some(email) = self.email.as_ref().filter(|e| e.enabled) else {
            return Ok(None);
        };

        for (key, value) in [
            ("smtp_server", &email.smtp_server),
            ("email_from", &email.email_from),
            ("email_to", &email.email_to),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ConfigError(format!(
                    "email_notifications.{key} is required when notifications are enabled"
                )));
            }
        }

        Ok(Some(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "db_config": {"host": "localhost", "database": "crawl", "user": "crawler", "password": "secret", "port": 5433},
        "websites": ["https://arxiv.org", {"url": "https://paperswithcode.com", "mode": "images"}],
        "queries": ["from-file"],
        "csv_filename": "data/out.csv",
        "log_filename": "logs/crawl.log",
        "email_notifications": {
            "enabled": true,
            "smtp_server": "smtp.example.com",
            "smtp_port": 2525,
            "email_from": "bot@example.com",
            "email_password": "pw",
            "email_to": "ops@example.com"
        }
    }"#;

    #[test]
    fn parses_full_document() {
        let config = CrawlConfig::from_json(FULL).unwrap();

        let db = config.db().unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5433);
        assert_eq!(config.websites.len(), 2);
        assert_eq!(config.csv_filename, PathBuf::from("data/out.csv"));
        assert_eq!(config.log_filename, PathBuf::from("logs/crawl.log"));

        let email = config.notifications().unwrap().expect("enabled");
        assert_eq!(email.smtp_port, 2525);
        assert_eq!(email.email_to, "ops@example.com");
    }

    #[test]
    fn defaults_when_optional_keys_absent() {
        let config = CrawlConfig::from_json(r#"{"websites": []}"#).unwrap();

        assert_eq!(config.csv_filename, PathBuf::from(DEFAULT_CSV_FILENAME));
        assert_eq!(config.log_filename, PathBuf::from(DEFAULT_LOG_FILENAME));
        assert!(config.queries.is_none());
        assert!(config.notifications().unwrap().is_none());
        assert!(matches!(config.db(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn missing_websites_is_config_error() {
        let err = CrawlConfig::from_json(r#"{"queries": ["x"]}"#).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(msg) if msg.contains("websites")));
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = CrawlConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn missing_queries_fails_plan() {
        let config = CrawlConfig::from_json(r#"{"websites": ["https://arxiv.org"]}"#).unwrap();
        let err = config.plan(ScrapeMode::Datasets, 10).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(msg) if msg.contains("queries")));
    }

    #[test]
    fn cli_queries_replace_file_queries() {
        let config = CrawlConfig::from_json(FULL)
            .unwrap()
            .with_queries(vec!["transformer".into()]);

        let plan = config.plan(ScrapeMode::Datasets, 5).unwrap();
        assert_eq!(plan.queries, vec!["transformer".to_string()]);
        assert_eq!(plan.per_query_limit, 5);
    }

    #[test]
    fn site_modes_fall_back_to_default() {
        let config = CrawlConfig::from_json(FULL).unwrap();
        let sites = config.sites(ScrapeMode::Datasets);

        assert_eq!(sites[0], SiteConfig::new("https://arxiv.org", ScrapeMode::Datasets));
        assert_eq!(
            sites[1],
            SiteConfig::new("https://paperswithcode.com", ScrapeMode::Images)
        );
    }

    #[test]
    fn max_records_carried_into_plan() {
        let config =
            CrawlConfig::from_json(r#"{"websites": [], "queries": [], "max_records": 50}"#).unwrap();
        let plan = config.plan(ScrapeMode::Images, 100).unwrap();
        assert_eq!(plan.max_records, Some(50));
    }

    #[test]
    fn enabled_notifications_require_addresses() {
        let config = CrawlConfig::from_json(
            r#"{"websites": [], "email_notifications": {"enabled": true, "smtp_server": "smtp.example.com"}}"#,
        )
        .unwrap();
        assert!(matches!(config.notifications(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn disabled_notifications_ignore_missing_fields() {
        let config = CrawlConfig::from_json(
            r#"{"websites": [], "email_notifications": {"enabled": false}}"#,
        )
        .unwrap();
        assert!(config.notifications().unwrap().is_none());
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, FULL).unwrap();

        let config = CrawlConfig::from_file(&path).unwrap();
        assert_eq!(config.websites[0].url(), "https://arxiv.org");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = CrawlConfig::from_file(Path::new("/nonexistent/trawl.json")).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
