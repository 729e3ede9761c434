use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use trawl_core::AppError;
use trawl_core::config::DbSettings;

/// Connection parameters for the relational sink.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    options: PgConnectOptions,
}

impl DatabaseConfig {
    /// Build from the `db_config` section of the configuration file.
    pub fn from_settings(settings: &DbSettings) -> Self {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password);

        Self { options }
    }

    /// Parse a `postgres://` connection URL.
    pub fn from_url(url: &str) -> Result<Self, AppError> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| AppError::ConfigError(format!("Invalid database URL: {e}")))?;
        Ok(Self { options })
    }

    /// Connection URL from `DATABASE_URL`, `None` when the variable is unset.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        match std::env::var("DATABASE_URL") {
            Ok(url) => Self::from_url(&url).map(Some),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(AppError::ConfigError(format!("Unreadable DATABASE_URL: {e}"))),
        }
    }

    /// `DATABASE_URL` when set, otherwise the file's `db_config`.
    pub fn resolve(settings: Option<&DbSettings>) -> Result<Self, AppError> {
        Self::prefer(Self::from_env()?, settings)
    }

    fn prefer(from_env: Option<Self>, settings: Option<&DbSettings>) -> Result<Self, AppError> {
        match (from_env, settings) {
            (Some(config), _) => Ok(config),
            (None, Some(settings)) => Ok(Self::from_settings(settings)),
            (None, None) => Err(AppError::ConfigError(
                "No database configured: set DATABASE_URL or 'db_config'".into(),
            )),
        }
    }

    pub fn options(&self) -> &PgConnectOptions {
        &self.options
    }
}
