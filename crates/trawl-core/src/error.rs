use thiserror::Error;

/// Application-wide error types for trawl.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// HTTP request failed or returned a non-2xx status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Markup could not be parsed into records.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Writing the delimited output file failed.
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Sending the completion email failed.
    #[error("Notification error: {0}")]
    NotificationError(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Coarse category used as a structured logging field.
    pub fn category(&self) -> &'static str {
        match self {
            AppError::HttpError(_) | AppError::NetworkError(_) => "fetch",
            AppError::ParseError(_) => "parse",
            AppError::CsvError(_) | AppError::DatabaseError(_) => "storage",
            AppError::NotificationError(_) => "notify",
            AppError::ConfigError(_) => "config",
        }
    }

    /// Returns true if the error happened while retrieving a page.
    pub fn is_fetch_error(&self) -> bool {
        self.category() == "fetch"
    }
}
