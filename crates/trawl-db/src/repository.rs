use chrono::{DateTime, Utc};
use trawl_core::error::AppError;
use trawl_core::models::{NOT_AVAILABLE, Record};
use trawl_core::traits::RecordSink;

use crate::database::{Database, close};

/// A record as persisted, with its row id and insertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub record: Record,
    pub scraped_at: DateTime<Utc>,
}

/// Repository for scraped records in PostgreSQL.
///
/// A batch is inserted in a single transaction. Rows whose `url` already
/// exists are skipped, so re-running a job never duplicates data. Records
/// without a link share the `N/A` url, so only the first of them is kept.
#[derive(Debug, Clone)]
pub struct RecordRepository {
    db: Database,
}

impl RecordRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a batch. Returns the number of rows actually inserted.
    pub async fn insert_batch(&self, records: &[Record]) -> Result<u64, AppError> {
        let mut conn = self.db.connect().await?;
        let result = insert_all(&mut conn, records).await;
        close(conn).await;
        result
    }

    /// Total number of stored records.
    pub async fn count(&self) -> Result<i64, AppError> {
        let mut conn = self.db.connect().await?;
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM records")
            .fetch_one(&mut conn)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()));
        close(conn).await;
        result
    }

    /// Look up a stored record by its url.
    pub async fn find_by_url(&self, url: &str) -> Result<Option<StoredRecord>, AppError> {
        let mut conn = self.db.connect().await?;
        let result = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, query, title, authors, abstract, url, size, format, scraped_at
            FROM records
            WHERE url = $1
            "#,
        )
        .bind(url)
        .fetch_optional(&mut conn)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()));
        close(conn).await;

        Ok(result?.map(Into::into))
    }
}

async fn insert_all(conn: &mut sqlx::PgConnection, records: &[Record]) -> Result<u64, AppError> {
    use sqlx::Connection;

    let mut tx = conn
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

    let mut inserted = 0;
    for record in records {
        let result = sqlx::query(
            r#"
            INSERT INTO records (query, title, authors, abstract, url, size, format)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(&record.query)
        .bind(&record.title)
        .bind(&record.authors)
        .bind(&record.abstract_text)
        .bind(&record.url)
        .bind(&record.size)
        .bind(&record.format)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Insert failed for {}: {e}", record.url)))?;

        if result.rows_affected() == 0 {
            if record.url == NOT_AVAILABLE {
                tracing::warn!(
                    query = %record.query,
                    title = %record.title,
                    "Record without a link dropped: an N/A url is already stored"
                );
            } else {
                tracing::debug!(url = %record.url, "Record already stored");
            }
        }
        inserted += result.rows_affected();
    }

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(format!("Commit failed: {e}")))?;

    Ok(inserted)
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    query: String,
    title: String,
    authors: Option<String>,
    #[sqlx(rename = "abstract")]
    abstract_text: Option<String>,
    url: String,
    size: Option<String>,
    format: Option<String>,
    scraped_at: DateTime<Utc>,
}

impl From<RecordRow> for StoredRecord {
    fn from(row: RecordRow) -> Self {
        StoredRecord {
            id: row.id,
            record: Record {
                query: row.query,
                title: row.title,
                authors: row.authors,
                abstract_text: row.abstract_text,
                url: row.url,
                size: row.size,
                format: row.format,
            },
            scraped_at: row.scraped_at,
        }
    }
}

// -- Trait implementation --

impl RecordSink for RecordRepository {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn write_batch(&self, records: &[Record]) -> Result<u64, AppError> {
        let inserted = self.insert_batch(records).await?;
        tracing::info!(
            rows = records.len(),
            inserted,
            skipped = (records.len() as u64).saturating_sub(inserted),
            "Data saved to database"
        );
        Ok(inserted)
    }
}
