use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::Aggregator;
use crate::error::AppError;
use crate::models::{CrawlPlan, Record};
use crate::traits::{Fetcher, Notifier, NullNotifier, RecordSink};

pub const NOTIFICATION_SUBJECT: &str = "Scraping Completed";

/// What happened to a batch at one sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// The batch was empty; the sink was not called.
    Skipped,
    Written(u64),
    Failed(AppError),
}

impl SinkOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, SinkOutcome::Failed(_))
    }
}

impl fmt::Display for SinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkOutcome::Skipped => write!(f, "skipped"),
            SinkOutcome::Written(rows) => write!(f, "{rows} rows"),
            SinkOutcome::Failed(e) => write!(f, "failed ({e})"),
        }
    }
}

/// Outcome of one crawl job run.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: usize,
    pub file: SinkOutcome,
    pub table: SinkOutcome,
    pub notified: bool,
}

impl JobReport {
    /// True when any sink failed to store the batch.
    pub fn has_errors(&self) -> bool {
        self.file.is_failed() || self.table.is_failed()
    }

    /// Plain-text body of the completion email.
    pub fn summary(&self) -> String {
        let headline = if self.has_errors() {
            "The scraping task has completed with errors."
        } else {
            "The scraping task has completed successfully."
        };
        format!(
            "{}\n\n\
             Run: {}\nStarted: {}\nFinished: {}\nRecords: {}\nFile: {}\nDatabase: {}\n",
            headline,
            self.run_id,
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.records,
            self.file,
            self.table,
        )
    }
}

/// One scheduled unit of work: aggregate the plan, persist the batch to the
/// file and table sinks, then notify.
///
/// Generic over all external dependencies via traits, enabling dependency
/// injection and testability without real HTTP, disk, database or SMTP.
pub struct CrawlJob<F, FS, TS, N = NullNotifier>
where
    F: Fetcher,
    FS: RecordSink,
    TS: RecordSink,
    N: Notifier,
{
    aggregator: Aggregator<F>,
    plan: CrawlPlan,
    file_sink: FS,
    table_sink: TS,
    notifier: Option<N>,
}

impl<F, FS, TS> CrawlJob<F, FS, TS, NullNotifier>
where
    F: Fetcher,
    FS: RecordSink,
    TS: RecordSink,
{
    /// Create a job without email notifications.
    pub fn new(fetcher: F, plan: CrawlPlan, file_sink: FS, table_sink: TS) -> Self {
        Self {
            aggregator: Aggregator::new(fetcher),
            plan,
            file_sink,
            table_sink,
            notifier: None,
        }
    }

    /// Attach a notifier that is called after every non-empty run.
    pub fn with_notifier<N: Notifier>(self, notifier: N) -> CrawlJob<F, FS, TS, N> {
        CrawlJob {
            aggregator: self.aggregator,
            plan: self.plan,
            file_sink: self.file_sink,
            table_sink: self.table_sink,
            notifier: Some(notifier),
        }
    }
}

impl<F, FS, TS, N> CrawlJob<F, FS, TS, N>
where
    F: Fetcher,
    FS: RecordSink,
    TS: RecordSink,
    N: Notifier,
{
    pub fn plan(&self) -> &CrawlPlan {
        &self.plan
    }

    /// Run the job once. Never fails: every error is logged and reported.
    pub async fn run(&self) -> JobReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%run_id, pairs = self.plan.pair_count(), "Job started");

        let batch = self.aggregator.collect(&self.plan).await;

        let mut report = JobReport {
            run_id,
            started_at,
            finished_at: started_at,
            records: batch.len(),
            file: SinkOutcome::Skipped,
            table: SinkOutcome::Skipped,
            notified: false,
        };

        if batch.is_empty() {
            tracing::warn!(%run_id, "No records scraped; skipping sinks");
            report.finished_at = Utc::now();
            return report;
        }

        report.file = write_to(&self.file_sink, &batch).await;
        report.table = write_to(&self.table_sink, &batch).await;
        report.finished_at = Utc::now();

        if let Some(notifier) = &self.notifier {
            match notifier.notify(NOTIFICATION_SUBJECT, &report.summary()).await {
                Ok(()) => {
                    tracing::info!(%run_id, "Completion notification sent");
                    report.notified = true;
                }
                Err(e) => {
                    tracing::error!(%run_id, error = %e, "Failed to send notification");
                }
            }
        }

        tracing::info!(
            %run_id,
            records = report.records,
            file = %report.file,
            table = %report.table,
            "Job completed"
        );
        report
    }
}

async fn write_to<S: RecordSink>(sink: &S, batch: &[Record]) -> SinkOutcome {
    match sink.write_batch(batch).await {
        Ok(rows) => {
            tracing::info!(sink = sink.name(), rows, "Batch saved");
            SinkOutcome::Written(rows)
        }
        Err(e) => {
            tracing::error!(sink = sink.name(), error = %e, "Error saving batch");
            SinkOutcome::Failed(e)
        }
    }
}
