pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod job;
pub mod models;
pub mod schedule;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use aggregate::Aggregator;
pub use config::CrawlConfig;
pub use error::AppError;
pub use extract::SiteKind;
pub use job::{CrawlJob, JobReport, SinkOutcome};
pub use models::{CrawlPlan, Record, RecordField, ScrapeMode, SiteConfig};
pub use schedule::{Schedule, Scheduler, TracingSchedulerReporter};
pub use traits::{Fetcher, Notifier, NullNotifier, RecordSink, SiteExtractor};
