use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use clap::builder::PossibleValuesParser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use trawl_client::{CsvSink, ReqwestFetcher, SmtpNotifier};
use trawl_core::traits::{Fetcher, Notifier, RecordSink};
use trawl_core::{CrawlConfig, CrawlJob, JobReport, Schedule, ScrapeMode, Scheduler, TracingSchedulerReporter};
use trawl_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "trawl", version, about = "Periodic scraper for research listing sites")]
struct Cli {
    /// Search query sent to every configured site
    #[arg(short, long, required_unless_present = "check_db")]
    query: Option<String>,

    /// Default mode for site entries that do not set one
    #[arg(
        short,
        long,
        value_parser = PossibleValuesParser::new(["images", "datasets"]),
        required_unless_present = "check_db"
    )]
    mode: Option<String>,

    /// Maximum records per site and query
    #[arg(short, long, default_value_t = 100)]
    limit: usize,

    /// How often to repeat the crawl after the first run
    #[arg(
        short,
        long,
        value_parser = PossibleValuesParser::new(["daily", "weekly"]),
        default_value = "weekly"
    )]
    schedule: String,

    /// Path to the JSON configuration file
    #[arg(short, long, env = "TRAWL_CONFIG", default_value = "config/config.json")]
    config: PathBuf,

    /// Run a single crawl and exit
    #[arg(long, default_value_t = false)]
    once: bool,

    /// Apply database migrations before crawling
    #[arg(long, default_value_t = false)]
    migrate: bool,

    /// Check database connectivity and exit
    #[arg(long, default_value_t = false)]
    check_db: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = CrawlConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config.display()))?;

    init_tracing(&config.log_filename)?;

    let db = Database::new(DatabaseConfig::resolve(config.db.as_ref())?);

    if cli.check_db {
        db.probe().await.context("Database connectivity check failed")?;
        println!("Database connection successful");
        return Ok(());
    }

    // Both are enforced by clap unless --check-db was given.
    let query = cli.query.context("--query is required")?;
    let mode: ScrapeMode = cli
        .mode
        .context("--mode is required")?
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let schedule: Schedule = cli.schedule.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let config = config.with_queries(vec![query]);
    let plan = config.plan(mode, cli.limit)?;

    if cli.migrate {
        db.migrate().await.context("Failed to apply migrations")?;
        tracing::info!("Migrations applied");
    }

    let fetcher = ReqwestFetcher::new().context("Failed to create HTTP client")?;
    let job = CrawlJob::new(
        fetcher,
        plan,
        CsvSink::new(&config.csv_filename),
        db.record_repo(),
    );

    match config.notifications()? {
        Some(email) => {
            let notifier = SmtpNotifier::new(email).context("Invalid email_notifications")?;
            drive(job.with_notifier(notifier), schedule, cli.once).await
        }
        None => drive(job, schedule, cli.once).await,
    }
}

/// Run the job now, then on `schedule` until Ctrl-C unless `once` is set.
async fn drive<F, FS, TS, N>(job: CrawlJob<F, FS, TS, N>, schedule: Schedule, once: bool) -> Result<()>
where
    F: Fetcher,
    FS: RecordSink,
    TS: RecordSink,
    N: Notifier,
{
    let plan = job.plan();
    tracing::info!(
        sites = plan.sites.len(),
        queries = plan.queries.len(),
        limit = plan.per_query_limit,
        %schedule,
        "Starting crawl"
    );

    print_report(&job.run().await);

    if once {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    let job = &job;
    let mut scheduler = Scheduler::new(schedule, Utc::now());
    scheduler
        .run(cancel, &TracingSchedulerReporter, move || async move {
            print_report(&job.run().await);
        })
        .await;

    Ok(())
}

fn print_report(report: &JobReport) {
    println!(
        "[{}] run {}: {} records, csv: {}, database: {}{}",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.run_id,
        report.records,
        report.file,
        report.table,
        if report.notified { ", notified" } else { "" },
    );
}

/// Log to stderr and, without colors, to the configured log file.
fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("trawl=info".parse()?))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}

async fn shutdown_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
    cancel.cancel();
}
