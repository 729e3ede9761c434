//! Calendar scheduling for the recurring crawl job.
//!
//! A [`Scheduler`] owns exactly one recurring job. Its loop wakes up every
//! `poll_interval`, runs the job inline when it is due, and computes the
//! next due time from the moment the run finished. Nothing is persisted, so
//! a restart starts a fresh period from process start.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio_util::sync::CancellationToken;

/// How often the crawl job recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    Weekly,
}

impl Schedule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Schedule::Daily => "daily",
            Schedule::Weekly => "weekly",
        }
    }

    pub fn period(&self) -> TimeDelta {
        match self {
            Schedule::Daily => TimeDelta::days(1),
            Schedule::Weekly => TimeDelta::weeks(1),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Schedule::Daily),
            "weekly" => Ok(Schedule::Weekly),
            _ => Err(format!("Unknown schedule: {}", s)),
        }
    }
}

/// Events emitted by the scheduler for monitoring/logging.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    Started {
        schedule: Schedule,
        next_run: DateTime<Utc>,
    },
    JobStarted {
        run: u64,
    },
    JobFinished {
        run: u64,
        next_run: DateTime<Utc>,
    },
    Stopped {
        runs: u64,
    },
}

/// Trait for receiving scheduler events (decoupled logging).
pub trait SchedulerReporter: Send + Sync {
    fn report(&self, event: SchedulerEvent) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSchedulerReporter;

impl SchedulerReporter for TracingSchedulerReporter {
    fn report(&self, event: SchedulerEvent) {
        match event {
            SchedulerEvent::Started { schedule, next_run } => {
                tracing::info!(%schedule, %next_run, "Scheduler started");
            }
            SchedulerEvent::JobStarted { run } => {
                tracing::info!(run, "Scheduled job due");
            }
            SchedulerEvent::JobFinished { run, next_run } => {
                tracing::info!(run, %next_run, "Scheduled job finished");
            }
            SchedulerEvent::Stopped { runs } => {
                tracing::info!(runs, "Scheduler stopped");
            }
        }
    }
}

/// Single recurring job on a fixed calendar period.
#[derive(Debug, Clone)]
pub struct Scheduler {
    schedule: Schedule,
    next_run: DateTime<Utc>,
    poll_interval: Duration,
    runs: u64,
}

impl Scheduler {
    /// Register the job; the first run is one period after `now`.
    pub fn new(schedule: Schedule, now: DateTime<Utc>) -> Self {
        Self::starting_at(schedule, now + schedule.period())
    }

    /// Register the job with an explicit first due time.
    pub fn starting_at(schedule: Schedule, next_run: DateTime<Utc>) -> Self {
        Self {
            schedule,
            next_run,
            poll_interval: Duration::from_secs(1),
            runs: 0,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn next_run(&self) -> DateTime<Utc> {
        self.next_run
    }

    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_run
    }

    /// Record a finished run and move the due time one period past `finished_at`.
    pub fn mark_run(&mut self, finished_at: DateTime<Utc>) {
        self.runs += 1;
        self.next_run = finished_at + self.schedule.period();
    }

    /// Poll until cancellation, running `job` inline whenever it is due.
    pub async fn run<J, Fut, R>(&mut self, cancel_token: CancellationToken, reporter: &R, mut job: J)
    where
        J: FnMut() -> Fut,
        Fut: Future<Output = ()>,
        R: SchedulerReporter,
    {
        reporter.report(SchedulerEvent::Started {
            schedule: self.schedule,
            next_run: self.next_run,
        });

        loop {
            if cancel_token.is_cancelled() {
                break;
            }

            if self.is_due(Utc::now()) {
                reporter.report(SchedulerEvent::JobStarted {
                    run: self.runs + 1,
                });
                job().await;
                self.mark_run(Utc::now());
                reporter.report(SchedulerEvent::JobFinished {
                    run: self.runs,
                    next_run: self.next_run,
                });
                continue;
            }

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                () = cancel_token.cancelled() => break,
            }
        }

        reporter.report(SchedulerEvent::Stopped { runs: self.runs });
    }
}
