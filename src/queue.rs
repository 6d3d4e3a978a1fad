//! Rate-limited FIFO request queue
//!
//! Serializes outgoing network calls through a background drain task using
//! tokio channels, enforcing a calls-per-window budget. Jobs over budget are
//! delayed until the window resets, never dropped, and a fixed inter-request
//! delay is applied between consecutive jobs to smooth bursts that fit inside
//! the budget.
//!
//! The queue makes no decisions about job outcomes: a job's error passes back
//! to its submitter unmodified, and a failing job never stalls the jobs behind
//! it. Retry policy, if any, belongs to the caller.

use std::future::Future;

use futures::future::BoxFuture;
use log::{debug, warn};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, sleep_until, Instant};

use crate::config::RateLimitConfig;

/// A queued unit of work with its completion channel already bound
type QueuedJob = BoxFuture<'static, ()>;

/// Errors the queue itself can produce
///
/// Job errors are not represented here; they flow back through [`RequestQueue::add`]
/// inside the job's own output type.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The drain task is gone, so the job can never run
    #[error("request queue is closed")]
    Closed,
}

/// FIFO queue that starts at most `max_requests` jobs per rate window
///
/// Each queue owns one background drain task, spawned at construction (a tokio
/// runtime must be running). Jobs execute strictly in submission order, one at
/// a time. Cloning is not provided; share a queue between clients behind an
/// `Arc` so the rate budget's scope is an explicit decision at the
/// composition root.
#[derive(Debug)]
pub struct RequestQueue {
    jobs: mpsc::UnboundedSender<QueuedJob>,
}

impl RequestQueue {
    /// Creates a queue and spawns its drain task
    pub fn new(config: RateLimitConfig) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        tokio::spawn(drain(jobs_rx, config));
        Self { jobs: jobs_tx }
    }

    /// Submits a task and resolves with the task's own output once it has run
    ///
    /// The output passes through untouched: when `T` is a `Result`, a task
    /// failure comes back as that same `Err`, and the queue moves on to the
    /// next job regardless. There is no cancellation; once accepted, the task
    /// runs to settlement even if the returned future is dropped.
    pub async fn add<F, T>(&self, task: F) -> Result<T, QueueError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: QueuedJob = Box::pin(async move {
            let output = task.await;
            // The submitter may have dropped the receiver; the task still ran
            let _ = done_tx.send(output);
        });
        self.jobs.send(job).map_err(|_| QueueError::Closed)?;
        done_rx.await.map_err(|_| QueueError::Closed)
    }
}

/// Drain loop: blocked on `recv` while idle, throttled while over budget
async fn drain(mut jobs: mpsc::UnboundedReceiver<QueuedJob>, config: RateLimitConfig) {
    let mut started: u32 = 0;
    let mut window_reset = Instant::now() + config.window;

    while let Some(job) = jobs.recv().await {
        if Instant::now() >= window_reset {
            started = 0;
            window_reset = Instant::now() + config.window;
        }
        while started >= config.max_requests {
            warn!(
                "rate budget of {} reached; delaying next request {:?}",
                config.max_requests,
                window_reset.saturating_duration_since(Instant::now())
            );
            sleep_until(window_reset).await;
            // Re-check: the window rolled over while we slept
            if Instant::now() >= window_reset {
                started = 0;
                window_reset = Instant::now() + config.window;
            }
        }

        started += 1;
        job.await;
        sleep(config.spacing).await;
    }
    debug!("request queue closed");
}
