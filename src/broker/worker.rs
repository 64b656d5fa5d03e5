//! Worker pool
//!
//! A fixed set of tasks competing for jobs on the shared job channel. Each
//! job lands on exactly one worker, which attempts delivery to every
//! destination in id order. Every attempt is bounded by the delivery timeout
//! and its failure is logged and skipped: one bad receiver never holds back
//! the rest of the job, the worker, or any other worker.
//!
//! Workers exit once the channel is closed and drained, which is how a
//! shutdown flushes already-submitted jobs.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::broker::job::Job;
use crate::delivery::Deliver;
use crate::utils::DeliveryError;

pub type SharedJobs = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Delivery tally for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers (at least one) on the current runtime.
    pub fn spawn(
        count: usize,
        jobs: mpsc::Receiver<Job>,
        deliverer: Arc<dyn Deliver>,
        timeout: Duration,
    ) -> Self {
        let jobs: SharedJobs = Arc::new(Mutex::new(jobs));
        let handles = (0..count.max(1))
            .map(|worker_id| tokio::spawn(run(worker_id, jobs.clone(), deliverer.clone(), timeout)))
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to drain the channel and exit.
    pub async fn join(self) {
        for result in join_all(self.handles).await {
            if let Err(e) = result {
                error!("worker task failed: {e}");
            }
        }
    }
}

/// Pull jobs until the channel is closed and empty.
pub async fn run(worker_id: usize, jobs: SharedJobs, deliverer: Arc<dyn Deliver>, timeout: Duration) {
    debug!(worker_id, "worker started");
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else { break };
        deliver_job(worker_id, &job, deliverer.as_ref(), timeout).await;
    }
    debug!(worker_id, "worker stopped");
}

/// Attempt delivery of `job` to each of its destinations once.
pub async fn deliver_job(
    worker_id: usize,
    job: &Job,
    deliverer: &dyn Deliver,
    timeout: Duration,
) -> JobReport {
    let mut report = JobReport::default();

    for (&destination_id, address) in &job.destinations {
        let attempt = tokio::time::timeout(timeout, deliverer.deliver(address, &job.message.payload));
        let outcome = match attempt.await {
            Ok(outcome) => outcome,
            Err(_) => Err(DeliveryError::Timeout(timeout)),
        };

        match outcome {
            Ok(receipt) => {
                report.delivered += 1;
                info!(
                    worker_id,
                    job_id = job.id,
                    destination_id,
                    address = %address,
                    status = receipt.status,
                    response = %receipt.summary(),
                    "message delivered"
                );
            }
            Err(e) => {
                report.failed += 1;
                warn!(
                    worker_id,
                    job_id = job.id,
                    destination_id,
                    address = %address,
                    "delivery failed: {e}"
                );
            }
        }
    }

    debug!(
        worker_id,
        job_id = job.id,
        delivered = report.delivered,
        failed = report.failed,
        "job finished"
    );
    report
}
