//! Dispatch loop
//!
//! The single background task that matches queued messages against
//! registered receivers. While both exist it pops one message per iteration,
//! wraps it in a `Job` with a copy of the receiver table, and submits it to
//! the bounded job channel. A full channel suspends the loop until a worker
//! takes a job, which is the only backpressure in the system.
//!
//! When there is nothing to do the loop parks on the broker's wake-up signal
//! (raised by enqueue and receiver registration) with a bounded idle timeout
//! as fallback. Cancellation is only observed between iterations, so a
//! message that has been popped is always submitted before the loop exits.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::broker::Broker;
use crate::broker::job::Job;

/// Build the next job if a message is queued and a receiver is registered.
///
/// The receiver snapshot used for the readiness check is the one attached to
/// the job, so a job never goes out with an empty destination table.
pub fn take_job(broker: &Broker) -> Option<Job> {
    let destinations = broker.registry().receivers();
    if destinations.is_empty() || broker.queue().is_empty() {
        return None;
    }

    let message = match broker.queue().pop() {
        Ok(message) => message,
        Err(e) => {
            debug!("queue drained between check and pop: {e}");
            return None;
        }
    };

    Some(Job {
        id: broker.next_job_id(),
        message,
        destinations,
    })
}

/// Run until `cancel` fires or every worker has gone away.
pub async fn run(broker: Arc<Broker>, jobs: mpsc::Sender<Job>, cancel: CancellationToken) {
    let idle = broker.settings().idle_poll();
    info!(idle_ms = idle.as_millis() as u64, "dispatch loop started");

    while !cancel.is_cancelled() {
        let Some(job) = take_job(&broker) else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = broker.wakeup().notified() => {}
                _ = tokio::time::sleep(idle) => {}
            }
            continue;
        };

        let job_id = job.id;
        let destinations = job.destinations.len();
        let waited_ms = job.message.waited_ms();

        if let Err(mpsc::error::SendError(job)) = jobs.send(job).await {
            error!(
                job_id,
                bytes = job.message.payload.len(),
                "job channel closed, message dropped; stopping dispatch"
            );
            break;
        }

        let completed = broker.record_submitted();
        debug!(job_id, destinations, waited_ms, completed, "job submitted");
    }

    info!("dispatch loop stopped");
}
