//! Broker engine
//!
//! `Broker` owns the pending message queue, the connection registry, and the
//! job counters. It is shared as `Arc<Broker>` between the HTTP handlers, the
//! dispatch loop and anything reporting status; every method takes `&self`
//! and holds an internal lock only for the duration of the call, never
//! across network I/O.
//!
//! `Broker::start` spawns the delivery pipeline: one dispatch loop feeding a
//! bounded job channel drained by a fixed pool of workers. The returned
//! `BrokerRuntime` stops it again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::broker::dispatch;
use crate::broker::job::JobId;
use crate::broker::message::Message;
use crate::broker::queue::MessageQueue;
use crate::broker::registry::{Connection, ConnectionId, ConnectionRegistry, Role};
use crate::broker::worker::WorkerPool;
use crate::config::BrokerSettings;
use crate::delivery::Deliver;
use crate::utils::BrokerError;

/// Point-in-time counters for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrokerStats {
    pub queue_depth: usize,
    pub senders: usize,
    pub receivers: usize,
    pub completed_jobs: u64,
}

#[derive(Debug)]
pub struct Broker {
    queue: MessageQueue,
    registry: ConnectionRegistry,
    wakeup: Notify,
    last_job_id: AtomicU64,
    completed_jobs: AtomicU64,
    settings: BrokerSettings,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerSettings::default())
    }
}

impl Broker {
    pub fn new(settings: BrokerSettings) -> Self {
        Self {
            queue: MessageQueue::new(),
            registry: ConnectionRegistry::new(),
            wakeup: Notify::new(),
            last_job_id: AtomicU64::new(0),
            completed_jobs: AtomicU64::new(0),
            settings,
        }
    }

    /// Queue a payload for delivery to every receiver. Always succeeds.
    pub fn enqueue(&self, payload: impl Into<String>) {
        self.queue.add(Message::new(payload));
        self.wakeup.notify_one();
    }

    /// Register an endpoint from a wire-level mode string (`send` or `receive`).
    ///
    /// The mode is validated before anything is allocated, so a rejected
    /// registration leaves the id counter untouched.
    pub fn register_connection(&self, address: &str, mode: &str) -> Result<ConnectionId, BrokerError> {
        let role: Role = mode.parse()?;
        Ok(self.register(address, role))
    }

    pub fn register(&self, address: &str, role: Role) -> ConnectionId {
        let id = self.registry.add_connection(address, role);
        info!(id, address, role = %role, "connection registered");
        if role == Role::Receiver {
            self.wakeup.notify_one();
        }
        id
    }

    pub fn unregister_connection(&self, id: ConnectionId) -> Result<Connection, BrokerError> {
        let connection = self.registry.disconnect(id)?;
        info!(id, address = %connection.address, role = %connection.role, "connection removed");
        Ok(connection)
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn sender_count(&self) -> usize {
        self.registry.sender_count()
    }

    pub fn receiver_count(&self) -> usize {
        self.registry.receiver_count()
    }

    /// Number of jobs handed to the worker pool so far.
    pub fn completed_job_count(&self) -> u64 {
        self.completed_jobs.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            queue_depth: self.queue_depth(),
            senders: self.sender_count(),
            receivers: self.receiver_count(),
            completed_jobs: self.completed_job_count(),
        }
    }

    pub fn queue(&self) -> &MessageQueue {
        &self.queue
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    pub(crate) fn wakeup(&self) -> &Notify {
        &self.wakeup
    }

    pub(crate) fn next_job_id(&self) -> JobId {
        self.last_job_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn record_submitted(&self) -> u64 {
        self.completed_jobs.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Spawn the dispatch loop and worker pool on the current tokio runtime.
    pub fn start(self: &Arc<Self>, deliverer: Arc<dyn Deliver>) -> BrokerRuntime {
        let (jobs_tx, jobs_rx) = mpsc::channel(self.settings.job_buffer.max(1));
        let cancel = CancellationToken::new();

        let workers = WorkerPool::spawn(
            self.settings.workers,
            jobs_rx,
            deliverer,
            self.settings.delivery_timeout(),
        );
        let dispatcher = tokio::spawn(dispatch::run(self.clone(), jobs_tx, cancel.clone()));

        info!(
            workers = workers.len(),
            job_buffer = self.settings.job_buffer,
            "delivery pipeline started"
        );

        BrokerRuntime {
            cancel,
            dispatcher,
            workers,
        }
    }
}

/// Handle on a running delivery pipeline.
#[derive(Debug)]
pub struct BrokerRuntime {
    cancel: CancellationToken,
    dispatcher: JoinHandle<()>,
    workers: WorkerPool,
}

impl BrokerRuntime {
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stop dispatching, let the workers finish every submitted job, and wait
    /// for all tasks to exit. Messages still queued stay in the queue.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.dispatcher.await {
            error!("dispatch loop failed: {e}");
        }
        self.workers.join().await;
        info!("delivery pipeline stopped");
    }
}
