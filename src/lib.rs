//! # relaymq
//!
//! `relaymq` is a minimal in-memory message broker. Endpoints register as
//! senders or receivers, senders enqueue payloads, and a background pipeline
//! POSTs every queued message to every receiver registered at dispatch time.
//!
//! ## Core Modules
//!
//! - `broker`: the queue, the connection registry, the dispatch loop and the
//!   worker pool, tied together by `Broker`.
//! - `delivery`: the outbound side; `Deliver` and its HTTP implementation.
//! - `config`: loading and merging server and pipeline settings.
//! - `transport`: the HTTP adapter translating requests into broker calls.
//! - `utils`: error types and logging setup.
//!
//! Delivery is best effort: one attempt per receiver per message, nothing is
//! persisted, and a message popped for dispatch is never re-queued.

pub mod broker;
pub mod config;
pub mod delivery;
pub mod transport;
pub mod utils;

pub use broker::{Broker, BrokerRuntime, BrokerStats};
