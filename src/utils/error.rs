//! The `error` module defines the error types shared across `relaymq`.
//!
//! `BrokerError` covers the recoverable failures of the core operations and is
//! surfaced to HTTP callers by the transport layer. `DeliveryError` describes a
//! failed delivery attempt to a single destination; workers log it and move on.

use std::time::Duration;

use thiserror::Error;

/// Failures of the queue and connection registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// `pop` was called with nothing queued.
    #[error("cannot pop empty queue")]
    EmptyQueue,

    /// Registration used a mode other than `send` or `receive`.
    #[error("incorrect mode string {0:?}, expected \"send\" or \"receive\"")]
    InvalidRole(String),

    /// No sender or receiver holds this id.
    #[error("no such connection: {0}")]
    NotFound(u64),
}

/// A failed delivery of one message to one destination.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("destination answered {status}: {body}")]
    Rejected { status: u16, body: String },
}
