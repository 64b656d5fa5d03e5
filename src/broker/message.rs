//! Message definitions for the broker
//!
//! A `Message` is the opaque payload a sender enqueued. The broker never looks
//! inside `payload`; it is delivered to receivers byte for byte as the body of
//! an HTTP POST.
//!
//! `enqueued_at` is milliseconds since the UNIX epoch, stamped by the broker
//! on enqueue. It is only used to report how long a message waited before
//! dispatch and carries no identity.

use chrono::Utc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub payload: String,
    pub enqueued_at: i64,
}

impl Message {
    /// Wrap a payload, stamping the current time.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            enqueued_at: Utc::now().timestamp_millis(),
        }
    }

    /// Milliseconds elapsed since the message was enqueued.
    pub fn waited_ms(&self) -> i64 {
        Utc::now().timestamp_millis() - self.enqueued_at
    }
}
