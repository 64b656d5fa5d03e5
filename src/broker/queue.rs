//! Pending message queue
//!
//! A strict FIFO shared by the HTTP handlers (producers) and the dispatch loop
//! (sole consumer). Every operation takes the same lock for its whole critical
//! section, so the sequence of adds and pops is linearizable. `pop` never
//! waits for an item; callers check `len` first and treat `EmptyQueue` as a
//! no-op.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::broker::message::Message;
use crate::utils::BrokerError;

#[derive(Debug, Default)]
pub struct MessageQueue {
    items: Mutex<VecDeque<Message>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the tail. Unbounded.
    pub fn add(&self, message: Message) {
        self.items.lock().push_back(message);
    }

    /// Remove and return the earliest remaining message.
    pub fn pop(&self) -> Result<Message, BrokerError> {
        self.items.lock().pop_front().ok_or(BrokerError::EmptyQueue)
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
