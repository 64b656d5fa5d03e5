//! The `delivery` module performs the outbound half of the broker: handing a
//! message payload to one receiver endpoint.
//!
//! Workers only see the [`Deliver`] trait, so the HTTP implementation can be
//! swapped for an in-process one in tests. An implementation reports a
//! [`DeliveryReceipt`] when the destination accepted the payload and a
//! [`DeliveryError`] for anything else; it never panics on remote behaviour.

pub mod http;

use async_trait::async_trait;

use crate::utils::DeliveryError;

pub use http::HttpDelivery;

/// What a destination answered to a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
    pub body: String,
}

impl DeliveryReceipt {
    /// The response body cut down for a log line.
    pub fn summary(&self) -> String {
        summarize(&self.body)
    }
}

/// Send one payload to one address.
#[async_trait]
pub trait Deliver: Send + Sync {
    async fn deliver(&self, address: &str, payload: &str) -> Result<DeliveryReceipt, DeliveryError>;
}

const SUMMARY_CHARS: usize = 100;

pub(crate) fn summarize(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() > SUMMARY_CHARS {
        let head: String = trimmed.chars().take(SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests;
