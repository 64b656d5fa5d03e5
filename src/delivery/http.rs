//! HTTP delivery
//!
//! POSTs the raw payload as `text/plain` to the receiver's registered
//! address and reads the whole response body. A 2xx answer is a receipt;
//! any other status is reported as `DeliveryError::Rejected` with the body
//! attached so the worker can log it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::{Deliver, DeliveryReceipt, summarize};
use crate::utils::DeliveryError;

#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: Client,
}

impl HttpDelivery {
    /// Build a client whose requests, body read included, give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Deliver for HttpDelivery {
    async fn deliver(&self, address: &str, payload: &str) -> Result<DeliveryReceipt, DeliveryError> {
        debug!(address, bytes = payload.len(), "posting message");

        let response = self
            .client
            .post(address)
            .header(CONTENT_TYPE, "text/plain")
            .body(payload.to_owned())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            Ok(DeliveryReceipt {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body: summarize(&body),
            })
        }
    }
}
