use async_trait::async_trait;
use thiserror::Error;

use crate::relay::message::WebhookMessage;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook returned {status}")]
    Status { status: u16 },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Outbound destination for rendered messages. The destination address is
/// opaque to the relay; faked in tests.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn deliver(
        &self,
        destination: &str,
        message: &WebhookMessage,
    ) -> Result<(), DeliveryError>;
}

/// Delivers messages with a JSON POST to the destination URL.
pub struct WebhookSink {
    http: reqwest::Client,
}

impl WebhookSink {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Sink for WebhookSink {
    async fn deliver(
        &self,
        destination: &str,
        message: &WebhookMessage,
    ) -> Result<(), DeliveryError> {
        let response = self.http.post(destination).json(message).send().await?;

        if !response.status().is_success() {
            return Err(DeliveryError::Status {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
