use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while delivering a notification
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned error status: {0}")]
    Status(reqwest::StatusCode),
}

/// Lifecycle events pushed to interested parties
///
/// Delivery is fire-and-forget: the lifecycle logs failures and never
/// lets them fail the triggering transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LifecycleEvent {
    #[serde(rename_all = "camelCase")]
    NewRequest {
        ride_id: Uuid,
        request_id: Uuid,
        rider_id: Uuid,
        driver_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Approved {
        ride_id: Uuid,
        request_id: Uuid,
        rider_id: Uuid,
    },
    #[serde(rename_all = "camelCase")]
    Rejected {
        ride_id: Uuid,
        request_id: Uuid,
        rider_id: Uuid,
    },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: LifecycleEvent) -> Result<(), NotifyError>;
}

/// Notifier that POSTs events as JSON to a configured webhook URL
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: LifecycleEvent) -> Result<(), NotifyError> {
        let response = self.client.post(&self.url).json(&event).send().await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status()));
        }

        tracing::debug!("Delivered lifecycle event to {}", self.url);
        Ok(())
    }
}

/// Notifier that only writes to the log; used when no webhook is
/// configured and in tests
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: LifecycleEvent) -> Result<(), NotifyError> {
        tracing::info!("Lifecycle event: {:?}", event);
        Ok(())
    }
}
