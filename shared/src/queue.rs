//! SQS publishing of trimmed weather payloads.

use aws_sdk_sqs::Client as SqsClient;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::weather::SubWeatherData;
use crate::{Error, Result};

/// Serialize a weather payload into an SQS message body.
pub fn message_body(weather: &SubWeatherData) -> Result<String> {
    Ok(serde_json::to_string(weather)?)
}

/// Publishes weather payloads to a named queue.
pub struct WeatherPublisher {
    client: SqsClient,
    queue_name: String,
    queue_url: OnceCell<String>,
}

impl WeatherPublisher {
    /// Create a publisher for the given queue name.
    pub fn new(client: SqsClient, queue_name: String) -> Self {
        Self {
            client,
            queue_name,
            queue_url: OnceCell::new(),
        }
    }

    /// Resolve the queue URL once per publisher.
    async fn queue_url(&self) -> Result<&str> {
        let url = self
            .queue_url
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get_queue_url()
                    .queue_name(&self.queue_name)
                    .send()
                    .await
                    .map_err(|e| {
                        error!(
                            queue = %self.queue_name,
                            error = %e,
                            "Retrieving the queue URL failed"
                        );
                        Error::Aws(format!("Failed to get queue URL: {}", e))
                    })?;

                response
                    .queue_url()
                    .map(str::to_string)
                    .ok_or_else(|| Error::Aws(format!("Queue {} has no URL", self.queue_name)))
            })
            .await?;

        Ok(url.as_str())
    }

    /// Publish a weather payload, returning the SQS message id.
    pub async fn publish(&self, weather: &SubWeatherData) -> Result<String> {
        info!(queue = %self.queue_name, city = %weather.name, "Publishing to SQS");

        let queue_url = self.queue_url().await?;
        let body = message_body(weather)?;

        let response = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| {
                error!(queue = %self.queue_name, error = %e, "Publishing to SQS failed");
                Error::Aws(format!("Failed to send message: {}", e))
            })?;

        let message_id = response.message_id().unwrap_or_default().to_string();
        info!(queue = %self.queue_name, message_id = %message_id, "Publishing to SQS successful");

        Ok(message_id)
    }
}
