use anyhow::Context;
use async_trait::async_trait;

use super::{BookingJob, JobDispatcher};

/// Posts each job as JSON to the worker service that renders QR codes and
/// sends notifications.
pub struct WebhookDispatcher {
    url: String,
    client: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl JobDispatcher for WebhookDispatcher {
    async fn dispatch(&self, job: &BookingJob) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(job)
            .send()
            .await
            .context("failed to post booking job")?
            .error_for_status()
            .context("job webhook returned error")?;

        Ok(())
    }
}
