use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use model::{Ack, TrainingTriplet, WeightBundle};
use reqwest::{Client, StatusCode};

/// HTTP access to a coordinator. Every call is bounded by its timeout.
#[derive(Clone, Debug)]
pub struct CoordinatorClient {
    client: Client,
    base_url: String,
    fetch_timeout: Duration,
    report_timeout: Duration,
}

impl CoordinatorClient {
    pub fn new(base_url: &str, fetch_timeout: Duration, report_timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            fetch_timeout,
            report_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The latest bundle, or `None` when the coordinator has not persisted any weights yet.
    pub async fn fetch_weights(&self) -> Result<Option<WeightBundle>> {
        let url = format!("{}/weights", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.error_for_status()?.bytes().await?;
        let bundle = WeightBundle::from_slice(&body)?;

        debug!("Fetched weights version {} from {}", bundle.version, url);

        Ok(Some(bundle))
    }

    pub async fn report_triplets(&self, triplets: &[TrainingTriplet]) -> Result<Ack> {
        let url = format!("{}/triplets", self.base_url);
        let ack = self
            .client
            .post(&url)
            .timeout(self.report_timeout)
            .json(triplets)
            .send()
            .await
            .with_context(|| format!("Failed to post to {}", url))?
            .error_for_status()?
            .json::<Ack>()
            .await?;

        Ok(ack)
    }
}
