//! HTTP client for Store A, the scheduler's running-instance store.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use statesync_id::{AppGuid, ProcessGuid};
use statesync_models::{RunningProcessRecord, RunningProcessUpdate};
use statesync_reconcile::DomainToken;
use tracing::debug;

use super::http::{build_client, check_status};
use super::SchedulerStore;
use crate::error::StoreResult;

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<RunningProcessRecord>,
}

/// Client for the scheduler's record API.
pub struct HttpSchedulerStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSchedulerStore {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout, token)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SchedulerStore for HttpSchedulerStore {
    async fn records(&self, filter: Option<&AppGuid>) -> StoreResult<Vec<RunningProcessRecord>> {
        let url = format!("{}/v1/records", self.base_url);

        let mut request = self.client.get(&url);
        if let Some(app_guid) = filter {
            request = request.query(&[("app_guid", app_guid.to_string())]);
        }

        let resp = check_status(request.send().await?).await?;
        let body: RecordsResponse = resp.json().await?;

        debug!(count = body.records.len(), "Fetched running-process records");
        Ok(body.records)
    }

    async fn record_by_guid(
        &self,
        guid: &ProcessGuid,
    ) -> StoreResult<Option<RunningProcessRecord>> {
        let url = format!("{}/v1/records/{}", self.base_url, guid);

        let resp = self.client.get(&url).send().await?;
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }

        let resp = check_status(resp).await?;
        Ok(Some(resp.json().await?))
    }

    async fn create(&self, record: &RunningProcessRecord) -> StoreResult<()> {
        let url = format!("{}/v1/records", self.base_url);
        let resp = self.client.post(&url).json(record).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn update(&self, guid: &ProcessGuid, update: &RunningProcessUpdate) -> StoreResult<()> {
        let url = format!("{}/v1/records/{}", self.base_url, guid);
        let resp = self.client.put(&url).json(update).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete(&self, guid: &ProcessGuid) -> StoreResult<()> {
        let url = format!("{}/v1/records/{}", self.base_url, guid);
        let resp = self.client.delete(&url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn bump_domain(&self, token: &DomainToken) -> StoreResult<()> {
        let url = format!("{}/v1/domains/{}", self.base_url, token.name());
        let resp = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "epoch": token.epoch() }))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }
}
