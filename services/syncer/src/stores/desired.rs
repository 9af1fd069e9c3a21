//! HTTP client for the desired-state authority.
//!
//! The authority's payloads are loosely typed JSON; they are mapped into
//! [`DesiredProcess`] here, at the boundary. A payload missing a required
//! field fails the whole read rather than defaulting to zero values — no
//! partial sweep runs against an incomplete desired set.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use statesync_id::{AppGuid, ProcessGuid};
use statesync_models::DesiredProcess;
use tracing::debug;

use super::http::{build_client, check_status};
use super::DesiredStateSource;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Deserialize)]
struct ProcessesResponse {
    processes: Vec<serde_json::Value>,
}

/// Read-only client for the desired-state authority's API.
pub struct HttpDesiredStateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDesiredStateSource {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout, token)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn decode(raw: serde_json::Value) -> StoreResult<DesiredProcess> {
        serde_json::from_value(raw)
            .map_err(|e| StoreError::Unexpected(format!("invalid desired process payload: {e}")))
    }
}

#[async_trait]
impl DesiredStateSource for HttpDesiredStateSource {
    async fn processes(&self, filter: Option<&AppGuid>) -> StoreResult<Vec<DesiredProcess>> {
        let url = format!("{}/v1/desired/processes", self.base_url);

        let mut request = self.client.get(&url);
        if let Some(app_guid) = filter {
            request = request.query(&[("app_guid", app_guid.to_string())]);
        }

        let resp = check_status(request.send().await?).await?;
        let body: ProcessesResponse = resp.json().await?;

        let mut processes = Vec::with_capacity(body.processes.len());
        for raw in body.processes {
            processes.push(Self::decode(raw)?);
        }

        debug!(count = processes.len(), "Fetched desired processes");
        Ok(processes)
    }

    async fn process_by_guid(&self, guid: &ProcessGuid) -> StoreResult<Option<DesiredProcess>> {
        let url = format!("{}/v1/desired/processes/{}", self.base_url, guid);

        let resp = self.client.get(&url).send().await?;
        if resp.status().as_u16() == 404 {
            return Ok(None);
        }

        let resp = check_status(resp).await?;
        let raw: serde_json::Value = resp.json().await?;
        Ok(Some(Self::decode(raw)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use statesync_id::{DropletGuid, VersionGuid};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn process_json(guid: &ProcessGuid, app: &AppGuid) -> serde_json::Value {
        serde_json::json!({
            "process_guid": guid.to_string(),
            "app_guid": app.to_string(),
            "instances": 2,
            "start_command": "bundle exec rackup",
            "droplet_guid": DropletGuid::new().to_string(),
            "annotation": "1700000000.0",
            "revision": 4,
            "started_at": Utc::now(),
            "routes": [],
        })
    }

    #[tokio::test]
    async fn test_processes_decodes_loose_json() {
        let server = MockServer::start().await;
        let app = AppGuid::new();
        let guid = ProcessGuid::from_parts(app, VersionGuid::new());

        Mock::given(method("GET"))
            .and(path("/v1/desired/processes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "processes": [process_json(&guid, &app)],
            })))
            .mount(&server)
            .await;

        let source =
            HttpDesiredStateSource::new(&server.uri(), None, Duration::from_secs(5)).unwrap();
        let processes = source.processes(None).await.unwrap();

        assert_eq!(processes.len(), 1);
        assert_eq!(processes[0].process_guid, guid);
        assert_eq!(processes[0].instances, 2);
    }

    #[tokio::test]
    async fn test_missing_required_field_fails_the_read() {
        let server = MockServer::start().await;

        // `instances` is absent; the read must fail fast.
        Mock::given(method("GET"))
            .and(path("/v1/desired/processes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "processes": [{
                    "process_guid": ProcessGuid::from_parts(AppGuid::new(), VersionGuid::new()),
                    "app_guid": AppGuid::new(),
                    "start_command": "./run",
                }],
            })))
            .mount(&server)
            .await;

        let source =
            HttpDesiredStateSource::new(&server.uri(), None, Duration::from_secs(5)).unwrap();
        let err = source.processes(None).await.unwrap_err();
        assert!(matches!(err, StoreError::Unexpected(_)));
    }

    #[tokio::test]
    async fn test_filter_and_bearer_token_are_sent() {
        let server = MockServer::start().await;
        let app = AppGuid::new();

        Mock::given(method("GET"))
            .and(path("/v1/desired/processes"))
            .and(query_param("app_guid", app.to_string()))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "processes": [] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source =
            HttpDesiredStateSource::new(&server.uri(), Some("sekrit"), Duration::from_secs(5))
                .unwrap();
        let processes = source.processes(Some(&app)).await.unwrap();
        assert!(processes.is_empty());
    }

    #[tokio::test]
    async fn test_process_by_guid_not_found_is_none() {
        let server = MockServer::start().await;
        let guid = ProcessGuid::from_parts(AppGuid::new(), VersionGuid::new());

        Mock::given(method("GET"))
            .and(path(format!("/v1/desired/processes/{guid}")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source =
            HttpDesiredStateSource::new(&server.uri(), None, Duration::from_secs(5)).unwrap();
        assert!(source.process_by_guid(&guid).await.unwrap().is_none());
    }
}
