//! HTTP client for Store B, the routing table.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use statesync_id::{AppGuid, ProcessGuid, RouteGuid};
use statesync_models::{ProcessIdentityAssociation, Route, RouteMapping};
use tracing::debug;

use super::http::{build_client, check_status};
use super::RoutingStore;
use crate::error::StoreResult;

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct MappingsResponse {
    mappings: Vec<RouteMapping>,
}

#[derive(Debug, Deserialize)]
struct AssociationsResponse {
    associations: Vec<ProcessIdentityAssociation>,
}

/// Client for the routing control plane's table API.
pub struct HttpRoutingStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRoutingStore {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout, token)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RoutingStore for HttpRoutingStore {
    async fn list_routes(&self) -> StoreResult<BTreeMap<RouteGuid, String>> {
        let url = format!("{}/v1/routes", self.base_url);
        let resp = check_status(self.client.get(&url).send().await?).await?;
        let body: RoutesResponse = resp.json().await?;

        debug!(count = body.routes.len(), "Fetched routes");
        Ok(body.routes.into_iter().map(|r| (r.guid, r.host)).collect())
    }

    async fn upsert_route(&self, guid: RouteGuid, host: &str) -> StoreResult<()> {
        let url = format!("{}/v1/routes/{}", self.base_url, guid);
        let resp = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "host": host }))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete_route(&self, guid: RouteGuid) -> StoreResult<()> {
        let url = format!("{}/v1/routes/{}", self.base_url, guid);
        let resp = self.client.delete(&url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn list_mappings(&self) -> StoreResult<BTreeMap<(RouteGuid, ProcessGuid), u32>> {
        let url = format!("{}/v1/route_mappings", self.base_url);
        let resp = check_status(self.client.get(&url).send().await?).await?;
        let body: MappingsResponse = resp.json().await?;

        debug!(count = body.mappings.len(), "Fetched route mappings");
        Ok(body
            .mappings
            .into_iter()
            .map(|m| (m.key(), m.weight))
            .collect())
    }

    async fn upsert_mapping(
        &self,
        route_guid: RouteGuid,
        process_guid: ProcessGuid,
        weight: u32,
    ) -> StoreResult<()> {
        let url = format!(
            "{}/v1/routes/{}/mappings/{}",
            self.base_url, route_guid, process_guid
        );
        let resp = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "weight": weight }))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete_mapping(
        &self,
        route_guid: RouteGuid,
        process_guid: ProcessGuid,
    ) -> StoreResult<()> {
        let url = format!(
            "{}/v1/routes/{}/mappings/{}",
            self.base_url, route_guid, process_guid
        );
        let resp = self.client.delete(&url).send().await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn list_associations(&self) -> StoreResult<BTreeMap<AppGuid, BTreeSet<ProcessGuid>>> {
        let url = format!("{}/v1/associations", self.base_url);
        let resp = check_status(self.client.get(&url).send().await?).await?;
        let body: AssociationsResponse = resp.json().await?;

        debug!(count = body.associations.len(), "Fetched associations");
        Ok(body
            .associations
            .into_iter()
            .map(|a| (a.app_guid, a.process_guids))
            .collect())
    }

    async fn upsert_association(
        &self,
        app_guid: AppGuid,
        process_guids: &BTreeSet<ProcessGuid>,
    ) -> StoreResult<()> {
        let url = format!("{}/v1/associations/{}", self.base_url, app_guid);
        let resp = self
            .client
            .put(&url)
            .json(&serde_json::json!({ "process_guids": process_guids }))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    async fn delete_association(&self, app_guid: AppGuid) -> StoreResult<()> {
        let url = format!("{}/v1/associations/{}", self.base_url, app_guid);
        let resp = self.client.delete(&url).send().await?;
        check_status(resp).await?;
        Ok(())
    }
}
