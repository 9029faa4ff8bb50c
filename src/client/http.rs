//! HTTP Client
//!
//! reqwest-backed implementation of [`TransitApi`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::{ClientError, ClientResult};
use super::types::{
    CurrentLoad, ForecastPoint, Health, Id, LoadStatistics, LoadTarget, PeakHours, Route, Stop,
};
use super::TransitApi;

/// Backend REST client
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

/// Configuration for the backend client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. "http://localhost:8000/api/v1"
    pub base_url: String,
    /// Path prefix of the load/forecast/stops endpoints ("passengers")
    pub namespace: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            namespace: "passengers".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Error body shapes the backend uses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base(), path)
    }

    fn namespaced(&self, path: &str) -> String {
        format!("/{}{}", self.config.namespace.trim_matches('/'), path)
    }

    /// Check backend liveness at `{origin}/health`
    pub async fn health(&self) -> ClientResult<Health> {
        let base = self.base();
        let origin = base.strip_suffix("/api/v1").unwrap_or(base);
        self.fetch(&format!("{}/health", origin), &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.fetch(&self.url(path), query).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        tracing::debug!(url = %url, ?query, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        let body = response.bytes().await.map_err(ClientError::from_transport)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Pull a human-readable message out of an error body
fn error_message(text: &str, status: reqwest::StatusCode) -> String {
    let parsed = serde_json::from_str::<ErrorBody>(text).ok();
    let message = parsed.and_then(|body| match body.detail {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
        None => body.error,
    });

    match message {
        Some(m) if !m.is_empty() => m,
        _ if !text.trim().is_empty() => text.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

fn segment(id: &Id) -> String {
    urlencoding::encode(id.as_str()).into_owned()
}

fn target_query(target: &LoadTarget) -> Vec<(&'static str, String)> {
    target
        .stop_id
        .iter()
        .map(|stop| ("stop_id", stop.to_string()))
        .collect()
}

#[async_trait]
impl TransitApi for ApiClient {
    async fn routes(&self) -> ClientResult<Vec<Route>> {
        self.get_json("/routes", &[]).await
    }

    async fn stops(&self, route_id: Option<&Id>) -> ClientResult<Vec<Stop>> {
        let path = match route_id {
            Some(route) => self.namespaced(&format!("/routes/{}/stops", segment(route))),
            None => self.namespaced("/stops"),
        };
        self.get_json(&path, &[]).await
    }

    async fn current_load(&self, target: &LoadTarget) -> ClientResult<CurrentLoad> {
        let path = self.namespaced(&format!("/current-load/{}", segment(&target.id)));
        self.get_json(&path, &target_query(target)).await
    }

    async fn forecast(&self, target: &LoadTarget, hours: u32) -> ClientResult<Vec<ForecastPoint>> {
        let path = self.namespaced(&format!("/forecast/{}", segment(&target.id)));
        let mut query = target_query(target);
        query.push(("hours", hours.to_string()));
        self.get_json(&path, &query).await
    }

    async fn load_statistics(&self, target: &LoadTarget, days: u32) -> ClientResult<LoadStatistics> {
        let path = format!("/analytics/load-statistics/{}", segment(&target.id));
        let mut query = target_query(target);
        query.push(("days", days.to_string()));
        self.get_json(&path, &query).await
    }

    async fn peak_hours(&self, target: &LoadTarget, days: u32) -> ClientResult<PeakHours> {
        let path = format!("/analytics/peak-hours/{}", segment(&target.id));
        let mut query = target_query(target);
        query.push(("days", days.to_string()));
        self.get_json(&path, &query).await
    }
}
