//! API client for communicating with the ferry alerts REST API.
//!
//! This module provides the `ApiClient` struct, the HTTP implementation of
//! `AlertsBackend`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{AlertOptions, AlertPage, AlertPatch, ListQuery, QuickSave, RouteCacheEntry, SavedRoute, Stats};

use super::{AlertsBackend, ApiError};

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when neither config nor environment provide one
pub const DEFAULT_API_BASE_URL: &str = "https://api.ferrywatch.app/v1";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Query parameter carrying the guest identity.
const IDENTITY_PARAM: &str = "identityHint";

#[derive(Debug, Serialize)]
struct CreateAlertBody<'a> {
    departure_port: &'a str,
    arrival_port: &'a str,
    #[serde(flatten)]
    options: &'a AlertOptions,
}

/// API client for the alerts service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn alert_url(&self, alert_id: i64, action: Option<&str>) -> String {
        match action {
            Some(action) => self.url(&format!("/alerts/{}/{}", alert_id, action)),
            None => self.url(&format!("/alerts/{}", alert_id)),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request, backing off on rate limiting.
    /// `build` is called once per attempt since a sent request is consumed.
    async fn execute(&self, url: &str, build: impl Fn() -> RequestBuilder) -> Result<Response, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build().send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status.as_u16() == 429 {
                retries += 1;
                if retries > MAX_RATE_LIMIT_RETRIES {
                    return Err(ApiError::RateLimited);
                }
                warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            debug!(url = url, status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }
    }

    async fn parse<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON from {}: {}", url, e)))
    }

    async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(&self, url: &str, query: &Q) -> Result<T, ApiError> {
        let response = self
            .execute(url, || self.request(Method::GET, url).query(query))
            .await?;
        Self::parse(url, response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        identity_hint: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        let query = identity_query(identity_hint);
        let response = self
            .execute(url, || self.request(method.clone(), url).query(&query).json(body))
            .await?;
        Self::parse(url, response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.execute(url, || self.request(Method::POST, url)).await?;
        Self::parse(url, response).await
    }
}

fn identity_query(identity_hint: Option<&str>) -> Vec<(&'static str, String)> {
    identity_hint
        .map(|hint| vec![(IDENTITY_PARAM, hint.to_string())])
        .unwrap_or_default()
}

fn list_query_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("per_page", query.per_page.to_string()),
    ];
    if let Some(status) = query.status {
        params.push(("status", status.as_str().to_string()));
    }
    params
}

#[async_trait]
impl AlertsBackend for ApiClient {
    async fn list_alerts(&self, query: ListQuery) -> Result<AlertPage, ApiError> {
        let url = self.url("/alerts");
        let page: AlertPage = self.get(&url, &list_query_params(&query)).await?;
        debug!(page = page.page, count = page.routes.len(), total = page.total, "Fetched alerts page");
        Ok(page)
    }

    async fn create_alert(
        &self,
        departure: &str,
        arrival: &str,
        options: &AlertOptions,
    ) -> Result<SavedRoute, ApiError> {
        let url = self.url("/alerts");
        let body = CreateAlertBody {
            departure_port: departure,
            arrival_port: arrival,
            options,
        };
        self.send_json(Method::POST, &url, None, &body).await
    }

    async fn quick_save(&self, request: &QuickSave) -> Result<SavedRoute, ApiError> {
        let url = self.url("/alerts/quick-save");
        self.send_json(Method::POST, &url, None, request).await
    }

    async fn update_alert(
        &self,
        alert_id: i64,
        patch: &AlertPatch,
        identity_hint: Option<&str>,
    ) -> Result<SavedRoute, ApiError> {
        let url = self.alert_url(alert_id, None);
        self.send_json(Method::PATCH, &url, identity_hint, patch).await
    }

    async fn delete_alert(&self, alert_id: i64, identity_hint: Option<&str>) -> Result<(), ApiError> {
        let url = self.alert_url(alert_id, None);
        let query = identity_query(identity_hint);
        self.execute(&url, || self.request(Method::DELETE, &url).query(&query))
            .await?;
        Ok(())
    }

    async fn pause_alert(&self, alert_id: i64) -> Result<SavedRoute, ApiError> {
        self.post_empty(&self.alert_url(alert_id, Some("pause"))).await
    }

    async fn resume_alert(&self, alert_id: i64) -> Result<SavedRoute, ApiError> {
        self.post_empty(&self.alert_url(alert_id, Some("resume"))).await
    }

    async fn check_route(
        &self,
        departure: &str,
        arrival: &str,
        identity_hint: Option<&str>,
    ) -> Result<RouteCacheEntry, ApiError> {
        let url = self.url("/alerts/check");
        let mut query = vec![
            ("departure", departure.to_string()),
            ("arrival", arrival.to_string()),
        ];
        query.extend(identity_query(identity_hint));
        self.get(&url, &query).await
    }

    async fn fetch_stats(&self) -> Result<Stats, ApiError> {
        let url = self.url("/alerts/stats");
        self.get(&url, &[] as &[(&str, &str)]).await
    }
}
