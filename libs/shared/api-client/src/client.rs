use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Url,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::PortalConfig;

use crate::error::ApiError;

const RETRY_BACKOFF_MS: u64 = 250;

/// JSON-over-HTTP client for the booking backend.
///
/// Every call shares the same timeout and retry policy: idempotent requests
/// are retried on transport failures and 5xx answers, everything else is
/// attempted once.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl ApiClient {
    pub fn new(config: &PortalConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout ({}), using defaults", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::InvalidRequest("access token is not a valid header value".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn get<T>(&self, path: &str, query: &[(&str, String)], auth_token: Option<&str>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, path, query, auth_token, None).await
    }

    pub async fn post<T>(&self, path: &str, auth_token: Option<&str>, body: Option<Value>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, &[], auth_token, body).await
    }

    pub async fn patch<T>(&self, path: &str, auth_token: Option<&str>, body: Option<Value>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.request(Method::PATCH, path, &[], auth_token, body).await
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let headers = self.get_headers(auth_token)?;
        let attempts = if is_idempotent(&method) { self.max_retries + 1 } else { 1 };

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("{} {} (attempt {}/{})", method, url, attempt, attempts);

            let mut req = self.client
                .request(method.clone(), &url)
                .headers(headers.clone());

            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(ref body_data) = body {
                req = req.json(body_data);
            }

            match self.execute(req).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    warn!("{} {} failed ({}), retrying", method, url, e);
                    tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn execute<T>(&self, req: reqwest::RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(ApiError::from_status(status, &text));
        }

        // 204s and empty bodies decode as JSON null so `()` and `Value` both work
        let payload = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(payload)?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Joins `segments` into an absolute API path.
///
/// Each segment is percent-encoded, so an id holding `/`, `?` or `#` stays a
/// single segment. Empty, `.` and `..` segments are refused.
pub fn api_path(segments: &[&str]) -> Result<String, ApiError> {
    if let Some(bad) = segments.iter().find(|s| s.is_empty() || **s == "." || **s == "..") {
        return Err(ApiError::InvalidRequest(format!("invalid path segment '{}'", bad)));
    }

    let mut url = Url::parse("http://localhost/")
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidRequest("cannot build API path".to_string()))?
        .extend(segments);

    Ok(url.path().to_string())
}

fn is_idempotent(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}
