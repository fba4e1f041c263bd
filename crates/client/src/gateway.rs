//! Authenticated JSON gateway to the account backend.
//!
//! Every remote call in the subsystem goes through [`ApiGateway`]: it attaches
//! the bearer token from the [`SessionStore`], executes the request, and
//! normalizes every failure into the closed [`ApiError`] taxonomy. It never
//! retries and never recovers — retry policy belongs to the caller, and in
//! this subsystem there is none.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use streampass_core::{ApiError, ApiResult};

use crate::session::SessionStore;

/// Error envelope the backend uses for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiGateway {
    base: Url,
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl ApiGateway {
    pub fn new(base: Url, session: Arc<SessionStore>) -> Self {
        Self {
            base,
            http: reqwest::Client::new(),
            session,
        }
    }

    /// Use a custom HTTP client (timeouts, connection pool reuse).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::GET, path, &[], None, false).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> ApiResult<T> {
        self.execute(Method::GET, path, query, None, false).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        self.execute(Method::POST, path, &[], Some(body), false).await
    }

    /// POST to a credential endpoint (login/register), where a 401 means
    /// wrong credentials rather than a missing session.
    pub async fn post_auth<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        self.execute(Method::POST, path, &[], Some(body), true).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = serde_json::to_value(body).map_err(|e| ApiError::RequestFailed(e.to_string()))?;
        self.execute(Method::PATCH, path, &[], Some(body), false).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::DELETE, path, &[], None, false).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
        auth_endpoint: bool,
    ) -> ApiResult<T> {
        let url = self.endpoint(path)?;

        let mut request = self.http.request(method.clone(), url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.session.get() {
            request = request.bearer_auth(token);
        }
        // Always JSON, even on bodyless requests.
        request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        debug!(method = %method, path, status = status.as_u16(), "API request");

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.detail.or(b.message));
            return Err(ApiError::from_response(
                status.as_u16(),
                detail.as_deref(),
                auth_endpoint,
            ));
        }

        // Some mutation endpoints answer with an empty body.
        let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(payload)
            .map_err(|e| ApiError::RequestFailed(format!("invalid response body: {e}")))
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        // Join against the base regardless of whether it carries a path
        // prefix or trailing slash.
        let mut base = self.base.clone();
        {
            let mut segments = base
                .path_segments_mut()
                .map_err(|_| ApiError::RequestFailed("base URL cannot be a base".into()))?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                segments.push(segment);
            }
        }
        Ok(base)
    }
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        ApiError::NetworkUnavailable
    } else {
        ApiError::RequestFailed(e.to_string())
    }
}
