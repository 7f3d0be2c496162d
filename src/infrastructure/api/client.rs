#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::sync::Arc;

use reqwest::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::types::RefreshRequest;
use super::types::RefreshResponse;
use crate::domain::services::CredentialStore;

/// Typed failure surface of the API layer. Controllers match on the variant
/// instead of inspecting response objects.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach the TalkFlow API: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("your session has expired")]
    SessionExpired,
    #[error("{detail}")]
    Validation { status: u16, detail: String },
    #[error("the TalkFlow API failed with HTTP {0}")]
    Server(u16),
    #[error("unexpected response from the TalkFlow API: {0}")]
    Decode(String),
}

/// Per-request retry state. A request starts `Normal`; the first 401 flips it
/// to `Retried` and triggers one token refresh plus one replay. There is no
/// third state, which is what rules out refresh loops.
#[derive(Copy, Clone, PartialEq, Eq)]
enum RequestState {
    Normal,
    Retried,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    store: Arc<CredentialStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, store: Arc<CredentialStore>) -> ApiClient {
        return ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            store,
        };
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        return &self.store;
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.base_url);
    }

    /// Dispatches a request, attaching `Authorization: Bearer` whenever an
    /// access token is stored. A 401 on a `Normal` request triggers a token
    /// refresh and exactly one replay with the new token; every other
    /// failure, including a 401 on a `Retried` request, propagates as is.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut state = RequestState::Normal;

        loop {
            let mut req = self.http.request(method.clone(), self.endpoint(path));
            if let Some(token) = self.store.access_token() {
                req = req.bearer_auth(token);
            }
            if let Some(payload) = &body {
                req = req.json(payload);
            }

            let res = req.send().await?;
            if res.status() != StatusCode::UNAUTHORIZED || state == RequestState::Retried {
                return classify(res).await;
            }

            state = RequestState::Retried;
            self.refresh().await?;
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let res = self.execute(Method::GET, path, None).await?;
        return decode(res).await;
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        let res = self.execute(Method::POST, path, Some(body)).await?;
        return decode(res).await;
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        let res = self.execute(Method::PUT, path, Some(body)).await?;
        return decode(res).await;
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let res = self.execute(Method::DELETE, path, None).await?;
        return decode(res).await;
    }

    /// Trades the refresh token for a new access token on a dedicated,
    /// non-intercepted request. Any failure here is terminal for the session:
    /// the store is wiped and the caller gets `SessionExpired`.
    async fn refresh(&self) -> Result<(), ApiError> {
        let refresh = match self.store.refresh_token() {
            Some(refresh) => refresh,
            None => {
                self.store.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        let res = self
            .http
            .post(self.endpoint("/auth/token/refresh/"))
            .json(&RefreshRequest { refresh })
            .send()
            .await;

        let res = match res {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                tracing::warn!(status = res.status().as_u16(), "token refresh rejected");
                self.store.clear();
                return Err(ApiError::SessionExpired);
            }
            Err(err) => {
                tracing::warn!(err = ?err, "token refresh unreachable");
                self.store.clear();
                return Err(ApiError::SessionExpired);
            }
        };

        match res.json::<RefreshResponse>().await {
            Ok(tokens) => {
                self.store.set_tokens(&tokens.access, tokens.refresh.as_deref());
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(err = ?err, "token refresh returned an unexpected payload");
                self.store.clear();
                return Err(ApiError::SessionExpired);
            }
        }
    }
}

async fn classify(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status.is_server_error() {
        return Err(ApiError::Server(status.as_u16()));
    }

    let detail = error_detail(&res.text().await.unwrap_or_default());
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized(detail));
    }

    return Err(ApiError::Validation {
        status: status.as_u16(),
        detail,
    });
}

pub async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
    let payload = res.text().await?;
    return serde_json::from_str::<T>(&payload).map_err(|err| {
        return ApiError::Decode(err.to_string());
    });
}

/// Pulls a human-readable message out of whichever error shape the backend
/// produced: the `{success, error: {message, details}}` envelope of its
/// exception handler, DRF's `{detail}`, or a raw body as a last resort.
fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(message) = parsed
            .get("error")
            .and_then(|error| return error.get("message"))
            .and_then(|message| return message.as_str())
        {
            return message.to_string();
        }
        if let Some(detail) = parsed.get("detail").and_then(|detail| return detail.as_str()) {
            return detail.to_string();
        }
        if let Some(error) = parsed.get("error").and_then(|error| return error.as_str()) {
            return error.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "request failed".to_string();
    }

    return trimmed.to_string();
}
