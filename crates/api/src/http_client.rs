// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The grouping service over HTTP.

use crate::error::{Operation, ServiceError};
use crate::request_response::{
    FetchPreviewRequest, PreviewResponse, SubmitGroupsRequest, SubmitGroupsResponse,
};
use crate::service::{GroupingService, ServiceFuture};
use futures::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const PREVIEW_PATH: &str = "groups/preview";
const SUBMIT_PATH: &str = "groups";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON client for the grouping service.
#[derive(Debug, Clone)]
pub struct HttpGroupingService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGroupingService {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client: reqwest::Client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Transport {
                operation: Operation::Preview,
                message: e.to_string(),
            })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Uses an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: Operation,
    ) -> Result<T, ServiceError> {
        let url: String = self.url(path);
        debug!(%operation, %url, "Calling grouping service");

        let response: reqwest::Response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status: reqwest::StatusCode = response.status();
        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default();
            let message: Option<String> = server_message(&body);
            warn!(%operation, status = status.as_u16(), ?message, "Grouping service rejected request");
            return Err(ServiceError::Rejected {
                operation,
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode {
                operation,
                message: e.to_string(),
            })
    }
}

/// Pulls a human-readable message out of an error body.
///
/// JSON bodies are searched for `message`, `error` and `title`, in that
/// order. A short non-JSON body is used as is.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    let trimmed: &str = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error", "title"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .find(|message| !message.is_empty())
            .map(str::to_string),
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => {
            Some(trimmed.to_string())
        }
        Err(_) => None,
    }
}

impl GroupingService for HttpGroupingService {
    fn fetch_preview(
        &self,
        request: FetchPreviewRequest,
        operation: Operation,
    ) -> ServiceFuture<'_, PreviewResponse> {
        async move { self.post(PREVIEW_PATH, &request, operation).await }.boxed()
    }

    fn submit_groups(
        &self,
        request: SubmitGroupsRequest,
    ) -> ServiceFuture<'_, SubmitGroupsResponse> {
        async move { self.post(SUBMIT_PATH, &request, Operation::Submit).await }.boxed()
    }
}
