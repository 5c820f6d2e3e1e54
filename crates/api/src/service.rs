// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The grouping service as seen by the protocol.

use crate::error::{ApiError, Operation, ServiceError};
use crate::request_response::{
    FetchPreviewRequest, PreviewResponse, SubmitGroupsRequest, SubmitGroupsResponse,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// The future returned by every service call.
pub type ServiceFuture<'a, T> = BoxFuture<'a, Result<T, ServiceError>>;

/// The external grouping service.
///
/// Implementations are shared between requests, so they must be usable
/// through `&self` from any thread.
pub trait GroupingService: Send + Sync {
    /// Fetches a preview. `operation` labels errors as a first fetch or a
    /// recalculation.
    fn fetch_preview(
        &self,
        request: FetchPreviewRequest,
        operation: Operation,
    ) -> ServiceFuture<'_, PreviewResponse>;

    /// Creates the confirmed groups.
    fn submit_groups(&self, request: SubmitGroupsRequest)
    -> ServiceFuture<'_, SubmitGroupsResponse>;
}

impl<S: GroupingService + ?Sized> GroupingService for std::sync::Arc<S> {
    fn fetch_preview(
        &self,
        request: FetchPreviewRequest,
        operation: Operation,
    ) -> ServiceFuture<'_, PreviewResponse> {
        (**self).fetch_preview(request, operation)
    }

    fn submit_groups(
        &self,
        request: SubmitGroupsRequest,
    ) -> ServiceFuture<'_, SubmitGroupsResponse> {
        (**self).submit_groups(request)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An in-process service answering from a fixed preview.
///
/// Every request is recorded. A configured failure is returned by every
/// call until it is cleared.
#[derive(Debug, Default)]
pub struct FixtureGroupingService {
    preview: Mutex<PreviewResponse>,
    submit_warnings: Mutex<Vec<String>>,
    failure: Mutex<Option<(u16, String)>>,
    fetches: Mutex<Vec<FetchPreviewRequest>>,
    submissions: Mutex<Vec<SubmitGroupsRequest>>,
}

impl FixtureGroupingService {
    #[must_use]
    pub fn new(preview: PreviewResponse) -> Self {
        Self {
            preview: Mutex::new(preview),
            ..Self::default()
        }
    }

    /// Builds a fixture from a preview response in JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidPreview` if the JSON is not a preview
    /// response.
    pub fn from_json(json: &str) -> Result<Self, ApiError> {
        let preview: PreviewResponse = serde_json::from_str(json)
            .map_err(|e| ApiError::InvalidPreview(e.to_string()))?;
        Ok(Self::new(preview))
    }

    /// Replaces the preview served from now on.
    pub fn set_preview(&self, preview: PreviewResponse) {
        *lock(&self.preview) = preview;
    }

    /// Sets the warnings returned with every successful submission.
    pub fn set_submit_warnings(&self, warnings: Vec<String>) {
        *lock(&self.submit_warnings) = warnings;
    }

    /// Makes every call fail with this status and message.
    pub fn fail_with(&self, status: u16, message: impl Into<String>) {
        *lock(&self.failure) = Some((status, message.into()));
    }

    /// Lets calls succeed again.
    pub fn clear_failure(&self) {
        *lock(&self.failure) = None;
    }

    /// Preview requests received so far.
    #[must_use]
    pub fn fetches(&self) -> Vec<FetchPreviewRequest> {
        lock(&self.fetches).clone()
    }

    /// Submissions received so far.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmitGroupsRequest> {
        lock(&self.submissions).clone()
    }

    fn failure(&self, operation: Operation) -> Option<ServiceError> {
        lock(&self.failure)
            .as_ref()
            .map(|(status, message)| ServiceError::Rejected {
                operation,
                status: *status,
                message: Some(message.clone()),
            })
    }
}

impl GroupingService for FixtureGroupingService {
    fn fetch_preview(
        &self,
        request: FetchPreviewRequest,
        operation: Operation,
    ) -> ServiceFuture<'_, PreviewResponse> {
        async move {
            debug!(%operation, cluster_id = %request.cluster_id, "Fixture preview requested");
            lock(&self.fetches).push(request);
            if let Some(err) = self.failure(operation) {
                return Err(err);
            }
            Ok(lock(&self.preview).clone())
        }
        .boxed()
    }

    fn submit_groups(
        &self,
        request: SubmitGroupsRequest,
    ) -> ServiceFuture<'_, SubmitGroupsResponse> {
        async move {
            let groups_created: usize = request.groups.len();
            lock(&self.submissions).push(request);
            if let Some(err) = self.failure(Operation::Submit) {
                return Err(err);
            }
            info!(groups_created, "Fixture accepted submission");
            Ok(SubmitGroupsResponse {
                groups_created,
                warnings: lock(&self.submit_warnings).clone(),
            })
        }
        .boxed()
    }
}
