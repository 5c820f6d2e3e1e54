// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Drives a [`PreviewDialog`] against a [`GroupingService`].

use crate::error::{ApiError, Operation, ProtocolError, ServiceError};
use crate::protocol::{DialogPhase, PreviewDialog, PreviewTicket, ResponseOutcome, SubmitTicket};
use crate::request_response::{PreviewResponse, SubmitGroupsResponse};
use crate::service::GroupingService;
use plotgroup::{EditCommand, EditOutcome};
use serde::Serialize;
use tracing::debug;

/// Cached views the host should refresh after groups are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachedView {
    /// The current season's overview.
    CurrentSeason,
    /// The list of groups.
    GroupsList,
}

/// The views invalidated by a successful submission.
pub const INVALIDATED_ON_SUBMIT: [CachedView; 2] =
    [CachedView::CurrentSeason, CachedView::GroupsList];

/// Receives notifications from a controller.
pub trait DialogObserver: Send + Sync {
    /// Groups were created.
    fn groups_created(&self, response: &SubmitGroupsResponse);

    /// Cached views are out of date.
    fn invalidate(&self, views: &[CachedView]);

    /// A round-trip failed; `message` is ready to show.
    fn failed(&self, _operation: Operation, _message: &str) {}
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DialogObserver for NoopObserver {
    fn groups_created(&self, _response: &SubmitGroupsResponse) {}

    fn invalidate(&self, _views: &[CachedView]) {}
}

/// Tells an observer about a successful submission.
pub fn notify_submitted<O: DialogObserver + ?Sized>(observer: &O, response: &SubmitGroupsResponse) {
    observer.groups_created(response);
    observer.invalidate(&INVALIDATED_ON_SUBMIT);
}

/// Owns a dialog and performs its round-trips in order.
pub struct PreviewController<S: GroupingService, O: DialogObserver> {
    dialog: PreviewDialog,
    service: S,
    observer: O,
}

impl<S: GroupingService, O: DialogObserver> PreviewController<S, O> {
    #[must_use]
    pub const fn new(dialog: PreviewDialog, service: S, observer: O) -> Self {
        Self {
            dialog,
            service,
            observer,
        }
    }

    #[must_use]
    pub const fn dialog(&self) -> &PreviewDialog {
        &self.dialog
    }

    pub const fn dialog_mut(&mut self) -> &mut PreviewDialog {
        &mut self.dialog
    }

    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }

    #[must_use]
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    fn report_failure(&self) {
        if let DialogPhase::Failed { operation, message } = self.dialog.phase() {
            self.observer.failed(*operation, message);
        }
    }

    async fn fetch(&mut self, ticket: PreviewTicket) -> ResponseOutcome {
        let result: Result<PreviewResponse, ServiceError> = self
            .service
            .fetch_preview(ticket.request().clone(), ticket.operation())
            .await;
        let outcome: ResponseOutcome = match ticket.operation() {
            Operation::Recalculate => self.dialog.complete_recalculate(&ticket, result),
            Operation::Preview | Operation::Submit => {
                self.dialog.complete_preview(&ticket, result)
            }
        };
        if outcome == ResponseOutcome::Failed {
            self.report_failure();
        }
        outcome
    }

    /// Opens the dialog and loads the first preview.
    ///
    /// Returns `None` if the dialog was already open.
    pub async fn open(&mut self) -> Option<ResponseOutcome> {
        let ticket: PreviewTicket = self.dialog.open()?;
        Some(self.fetch(ticket).await)
    }

    /// Re-fetches the preview with the current parameters.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the dialog cannot recalculate now.
    pub async fn recalculate(&mut self) -> Result<ResponseOutcome, ApiError> {
        let ticket: PreviewTicket = self.dialog.begin_recalculate()?;
        Ok(self.fetch(ticket).await)
    }

    /// Applies an edit.
    ///
    /// # Errors
    ///
    /// Returns the dialog's error if the edit is refused.
    pub fn edit(&mut self, command: EditCommand) -> Result<EditOutcome, ApiError> {
        self.dialog.edit(command)
    }

    /// Submits the edited groups.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if submission is blocked, and the service
    /// error if creation fails. A failed creation leaves the session intact.
    pub async fn submit(
        &mut self,
        create_groups_immediately: bool,
    ) -> Result<SubmitGroupsResponse, ApiError> {
        let ticket: SubmitTicket = self.dialog.begin_submit(create_groups_immediately)?;
        let result: Result<SubmitGroupsResponse, ServiceError> = self
            .service
            .submit_groups(ticket.request().clone())
            .await;
        match (self.dialog.complete_submit(&ticket, result.clone()), result) {
            (ResponseOutcome::Applied, Ok(response)) => {
                notify_submitted(&self.observer, &response);
                Ok(response)
            }
            (_, Err(e)) => {
                self.report_failure();
                Err(e.into())
            }
            (outcome, Ok(_)) => {
                debug!(?outcome, "Submission response not applied");
                Err(ProtocolError::NoSession.into())
            }
        }
    }

    /// Closes the dialog.
    pub fn close(&mut self) {
        self.dialog.close();
    }
}
