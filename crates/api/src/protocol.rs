// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The preview dialog state machine.
//!
//! ```text
//! Idle -> Previewing -> Editing <-> Recalculating
//!                          |
//!                          v
//!                      Submitting -> Done
//! ```
//!
//! `Previewing`, `Recalculating` and `Submitting` fail into `Failed`. Every
//! network round-trip is split into a `begin_*`/`open` call that hands out a
//! ticket and a `complete_*` call that takes the ticket back with the
//! result, so the host never holds the dialog across an await.

use crate::error::{ApiError, Operation, ProtocolError, ServiceError};
use crate::mapping::{reported_summary, session_seed_from_preview, submission_from_session};
use crate::params::{GroupingParameters, SeasonContext};
use crate::request_response::{
    FetchPreviewRequest, PreviewResponse, SubmitGroupsRequest, SubmitGroupsResponse,
};
use plotgroup::{EditCommand, EditOutcome, PreviewSession, SessionSeed, SupervisorOption, apply};
use plotgroup_domain::{
    PreviewSummary, ValidationFinding, ValidationRules, count_by_severity,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where the dialog is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DialogPhase {
    /// Closed, or opened but never fetched.
    Idle,
    /// Waiting for the first preview.
    Previewing,
    /// A session is loaded and editable.
    Editing,
    /// Waiting for a recalculated preview. Edits are still accepted but
    /// will be discarded when the response arrives.
    Recalculating,
    /// Waiting for the creation response.
    Submitting,
    /// Groups were created.
    Done {
        /// What the service created.
        response: SubmitGroupsResponse,
    },
    /// The last round-trip failed; the session, if any, is untouched.
    Failed {
        /// The round-trip that failed.
        operation: Operation,
        /// The notification shown to the user.
        message: String,
    },
}

impl DialogPhase {
    /// The phase name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Previewing => "previewing",
            Self::Editing => "editing",
            Self::Recalculating => "recalculating",
            Self::Submitting => "submitting",
            Self::Done { .. } => "done",
            Self::Failed { .. } => "failed",
        }
    }
}

/// What happened to a response handed back to the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOutcome {
    /// The response was applied.
    Applied,
    /// A response with a higher sequence number was already seen, or a
    /// submission has started; this one was dropped.
    Stale,
    /// The dialog was closed since the request was issued.
    Closed,
    /// The request failed and the dialog moved to `Failed`.
    Failed,
}

/// A preview or recalculation request in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTicket {
    lifecycle: u64,
    generation: u64,
    operation: Operation,
    request: FetchPreviewRequest,
}

impl PreviewTicket {
    /// The request to send to the service.
    #[must_use]
    pub const fn request(&self) -> &FetchPreviewRequest {
        &self.request
    }

    /// Whether this is the first preview or a recalculation.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// The request's sequence number within the dialog.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A submission in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    lifecycle: u64,
    request: SubmitGroupsRequest,
}

impl SubmitTicket {
    /// The submission to send to the service.
    #[must_use]
    pub const fn request(&self) -> &SubmitGroupsRequest {
        &self.request
    }
}

/// One grouping dialog: its session, phase and request bookkeeping.
#[derive(Debug, Clone)]
pub struct PreviewDialog {
    context: SeasonContext,
    parameters: GroupingParameters,
    rules: ValidationRules,
    max_plots_per_group: Option<usize>,
    phase: DialogPhase,
    session: Option<PreviewSession>,
    reported_summary: Option<PreviewSummary>,
    lifecycle: u64,
    fetch_issued: bool,
    issued_generation: u64,
    resolved_generation: u64,
}

impl PreviewDialog {
    /// Creates an idle dialog for one cluster and season.
    #[must_use]
    pub fn new(context: SeasonContext, parameters: GroupingParameters) -> Self {
        Self {
            context,
            parameters,
            rules: ValidationRules::default(),
            max_plots_per_group: None,
            phase: DialogPhase::Idle,
            session: None,
            reported_summary: None,
            lifecycle: 0,
            fetch_issued: false,
            issued_generation: 0,
            resolved_generation: 0,
        }
    }

    /// Overrides the default validation thresholds.
    #[must_use]
    pub const fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Caps group size for edits in every session this dialog loads.
    #[must_use]
    pub const fn with_max_plots_per_group(mut self, max_plots_per_group: Option<usize>) -> Self {
        self.max_plots_per_group = max_plots_per_group;
        self
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> &DialogPhase {
        &self.phase
    }

    /// The editable session, once a preview has loaded.
    #[must_use]
    pub const fn session(&self) -> Option<&PreviewSession> {
        self.session.as_ref()
    }

    /// The cluster and season this dialog plans.
    #[must_use]
    pub const fn context(&self) -> &SeasonContext {
        &self.context
    }

    /// The parameters for the next fetch.
    #[must_use]
    pub const fn parameters(&self) -> &GroupingParameters {
        &self.parameters
    }

    /// The validation thresholds in use.
    #[must_use]
    pub const fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// The counts the service reported with the current preview.
    #[must_use]
    pub const fn reported_summary(&self) -> Option<PreviewSummary> {
        self.reported_summary
    }

    /// The message of the last failure, while the dialog is failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        match &self.phase {
            DialogPhase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Replaces the parameters used by the next recalculation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidParameters` if the parameters are
    /// inconsistent; the previous parameters are kept.
    pub fn set_parameters(&mut self, parameters: GroupingParameters) -> Result<(), ApiError> {
        parameters.validate()?;
        self.parameters = parameters;
        Ok(())
    }

    /// Validation findings for the current session.
    #[must_use]
    pub fn findings(&self) -> Vec<ValidationFinding> {
        self.session
            .as_ref()
            .map(|s| s.findings(&self.rules))
            .unwrap_or_default()
    }

    /// Whether a submission would be accepted right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.ensure_submittable().is_ok()
    }

    fn invalid(&self, action: &'static str) -> ProtocolError {
        ProtocolError::InvalidTransition {
            action,
            phase: self.phase.name(),
        }
    }

    fn fail(&mut self, error: &ServiceError) {
        warn!(
            operation = %error.operation(),
            error = %error,
            "Grouping round-trip failed"
        );
        self.phase = DialogPhase::Failed {
            operation: error.operation(),
            message: error.notification(),
        };
    }

    const fn next_generation(&mut self) -> u64 {
        self.issued_generation += 1;
        self.issued_generation
    }

    fn seed_from(
        response: &PreviewResponse,
        operation: Operation,
    ) -> Result<(SessionSeed, PreviewSummary), ServiceError> {
        let seed: SessionSeed =
            session_seed_from_preview(response).map_err(|e| ServiceError::Decode {
                operation,
                message: e.to_string(),
            })?;
        Ok((seed, reported_summary(response)))
    }

    /// Starts the first preview fetch of this open lifecycle.
    ///
    /// Returns `None` if a fetch was already issued since the dialog was
    /// last closed; reopening an open dialog never refetches.
    pub fn open(&mut self) -> Option<PreviewTicket> {
        if self.fetch_issued {
            debug!(lifecycle = self.lifecycle, "Preview already requested");
            return None;
        }
        self.fetch_issued = true;
        self.phase = DialogPhase::Previewing;
        let generation: u64 = self.next_generation();
        info!(
            lifecycle = self.lifecycle,
            cluster_id = %self.context.cluster_id,
            season_id = %self.context.season_id,
            "Requesting grouping preview"
        );
        Some(PreviewTicket {
            lifecycle: self.lifecycle,
            generation,
            operation: Operation::Preview,
            request: self.parameters.to_request(&self.context),
        })
    }

    /// Hands the first preview response back to the dialog.
    pub fn complete_preview(
        &mut self,
        ticket: &PreviewTicket,
        result: Result<PreviewResponse, ServiceError>,
    ) -> ResponseOutcome {
        self.complete_fetch(ticket, result)
    }

    /// Starts a recalculation with the current parameters.
    ///
    /// A recalculation may be started while another is in flight; the newer
    /// one wins regardless of arrival order.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidTransition` unless the dialog is
    /// editing, recalculating or failed.
    pub fn begin_recalculate(&mut self) -> Result<PreviewTicket, ProtocolError> {
        match self.phase {
            DialogPhase::Editing | DialogPhase::Recalculating | DialogPhase::Failed { .. } => {}
            _ => return Err(self.invalid("recalculate")),
        }
        self.fetch_issued = true;
        self.phase = DialogPhase::Recalculating;
        let generation: u64 = self.next_generation();
        debug!(lifecycle = self.lifecycle, generation, "Requesting recalculation");
        Ok(PreviewTicket {
            lifecycle: self.lifecycle,
            generation,
            operation: Operation::Recalculate,
            request: self.parameters.to_request(&self.context),
        })
    }

    /// Hands a recalculation response back to the dialog.
    ///
    /// A successful response replaces the whole session, discarding edits.
    /// Only a response newer than every response seen so far is considered,
    /// so a late answer never overwrites edits made after a newer failure.
    pub fn complete_recalculate(
        &mut self,
        ticket: &PreviewTicket,
        result: Result<PreviewResponse, ServiceError>,
    ) -> ResponseOutcome {
        self.complete_fetch(ticket, result)
    }

    fn complete_fetch(
        &mut self,
        ticket: &PreviewTicket,
        result: Result<PreviewResponse, ServiceError>,
    ) -> ResponseOutcome {
        if ticket.lifecycle != self.lifecycle {
            debug!(
                generation = ticket.generation,
                "Dropping response for a closed dialog"
            );
            return ResponseOutcome::Closed;
        }
        if ticket.generation <= self.resolved_generation {
            debug!(
                generation = ticket.generation,
                resolved = self.resolved_generation,
                "Dropping stale preview response"
            );
            return ResponseOutcome::Stale;
        }
        self.resolved_generation = ticket.generation;

        if matches!(self.phase, DialogPhase::Submitting | DialogPhase::Done { .. }) {
            debug!(
                generation = ticket.generation,
                phase = self.phase.name(),
                "Dropping preview response after submission started"
            );
            return ResponseOutcome::Stale;
        }
        let mapped: Result<(SessionSeed, PreviewSummary), ServiceError> =
            result.and_then(|response| Self::seed_from(&response, ticket.operation));

        // A failure is moot while a newer request is still outstanding.
        let newer_pending: bool = ticket.generation < self.issued_generation;
        if mapped.is_err() && newer_pending {
            debug!(
                generation = ticket.generation,
                issued = self.issued_generation,
                "Dropping failure superseded by a pending request"
            );
            return ResponseOutcome::Stale;
        }

        match mapped {
            Ok((seed, summary)) => {
                self.reported_summary = Some(summary);
                match self.session.as_mut() {
                    Some(session) => session.reset(seed),
                    None => {
                        self.session = Some(
                            PreviewSession::new(seed)
                                .with_max_plots_per_group(self.max_plots_per_group),
                        );
                    }
                }
                self.phase = if newer_pending {
                    DialogPhase::Recalculating
                } else {
                    DialogPhase::Editing
                };
                info!(
                    operation = %ticket.operation,
                    generation = ticket.generation,
                    "Preview applied"
                );
                ResponseOutcome::Applied
            }
            Err(e) => {
                self.fail(&e);
                ResponseOutcome::Failed
            }
        }
    }

    /// Applies an edit to the session.
    ///
    /// A failed dialog with a session returns to editing first.
    ///
    /// # Errors
    ///
    /// Returns a protocol error if the dialog is not editable and the edit's
    /// own error if it is refused.
    pub fn edit(&mut self, command: EditCommand) -> Result<EditOutcome, ApiError> {
        match self.phase {
            DialogPhase::Editing | DialogPhase::Recalculating => {}
            DialogPhase::Failed { .. } if self.session.is_some() => {
                self.phase = DialogPhase::Editing;
            }
            _ => return Err(self.invalid("edit").into()),
        }
        let session: &mut PreviewSession =
            self.session.as_mut().ok_or(ProtocolError::NoSession)?;
        Ok(apply(session, command)?)
    }

    /// Supervisor candidates for one group, annotated for the picker.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::NoSession` before a preview is loaded and the
    /// session's error if the group does not exist.
    pub fn supervisor_options(&self, group_number: u32) -> Result<Vec<SupervisorOption>, ApiError> {
        let session: &PreviewSession = self.session.as_ref().ok_or(ProtocolError::NoSession)?;
        Ok(session.supervisor_options(group_number)?)
    }

    /// Returns to a stable phase after a failure.
    ///
    /// With a session the dialog goes back to editing. Without one there is
    /// nothing to return to, so the dialog is closed.
    pub fn dismiss_error(&mut self) {
        if !matches!(self.phase, DialogPhase::Failed { .. }) {
            return;
        }
        if self.session.is_some() {
            self.phase = DialogPhase::Editing;
        } else {
            self.close();
        }
    }

    fn ensure_submittable(&self) -> Result<&PreviewSession, ProtocolError> {
        match self.phase {
            DialogPhase::Editing | DialogPhase::Failed { .. } => {}
            _ => return Err(self.invalid("submit")),
        }
        let session: &PreviewSession = self.session.as_ref().ok_or(ProtocolError::NoSession)?;
        let findings: Vec<ValidationFinding> = session.findings(&self.rules);
        let (errors, _warnings): (usize, usize) = count_by_severity(&findings);
        if errors > 0 {
            return Err(ProtocolError::BlockedByValidation { errors });
        }
        Ok(session)
    }

    /// Starts the submission of the edited groups.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::BlockedByValidation` while blocking errors
    /// exist, and `ProtocolError::InvalidTransition` unless the dialog is
    /// editing or failed with a session.
    pub fn begin_submit(
        &mut self,
        create_groups_immediately: bool,
    ) -> Result<SubmitTicket, ProtocolError> {
        let session: &PreviewSession = self.ensure_submittable()?;
        let request: SubmitGroupsRequest =
            submission_from_session(session, &self.context, create_groups_immediately);
        self.phase = DialogPhase::Submitting;
        info!(groups = request.groups.len(), "Submitting groups");
        Ok(SubmitTicket {
            lifecycle: self.lifecycle,
            request,
        })
    }

    /// Hands the submission response back to the dialog.
    ///
    /// On success the session is dropped and the dialog is done.
    pub fn complete_submit(
        &mut self,
        ticket: &SubmitTicket,
        result: Result<SubmitGroupsResponse, ServiceError>,
    ) -> ResponseOutcome {
        if ticket.lifecycle != self.lifecycle {
            return ResponseOutcome::Closed;
        }
        match result {
            Ok(response) => {
                info!(
                    groups_created = response.groups_created,
                    warnings = response.warnings.len(),
                    "Groups created"
                );
                self.session = None;
                self.phase = DialogPhase::Done { response };
                ResponseOutcome::Applied
            }
            Err(e) => {
                self.fail(&e);
                ResponseOutcome::Failed
            }
        }
    }

    /// Closes the dialog, dropping the session and anything in flight.
    pub fn close(&mut self) {
        self.lifecycle += 1;
        self.phase = DialogPhase::Idle;
        self.session = None;
        self.reported_summary = None;
        self.fetch_issued = false;
        debug!(lifecycle = self.lifecycle, "Dialog closed");
    }
}
