// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route handlers.
//!
//! The registry lock is never held across a grouping-service call: each
//! round-trip takes a ticket under the lock, calls the service unlocked and
//! hands the ticket back under the lock again.

use crate::AppState;
use crate::dialogs::{DialogEntry, DialogId, DialogPath, DialogView, MapView, entry_mut};
use crate::error::HttpError;
use crate::live::LiveObserver;
use axum::{
    Json,
    extract::{Path, State as AxumState},
    http::StatusCode,
};
use plotgroup::{EditCommand, EditOutcome, SupervisorOption};
use plotgroup_api::{
    DialogObserver, DialogPhase, GroupingParameters, Operation, PreviewDialog, PreviewResponse,
    PreviewTicket, ResponseOutcome, SeasonContext, ServiceError, SubmitGroupsResponse,
    SubmitTicket, notify_submitted,
};
use plotgroup_map::{HighlightState, MapConfig, MapRenderer, SceneSurface};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Request body for opening a dialog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenDialogRequest {
    /// The cluster and season to plan.
    #[serde(flatten)]
    pub context: SeasonContext,
    /// Parameters for the first preview; defaults apply when absent.
    #[serde(default)]
    pub parameters: Option<GroupingParameters>,
}

/// Request body for a recalculation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecalculateRequest {
    /// New parameters; the current ones are reused when absent.
    #[serde(default)]
    pub parameters: Option<GroupingParameters>,
}

/// Request body for a submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitRequest {
    /// Create the groups now rather than as drafts.
    #[serde(default = "default_create_immediately")]
    pub create_groups_immediately: bool,
}

const fn default_create_immediately() -> bool {
    true
}

/// Response to an edit.
#[derive(Debug, Clone, Serialize)]
pub struct EditResponse {
    /// What the edit changed.
    pub outcome: EditOutcome,
    /// The dialog after the edit.
    pub view: DialogView,
}

/// Response to a submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    /// What the service created.
    pub result: SubmitGroupsResponse,
    /// The dialog after the submission.
    pub view: DialogView,
}

fn report_failure(state: &AppState, id: DialogId, dialog: &PreviewDialog) {
    if let DialogPhase::Failed { operation, message } = dialog.phase() {
        let observer: LiveObserver<'_> = LiveObserver {
            broadcaster: &state.live,
            dialog_id: id,
            context: dialog.context(),
        };
        observer.failed(*operation, message);
    }
}

/// Completes a preview or recalculation round-trip under the lock.
async fn finish_fetch(
    state: &AppState,
    id: DialogId,
    ticket: &PreviewTicket,
    result: Result<PreviewResponse, ServiceError>,
) -> Result<DialogView, HttpError> {
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    let outcome: ResponseOutcome = match ticket.operation() {
        Operation::Recalculate => entry.dialog.complete_recalculate(ticket, result),
        Operation::Preview | Operation::Submit => entry.dialog.complete_preview(ticket, result),
    };
    match outcome {
        ResponseOutcome::Failed => {
            report_failure(state, id, &entry.dialog);
            Err(HttpError {
                status: StatusCode::BAD_GATEWAY,
                message: entry
                    .dialog
                    .last_error()
                    .unwrap_or("Could not load the grouping preview")
                    .to_string(),
            })
        }
        ResponseOutcome::Applied | ResponseOutcome::Stale | ResponseOutcome::Closed => {
            entry.sync_map()?;
            Ok(DialogView::of(id, &entry.dialog))
        }
    }
}

/// Handler for POST `/dialogs`.
///
/// Opens a dialog and loads its first preview.
pub async fn handle_open_dialog(
    AxumState(state): AxumState<AppState>,
    Json(req): Json<OpenDialogRequest>,
) -> Result<(StatusCode, Json<DialogView>), HttpError> {
    let parameters: GroupingParameters = req.parameters.unwrap_or_default();
    parameters.validate()?;
    info!(
        cluster_id = %req.context.cluster_id,
        season_id = %req.context.season_id,
        "Opening grouping dialog"
    );

    let id: DialogId = DialogId::random();
    let mut dialog: PreviewDialog = PreviewDialog::new(req.context, parameters)
        .with_rules(state.settings.rules)
        .with_max_plots_per_group(state.settings.max_plots_per_group);
    let ticket: PreviewTicket = dialog
        .open()
        .ok_or_else(|| HttpError::bad_request("Dialog is already open"))?;
    state.dialogs.lock().await.insert(
        id,
        DialogEntry {
            dialog,
            renderer: MapRenderer::new(SceneSurface::new(), state.settings.map),
        },
    );

    let result: Result<PreviewResponse, ServiceError> = state
        .service
        .fetch_preview(ticket.request().clone(), ticket.operation())
        .await;
    match finish_fetch(&state, id, &ticket, result).await {
        Ok(view) => Ok((StatusCode::CREATED, Json(view))),
        Err(e) => {
            // The id was never returned to a client.
            state.dialogs.lock().await.remove(&id);
            warn!(dialog_id = %id, error = %e.message, "Discarding dialog after failed open");
            Err(e)
        }
    }
}

/// Handler for GET `/dialogs/{id}`.
pub async fn handle_get_dialog(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
) -> Result<Json<DialogView>, HttpError> {
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    Ok(Json(DialogView::of(id, &entry.dialog)))
}

/// Handler for POST `/dialogs/{id}/edits`.
pub async fn handle_edit(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
    Json(command): Json<EditCommand>,
) -> Result<Json<EditResponse>, HttpError> {
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    let outcome: EditOutcome = entry.dialog.edit(command)?;
    entry.sync_map()?;
    info!(dialog_id = %id, description = %outcome.description, "Dialog edited");
    Ok(Json(EditResponse {
        outcome,
        view: DialogView::of(id, &entry.dialog),
    }))
}

/// Handler for GET `/dialogs/{id}/supervisors/{group_number}`.
pub async fn handle_supervisor_options(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
    Path(params): Path<HashMap<String, String>>,
) -> Result<Json<Vec<SupervisorOption>>, HttpError> {
    let group_number: u32 = params
        .get("group_number")
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| HttpError::bad_request("Malformed group number"))?;
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    Ok(Json(entry.dialog.supervisor_options(group_number)?))
}

/// Handler for POST `/dialogs/{id}/recalculate`.
///
/// Discards all edits in favor of a fresh preview.
pub async fn handle_recalculate(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
    Json(req): Json<RecalculateRequest>,
) -> Result<Json<DialogView>, HttpError> {
    let ticket: PreviewTicket = {
        let mut entries = state.dialogs.lock().await;
        let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
        if let Some(parameters) = req.parameters {
            entry.dialog.set_parameters(parameters)?;
        }
        entry.dialog.begin_recalculate()?
    };

    let result: Result<PreviewResponse, ServiceError> = state
        .service
        .fetch_preview(ticket.request().clone(), ticket.operation())
        .await;
    Ok(Json(finish_fetch(&state, id, &ticket, result).await?))
}

/// Handler for POST `/dialogs/{id}/submit`.
pub async fn handle_submit(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, HttpError> {
    let ticket: SubmitTicket = {
        let mut entries = state.dialogs.lock().await;
        let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
        entry.dialog.begin_submit(req.create_groups_immediately)?
    };

    let result: Result<SubmitGroupsResponse, ServiceError> = state
        .service
        .submit_groups(ticket.request().clone())
        .await;

    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    let outcome: ResponseOutcome = entry.dialog.complete_submit(&ticket, result.clone());
    match (outcome, result) {
        (ResponseOutcome::Applied, Ok(response)) => {
            let observer: LiveObserver<'_> = LiveObserver {
                broadcaster: &state.live,
                dialog_id: id,
                context: entry.dialog.context(),
            };
            notify_submitted(&observer, &response);
            entry.sync_map()?;
            Ok(Json(SubmitResponse {
                result: response,
                view: DialogView::of(id, &entry.dialog),
            }))
        }
        (_, Err(e)) => {
            report_failure(&state, id, &entry.dialog);
            Err(e.into())
        }
        (outcome, Ok(_)) => {
            warn!(dialog_id = %id, ?outcome, "Submission response arrived for a closed dialog");
            Err(HttpError::not_found(format!("Dialog {id} was closed")))
        }
    }
}

/// Handler for POST `/dialogs/{id}/dismiss`.
pub async fn handle_dismiss_error(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
) -> Result<Json<DialogView>, HttpError> {
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    entry.dialog.dismiss_error();
    entry.sync_map()?;
    Ok(Json(DialogView::of(id, &entry.dialog)))
}

/// Handler for DELETE `/dialogs/{id}`.
///
/// Closes the dialog and tears down its map.
pub async fn handle_close_dialog(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
) -> Result<StatusCode, HttpError> {
    let mut entry: DialogEntry = state
        .dialogs
        .lock()
        .await
        .remove(&id)
        .ok_or_else(|| HttpError::not_found(format!("Dialog {id} not found")))?;
    entry.dialog.close();
    let surface: SceneSurface = entry.renderer.dispose();
    info!(
        dialog_id = %id,
        remaining_layers = surface.layers().len(),
        "Dialog closed"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/dialogs/{id}/map`.
pub async fn handle_get_map(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
) -> Result<Json<MapView>, HttpError> {
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    entry.sync_map()?;
    Ok(Json(MapView::of(id, &entry.renderer)))
}

/// Handler for POST `/dialogs/{id}/highlight`.
pub async fn handle_highlight(
    AxumState(state): AxumState<AppState>,
    DialogPath(id): DialogPath,
    Json(highlight): Json<HighlightState>,
) -> Result<Json<MapView>, HttpError> {
    let mut entries = state.dialogs.lock().await;
    let entry: &mut DialogEntry = entry_mut(&mut entries, id)?;
    entry.sync_map()?;
    entry.renderer.set_highlight(highlight)?;
    Ok(Json(MapView::of(id, &entry.renderer)))
}

/// Handler for GET `/map/config`.
pub async fn handle_map_config(AxumState(state): AxumState<AppState>) -> Json<MapConfig> {
    Json(state.settings.map)
}
