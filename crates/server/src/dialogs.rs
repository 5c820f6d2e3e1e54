// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Open dialogs and their map renderers.

use crate::AppState;
use crate::error::HttpError;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use plotgroup::{PreviewSession, SessionSummary};
use plotgroup_api::{
    DialogPhase, GroupingParameters, PreviewDialog, SeasonContext, SubmitGroupsResponse,
};
use plotgroup_domain::{
    Plot, PreviewGroup, PreviewSummary, SupervisorForAssignment, UngroupedPlot,
    ValidationFinding,
};
use plotgroup_map::{HighlightState, LegendEntry, MapRenderer, RenderKey, SceneSurface};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Opaque dialog handle, rendered as 16 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DialogId(u64);

impl DialogId {
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random::<u64>())
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for DialogId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Self)
    }
}

impl Serialize for DialogId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One open dialog and the map drawn from its session.
pub struct DialogEntry {
    pub dialog: PreviewDialog,
    pub renderer: MapRenderer<SceneSurface>,
}

impl DialogEntry {
    /// Brings the map up to date with the session, or clears it when there
    /// is no session.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer rejects a paint update.
    pub fn sync_map(&mut self) -> Result<(), HttpError> {
        match self.dialog.session() {
            Some(session) => {
                self.renderer.render(session)?;
            }
            None => {
                let removed: usize = self.renderer.clear();
                debug!(removed, "Cleared map for dialog without session");
            }
        }
        Ok(())
    }
}

/// All open dialogs, keyed by id.
#[derive(Clone, Default)]
pub struct DialogRegistry {
    entries: Arc<Mutex<HashMap<DialogId, DialogEntry>>>,
}

impl DialogRegistry {
    pub async fn lock(&self) -> MutexGuard<'_, HashMap<DialogId, DialogEntry>> {
        self.entries.lock().await
    }

    pub async fn contains(&self, id: DialogId) -> bool {
        self.entries.lock().await.contains_key(&id)
    }
}

/// Looks up an entry that may have been closed while the lock was released.
///
/// # Errors
///
/// Returns 404 if the dialog no longer exists.
pub fn entry_mut(
    entries: &mut HashMap<DialogId, DialogEntry>,
    id: DialogId,
) -> Result<&mut DialogEntry, HttpError> {
    entries
        .get_mut(&id)
        .ok_or_else(|| HttpError::not_found(format!("Dialog {id} not found")))
}

/// Extracts the `{id}` path segment of an existing dialog.
///
/// Rejects malformed ids with 400 and unknown ones with 404.
pub struct DialogPath(pub DialogId);

impl FromRequestParts<AppState> for DialogPath {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(params): Path<HashMap<String, String>> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|e| HttpError::bad_request(e.body_text()))?;
        let raw: &str = params
            .get("id")
            .ok_or_else(|| HttpError::bad_request("Missing dialog id"))?;
        let id: DialogId = raw
            .parse()
            .map_err(|_| HttpError::bad_request(format!("Malformed dialog id '{raw}'")))?;
        if !state.dialogs.contains(id).await {
            return Err(HttpError::not_found(format!("Dialog {id} not found")));
        }
        Ok(Self(id))
    }
}

/// Everything a client needs to draw the dialog.
#[derive(Debug, Clone, Serialize)]
pub struct DialogView {
    pub dialog_id: DialogId,
    pub phase: &'static str,
    pub context: SeasonContext,
    pub parameters: GroupingParameters,
    pub revision: Option<u64>,
    pub groups: Vec<PreviewGroup>,
    pub removed_plots: Vec<Plot>,
    pub ungrouped_plots: Vec<UngroupedPlot>,
    pub available_supervisors: Vec<SupervisorForAssignment>,
    pub findings: Vec<ValidationFinding>,
    pub summary: Option<SessionSummary>,
    pub reported_summary: Option<PreviewSummary>,
    pub can_submit: bool,
    pub last_error: Option<String>,
    pub result: Option<SubmitGroupsResponse>,
}

impl DialogView {
    #[must_use]
    pub fn of(id: DialogId, dialog: &PreviewDialog) -> Self {
        let session: Option<&PreviewSession> = dialog.session();
        Self {
            dialog_id: id,
            phase: dialog.phase().name(),
            context: dialog.context().clone(),
            parameters: *dialog.parameters(),
            revision: session.map(PreviewSession::revision),
            groups: session
                .map(|s| s.edited_groups().to_vec())
                .unwrap_or_default(),
            removed_plots: session
                .map(|s| s.removed_plots().to_vec())
                .unwrap_or_default(),
            ungrouped_plots: session
                .map(|s| s.ungrouped_plots().to_vec())
                .unwrap_or_default(),
            available_supervisors: session
                .map(|s| s.available_supervisors().to_vec())
                .unwrap_or_default(),
            findings: dialog.findings(),
            summary: session.map(PreviewSession::summary),
            reported_summary: dialog.reported_summary(),
            can_submit: dialog.can_submit(),
            last_error: dialog.last_error().map(str::to_string),
            result: match dialog.phase() {
                DialogPhase::Done { response } => Some(response.clone()),
                _ => None,
            },
        }
    }
}

/// The rendered scene of a dialog.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub dialog_id: DialogId,
    pub key: Option<RenderKey>,
    pub highlight: HighlightState,
    pub legend: Vec<LegendEntry>,
    pub scene: SceneSurface,
}

impl MapView {
    #[must_use]
    pub fn of(id: DialogId, renderer: &MapRenderer<SceneSurface>) -> Self {
        Self {
            dialog_id: id,
            key: renderer.rendered_key(),
            highlight: renderer.highlight().clone(),
            legend: renderer.legend().to_vec(),
            scene: renderer.surface().clone(),
        }
    }
}
