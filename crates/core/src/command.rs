// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotgroup_domain::{PlotId, SupervisorId};
use serde::{Deserialize, Serialize};

/// A supervisor selection for a group.
///
/// On the wire this is a nullable string; `null`, an empty string and the
/// sentinel `"none"` all mean [`SupervisorChoice::Unassigned`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum SupervisorChoice {
    /// Assign this supervisor.
    Assign(SupervisorId),
    /// Leave the group without a supervisor.
    #[default]
    Unassigned,
}

impl SupervisorChoice {
    /// The sentinel value meaning "no supervisor".
    pub const NONE_SENTINEL: &'static str = "none";
}

impl From<Option<String>> for SupervisorChoice {
    fn from(raw: Option<String>) -> Self {
        match raw {
            Some(id) if !id.trim().is_empty() && id.trim() != Self::NONE_SENTINEL => {
                Self::Assign(SupervisorId::new(id.trim()))
            }
            _ => Self::Unassigned,
        }
    }
}

impl From<SupervisorChoice> for Option<String> {
    fn from(choice: SupervisorChoice) -> Self {
        match choice {
            SupervisorChoice::Assign(id) => Some(id.as_str().to_string()),
            SupervisorChoice::Unassigned => None,
        }
    }
}

/// Editable fields of a group; absent fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupPatch {
    /// New group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    /// New supervisor selection. Send `"none"` to clear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<SupervisorChoice>,
}

/// An edit to the working copy, expressed as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditCommand {
    /// Merge editable fields onto a group.
    UpdateGroup {
        /// The group to update.
        group_number: u32,
        /// The fields to change.
        patch: GroupPatch,
    },
    /// Move a plot from a group into the removed pool.
    RemovePlot {
        /// The group to remove from.
        group_number: u32,
        /// The plot to remove.
        plot_id: PlotId,
    },
    /// Move a removed or ungrouped plot into a group.
    AddPlot {
        /// The group to add to.
        group_number: u32,
        /// The plot to add.
        plot_id: PlotId,
    },
    /// Assign or clear a group's supervisor.
    AssignSupervisor {
        /// The group to update.
        group_number: u32,
        /// The new selection.
        #[serde(default)]
        supervisor: SupervisorChoice,
    },
}

impl EditCommand {
    /// Returns the command name used in logs and outcomes.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdateGroup { .. } => "UpdateGroup",
            Self::RemovePlot { .. } => "RemovePlot",
            Self::AddPlot { .. } => "AddPlot",
            Self::AssignSupervisor { .. } => "AssignSupervisor",
        }
    }

    /// Returns the group the command targets.
    #[must_use]
    pub const fn group_number(&self) -> u32 {
        match self {
            Self::UpdateGroup { group_number, .. }
            | Self::RemovePlot { group_number, .. }
            | Self::AddPlot { group_number, .. }
            | Self::AssignSupervisor { group_number, .. } => *group_number,
        }
    }
}
