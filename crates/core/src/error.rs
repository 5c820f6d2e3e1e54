// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotgroup_domain::{EditRejection, PlotId, SupervisorId};

/// Errors that can occur while editing a preview session.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// The edit was refused by a membership rule.
    Rejected(EditRejection),
    /// No group with this number exists in the session.
    GroupNotFound(u32),
    /// The plot is neither removed nor ungrouped, so it cannot be added.
    PlotNotFound(PlotId),
    /// The supervisor is not among the candidates offered by the preview.
    SupervisorNotFound(SupervisorId),
    /// A plot from the original preview is missing or appears more than once.
    AccountingViolation {
        /// The plot.
        plot_id: PlotId,
        /// How many places hold the plot.
        occurrences: usize,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(rejection) => write!(f, "{rejection}"),
            Self::GroupNotFound(number) => write!(f, "Group {number} not found"),
            Self::PlotNotFound(plot_id) => write!(
                f,
                "Plot {plot_id} is not available; only removed or ungrouped plots can be added"
            ),
            Self::SupervisorNotFound(supervisor_id) => {
                write!(f, "Supervisor {supervisor_id} is not available for assignment")
            }
            Self::AccountingViolation {
                plot_id,
                occurrences,
            } => write!(
                f,
                "Plot {plot_id} appears in {occurrences} places; expected exactly one"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<EditRejection> for CoreError {
    fn from(err: EditRejection) -> Self {
        Self::Rejected(err)
    }
}
