// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::PlotId;

/// The encoding a plot boundary was supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryFormat {
    /// Well-known text, e.g. `POLYGON((...))`.
    Wkt,
    /// A GeoJSON geometry, either as an object or string-encoded.
    GeoJson,
}

impl std::fmt::Display for BoundaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wkt => write!(f, "WKT"),
            Self::GeoJson => write!(f, "GeoJSON"),
        }
    }
}

/// Errors that can occur while decoding or validating domain data.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A boundary could not be decoded.
    GeometryDecode {
        /// The encoding that was being decoded.
        format: BoundaryFormat,
        /// What went wrong.
        reason: String,
    },
    /// A plot carries an area that is not a positive, finite number of hectares.
    InvalidPlotArea {
        /// The offending plot.
        plot_id: PlotId,
        /// The area as received.
        area_ha: f64,
    },
    /// A plot identifier is empty.
    EmptyPlotId,
    /// A date string could not be parsed.
    InvalidDate {
        /// The field that held the date.
        field: String,
        /// The raw value.
        value: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeometryDecode { format, reason } => {
                write!(f, "Failed to decode {format} boundary: {reason}")
            }
            Self::InvalidPlotArea { plot_id, area_ha } => {
                write!(
                    f,
                    "Plot {plot_id} has invalid area {area_ha}; area must be greater than 0 ha"
                )
            }
            Self::EmptyPlotId => write!(f, "Plot identifier cannot be empty"),
            Self::InvalidDate { field, value } => {
                write!(f, "Invalid date '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// Reasons an individual edit to a preview is refused.
///
/// Rejections are ordinary values: the caller shows the message and
/// the working copy stays exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum EditRejection {
    /// The plot is the last one in its group.
    LastPlotInGroup {
        /// The group that would be emptied.
        group_number: u32,
        /// The plot that was to be removed.
        plot_id: PlotId,
    },
    /// The plot is not a member of the group it was to be removed from.
    PlotNotInGroup {
        /// The group that was addressed.
        group_number: u32,
        /// The plot that was addressed.
        plot_id: PlotId,
    },
    /// The plot is already a member of the target group.
    AlreadyInGroup {
        /// The target group.
        group_number: u32,
        /// The plot that was to be added.
        plot_id: PlotId,
    },
    /// The plot belongs to a different group and must be removed there first.
    AssignedToOtherGroup {
        /// The plot that was to be added.
        plot_id: PlotId,
        /// The group that currently owns the plot.
        owner_group_number: u32,
    },
    /// The target group already holds the maximum number of plots.
    GroupAtCapacity {
        /// The target group.
        group_number: u32,
        /// The configured per-group cap.
        max_plots: usize,
    },
    /// The chosen supervisor is flagged unavailable.
    SupervisorUnavailable {
        /// The supervisor's display name.
        full_name: String,
        /// Why the supervisor cannot take the group.
        reason: String,
    },
}

impl std::fmt::Display for EditRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastPlotInGroup {
                group_number,
                plot_id,
            } => write!(
                f,
                "Cannot remove plot {plot_id}: it is the last plot in group {group_number}"
            ),
            Self::PlotNotInGroup {
                group_number,
                plot_id,
            } => write!(f, "Plot {plot_id} is not in group {group_number}"),
            Self::AlreadyInGroup {
                group_number,
                plot_id,
            } => write!(f, "Plot {plot_id} is already in group {group_number}"),
            Self::AssignedToOtherGroup {
                plot_id,
                owner_group_number,
            } => write!(
                f,
                "Plot {plot_id} already belongs to group {owner_group_number}; remove it from group {owner_group_number} first"
            ),
            Self::GroupAtCapacity {
                group_number,
                max_plots,
            } => write!(
                f,
                "Group {group_number} already has the maximum of {max_plots} plots"
            ),
            Self::SupervisorUnavailable { full_name, reason } => {
                write!(f, "Supervisor {full_name} is unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for EditRejection {}
