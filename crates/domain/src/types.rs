// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::dates::{iso_date, median_date};
use crate::geometry::{Geometry, RawBoundary, parse_boundary};
use serde::{Deserialize, Serialize};
use time::Date;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Stable, opaque key of a plot.
    PlotId
);
string_id!(
    /// Identifier of the farmer who works a plot.
    FarmerId
);
string_id!(
    /// Identifier of a supervisor.
    SupervisorId
);
string_id!(
    /// Identifier of a rice variety.
    RiceVarietyId
);

/// A farmed land parcel as fetched from the grouping service.
///
/// Plots are snapshots: groups hold copies keyed by `plot_id` and never
/// modify them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    /// The plot key.
    pub plot_id: PlotId,
    /// The farmer working the plot.
    pub farmer_id: Option<FarmerId>,
    /// The farmer's display name.
    pub farmer_name: Option<String>,
    /// Area in hectares.
    pub area_ha: f64,
    /// Planting date, if one has been recorded.
    #[serde(default, with = "iso_date::option")]
    pub planting_date: Option<Date>,
    /// Cadastral parcel number (số thửa).
    pub so_thua: Option<i32>,
    /// Cadastral map sheet number (số tờ).
    pub so_to: Option<i32>,
    /// Boundary as GeoJSON (object or string-encoded).
    pub boundary_geojson: Option<serde_json::Value>,
    /// Boundary as WKT.
    pub boundary_wkt: Option<String>,
}

impl Plot {
    /// Creates a plot with no farmer, dates or boundary.
    #[must_use]
    pub const fn new(plot_id: PlotId, area_ha: f64) -> Self {
        Self {
            plot_id,
            farmer_id: None,
            farmer_name: None,
            area_ha,
            planting_date: None,
            so_thua: None,
            so_to: None,
            boundary_geojson: None,
            boundary_wkt: None,
        }
    }

    /// Sets the farmer.
    #[must_use]
    pub fn with_farmer(mut self, farmer_id: FarmerId, farmer_name: impl Into<String>) -> Self {
        self.farmer_id = Some(farmer_id);
        self.farmer_name = Some(farmer_name.into());
        self
    }

    /// Sets the planting date.
    #[must_use]
    pub const fn with_planting_date(mut self, planting_date: Date) -> Self {
        self.planting_date = Some(planting_date);
        self
    }

    /// Sets the cadastral numbers.
    #[must_use]
    pub const fn with_cadastral(mut self, so_thua: Option<i32>, so_to: Option<i32>) -> Self {
        self.so_thua = so_thua;
        self.so_to = so_to;
        self
    }

    /// Sets the WKT boundary.
    #[must_use]
    pub fn with_boundary_wkt(mut self, wkt: impl Into<String>) -> Self {
        self.boundary_wkt = Some(wkt.into());
        self
    }

    /// Sets the GeoJSON boundary.
    #[must_use]
    pub fn with_boundary_geojson(mut self, geojson: serde_json::Value) -> Self {
        self.boundary_geojson = Some(geojson);
        self
    }

    /// Returns whether any boundary representation is present.
    #[must_use]
    pub const fn has_boundary(&self) -> bool {
        self.boundary_geojson.is_some() || self.boundary_wkt.is_some()
    }

    /// Decodes the plot boundary.
    ///
    /// GeoJSON is authoritative when both representations are present; WKT
    /// is only consulted when GeoJSON is missing or cannot be decoded.
    #[must_use]
    pub fn boundary(&self) -> Option<Geometry> {
        self.boundary_geojson
            .as_ref()
            .and_then(|value| parse_boundary(RawBoundary::Json(value)))
            .or_else(|| {
                self.boundary_wkt
                    .as_deref()
                    .and_then(|wkt| parse_boundary(RawBoundary::Text(wkt)))
            })
    }
}

/// The supervisor currently assigned to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedSupervisor {
    /// The supervisor key.
    pub supervisor_id: SupervisorId,
    /// The supervisor's display name.
    pub full_name: String,
}

/// A proposed work group within a preview.
///
/// Membership is an ordered list of plot snapshots. The plot count, total
/// area and median planting date are derived from it whenever it changes
/// and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewGroup {
    /// Ordinal of the group within one preview session.
    pub group_number: u32,
    /// User-editable name.
    pub group_name: String,
    /// The rice variety planted by the group.
    pub rice_variety_id: Option<RiceVarietyId>,
    /// The rice variety's display name.
    pub rice_variety_name: Option<String>,
    /// First day of the planting window.
    #[serde(with = "iso_date::option")]
    pub planting_window_start: Option<Date>,
    /// Last day of the planting window.
    #[serde(with = "iso_date::option")]
    pub planting_window_end: Option<Date>,
    /// Assigned supervisor; `None` is a valid, deliberate state.
    pub supervisor: Option<AssignedSupervisor>,
    plots: Vec<Plot>,
    plot_count: usize,
    total_area: f64,
    #[serde(with = "iso_date::option")]
    median_planting_date: Option<Date>,
    #[serde(skip)]
    reported_median_planting_date: Option<Date>,
}

impl PreviewGroup {
    /// Creates a group from its members.
    #[must_use]
    pub fn new(group_number: u32, group_name: impl Into<String>, plots: Vec<Plot>) -> Self {
        let mut group: Self = Self {
            group_number,
            group_name: group_name.into(),
            rice_variety_id: None,
            rice_variety_name: None,
            planting_window_start: None,
            planting_window_end: None,
            supervisor: None,
            plots,
            plot_count: 0,
            total_area: 0.0,
            median_planting_date: None,
            reported_median_planting_date: None,
        };
        group.recompute();
        group
    }

    /// Sets the rice variety.
    #[must_use]
    pub fn with_rice_variety(
        mut self,
        rice_variety_id: Option<RiceVarietyId>,
        rice_variety_name: Option<String>,
    ) -> Self {
        self.rice_variety_id = rice_variety_id;
        self.rice_variety_name = rice_variety_name;
        self
    }

    /// Sets the planting window.
    #[must_use]
    pub const fn with_planting_window(mut self, start: Option<Date>, end: Option<Date>) -> Self {
        self.planting_window_start = start;
        self.planting_window_end = end;
        self
    }

    /// Sets the median planting date reported by the grouping service.
    ///
    /// The reported value is used only while no member plot has a
    /// planting date of its own.
    #[must_use]
    pub fn with_reported_median_planting_date(mut self, median: Option<Date>) -> Self {
        self.reported_median_planting_date = median;
        self.recompute();
        self
    }

    /// Sets the assigned supervisor.
    #[must_use]
    pub fn with_supervisor(mut self, supervisor: Option<AssignedSupervisor>) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Returns the member plots in order.
    #[must_use]
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    /// Returns the member plot ids in order.
    pub fn plot_ids(&self) -> impl Iterator<Item = &PlotId> {
        self.plots.iter().map(|plot| &plot.plot_id)
    }

    /// Returns whether the plot is a member.
    #[must_use]
    pub fn contains_plot(&self, plot_id: &PlotId) -> bool {
        self.plots.iter().any(|plot| &plot.plot_id == plot_id)
    }

    /// Returns the number of member plots.
    #[must_use]
    pub const fn plot_count(&self) -> usize {
        self.plot_count
    }

    /// Returns the summed area of the member plots in hectares.
    #[must_use]
    pub const fn total_area(&self) -> f64 {
        self.total_area
    }

    /// Returns the median planting date of the group.
    #[must_use]
    pub const fn median_planting_date(&self) -> Option<Date> {
        self.median_planting_date
    }

    /// Returns the assigned supervisor's id.
    #[must_use]
    pub fn supervisor_id(&self) -> Option<&SupervisorId> {
        self.supervisor.as_ref().map(|s| &s.supervisor_id)
    }

    /// Appends a plot to the group.
    ///
    /// Membership rules are checked by the caller; see
    /// [`crate::can_add_plot`].
    pub fn push_plot(&mut self, plot: Plot) {
        self.plots.push(plot);
        self.recompute();
    }

    /// Removes a plot from the group, returning it if it was a member.
    pub fn take_plot(&mut self, plot_id: &PlotId) -> Option<Plot> {
        let index: usize = self.plots.iter().position(|p| &p.plot_id == plot_id)?;
        let plot: Plot = self.plots.remove(index);
        self.recompute();
        Some(plot)
    }

    fn recompute(&mut self) {
        self.plot_count = self.plots.len();
        self.total_area = self.plots.iter().map(|p| p.area_ha).sum();
        let dates: Vec<Date> = self.plots.iter().filter_map(|p| p.planting_date).collect();
        self.median_planting_date = median_date(&dates).or(self.reported_median_planting_date);
    }
}

/// A supervisor that may be assigned to a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupervisorForAssignment {
    /// The supervisor key.
    pub supervisor_id: SupervisorId,
    /// Display name.
    pub full_name: String,
    /// Whether the supervisor can take another group.
    pub is_available: bool,
    /// Why the supervisor cannot take another group; set iff unavailable.
    pub unavailable_reason: Option<String>,
    /// Groups already supervised this season.
    pub current_group_count: u32,
    /// Hectares already supervised this season.
    pub current_total_area: f64,
    /// Upper bound on supervised hectares; `None` means unconstrained.
    pub max_area_capacity: Option<f64>,
    /// Remaining hectares as reported by the service, if it reported one.
    pub reported_remaining_area_capacity: Option<f64>,
}

impl SupervisorForAssignment {
    /// Returns the remaining hectares this supervisor can take.
    ///
    /// A reported value wins; otherwise it is derived from the maximum and
    /// the current load. `None` means unconstrained.
    #[must_use]
    pub fn remaining_area_capacity(&self) -> Option<f64> {
        self.reported_remaining_area_capacity.or_else(|| {
            self.max_area_capacity
                .map(|max| (max - self.current_total_area).max(0.0))
        })
    }

    /// Returns whether a group of the given area fits the remaining capacity.
    #[must_use]
    pub fn can_take_area(&self, area_ha: f64) -> bool {
        self.remaining_area_capacity()
            .is_none_or(|remaining| area_ha <= remaining)
    }
}

/// Why the grouping algorithm left a plot out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UngroupReason {
    /// The plot has no planting date.
    MissingPlantingDate,
    /// The plot has no boundary to measure distance from.
    MissingBoundary,
    /// No group is within the proximity threshold.
    TooFarFromGroups,
    /// The planting date is outside every group's tolerance.
    PlantingDateMismatch,
    /// Nearby groups are already at their size limits.
    GroupCapacityReached,
    /// A reason code this client does not know.
    Other(String),
}

impl UngroupReason {
    /// Maps a service reason code onto a reason, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        let normalized: String = code.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "missingplantingdate" | "noplantingdate" => Self::MissingPlantingDate,
            "missingboundary" | "nocoordinates" | "noboundary" => Self::MissingBoundary,
            "toofarfromgroups" | "toofar" | "isolated" => Self::TooFarFromGroups,
            "plantingdatemismatch" | "plantingdateoutlier" => Self::PlantingDateMismatch,
            "groupcapacityreached" | "capacityexceeded" => Self::GroupCapacityReached,
            _ => Self::Other(code.to_string()),
        }
    }

    /// Returns the service reason code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::MissingPlantingDate => "MissingPlantingDate",
            Self::MissingBoundary => "MissingBoundary",
            Self::TooFarFromGroups => "TooFarFromGroups",
            Self::PlantingDateMismatch => "PlantingDateMismatch",
            Self::GroupCapacityReached => "GroupCapacityReached",
            Self::Other(code) => code,
        }
    }

    /// Returns a short human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::MissingPlantingDate => "No planting date",
            Self::MissingBoundary => "No boundary",
            Self::TooFarFromGroups => "Too far from other plots",
            Self::PlantingDateMismatch => "Planting date out of range",
            Self::GroupCapacityReached => "Nearby groups are full",
            Self::Other(code) => code,
        }
    }
}

/// A group near an ungrouped plot, ranked by distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyGroup {
    /// The candidate group.
    pub group_number: u32,
    /// The candidate group's name.
    pub group_name: String,
    /// Distance from the plot to the group in meters.
    pub distance_meters: f64,
}

/// A plot the grouping algorithm could not place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UngroupedPlot {
    /// The plot itself.
    pub plot: Plot,
    /// Machine reason.
    pub reason: UngroupReason,
    /// Human explanation supplied by the service.
    pub reason_description: String,
    /// Distance to the nearest group in meters.
    pub distance_to_nearest_group: Option<f64>,
    /// Free-text hints.
    pub suggestions: Vec<String>,
    /// Candidate groups, nearest first.
    pub nearby_groups: Vec<NearbyGroup>,
}

/// Counts reported by the grouping service for a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviewSummary {
    /// Number of groups the preview would create.
    pub groups_to_be_formed: usize,
    /// Number of plots placed into groups.
    pub plots_grouped: usize,
    /// Number of plots left out.
    pub ungrouped_plots: usize,
}
