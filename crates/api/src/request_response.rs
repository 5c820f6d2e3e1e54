// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wire shapes exchanged with the grouping service.
//!
//! These mirror the service's JSON exactly. Conversion to and from the
//! session types happens in [`crate::mapping`] and nowhere else.

use crate::params::GroupingStrategy;
use plotgroup_domain::iso_date;
use serde::{Deserialize, Serialize};
use time::Date;

/// Request for a grouping preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPreviewRequest {
    /// The cluster whose plots are grouped.
    pub cluster_id: String,
    /// The season being planned.
    pub season_id: String,
    /// The season's year.
    pub year: i32,
    /// How the service should prioritize grouping criteria.
    pub strategy: GroupingStrategy,
    /// Maximum distance between plots of one group.
    pub proximity_threshold_meters: f64,
    /// Maximum spread of planting dates within a group.
    pub planting_date_tolerance_days: u32,
    /// Smallest group area in hectares.
    pub min_group_area_ha: f64,
    /// Largest group area in hectares.
    pub max_group_area_ha: f64,
    /// Fewest plots per group.
    pub min_plots: u32,
    /// Most plots per group.
    pub max_plots: u32,
    /// Whether the service proposes supervisors.
    pub auto_assign_supervisors: bool,
}

/// A plot as sent by the service.
///
/// Dates are kept as strings here; the mapping parses them leniently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDto {
    /// Unique plot identifier.
    pub plot_id: String,
    /// The owning farmer.
    #[serde(default)]
    pub farmer_id: Option<String>,
    /// The farmer's display name.
    #[serde(default)]
    pub farmer_name: Option<String>,
    /// Area in hectares.
    pub area: f64,
    /// Planting date as the service formats it.
    #[serde(default)]
    pub planting_date: Option<String>,
    /// Cadastral parcel number.
    #[serde(default)]
    pub so_thua: Option<i32>,
    /// Cadastral map sheet number.
    #[serde(default)]
    pub so_to: Option<i32>,
    /// Boundary as a GeoJSON object or string.
    #[serde(default, rename = "boundaryGeoJson")]
    pub boundary_geojson: Option<serde_json::Value>,
    /// Boundary as WKT.
    #[serde(default)]
    pub boundary_wkt: Option<String>,
}

/// A proposed group as sent by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedGroupDto {
    /// Group number, unique within the preview.
    pub group_number: u32,
    /// Proposed display name.
    pub group_name: String,
    /// Dominant rice variety.
    #[serde(default)]
    pub rice_variety_id: Option<String>,
    /// Display name of the rice variety.
    #[serde(default)]
    pub rice_variety_name: Option<String>,
    /// First day of the planting window.
    #[serde(default)]
    pub planting_window_start: Option<String>,
    /// Last day of the planting window.
    #[serde(default)]
    pub planting_window_end: Option<String>,
    /// Reported by the service; recomputed locally.
    #[serde(default)]
    pub median_planting_date: Option<String>,
    /// Proposed supervisor.
    #[serde(default)]
    pub supervisor_id: Option<String>,
    /// Display name of the proposed supervisor.
    #[serde(default)]
    pub supervisor_name: Option<String>,
    /// Member order; plot details come from `plots`.
    #[serde(default)]
    pub plot_ids: Vec<String>,
    /// Member details.
    #[serde(default)]
    pub plots: Vec<PlotDto>,
    /// Reported by the service; recomputed locally.
    #[serde(default)]
    pub plot_count: Option<usize>,
    /// Reported by the service; recomputed locally.
    #[serde(default)]
    pub total_area: Option<f64>,
}

/// A supervisor candidate as sent by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorDto {
    /// Supervisor identifier.
    pub supervisor_id: String,
    /// Display name.
    pub full_name: String,
    /// Whether the supervisor can take a group; absent means available.
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Why the supervisor is unavailable.
    #[serde(default)]
    pub unavailable_reason: Option<String>,
    /// Groups already supervised this season.
    #[serde(default)]
    pub current_group_count: u32,
    /// Hectares already supervised this season.
    #[serde(default)]
    pub current_total_area: f64,
    /// Most hectares the supervisor may hold.
    #[serde(default)]
    pub max_area_capacity: Option<f64>,
    /// Hectares still available.
    #[serde(default)]
    pub remaining_area_capacity: Option<f64>,
}

const fn default_true() -> bool {
    true
}

/// A group near an ungrouped plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyGroupDto {
    /// The nearby group.
    pub group_number: u32,
    /// Its display name.
    #[serde(default)]
    pub group_name: String,
    /// Distance from the plot in meters.
    pub distance_meters: f64,
}

/// An ungrouped plot: the plot's own fields plus the reason it was left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UngroupedPlotDto {
    /// The plot itself.
    #[serde(flatten)]
    pub plot: PlotDto,
    /// Machine-readable reason code.
    pub ungroup_reason: String,
    /// Human-readable reason.
    #[serde(default)]
    pub reason_description: String,
    /// Meters to the closest proposed group.
    #[serde(default)]
    pub distance_to_nearest_group: Option<f64>,
    /// Hints for placing the plot by hand.
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Groups the plot could join.
    #[serde(default)]
    pub nearby_groups: Vec<NearbyGroupDto>,
}

/// Counts the service reports with a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummaryDto {
    /// Number of proposed groups.
    pub groups_to_be_formed: usize,
    /// Plots placed in a group.
    pub plots_grouped: usize,
    /// Plots left out.
    pub ungrouped_plots: usize,
}

/// Response to a preview request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewResponse {
    /// The proposed groups, in display order.
    pub proposed_groups: Vec<ProposedGroupDto>,
    /// Supervisor candidates.
    pub available_supervisors: Vec<SupervisorDto>,
    /// Plots the service could not place.
    pub ungrouped_plots: Vec<UngroupedPlotDto>,
    /// Reported counts.
    pub summary: PreviewSummaryDto,
}

/// One group of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGroupDto {
    /// Final group name.
    pub group_name: String,
    /// Rice variety carried over from the preview.
    pub rice_variety_id: Option<String>,
    /// First day of the planting window.
    #[serde(with = "iso_date::option")]
    pub planting_window_start: Option<Date>,
    /// Last day of the planting window.
    #[serde(with = "iso_date::option")]
    pub planting_window_end: Option<Date>,
    /// Median planting date of the final members.
    #[serde(with = "iso_date::option")]
    pub median_planting_date: Option<Date>,
    /// Final members.
    pub plot_ids: Vec<String>,
    /// Assigned supervisor; omitted when none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_id: Option<String>,
}

/// Request to create the confirmed groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGroupsRequest {
    /// The cluster the groups belong to.
    pub cluster_id: String,
    /// The season being planned.
    pub season_id: String,
    /// The season's year.
    pub year: i32,
    /// Create the groups now rather than as drafts.
    pub create_groups_immediately: bool,
    /// The groups to create.
    pub groups: Vec<SubmitGroupDto>,
}

/// Response to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmitGroupsResponse {
    /// Number of groups the service created.
    pub groups_created: usize,
    /// Non-fatal notes from the service.
    pub warnings: Vec<String>,
}
