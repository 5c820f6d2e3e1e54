// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The two conversions between wire shapes and session types.
//!
//! Both are pure. `session_seed_from_preview` turns a preview response into
//! the seed of an editable session; `submission_from_session` turns the
//! edited groups back into a creation request.

use crate::error::ApiError;
use crate::params::SeasonContext;
use crate::request_response::{
    PlotDto, PreviewResponse, ProposedGroupDto, SubmitGroupDto, SubmitGroupsRequest,
    SupervisorDto, UngroupedPlotDto,
};
use plotgroup::{PreviewSession, SessionSeed};
use plotgroup_domain::{
    AssignedSupervisor, DomainError, FarmerId, NearbyGroup, Plot, PlotId, PreviewGroup,
    PreviewSummary, RiceVarietyId, SupervisorForAssignment, SupervisorId, UngroupReason,
    UngroupedPlot, parse_iso_date,
};
use std::collections::{BTreeMap, BTreeSet};
use time::Date;
use tracing::warn;

/// Converts a preview response into a session seed.
///
/// Group membership follows `plotIds` when the service sends them and the
/// order of `plots` otherwise. Reported counts and areas are not trusted;
/// the groups derive their own.
///
/// # Errors
///
/// Returns `ApiError::InvalidPreview` if a plot has an empty id or a
/// non-positive area, a group lists a plot twice, or a group lists a plot
/// id without sending the plot itself.
pub fn session_seed_from_preview(response: &PreviewResponse) -> Result<SessionSeed, ApiError> {
    let supervisors: Vec<SupervisorForAssignment> = response
        .available_supervisors
        .iter()
        .map(supervisor_from_dto)
        .collect();

    let groups: Vec<PreviewGroup> = response
        .proposed_groups
        .iter()
        .map(|dto| group_from_dto(dto, &supervisors))
        .collect::<Result<_, _>>()?;

    let ungrouped_plots: Vec<UngroupedPlot> = response
        .ungrouped_plots
        .iter()
        .map(ungrouped_from_dto)
        .collect::<Result<_, _>>()?;

    Ok(SessionSeed {
        groups,
        ungrouped_plots,
        available_supervisors: supervisors,
    })
}

/// Returns the counts the service reported alongside the preview.
#[must_use]
pub const fn reported_summary(response: &PreviewResponse) -> PreviewSummary {
    PreviewSummary {
        groups_to_be_formed: response.summary.groups_to_be_formed,
        plots_grouped: response.summary.plots_grouped,
        ungrouped_plots: response.summary.ungrouped_plots,
    }
}

/// Converts the edited groups of a session into a creation request.
///
/// Names are trimmed; every other field is carried over as edited.
#[must_use]
pub fn submission_from_session(
    session: &PreviewSession,
    context: &SeasonContext,
    create_groups_immediately: bool,
) -> SubmitGroupsRequest {
    SubmitGroupsRequest {
        cluster_id: context.cluster_id.clone(),
        season_id: context.season_id.clone(),
        year: context.year,
        create_groups_immediately,
        groups: session
            .edited_groups()
            .iter()
            .map(|group| SubmitGroupDto {
                group_name: group.group_name.trim().to_string(),
                rice_variety_id: group
                    .rice_variety_id
                    .as_ref()
                    .map(|id| id.as_str().to_string()),
                planting_window_start: group.planting_window_start,
                planting_window_end: group.planting_window_end,
                median_planting_date: group.median_planting_date(),
                plot_ids: group.plot_ids().map(|id| id.as_str().to_string()).collect(),
                supervisor_id: group.supervisor_id().map(|id| id.as_str().to_string()),
            })
            .collect(),
    }
}

fn lenient_date(field: &str, value: Option<&str>) -> Option<Date> {
    let value: &str = value.filter(|v| !v.trim().is_empty())?;
    match parse_iso_date(field, value) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable date");
            None
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn plot_from_dto(dto: &PlotDto) -> Result<Plot, ApiError> {
    if dto.plot_id.trim().is_empty() {
        return Err(ApiError::InvalidPreview(DomainError::EmptyPlotId.to_string()));
    }
    if !dto.area.is_finite() || dto.area <= 0.0 {
        return Err(ApiError::InvalidPreview(
            DomainError::InvalidPlotArea {
                plot_id: PlotId::new(dto.plot_id.clone()),
                area_ha: dto.area,
            }
            .to_string(),
        ));
    }

    let mut plot: Plot = Plot::new(PlotId::new(dto.plot_id.trim()), dto.area)
        .with_cadastral(dto.so_thua, dto.so_to);
    plot.farmer_id = non_empty(dto.farmer_id.as_deref()).map(FarmerId::new);
    plot.farmer_name = non_empty(dto.farmer_name.as_deref());
    plot.planting_date = lenient_date("plantingDate", dto.planting_date.as_deref());
    plot.boundary_geojson = dto
        .boundary_geojson
        .clone()
        .filter(|value| !value.is_null());
    plot.boundary_wkt = non_empty(dto.boundary_wkt.as_deref());
    Ok(plot)
}

fn supervisor_from_dto(dto: &SupervisorDto) -> SupervisorForAssignment {
    SupervisorForAssignment {
        supervisor_id: SupervisorId::new(dto.supervisor_id.trim()),
        full_name: dto.full_name.clone(),
        is_available: dto.is_available,
        unavailable_reason: if dto.is_available {
            None
        } else {
            non_empty(dto.unavailable_reason.as_deref())
        },
        current_group_count: dto.current_group_count,
        current_total_area: dto.current_total_area,
        max_area_capacity: dto.max_area_capacity,
        reported_remaining_area_capacity: dto.remaining_area_capacity,
    }
}

fn group_from_dto(
    dto: &ProposedGroupDto,
    supervisors: &[SupervisorForAssignment],
) -> Result<PreviewGroup, ApiError> {
    let mut details: BTreeMap<String, Plot> = BTreeMap::new();
    let mut detail_order: Vec<String> = Vec::new();
    for plot_dto in &dto.plots {
        let plot: Plot = plot_from_dto(plot_dto)?;
        let key: String = plot.plot_id.as_str().to_string();
        if details.insert(key.clone(), plot).is_some() {
            return Err(duplicate_in_group(dto.group_number, &key));
        }
        detail_order.push(key);
    }

    let membership: Vec<String> = if dto.plot_ids.is_empty() {
        detail_order
    } else {
        dto.plot_ids.iter().map(|id| id.trim().to_string()).collect()
    };

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut plots: Vec<Plot> = Vec::with_capacity(membership.len());
    for plot_id in &membership {
        if !seen.insert(plot_id.as_str()) {
            return Err(duplicate_in_group(dto.group_number, plot_id));
        }
        let plot: Plot = details.remove(plot_id).ok_or_else(|| {
            ApiError::InvalidPreview(format!(
                "group {} lists plot {plot_id} without sending its details",
                dto.group_number
            ))
        })?;
        plots.push(plot);
    }
    if !details.is_empty() {
        warn!(
            group_number = dto.group_number,
            ignored = details.len(),
            "Group sent plot details that are not in its plot ids"
        );
    }

    let supervisor: Option<AssignedSupervisor> =
        non_empty(dto.supervisor_id.as_deref()).map(|id| {
            let supervisor_id: SupervisorId = SupervisorId::new(id);
            let full_name: String = non_empty(dto.supervisor_name.as_deref())
                .or_else(|| {
                    supervisors
                        .iter()
                        .find(|s| s.supervisor_id == supervisor_id)
                        .map(|s| s.full_name.clone())
                })
                .unwrap_or_else(|| supervisor_id.as_str().to_string());
            AssignedSupervisor {
                supervisor_id,
                full_name,
            }
        });

    let group: PreviewGroup = PreviewGroup::new(dto.group_number, dto.group_name.clone(), plots)
        .with_rice_variety(
            non_empty(dto.rice_variety_id.as_deref()).map(RiceVarietyId::new),
            non_empty(dto.rice_variety_name.as_deref()),
        )
        .with_planting_window(
            lenient_date("plantingWindowStart", dto.planting_window_start.as_deref()),
            lenient_date("plantingWindowEnd", dto.planting_window_end.as_deref()),
        )
        .with_reported_median_planting_date(lenient_date(
            "medianPlantingDate",
            dto.median_planting_date.as_deref(),
        ))
        .with_supervisor(supervisor);

    if dto.plot_count.is_some_and(|count| count != group.plot_count()) {
        warn!(
            group_number = dto.group_number,
            reported = dto.plot_count,
            derived = group.plot_count(),
            "Reported plot count differs from membership"
        );
    }
    if dto
        .total_area
        .is_some_and(|area| (area - group.total_area()).abs() > 1e-6)
    {
        warn!(
            group_number = dto.group_number,
            reported = dto.total_area,
            derived = group.total_area(),
            "Reported total area differs from membership"
        );
    }

    Ok(group)
}

fn duplicate_in_group(group_number: u32, plot_id: &str) -> ApiError {
    ApiError::InvalidPreview(format!(
        "group {group_number} lists plot {plot_id} more than once"
    ))
}

fn ungrouped_from_dto(dto: &UngroupedPlotDto) -> Result<UngroupedPlot, ApiError> {
    Ok(UngroupedPlot {
        plot: plot_from_dto(&dto.plot)?,
        reason: UngroupReason::from_code(&dto.ungroup_reason),
        reason_description: dto.reason_description.clone(),
        distance_to_nearest_group: dto.distance_to_nearest_group,
        suggestions: dto.suggestions.clone(),
        nearby_groups: dto
            .nearby_groups
            .iter()
            .map(|g| NearbyGroup {
                group_number: g.group_number,
                group_name: g.group_name.clone(),
                distance_meters: g.distance_meters,
            })
            .collect(),
    })
}
