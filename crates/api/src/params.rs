// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inputs to the grouping algorithm.

use crate::error::ApiError;
use crate::request_response::FetchPreviewRequest;
use serde::{Deserialize, Serialize};

/// How the grouping service should weigh proximity against planting dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupingStrategy {
    /// Let the service balance both criteria.
    #[default]
    Auto,
    /// Cluster by distance first.
    ProximityFirst,
    /// Cluster by planting date first.
    PlantingDateFirst,
}

/// The season a preview is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonContext {
    pub cluster_id: String,
    pub season_id: String,
    pub year: i32,
}

/// User-tunable grouping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupingParameters {
    pub strategy: GroupingStrategy,
    /// Maximum distance between plots of one group.
    pub proximity_threshold_meters: f64,
    /// Maximum planting date spread around the group median.
    pub planting_date_tolerance_days: u32,
    pub min_group_area_ha: f64,
    pub max_group_area_ha: f64,
    pub min_plots: u32,
    pub max_plots: u32,
    /// Whether the service should propose supervisors.
    pub auto_assign_supervisors: bool,
}

impl Default for GroupingParameters {
    fn default() -> Self {
        Self {
            strategy: GroupingStrategy::Auto,
            proximity_threshold_meters: 100.0,
            planting_date_tolerance_days: 2,
            min_group_area_ha: 15.0,
            max_group_area_ha: 50.0,
            min_plots: 3,
            max_plots: 20,
            auto_assign_supervisors: true,
        }
    }
}

impl GroupingParameters {
    /// Checks the parameters are internally consistent.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidParameters` if a threshold is negative or
    /// not finite, or a minimum exceeds its maximum.
    pub fn validate(&self) -> Result<(), ApiError> {
        let finite_non_negative = |value: f64| value.is_finite() && value >= 0.0;

        if !finite_non_negative(self.proximity_threshold_meters) {
            return Err(ApiError::InvalidParameters(format!(
                "proximity threshold must be a non-negative distance, got {}",
                self.proximity_threshold_meters
            )));
        }
        if !finite_non_negative(self.min_group_area_ha)
            || !finite_non_negative(self.max_group_area_ha)
        {
            return Err(ApiError::InvalidParameters(String::from(
                "group area bounds must be non-negative",
            )));
        }
        if self.min_group_area_ha > self.max_group_area_ha {
            return Err(ApiError::InvalidParameters(format!(
                "minimum group area {} ha exceeds maximum {} ha",
                self.min_group_area_ha, self.max_group_area_ha
            )));
        }
        if self.min_plots == 0 {
            return Err(ApiError::InvalidParameters(String::from(
                "minimum plots per group must be at least 1",
            )));
        }
        if self.min_plots > self.max_plots {
            return Err(ApiError::InvalidParameters(format!(
                "minimum plots {} exceeds maximum {}",
                self.min_plots, self.max_plots
            )));
        }
        Ok(())
    }

    /// Builds the preview request for a season.
    #[must_use]
    pub fn to_request(&self, context: &SeasonContext) -> FetchPreviewRequest {
        FetchPreviewRequest {
            cluster_id: context.cluster_id.clone(),
            season_id: context.season_id.clone(),
            year: context.year,
            strategy: self.strategy,
            proximity_threshold_meters: self.proximity_threshold_meters,
            planting_date_tolerance_days: self.planting_date_tolerance_days,
            min_group_area_ha: self.min_group_area_ha,
            max_group_area_ha: self.max_group_area_ha,
            min_plots: self.min_plots,
            max_plots: self.max_plots,
            auto_assign_supervisors: self.auto_assign_supervisors,
        }
    }
}
