// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rules that gate submission of a set of proposed groups.
//!
//! Every function here is pure: the same groups always produce the same
//! findings, in the same order.

use crate::error::EditRejection;
use crate::types::{PlotId, PreviewGroup};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks submission.
    Error,
    /// Shown to the user but does not block submission.
    Warning,
}

/// A single classified validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Whether the finding blocks submission.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// The group the finding is about, when it concerns exactly one group.
    pub group_number: Option<u32>,
}

impl ValidationFinding {
    fn error(message: String, group_number: Option<u32>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            group_number,
        }
    }

    fn warning(message: String, group_number: Option<u32>) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            group_number,
        }
    }

    /// Returns whether this finding blocks submission.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Thresholds for the size warnings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Groups with fewer plots than this (but at least one) are warned about.
    pub min_plots_per_group: usize,
    /// Groups with a positive area below this many hectares are warned about.
    pub min_group_area_ha: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_plots_per_group: 3,
            min_group_area_ha: 5.0,
        }
    }
}

/// Validates groups against the default rules.
#[must_use]
pub fn validate(groups: &[PreviewGroup]) -> Vec<ValidationFinding> {
    validate_with_rules(groups, &ValidationRules::default())
}

/// Validates groups against explicit rules.
///
/// All rules run; their order only determines the order of the findings:
///
/// 1. empty group (error)
/// 2. plot assigned to more than one group (error)
/// 3. groups without a supervisor (one aggregated warning)
/// 4. blank group name (error)
/// 5. duplicate group name, compared trimmed and case-insensitively (error)
/// 6. undersized group (warning)
/// 7. undersized area (warning)
#[must_use]
pub fn validate_with_rules(
    groups: &[PreviewGroup],
    rules: &ValidationRules,
) -> Vec<ValidationFinding> {
    let mut findings: Vec<ValidationFinding> = Vec::new();

    // Rule 1: every group needs at least one plot
    for group in groups.iter().filter(|g| g.plot_count() == 0) {
        findings.push(ValidationFinding::error(
            format!(
                "Group {} ({}) has no plots",
                group.group_number, group.group_name
            ),
            Some(group.group_number),
        ));
    }

    // Rule 2: a plot belongs to at most one group
    let mut owners: BTreeMap<&PlotId, Vec<u32>> = BTreeMap::new();
    for group in groups {
        for plot_id in group.plot_ids() {
            owners.entry(plot_id).or_default().push(group.group_number);
        }
    }
    for (plot_id, group_numbers) in owners.iter().filter(|(_, owners)| owners.len() > 1) {
        let listed: Vec<String> = group_numbers.iter().map(ToString::to_string).collect();
        findings.push(ValidationFinding::error(
            format!(
                "Plot {plot_id} is assigned to multiple groups: {}",
                listed.join(", ")
            ),
            None,
        ));
    }

    // Rule 3: supervisors are optional but worth pointing out
    let unsupervised: usize = groups.iter().filter(|g| g.supervisor.is_none()).count();
    if unsupervised > 0 {
        findings.push(ValidationFinding::warning(
            format!("{unsupervised} group(s) have no supervisor assigned"),
            None,
        ));
    }

    // Rule 4: names must not be blank
    for group in groups.iter().filter(|g| g.group_name.trim().is_empty()) {
        findings.push(ValidationFinding::error(
            format!("Group {} has an empty name", group.group_number),
            Some(group.group_number),
        ));
    }

    // Rule 5: names must be unique, ignoring case and surrounding whitespace
    let mut by_name: Vec<(String, &str, Vec<u32>)> = Vec::new();
    for group in groups {
        let normalized: String = group.group_name.trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        match by_name.iter_mut().find(|(name, _, _)| *name == normalized) {
            Some((_, _, numbers)) => numbers.push(group.group_number),
            None => by_name.push((
                normalized,
                group.group_name.trim(),
                vec![group.group_number],
            )),
        }
    }
    for (_, display, numbers) in by_name.iter().filter(|(_, _, n)| n.len() > 1) {
        let listed: Vec<String> = numbers.iter().map(ToString::to_string).collect();
        findings.push(ValidationFinding::error(
            format!(
                "Group name '{display}' is used by multiple groups: {}",
                listed.join(", ")
            ),
            None,
        ));
    }

    // Rule 6: small but non-empty groups
    for group in groups
        .iter()
        .filter(|g| g.plot_count() > 0 && g.plot_count() < rules.min_plots_per_group)
    {
        findings.push(ValidationFinding::warning(
            format!(
                "Group {} ({}) has only {} plot(s); at least {} are recommended",
                group.group_number,
                group.group_name,
                group.plot_count(),
                rules.min_plots_per_group
            ),
            Some(group.group_number),
        ));
    }

    // Rule 7: small but non-zero area
    for group in groups
        .iter()
        .filter(|g| g.total_area() > 0.0 && g.total_area() < rules.min_group_area_ha)
    {
        findings.push(ValidationFinding::warning(
            format!(
                "Group {} ({}) covers {:.2} ha, below the minimum of {} ha",
                group.group_number,
                group.group_name,
                group.total_area(),
                rules.min_group_area_ha
            ),
            Some(group.group_number),
        ));
    }

    findings
}

/// Returns whether any finding blocks submission.
#[must_use]
pub fn has_blocking_errors(findings: &[ValidationFinding]) -> bool {
    findings.iter().any(ValidationFinding::is_blocking)
}

/// Counts findings as `(errors, warnings)`.
#[must_use]
pub fn count_by_severity(findings: &[ValidationFinding]) -> (usize, usize) {
    let errors: usize = findings.iter().filter(|f| f.is_blocking()).count();
    (errors, findings.len() - errors)
}

/// Checks whether a plot may be removed from a group.
///
/// Removing the last plot is refused: a group is never emptied as a side
/// effect of plot removal.
///
/// # Errors
///
/// Returns `EditRejection::PlotNotInGroup` if the plot is not a member and
/// `EditRejection::LastPlotInGroup` if it is the only member.
pub fn can_remove_plot(group: &PreviewGroup, plot_id: &PlotId) -> Result<(), EditRejection> {
    if !group.contains_plot(plot_id) {
        return Err(EditRejection::PlotNotInGroup {
            group_number: group.group_number,
            plot_id: plot_id.clone(),
        });
    }
    if group.plot_count() <= 1 {
        return Err(EditRejection::LastPlotInGroup {
            group_number: group.group_number,
            plot_id: plot_id.clone(),
        });
    }
    Ok(())
}

/// Checks whether a plot may be added to a group.
///
/// # Arguments
///
/// * `group` - The target group
/// * `plot_id` - The plot to add
/// * `all_groups` - Every group in the working set, including the target
/// * `max_plots_per_group` - Optional cap on group size
///
/// # Errors
///
/// Returns an error if:
/// - The plot is already in the target group
/// - The plot belongs to another group (the error names that group)
/// - The target group is at the cap
pub fn can_add_plot(
    group: &PreviewGroup,
    plot_id: &PlotId,
    all_groups: &[PreviewGroup],
    max_plots_per_group: Option<usize>,
) -> Result<(), EditRejection> {
    if group.contains_plot(plot_id) {
        return Err(EditRejection::AlreadyInGroup {
            group_number: group.group_number,
            plot_id: plot_id.clone(),
        });
    }

    if let Some(owner) = all_groups
        .iter()
        .find(|g| g.group_number != group.group_number && g.contains_plot(plot_id))
    {
        return Err(EditRejection::AssignedToOtherGroup {
            plot_id: plot_id.clone(),
            owner_group_number: owner.group_number,
        });
    }

    if let Some(max_plots) = max_plots_per_group {
        if group.plot_count() >= max_plots {
            return Err(EditRejection::GroupAtCapacity {
                group_number: group.group_number,
                max_plots,
            });
        }
    }

    Ok(())
}
