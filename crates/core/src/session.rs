// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The editable working copy of a grouping preview.

use crate::command::{GroupPatch, SupervisorChoice};
use crate::error::CoreError;
use plotgroup_domain::{
    AssignedSupervisor, EditRejection, Plot, PlotId, PreviewGroup, SupervisorForAssignment,
    SupervisorId, UngroupedPlot, ValidationFinding, ValidationRules, can_add_plot,
    can_remove_plot, validate_with_rules,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Everything a session is seeded from: one preview response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSeed {
    /// Proposed groups, in response order.
    pub groups: Vec<PreviewGroup>,
    /// Plots the algorithm could not place.
    pub ungrouped_plots: Vec<UngroupedPlot>,
    /// Candidates for supervisor assignment.
    pub available_supervisors: Vec<SupervisorForAssignment>,
}

/// One entry of a group's supervisor picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupervisorOption {
    /// The supervisor key.
    pub supervisor_id: SupervisorId,
    /// Display name.
    pub full_name: String,
    /// Whether the supervisor can be selected.
    pub is_available: bool,
    /// Why the supervisor cannot be selected.
    pub unavailable_reason: Option<String>,
    /// Hectares the supervisor can still take; `None` is unconstrained.
    pub remaining_area_capacity: Option<f64>,
    /// Whether the group's current area fits the remaining capacity.
    pub fits_group_area: bool,
    /// Whether the supervisor is the group's current selection.
    pub is_current: bool,
}

/// Counts describing the working set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Number of groups, including empty ones.
    pub group_count: usize,
    /// Plots placed in some group.
    pub grouped_plot_count: usize,
    /// Hectares placed in some group.
    pub grouped_area: f64,
    /// Plots removed from groups during editing.
    pub removed_plot_count: usize,
    /// Plots the algorithm left out and nobody has placed yet.
    pub ungrouped_plot_count: usize,
}

/// The mutable projection of one preview response.
///
/// Every plot of the seeding response lives in exactly one place: a group,
/// the removed pool, or the ungrouped pool. Edits move plots between those
/// places and never drop them.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSession {
    session_id: u64,
    revision: u64,
    edited_groups: Vec<PreviewGroup>,
    removed_plots: Vec<Plot>,
    ungrouped_plots: Vec<UngroupedPlot>,
    available_supervisors: Vec<SupervisorForAssignment>,
    original_plot_ids: BTreeSet<PlotId>,
    max_plots_per_group: Option<usize>,
}

impl PreviewSession {
    /// Seeds a session from a preview response.
    #[must_use]
    pub fn new(seed: SessionSeed) -> Self {
        let original_plot_ids: BTreeSet<PlotId> = original_ids(&seed);
        let session: Self = Self {
            session_id: next_session_id(),
            revision: 0,
            edited_groups: seed.groups,
            removed_plots: Vec::new(),
            ungrouped_plots: seed.ungrouped_plots,
            available_supervisors: seed.available_supervisors,
            original_plot_ids,
            max_plots_per_group: None,
        };
        debug!(
            session_id = session.session_id,
            groups = session.edited_groups.len(),
            ungrouped = session.ungrouped_plots.len(),
            "Seeded preview session"
        );
        session
    }

    /// Caps the number of plots any group may hold after an add.
    #[must_use]
    pub const fn with_max_plots_per_group(mut self, max_plots_per_group: Option<usize>) -> Self {
        self.max_plots_per_group = max_plots_per_group;
        self
    }

    /// Identity of the seed this session was built from.
    #[must_use]
    pub const fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Number of successful edits since seeding.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The groups as edited so far.
    #[must_use]
    pub fn edited_groups(&self) -> &[PreviewGroup] {
        &self.edited_groups
    }

    /// Plots taken out of groups, awaiting re-assignment.
    #[must_use]
    pub fn removed_plots(&self) -> &[Plot] {
        &self.removed_plots
    }

    /// Plots the algorithm left out.
    #[must_use]
    pub fn ungrouped_plots(&self) -> &[UngroupedPlot] {
        &self.ungrouped_plots
    }

    /// Candidates for supervisor assignment.
    #[must_use]
    pub fn available_supervisors(&self) -> &[SupervisorForAssignment] {
        &self.available_supervisors
    }

    /// The per-group plot cap, if any.
    #[must_use]
    pub const fn max_plots_per_group(&self) -> Option<usize> {
        self.max_plots_per_group
    }

    /// Looks up a group by number.
    #[must_use]
    pub fn group(&self, group_number: u32) -> Option<&PreviewGroup> {
        self.edited_groups
            .iter()
            .find(|g| g.group_number == group_number)
    }

    fn group_index(&self, group_number: u32) -> Result<usize, CoreError> {
        self.edited_groups
            .iter()
            .position(|g| g.group_number == group_number)
            .ok_or(CoreError::GroupNotFound(group_number))
    }

    const fn touch(&mut self) {
        self.revision += 1;
    }

    /// Merges the patch's fields onto a group.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist or the supervisor in the
    /// patch cannot be assigned. Nothing is changed on error.
    pub fn update_group(&mut self, group_number: u32, patch: GroupPatch) -> Result<(), CoreError> {
        let index: usize = self.group_index(group_number)?;
        let supervisor: Option<Option<AssignedSupervisor>> = match &patch.supervisor {
            Some(choice) => Some(self.resolve_supervisor(&self.edited_groups[index], choice)?),
            None => None,
        };

        let group: &mut PreviewGroup = &mut self.edited_groups[index];
        if let Some(name) = patch.group_name {
            group.group_name = name;
        }
        if let Some(supervisor) = supervisor {
            group.supervisor = supervisor;
        }
        self.touch();
        Ok(())
    }

    /// Moves a plot from a group into the removed pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist, the plot is not a
    /// member, or the plot is the group's last one.
    pub fn remove_plot(&mut self, group_number: u32, plot_id: &PlotId) -> Result<(), CoreError> {
        let index: usize = self.group_index(group_number)?;
        can_remove_plot(&self.edited_groups[index], plot_id)?;

        let plot: Plot = self.edited_groups[index]
            .take_plot(plot_id)
            .ok_or_else(|| EditRejection::PlotNotInGroup {
                group_number,
                plot_id: plot_id.clone(),
            })?;
        self.removed_plots.push(plot);
        self.touch();
        Ok(())
    }

    /// Adds a plot to a group, taking it out of the removed or ungrouped
    /// pool if it is there.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist, the plot is already in
    /// this or another group, or the group is at the plot cap.
    pub fn add_plot(&mut self, group_number: u32, plot: Plot) -> Result<(), CoreError> {
        let index: usize = self.group_index(group_number)?;
        can_add_plot(
            &self.edited_groups[index],
            &plot.plot_id,
            &self.edited_groups,
            self.max_plots_per_group,
        )?;

        self.removed_plots.retain(|p| p.plot_id != plot.plot_id);
        self.ungrouped_plots
            .retain(|u| u.plot.plot_id != plot.plot_id);
        self.edited_groups[index].push_plot(plot);
        self.touch();
        Ok(())
    }

    /// Adds a removed or ungrouped plot to a group by id.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::PlotNotFound` if the plot is in neither pool, and
    /// otherwise the errors of [`Self::add_plot`].
    pub fn add_plot_by_id(&mut self, group_number: u32, plot_id: &PlotId) -> Result<(), CoreError> {
        // Membership errors name the owning group, so check them first.
        let index: usize = self.group_index(group_number)?;
        can_add_plot(
            &self.edited_groups[index],
            plot_id,
            &self.edited_groups,
            self.max_plots_per_group,
        )?;

        let plot: Plot = self
            .find_unassigned_plot(plot_id)
            .cloned()
            .ok_or_else(|| CoreError::PlotNotFound(plot_id.clone()))?;
        self.add_plot(group_number, plot)
    }

    /// Assigns or clears a group's supervisor.
    ///
    /// # Errors
    ///
    /// Returns an error if the group does not exist, the supervisor is not a
    /// candidate, or the supervisor is flagged unavailable.
    pub fn assign_supervisor(
        &mut self,
        group_number: u32,
        choice: &SupervisorChoice,
    ) -> Result<(), CoreError> {
        let index: usize = self.group_index(group_number)?;
        let supervisor: Option<AssignedSupervisor> =
            self.resolve_supervisor(&self.edited_groups[index], choice)?;
        self.edited_groups[index].supervisor = supervisor;
        self.touch();
        Ok(())
    }

    fn resolve_supervisor(
        &self,
        group: &PreviewGroup,
        choice: &SupervisorChoice,
    ) -> Result<Option<AssignedSupervisor>, CoreError> {
        let SupervisorChoice::Assign(supervisor_id) = choice else {
            return Ok(None);
        };
        let candidate: &SupervisorForAssignment = self
            .available_supervisors
            .iter()
            .find(|s| &s.supervisor_id == supervisor_id)
            .ok_or_else(|| CoreError::SupervisorNotFound(supervisor_id.clone()))?;

        // Keeping the current supervisor is always allowed, even if the
        // service now reports them as full.
        let is_current: bool = group.supervisor_id() == Some(supervisor_id);
        if !candidate.is_available && !is_current {
            return Err(EditRejection::SupervisorUnavailable {
                full_name: candidate.full_name.clone(),
                reason: candidate
                    .unavailable_reason
                    .clone()
                    .unwrap_or_else(|| String::from("no reason given")),
            }
            .into());
        }

        Ok(Some(AssignedSupervisor {
            supervisor_id: candidate.supervisor_id.clone(),
            full_name: candidate.full_name.clone(),
        }))
    }

    /// Lists supervisor candidates for one group.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::GroupNotFound` if the group does not exist.
    pub fn supervisor_options(&self, group_number: u32) -> Result<Vec<SupervisorOption>, CoreError> {
        let group: &PreviewGroup = self
            .group(group_number)
            .ok_or(CoreError::GroupNotFound(group_number))?;

        Ok(self
            .available_supervisors
            .iter()
            .map(|s| SupervisorOption {
                supervisor_id: s.supervisor_id.clone(),
                full_name: s.full_name.clone(),
                is_available: s.is_available,
                unavailable_reason: s.unavailable_reason.clone(),
                remaining_area_capacity: s.remaining_area_capacity(),
                fits_group_area: s.can_take_area(group.total_area()),
                is_current: group.supervisor_id() == Some(&s.supervisor_id),
            })
            .collect())
    }

    /// Finds a plot in the removed pool, then the ungrouped pool.
    #[must_use]
    pub fn find_unassigned_plot(&self, plot_id: &PlotId) -> Option<&Plot> {
        self.removed_plots
            .iter()
            .find(|p| &p.plot_id == plot_id)
            .or_else(|| {
                self.ungrouped_plots
                    .iter()
                    .map(|u| &u.plot)
                    .find(|p| &p.plot_id == plot_id)
            })
    }

    /// Validates the edited groups.
    #[must_use]
    pub fn findings(&self, rules: &ValidationRules) -> Vec<ValidationFinding> {
        validate_with_rules(&self.edited_groups, rules)
    }

    /// Summarizes the working set.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            group_count: self.edited_groups.len(),
            grouped_plot_count: self.edited_groups.iter().map(PreviewGroup::plot_count).sum(),
            grouped_area: self.edited_groups.iter().map(PreviewGroup::total_area).sum(),
            removed_plot_count: self.removed_plots.len(),
            ungrouped_plot_count: self.ungrouped_plots.len(),
        }
    }

    /// Checks that every original plot is in exactly one place.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AccountingViolation` for the first plot found in
    /// zero or several places.
    pub fn verify_accounting(&self) -> Result<(), CoreError> {
        for plot_id in &self.original_plot_ids {
            let in_groups: usize = self
                .edited_groups
                .iter()
                .flat_map(|g| g.plot_ids())
                .filter(|id| *id == plot_id)
                .count();
            let in_removed: usize = self
                .removed_plots
                .iter()
                .filter(|p| &p.plot_id == plot_id)
                .count();
            let in_ungrouped: usize = self
                .ungrouped_plots
                .iter()
                .filter(|u| &u.plot.plot_id == plot_id)
                .count();
            let occurrences: usize = in_groups + in_removed + in_ungrouped;
            if occurrences != 1 {
                return Err(CoreError::AccountingViolation {
                    plot_id: plot_id.clone(),
                    occurrences,
                });
            }
        }
        Ok(())
    }

    /// Replaces the whole working set with a fresh preview.
    ///
    /// All edits and the removed pool are discarded; the plot cap is kept.
    pub fn reset(&mut self, seed: SessionSeed) {
        let discarded: u64 = self.revision;
        let max_plots_per_group: Option<usize> = self.max_plots_per_group;
        *self = Self::new(seed).with_max_plots_per_group(max_plots_per_group);
        info!(
            session_id = self.session_id,
            discarded_edits = discarded,
            "Preview session reset"
        );
    }
}

fn original_ids(seed: &SessionSeed) -> BTreeSet<PlotId> {
    seed.groups
        .iter()
        .flat_map(|g| g.plot_ids())
        .cloned()
        .chain(seed.ungrouped_plots.iter().map(|u| u.plot.plot_id.clone()))
        .collect()
}
