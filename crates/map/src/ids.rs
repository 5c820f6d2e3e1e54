// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identifiers of everything the renderer puts on a surface.
//!
//! All ids start with one of three prefixes; clearing removes exactly the
//! ids carrying them and leaves anything else on the surface alone.

use plotgroup_domain::PlotId;

/// Prefix of grouped plot sources and layers.
pub const PLOT_PREFIX: &str = "plot-";
/// Prefix of group label markers.
pub const GROUP_PREFIX: &str = "group-";
/// Prefix of ungrouped plot sources, layers and markers.
pub const UNGROUPED_PREFIX: &str = "ungrouped-";

/// Returns whether the id belongs to the renderer.
#[must_use]
pub fn is_managed(id: &str) -> bool {
    [PLOT_PREFIX, GROUP_PREFIX, UNGROUPED_PREFIX]
        .iter()
        .any(|prefix| id.starts_with(prefix))
}

#[must_use]
pub fn plot_source(group_number: u32, plot_id: &PlotId) -> String {
    format!("{PLOT_PREFIX}{group_number}-{plot_id}")
}

#[must_use]
pub fn plot_fill(group_number: u32, plot_id: &PlotId) -> String {
    format!("{}-fill", plot_source(group_number, plot_id))
}

#[must_use]
pub fn plot_border(group_number: u32, plot_id: &PlotId) -> String {
    format!("{}-border", plot_source(group_number, plot_id))
}

#[must_use]
pub fn plot_point(group_number: u32, plot_id: &PlotId) -> String {
    format!("{}-point", plot_source(group_number, plot_id))
}

#[must_use]
pub fn group_marker(group_number: u32, plot_id: &PlotId) -> String {
    format!("{GROUP_PREFIX}{group_number}-{plot_id}")
}

#[must_use]
pub fn ungrouped_source(plot_id: &PlotId) -> String {
    format!("{UNGROUPED_PREFIX}{plot_id}")
}

#[must_use]
pub fn ungrouped_fill(plot_id: &PlotId) -> String {
    format!("{}-fill", ungrouped_source(plot_id))
}

#[must_use]
pub fn ungrouped_border(plot_id: &PlotId) -> String {
    format!("{}-border", ungrouped_source(plot_id))
}

#[must_use]
pub fn ungrouped_point(plot_id: &PlotId) -> String {
    format!("{}-point", ungrouped_source(plot_id))
}

#[must_use]
pub fn ungrouped_marker(plot_id: &PlotId) -> String {
    format!("{}-label", ungrouped_source(plot_id))
}
