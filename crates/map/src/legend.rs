// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::palette::{Palette, UNGROUPED_COLOR};
use plotgroup::PreviewSession;
use plotgroup_domain::UngroupedPlot;
use serde::Serialize;

/// One line of the map legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    /// `None` for the ungrouped entry.
    pub group_number: Option<u32>,
    pub label: String,
    pub color: String,
    pub dashed: bool,
    pub plot_count: usize,
    pub total_area: f64,
}

/// Builds the legend: one entry per group, then ungrouped plots if any.
pub fn build_legend(session: &PreviewSession, palette: &mut Palette) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = session
        .edited_groups()
        .iter()
        .map(|group| LegendEntry {
            group_number: Some(group.group_number),
            label: group.group_name.clone(),
            color: palette.color_for(group.group_number).to_string(),
            dashed: false,
            plot_count: group.plot_count(),
            total_area: group.total_area(),
        })
        .collect();

    let ungrouped: &[UngroupedPlot] = session.ungrouped_plots();
    if !ungrouped.is_empty() {
        entries.push(LegendEntry {
            group_number: None,
            label: String::from("Ungrouped"),
            color: UNGROUPED_COLOR.to_string(),
            dashed: true,
            plot_count: ungrouped.len(),
            total_area: ungrouped.iter().map(|u| u.plot.area_ha).sum(),
        });
    }
    entries
}
