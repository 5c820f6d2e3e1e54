// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotgroup_domain::PreviewGroup;
use std::collections::BTreeMap;

/// Group colors, handed out in order.
pub const GROUP_PALETTE: [&str; 6] = [
    "#3b82f6", "#10b981", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// Fill and border color of ungrouped plots.
pub const UNGROUPED_COLOR: &str = "#f59e0b";

/// Dash pattern of ungrouped plot borders.
pub const UNGROUPED_DASH: [f64; 2] = [2.0, 2.0];

/// Color assignment keyed by group number.
///
/// Seeding walks the groups in order, so an untouched preview is colored
/// exactly as if by position. Once assigned, a group keeps its color for the
/// life of the palette regardless of what happens to other groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    assignments: BTreeMap<u32, usize>,
    next_slot: usize,
}

impl Palette {
    /// Builds a palette seeded with the given groups.
    #[must_use]
    pub fn seeded(groups: &[PreviewGroup]) -> Self {
        let mut palette: Self = Self::default();
        for group in groups {
            palette.color_for(group.group_number);
        }
        palette
    }

    /// Returns the group's color, assigning the next slot on first use.
    pub fn color_for(&mut self, group_number: u32) -> &'static str {
        let next_slot: &mut usize = &mut self.next_slot;
        let slot: usize = *self.assignments.entry(group_number).or_insert_with(|| {
            let slot: usize = *next_slot;
            *next_slot += 1;
            slot
        });
        GROUP_PALETTE[slot % GROUP_PALETTE.len()]
    }

    /// Returns the group's color if one has been assigned.
    #[must_use]
    pub fn assigned(&self, group_number: u32) -> Option<&'static str> {
        self.assignments
            .get(&group_number)
            .map(|slot| GROUP_PALETTE[slot % GROUP_PALETTE.len()])
    }
}
