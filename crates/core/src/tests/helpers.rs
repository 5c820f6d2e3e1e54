// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{PreviewSession, SessionSeed};
use plotgroup_domain::{
    AssignedSupervisor, FarmerId, NearbyGroup, Plot, PlotId, PreviewGroup,
    SupervisorForAssignment, SupervisorId, UngroupReason, UngroupedPlot,
};
use time::Date;
use time::macros::date;

pub fn create_test_plot(id: &str, area_ha: f64, planting_date: Date) -> Plot {
    Plot::new(PlotId::new(id), area_ha)
        .with_farmer(FarmerId::new(format!("farmer-{id}")), format!("Farmer {id}"))
        .with_planting_date(planting_date)
}

pub fn create_test_supervisors() -> Vec<SupervisorForAssignment> {
    vec![
        SupervisorForAssignment {
            supervisor_id: SupervisorId::new("sup-1"),
            full_name: String::from("Nguyen Van An"),
            is_available: true,
            unavailable_reason: None,
            current_group_count: 1,
            current_total_area: 10.0,
            max_area_capacity: Some(20.0),
            reported_remaining_area_capacity: None,
        },
        SupervisorForAssignment {
            supervisor_id: SupervisorId::new("sup-2"),
            full_name: String::from("Tran Thi Binh"),
            is_available: false,
            unavailable_reason: Some(String::from("Already supervising 5 groups")),
            current_group_count: 5,
            current_total_area: 48.0,
            max_area_capacity: Some(50.0),
            reported_remaining_area_capacity: None,
        },
        SupervisorForAssignment {
            supervisor_id: SupervisorId::new("sup-3"),
            full_name: String::from("Le Van Cuong"),
            is_available: true,
            unavailable_reason: None,
            current_group_count: 0,
            current_total_area: 0.0,
            max_area_capacity: None,
            reported_remaining_area_capacity: None,
        },
    ]
}

/// Group 1: p1..p3, 10 ha, no supervisor.
/// Group 2: p4..p6, 12 ha, supervised by sup-2.
/// Ungrouped: p7.
pub fn create_test_seed() -> SessionSeed {
    let group_one: PreviewGroup = PreviewGroup::new(
        1,
        "Group 1",
        vec![
            create_test_plot("p1", 2.0, date!(2026 - 03 - 01)),
            create_test_plot("p2", 3.0, date!(2026 - 03 - 02)),
            create_test_plot("p3", 5.0, date!(2026 - 03 - 03)),
        ],
    );
    let group_two: PreviewGroup = PreviewGroup::new(
        2,
        "Group 2",
        vec![
            create_test_plot("p4", 4.0, date!(2026 - 03 - 05)),
            create_test_plot("p5", 4.0, date!(2026 - 03 - 06)),
            create_test_plot("p6", 4.0, date!(2026 - 03 - 07)),
        ],
    )
    .with_supervisor(Some(AssignedSupervisor {
        supervisor_id: SupervisorId::new("sup-2"),
        full_name: String::from("Tran Thi Binh"),
    }));

    SessionSeed {
        groups: vec![group_one, group_two],
        ungrouped_plots: vec![UngroupedPlot {
            plot: create_test_plot("p7", 1.5, date!(2026 - 04 - 20)),
            reason: UngroupReason::PlantingDateMismatch,
            reason_description: String::from("Planting date is 45 days after group median"),
            distance_to_nearest_group: Some(80.0),
            suggestions: vec![String::from("Consider adding to group 1")],
            nearby_groups: vec![NearbyGroup {
                group_number: 1,
                group_name: String::from("Group 1"),
                distance_meters: 80.0,
            }],
        }],
        available_supervisors: create_test_supervisors(),
    }
}

pub fn create_test_session() -> PreviewSession {
    PreviewSession::new(create_test_seed())
}

/// Asserts the derived counters of every group match its members.
pub fn assert_groups_consistent(session: &PreviewSession) {
    for group in session.edited_groups() {
        assert_eq!(group.plot_count(), group.plots().len());
        assert_eq!(group.plot_count(), group.plot_ids().count());
        let area: f64 = group.plots().iter().map(|p| p.area_ha).sum();
        assert!((group.total_area() - area).abs() < 1e-9);
    }
}
