// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotgroup::{PreviewSession, SessionSeed};
use plotgroup_domain::{
    AssignedSupervisor, FarmerId, NearbyGroup, Plot, PlotId, PreviewGroup, SupervisorId,
    UngroupReason, UngroupedPlot,
};
use serde_json::json;
use time::macros::date;

pub const SQUARE_WKT: &str =
    "POLYGON((106.1 10.1, 106.2 10.1, 106.2 10.2, 106.1 10.2, 106.1 10.1))";

pub fn square_geojson(lng: f64, lat: f64) -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [lng, lat],
            [lng + 0.01, lat],
            [lng + 0.01, lat + 0.01],
            [lng, lat + 0.01],
            [lng, lat]
        ]]
    })
}

pub fn plot(id: &str, area_ha: f64) -> Plot {
    Plot::new(PlotId::new(id), area_ha)
        .with_farmer(FarmerId::new(format!("f-{id}")), format!("Farmer {id}"))
        .with_planting_date(date!(2026 - 03 - 01))
}

/// Group 1: p1 (WKT square), p2 (GeoJSON square), p3 (no boundary).
/// Group 2: p4 (GeoJSON point), supervised.
/// Ungrouped: u1 (string-encoded GeoJSON square), u2 (no boundary).
pub fn create_test_seed() -> SessionSeed {
    let group_one: PreviewGroup = PreviewGroup::new(
        1,
        "Group 1",
        vec![
            plot("p1", 2.0).with_boundary_wkt(SQUARE_WKT),
            plot("p2", 3.0).with_boundary_geojson(square_geojson(106.3, 10.3)),
            plot("p3", 5.0),
        ],
    );
    let group_two: PreviewGroup = PreviewGroup::new(
        2,
        "Group 2",
        vec![plot("p4", 6.0).with_boundary_geojson(json!({
            "type": "Point",
            "coordinates": [106.5, 10.5]
        }))],
    )
    .with_supervisor(Some(AssignedSupervisor {
        supervisor_id: SupervisorId::new("sup-1"),
        full_name: String::from("Nguyen Van An"),
    }));

    let encoded: String = square_geojson(106.0, 10.0).to_string();
    SessionSeed {
        groups: vec![group_one, group_two],
        ungrouped_plots: vec![
            UngroupedPlot {
                plot: plot("u1", 1.0).with_boundary_geojson(json!(encoded)),
                reason: UngroupReason::TooFarFromGroups,
                reason_description: String::from("More than 100 m from any group"),
                distance_to_nearest_group: Some(412.4),
                suggestions: vec![String::from("Increase the proximity threshold")],
                nearby_groups: vec![NearbyGroup {
                    group_number: 1,
                    group_name: String::from("Group 1"),
                    distance_meters: 412.4,
                }],
            },
            UngroupedPlot {
                plot: plot("u2", 0.5),
                reason: UngroupReason::MissingBoundary,
                reason_description: String::new(),
                distance_to_nearest_group: None,
                suggestions: Vec::new(),
                nearby_groups: Vec::new(),
            },
        ],
        available_supervisors: Vec::new(),
    }
}

pub fn create_test_session() -> PreviewSession {
    PreviewSession::new(create_test_seed())
}
