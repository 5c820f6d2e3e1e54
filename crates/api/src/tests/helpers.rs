// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::{
    GroupingParameters, Operation, PreviewDialog, PreviewResponse, PreviewTicket, SeasonContext,
    ServiceError,
};
use serde_json::json;

/// A preview with two groups, one ungrouped plot and two supervisors.
///
/// Group 1 lists its members through `plotIds`; group 2 relies on the
/// order of `plots`.
pub fn create_test_preview_json() -> serde_json::Value {
    json!({
        "proposedGroups": [
            {
                "groupNumber": 1,
                "groupName": "Group A",
                "riceVarietyId": "rv-1",
                "riceVarietyName": "OM 5451",
                "plantingWindowStart": "2026-01-08",
                "plantingWindowEnd": "2026-01-16",
                "supervisorId": "sup-1",
                "supervisorName": "Nguyen Van An",
                "plotIds": ["p1", "p2", "p3"],
                "plots": [
                    {
                        "plotId": "p1",
                        "farmerId": "f-1",
                        "farmerName": "Tran Thi Binh",
                        "area": 6.0,
                        "plantingDate": "2026-01-10",
                        "soThua": 12,
                        "soTo": 3,
                        "boundaryWkt": "POLYGON((105.78 10.03, 105.79 10.03, 105.79 10.04, 105.78 10.03))"
                    },
                    { "plotId": "p2", "area": 5.5, "plantingDate": "2026-01-12T00:00:00Z" },
                    { "plotId": "p3", "area": 4.0, "plantingDate": "2026-01-14" }
                ],
                "plotCount": 3,
                "totalArea": 15.5
            },
            {
                "groupNumber": 2,
                "groupName": "Group B",
                "plots": [
                    { "plotId": "p4", "area": 8.0 },
                    { "plotId": "p5", "area": 7.0 }
                ]
            }
        ],
        "availableSupervisors": [
            {
                "supervisorId": "sup-1",
                "fullName": "Nguyen Van An",
                "isAvailable": true,
                "currentGroupCount": 1,
                "currentTotalArea": 10.0,
                "maxAreaCapacity": 40.0
            },
            {
                "supervisorId": "sup-2",
                "fullName": "Le Thi Cuc",
                "isAvailable": false,
                "unavailableReason": "On leave"
            }
        ],
        "ungroupedPlots": [
            {
                "plotId": "p6",
                "area": 3.0,
                "ungroupReason": "TooFarFromGroups",
                "reasonDescription": "More than 100 m from every group",
                "distanceToNearestGroup": 240.0,
                "nearbyGroups": [
                    { "groupNumber": 1, "groupName": "Group A", "distanceMeters": 240.0 }
                ]
            }
        ],
        "summary": {
            "groupsToBeFormed": 2,
            "plotsGrouped": 5,
            "ungroupedPlots": 1
        }
    })
}

pub fn create_test_preview() -> PreviewResponse {
    serde_json::from_value(create_test_preview_json()).unwrap()
}

/// The fixture preview with group 1 renamed, to tell responses apart.
pub fn create_renamed_preview(name: &str) -> PreviewResponse {
    let mut preview: PreviewResponse = create_test_preview();
    preview.proposed_groups[0].group_name = name.to_string();
    preview
}

pub fn create_test_context() -> SeasonContext {
    SeasonContext {
        cluster_id: String::from("cluster-7"),
        season_id: String::from("season-2026-ws"),
        year: 2026,
    }
}

pub fn create_test_dialog() -> PreviewDialog {
    PreviewDialog::new(create_test_context(), GroupingParameters::default())
}

/// A dialog that has loaded the fixture preview and is editing.
pub fn create_editing_dialog() -> PreviewDialog {
    let mut dialog: PreviewDialog = create_test_dialog();
    let ticket: PreviewTicket = dialog.open().unwrap();
    dialog.complete_preview(&ticket, Ok(create_test_preview()));
    dialog
}

pub fn create_service_error(operation: Operation) -> ServiceError {
    ServiceError::Rejected {
        operation,
        status: 500,
        message: Some(String::from("Grouping engine unavailable")),
    }
}
