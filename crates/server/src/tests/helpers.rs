// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::dialogs::DialogRegistry;
use crate::live::LiveEventBroadcaster;
use crate::{AppState, DialogSettings, build_router};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use plotgroup_api::FixtureGroupingService;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub fn create_test_preview_json() -> Value {
    json!({
        "proposedGroups": [
            {
                "groupNumber": 1,
                "groupName": "Group A",
                "supervisorId": "sup-1",
                "plots": [
                    {
                        "plotId": "p1",
                        "farmerName": "Tran Thi Binh",
                        "area": 6.0,
                        "plantingDate": "2026-01-10",
                        "boundaryGeoJson": {
                            "type": "Polygon",
                            "coordinates": [[
                                [105.780, 10.030], [105.782, 10.030],
                                [105.782, 10.032], [105.780, 10.030]
                            ]]
                        }
                    },
                    {
                        "plotId": "p2",
                        "area": 5.5,
                        "plantingDate": "2026-01-12",
                        "boundaryWkt": "POLYGON((105.783 10.030, 105.785 10.030, 105.785 10.032, 105.783 10.030))"
                    },
                    { "plotId": "p3", "area": 4.0, "plantingDate": "2026-01-14" }
                ]
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
            { "supervisorId": "sup-1", "fullName": "Nguyen Van An", "maxAreaCapacity": 40.0 },
            {
                "supervisorId": "sup-2",
                "fullName": "Le Thi Cuc",
                "isAvailable": false,
                "unavailableReason": "On leave"
            }
        ],
        "ungroupedPlots": [
            { "plotId": "p6", "area": 3.0, "ungroupReason": "MissingBoundary" }
        ],
        "summary": { "groupsToBeFormed": 2, "plotsGrouped": 5, "ungroupedPlots": 1 }
    })
}

pub fn create_test_app_state() -> (AppState, Arc<FixtureGroupingService>) {
    let service: Arc<FixtureGroupingService> = Arc::new(
        FixtureGroupingService::from_json(&create_test_preview_json().to_string()).unwrap(),
    );
    let state: AppState = AppState {
        dialogs: DialogRegistry::default(),
        service: service.clone(),
        live: Arc::new(LiveEventBroadcaster::new()),
        settings: Arc::new(DialogSettings::default()),
    };
    (state, service)
}

/// Sends one request and returns the status and the JSON body, if any.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body: Body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Opens a dialog for the test season and returns its id.
pub async fn open_dialog(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/dialogs",
        Some(json!({
            "clusterId": "cluster-7",
            "seasonId": "season-2026-ws",
            "year": 2026
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["dialog_id"].as_str().unwrap().to_string()
}

pub fn create_test_router() -> (Router, AppState, Arc<FixtureGroupingService>) {
    let (state, service) = create_test_app_state();
    (build_router(state.clone()), state, service)
}
