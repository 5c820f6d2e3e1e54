// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{create_test_router, open_dialog, send};
use axum::http::StatusCode;
use plotgroup_api::{FetchPreviewRequest, GroupingStrategy, SubmitGroupsRequest};
use serde_json::{Value, json};

#[tokio::test]
async fn test_open_dialog_loads_preview() {
    let (app, _state, service) = create_test_router();

    let (status, body) = send(
        &app,
        "POST",
        "/dialogs",
        Some(json!({
            "clusterId": "cluster-7",
            "seasonId": "season-2026-ws",
            "year": 2026,
            "parameters": { "strategy": "proximityFirst" }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["phase"], "editing");
    assert_eq!(body["revision"], 0);
    assert_eq!(body["groups"].as_array().unwrap().len(), 2);
    assert_eq!(body["groups"][0]["plot_count"], 3);
    assert_eq!(body["groups"][0]["total_area"], 15.5);
    assert_eq!(body["ungrouped_plots"].as_array().unwrap().len(), 1);
    assert_eq!(body["reported_summary"]["plots_grouped"], 5);
    assert_eq!(body["can_submit"], true);
    assert_eq!(body["dialog_id"].as_str().unwrap().len(), 16);

    let fetches: Vec<FetchPreviewRequest> = service.fetches();
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].cluster_id, "cluster-7");
    assert_eq!(fetches[0].strategy, GroupingStrategy::ProximityFirst);
}

#[tokio::test]
async fn test_open_dialog_rejects_invalid_parameters() {
    let (app, _state, service) = create_test_router();

    let (status, body) = send(
        &app,
        "POST",
        "/dialogs",
        Some(json!({
            "clusterId": "cluster-7",
            "seasonId": "season-2026-ws",
            "year": 2026,
            "parameters": { "minPlots": 9, "maxPlots": 2 }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert!(service.fetches().is_empty());
}

#[tokio::test]
async fn test_open_failure_discards_dialog() {
    let (app, state, service) = create_test_router();
    service.fail_with(503, "Grouping engine unavailable");

    let (status, body) = send(
        &app,
        "POST",
        "/dialogs",
        Some(json!({ "clusterId": "c", "seasonId": "s", "year": 2026 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["message"],
        "Could not load the grouping preview: Grouping engine unavailable"
    );
    assert!(state.dialogs.lock().await.is_empty());

    service.clear_failure();
    let (retry, _) = send(
        &app,
        "POST",
        "/dialogs",
        Some(json!({ "clusterId": "c", "seasonId": "s", "year": 2026 })),
    )
    .await;

    assert_eq!(retry, StatusCode::CREATED);
    assert_eq!(state.dialogs.lock().await.len(), 1);
}

#[tokio::test]
async fn test_unknown_and_malformed_dialog_ids() {
    let (app, _state, _service) = create_test_router();

    let (missing, _) = send(&app, "GET", "/dialogs/00000000000000ff", None).await;
    let (malformed, _) = send(&app, "GET", "/dialogs/not-an-id", None).await;

    assert_eq!(missing, StatusCode::NOT_FOUND);
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_edit_moves_plot_between_groups() {
    let (app, _state, _service) = create_test_router();
    let id: String = open_dialog(&app).await;
    let edits: String = format!("/dialogs/{id}/edits");

    let (status, body) = send(
        &app,
        "POST",
        &edits,
        Some(json!({ "type": "remove_plot", "group_number": 1, "plot_id": "p3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["description"], "Removed plot p3 from group 1");
    assert_eq!(body["view"]["removed_plots"][0]["plot_id"], "p3");

    let (status, body) = send(
        &app,
        "POST",
        &edits,
        Some(json!({ "type": "add_plot", "group_number": 2, "plot_id": "p3" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let view: &Value = &body["view"];
    assert_eq!(view["revision"], 2);
    assert_eq!(view["groups"][1]["plot_count"], 3);
    assert_eq!(view["summary"]["removed_plot_count"], 0);
}

#[tokio::test]
async fn test_rejected_edit_returns_unprocessable() {
    let (app, _state, _service) = create_test_router();
    let id: String = open_dialog(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/dialogs/{id}/edits"),
        Some(json!({ "type": "add_plot", "group_number": 2, "plot_id": "p1" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].as_str().unwrap().contains("p1"));

    let (_, view) = send(&app, "GET", &format!("/dialogs/{id}"), None).await;
    assert_eq!(view["revision"], 0);
}

#[tokio::test]
async fn test_edit_unknown_group_returns_not_found() {
    let (app, _state, _service) = create_test_router();
    let id: String = open_dialog(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/dialogs/{id}/edits"),
        Some(json!({ "type": "assign_supervisor", "group_number": 9, "supervisor": "none" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_supervisor_options_for_group() {
    let (app, _state, _service) = create_test_router();
    let id: String = open_dialog(&app).await;

    let (status, body) = send(&app, "GET", &format!("/dialogs/{id}/supervisors/1"), None).await;

    assert_eq!(status, StatusCode::OK);
    let options: &Vec<Value> = body.as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0]["supervisor_id"], "sup-1");
    assert_eq!(options[0]["is_current"], true);
    assert_eq!(options[1]["is_available"], false);
    assert_eq!(options[1]["unavailable_reason"], "On leave");
}

#[tokio::test]
async fn test_recalculate_discards_edits() {
    let (app, _state, service) = create_test_router();
    let id: String = open_dialog(&app).await;
    send(
        &app,
        "POST",
        &format!("/dialogs/{id}/edits"),
        Some(json!({
            "type": "update_group",
            "group_number": 1,
            "patch": { "group_name": "Manual" }
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/dialogs/{id}/recalculate"),
        Some(json!({ "parameters": { "proximityThresholdMeters": 250.0 } })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phase"], "editing");
    assert_eq!(body["revision"], 0);
    assert_eq!(body["groups"][0]["group_name"], "Group A");
    assert_eq!(body["parameters"]["proximityThresholdMeters"], 250.0);
    assert_eq!(service.fetches().len(), 2);
}

#[tokio::test]
async fn test_failed_recalculation_preserves_edits() {
    let (app, _state, service) = create_test_router();
    let id: String = open_dialog(&app).await;
    send(
        &app,
        "POST",
        &format!("/dialogs/{id}/edits"),
        Some(json!({
            "type": "update_group",
            "group_number": 1,
            "patch": { "group_name": "Kept" }
        })),
    )
    .await;
    service.fail_with(500, "Grouping engine unavailable");

    let (status, _) = send(&app, "POST", &format!("/dialogs/{id}/recalculate"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, view) = send(&app, "GET", &format!("/dialogs/{id}"), None).await;
    assert_eq!(view["phase"], "failed");
    assert_eq!(view["groups"][0]["group_name"], "Kept");
    assert_eq!(
        view["last_error"],
        "Could not recalculate groups: Grouping engine unavailable"
    );

    let (_, view) = send(&app, "POST", &format!("/dialogs/{id}/dismiss"), None).await;
    assert_eq!(view["phase"], "editing");
}

#[tokio::test]
async fn test_submit_blocked_by_duplicate_names() {
    let (app, _state, service) = create_test_router();
    let id: String = open_dialog(&app).await;
    send(
        &app,
        "POST",
        &format!("/dialogs/{id}/edits"),
        Some(json!({
            "type": "update_group",
            "group_number": 2,
            "patch": { "group_name": " group a " }
        })),
    )
    .await;

    let (status, body) = send(&app, "POST", &format!("/dialogs/{id}/submit"), Some(json!({}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("blocked"));
    assert!(service.submissions().is_empty());
}

#[tokio::test]
async fn test_submit_creates_groups() {
    let (app, _state, service) = create_test_router();
    let id: String = open_dialog(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/dialogs/{id}/submit"),
        Some(json!({ "create_groups_immediately": false })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["groupsCreated"], 2);
    assert_eq!(body["view"]["phase"], "done");
    assert_eq!(body["view"]["groups"].as_array().unwrap().len(), 0);

    let submissions: Vec<SubmitGroupsRequest> = service.submissions();
    assert_eq!(submissions.len(), 1);
    assert!(!submissions[0].create_groups_immediately);
    assert_eq!(submissions[0].groups[0].plot_ids, vec!["p1", "p2", "p3"]);
    assert_eq!(submissions[0].groups[0].supervisor_id.as_deref(), Some("sup-1"));
}

#[tokio::test]
async fn test_failed_submit_can_be_retried() {
    let (app, _state, service) = create_test_router();
    let id: String = open_dialog(&app).await;
    service.fail_with(409, "Plot p4 already belongs to a group");

    let (status, body) = send(&app, "POST", &format!("/dialogs/{id}/submit"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["message"],
        "Could not create groups: Plot p4 already belongs to a group"
    );

    service.clear_failure();
    let (status, _) = send(&app, "POST", &format!("/dialogs/{id}/submit"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(service.submissions().len(), 2);
}

#[tokio::test]
async fn test_close_dialog_removes_it() {
    let (app, _state, _service) = create_test_router();
    let id: String = open_dialog(&app).await;

    let (status, _) = send(&app, "DELETE", &format!("/dialogs/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/dialogs/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
