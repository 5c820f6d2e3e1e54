// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    assert_groups_consistent, create_test_plot, create_test_seed, create_test_session,
};
use crate::{
    CoreError, GroupPatch, PreviewSession, SessionSeed, SessionSummary, SupervisorChoice,
    SupervisorOption,
};
use plotgroup_domain::{
    EditRejection, Plot, PlotId, PreviewGroup, SupervisorId, ValidationFinding, ValidationRules,
    has_blocking_errors,
};
use time::macros::date;

#[test]
fn test_new_session_accounts_for_every_plot() {
    let session: PreviewSession = create_test_session();

    assert_eq!(session.revision(), 0);
    assert_eq!(session.edited_groups().len(), 2);
    assert!(session.removed_plots().is_empty());
    assert_eq!(session.ungrouped_plots().len(), 1);
    assert!(session.verify_accounting().is_ok());
    assert_groups_consistent(&session);
}

#[test]
fn test_sessions_get_distinct_ids() {
    let first: PreviewSession = create_test_session();
    let second: PreviewSession = create_test_session();

    assert_ne!(first.session_id(), second.session_id());
}

#[test]
fn test_remove_plot_moves_plot_to_removed_pool() {
    let mut session: PreviewSession = create_test_session();

    session.remove_plot(1, &PlotId::new("p2")).unwrap();

    let group: &PreviewGroup = session.group(1).unwrap();
    assert_eq!(group.plot_count(), 2);
    assert_eq!(group.total_area(), 7.0);
    assert!(!group.contains_plot(&PlotId::new("p2")));
    assert_eq!(session.removed_plots().len(), 1);
    assert_eq!(session.removed_plots()[0].plot_id, PlotId::new("p2"));
    assert_eq!(session.revision(), 1);
    assert!(session.verify_accounting().is_ok());
    assert_groups_consistent(&session);
}

#[test]
fn test_remove_last_plot_is_rejected_without_mutation() {
    let mut session: PreviewSession = create_test_session();
    session.remove_plot(1, &PlotId::new("p1")).unwrap();
    session.remove_plot(1, &PlotId::new("p2")).unwrap();
    let before: PreviewSession = session.clone();

    let result: Result<(), CoreError> = session.remove_plot(1, &PlotId::new("p3"));

    let err: CoreError = result.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Rejected(EditRejection::LastPlotInGroup { group_number: 1, .. })
    ));
    assert!(!err.to_string().is_empty());
    assert_eq!(session, before);
}

#[test]
fn test_remove_plot_from_missing_group() {
    let mut session: PreviewSession = create_test_session();

    let result: Result<(), CoreError> = session.remove_plot(9, &PlotId::new("p1"));

    assert_eq!(result, Err(CoreError::GroupNotFound(9)));
    assert_eq!(session.revision(), 0);
}

#[test]
fn test_add_removed_plot_to_other_group() {
    let mut session: PreviewSession = create_test_session();
    session.remove_plot(1, &PlotId::new("p3")).unwrap();

    session.add_plot_by_id(2, &PlotId::new("p3")).unwrap();

    assert!(session.removed_plots().is_empty());
    let group: &PreviewGroup = session.group(2).unwrap();
    assert_eq!(group.plot_count(), 4);
    assert_eq!(group.total_area(), 17.0);
    assert_eq!(session.group(1).unwrap().total_area(), 5.0);
    assert!(session.verify_accounting().is_ok());
    assert_groups_consistent(&session);
}

#[test]
fn test_add_ungrouped_plot_clears_ungrouped_entry() {
    let mut session: PreviewSession = create_test_session();

    session.add_plot_by_id(1, &PlotId::new("p7")).unwrap();

    assert!(session.ungrouped_plots().is_empty());
    assert_eq!(session.group(1).unwrap().plot_count(), 4);
    assert!(session.verify_accounting().is_ok());
}

#[test]
fn test_add_plot_owned_by_other_group_names_owner() {
    let mut session: PreviewSession = create_test_session();

    let err: CoreError = session
        .add_plot(1, create_test_plot("p4", 4.0, date!(2026 - 03 - 05)))
        .unwrap_err();

    assert_eq!(
        err,
        CoreError::Rejected(EditRejection::AssignedToOtherGroup {
            plot_id: PlotId::new("p4"),
            owner_group_number: 2,
        })
    );
    assert!(err.to_string().contains("group 2"));
    assert_eq!(session.revision(), 0);
}

#[test]
fn test_add_plot_already_in_group_is_rejected() {
    let mut session: PreviewSession = create_test_session();

    let err: CoreError = session.add_plot_by_id(1, &PlotId::new("p1")).unwrap_err();

    assert!(matches!(
        err,
        CoreError::Rejected(EditRejection::AlreadyInGroup { group_number: 1, .. })
    ));
}

#[test]
fn test_add_unknown_plot_by_id() {
    let mut session: PreviewSession = create_test_session();

    let err: CoreError = session.add_plot_by_id(1, &PlotId::new("nope")).unwrap_err();

    assert_eq!(err, CoreError::PlotNotFound(PlotId::new("nope")));
}

#[test]
fn test_add_plot_respects_cap() {
    let mut session: PreviewSession =
        PreviewSession::new(create_test_seed()).with_max_plots_per_group(Some(3));

    let err: CoreError = session.add_plot_by_id(1, &PlotId::new("p7")).unwrap_err();

    assert_eq!(
        err,
        CoreError::Rejected(EditRejection::GroupAtCapacity {
            group_number: 1,
            max_plots: 3,
        })
    );
    assert_eq!(session.ungrouped_plots().len(), 1);
}

#[test]
fn test_add_new_plot_not_in_preview() {
    let mut session: PreviewSession = create_test_session();
    let plot: Plot = create_test_plot("p99", 1.0, date!(2026 - 03 - 02));

    session.add_plot(1, plot).unwrap();

    assert_eq!(session.group(1).unwrap().plot_count(), 4);
    assert!(session.verify_accounting().is_ok());
}

#[test]
fn test_update_group_merges_fields() {
    let mut session: PreviewSession = create_test_session();

    session
        .update_group(
            1,
            GroupPatch {
                group_name: Some(String::from("North Field")),
                supervisor: None,
            },
        )
        .unwrap();

    let group: &PreviewGroup = session.group(1).unwrap();
    assert_eq!(group.group_name, "North Field");
    assert!(group.supervisor.is_none());
    assert_eq!(group.plot_count(), 3);
}

#[test]
fn test_update_group_with_bad_supervisor_changes_nothing() {
    let mut session: PreviewSession = create_test_session();
    let before: PreviewSession = session.clone();

    let result: Result<(), CoreError> = session.update_group(
        1,
        GroupPatch {
            group_name: Some(String::from("Renamed")),
            supervisor: Some(SupervisorChoice::Assign(SupervisorId::new("ghost"))),
        },
    );

    assert_eq!(
        result,
        Err(CoreError::SupervisorNotFound(SupervisorId::new("ghost")))
    );
    assert_eq!(session, before);
}

#[test]
fn test_assign_and_clear_supervisor() {
    let mut session: PreviewSession = create_test_session();

    session
        .assign_supervisor(1, &SupervisorChoice::Assign(SupervisorId::new("sup-1")))
        .unwrap();
    assert_eq!(
        session.group(1).unwrap().supervisor_id(),
        Some(&SupervisorId::new("sup-1"))
    );
    assert_eq!(
        session.group(1).unwrap().supervisor.as_ref().unwrap().full_name,
        "Nguyen Van An"
    );

    session
        .assign_supervisor(1, &SupervisorChoice::Unassigned)
        .unwrap();
    assert!(session.group(1).unwrap().supervisor.is_none());
    assert_eq!(session.revision(), 2);
}

#[test]
fn test_assign_unavailable_supervisor_is_rejected() {
    let mut session: PreviewSession = create_test_session();

    let err: CoreError = session
        .assign_supervisor(1, &SupervisorChoice::Assign(SupervisorId::new("sup-2")))
        .unwrap_err();

    assert!(err.to_string().contains("Already supervising 5 groups"));
    assert!(session.group(1).unwrap().supervisor.is_none());
}

#[test]
fn test_keeping_current_unavailable_supervisor_is_allowed() {
    let mut session: PreviewSession = create_test_session();

    session
        .assign_supervisor(2, &SupervisorChoice::Assign(SupervisorId::new("sup-2")))
        .unwrap();

    assert_eq!(
        session.group(2).unwrap().supervisor_id(),
        Some(&SupervisorId::new("sup-2"))
    );
}

#[test]
fn test_supervisor_options_report_capacity_fit() {
    let session: PreviewSession = create_test_session();

    let options: Vec<SupervisorOption> = session.supervisor_options(2).unwrap();

    assert_eq!(options.len(), 3);
    // sup-1 has 10 ha left; group 2 covers 12 ha
    assert_eq!(options[0].remaining_area_capacity, Some(10.0));
    assert!(!options[0].fits_group_area);
    assert!(!options[0].is_current);
    assert!(options[1].is_current);
    assert!(!options[1].is_available);
    assert_eq!(options[2].remaining_area_capacity, None);
    assert!(options[2].fits_group_area);

    assert_eq!(
        session.supervisor_options(5),
        Err(CoreError::GroupNotFound(5))
    );
}

#[test]
fn test_summary_tracks_edits() {
    let mut session: PreviewSession = create_test_session();
    session.remove_plot(2, &PlotId::new("p6")).unwrap();

    let summary: SessionSummary = session.summary();

    assert_eq!(summary.group_count, 2);
    assert_eq!(summary.grouped_plot_count, 5);
    assert_eq!(summary.grouped_area, 18.0);
    assert_eq!(summary.removed_plot_count, 1);
    assert_eq!(summary.ungrouped_plot_count, 1);
}

#[test]
fn test_findings_follow_edits() {
    let mut session: PreviewSession = create_test_session();
    let rules: ValidationRules = ValidationRules::default();

    let initial: Vec<ValidationFinding> = session.findings(&rules);
    assert_eq!(initial.len(), 1);
    assert!(!has_blocking_errors(&initial));

    session
        .update_group(
            1,
            GroupPatch {
                group_name: Some(String::from(" group 2")),
                supervisor: None,
            },
        )
        .unwrap();

    let edited: Vec<ValidationFinding> = session.findings(&rules);
    assert!(has_blocking_errors(&edited));
    assert_eq!(session.findings(&rules), edited);
}

#[test]
fn test_reset_discards_edits() {
    let mut session: PreviewSession =
        PreviewSession::new(create_test_seed()).with_max_plots_per_group(Some(10));
    let old_id: u64 = session.session_id();
    session.remove_plot(1, &PlotId::new("p1")).unwrap();
    session
        .assign_supervisor(1, &SupervisorChoice::Assign(SupervisorId::new("sup-3")))
        .unwrap();

    let fresh: SessionSeed = SessionSeed {
        groups: vec![PreviewGroup::new(
            1,
            "Group 1",
            vec![
                create_test_plot("p1", 2.0, date!(2026 - 03 - 01)),
                create_test_plot("p2", 3.0, date!(2026 - 03 - 02)),
            ],
        )],
        ungrouped_plots: Vec::new(),
        available_supervisors: Vec::new(),
    };
    session.reset(fresh.clone());

    assert_ne!(session.session_id(), old_id);
    assert_eq!(session.revision(), 0);
    assert_eq!(session.edited_groups(), fresh.groups.as_slice());
    assert!(session.removed_plots().is_empty());
    assert!(session.ungrouped_plots().is_empty());
    assert_eq!(session.max_plots_per_group(), Some(10));
    assert!(session.verify_accounting().is_ok());
}
