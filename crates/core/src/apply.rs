// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{EditCommand, SupervisorChoice};
use crate::error::CoreError;
use crate::session::PreviewSession;
use serde::Serialize;
use tracing::{debug, warn};

/// The result of a successful edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    /// The command that was applied.
    pub command: &'static str,
    /// The session revision after the edit.
    pub revision: u64,
    /// Human-readable description of what changed.
    pub description: String,
}

/// Applies an edit command to a session.
///
/// Commands are checked before anything is mutated, so a rejected command
/// leaves the session (including its revision) exactly as it was.
///
/// # Arguments
///
/// * `session` - The working copy to edit
/// * `command` - The edit to apply
///
/// # Errors
///
/// Returns an error if:
/// - The target group does not exist
/// - The edit violates a membership rule
/// - The named plot or supervisor is not available
pub fn apply(session: &mut PreviewSession, command: EditCommand) -> Result<EditOutcome, CoreError> {
    let name: &'static str = command.name();
    let group_number: u32 = command.group_number();

    let result: Result<String, CoreError> = match command {
        EditCommand::UpdateGroup { group_number, patch } => {
            let mut changed: Vec<String> = Vec::new();
            if let Some(group_name) = &patch.group_name {
                changed.push(format!("name '{group_name}'"));
            }
            if let Some(supervisor) = &patch.supervisor {
                changed.push(describe_supervisor(supervisor));
            }
            session
                .update_group(group_number, patch)
                .map(|()| format!("Updated group {group_number}: {}", changed.join(", ")))
        }
        EditCommand::RemovePlot {
            group_number,
            plot_id,
        } => session
            .remove_plot(group_number, &plot_id)
            .map(|()| format!("Removed plot {plot_id} from group {group_number}")),
        EditCommand::AddPlot {
            group_number,
            plot_id,
        } => session
            .add_plot_by_id(group_number, &plot_id)
            .map(|()| format!("Added plot {plot_id} to group {group_number}")),
        EditCommand::AssignSupervisor {
            group_number,
            supervisor,
        } => session
            .assign_supervisor(group_number, &supervisor)
            .map(|()| format!("Group {group_number}: {}", describe_supervisor(&supervisor))),
    };

    match result {
        Ok(description) => {
            debug!(
                session_id = session.session_id(),
                revision = session.revision(),
                command = name,
                group_number,
                "Edit applied"
            );
            Ok(EditOutcome {
                command: name,
                revision: session.revision(),
                description,
            })
        }
        Err(e) => {
            warn!(
                session_id = session.session_id(),
                command = name,
                group_number,
                error = %e,
                "Edit rejected"
            );
            Err(e)
        }
    }
}

fn describe_supervisor(choice: &SupervisorChoice) -> String {
    match choice {
        SupervisorChoice::Assign(id) => format!("supervisor {id}"),
        SupervisorChoice::Unassigned => String::from("no supervisor"),
    }
}
