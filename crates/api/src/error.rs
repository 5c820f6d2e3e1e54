// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the preview protocol.

use plotgroup::CoreError;
use serde::Serialize;
use thiserror::Error;

/// A network round-trip the protocol performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// The first preview fetch of a dialog.
    Preview,
    /// A re-fetch with the current parameters.
    Recalculate,
    /// Creation of the confirmed groups.
    Submit,
}

impl Operation {
    /// Returns what the operation does, as a user would say it.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Preview => "load the grouping preview",
            Self::Recalculate => "recalculate groups",
            Self::Submit => "create groups",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preview => write!(f, "preview"),
            Self::Recalculate => write!(f, "recalculate"),
            Self::Submit => write!(f, "submit"),
        }
    }
}

/// A failed call to the grouping service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request never produced a response.
    #[error("{operation} request failed: {message}")]
    Transport {
        operation: Operation,
        message: String,
    },
    /// The service answered with a non-success status.
    #[error("{operation} request was rejected with status {status}")]
    Rejected {
        operation: Operation,
        status: u16,
        /// The message the service put in the body, if any.
        message: Option<String>,
    },
    /// The response body could not be understood.
    #[error("{operation} response could not be decoded: {message}")]
    Decode {
        operation: Operation,
        message: String,
    },
}

impl ServiceError {
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Transport { operation, .. }
            | Self::Rejected { operation, .. }
            | Self::Decode { operation, .. } => *operation,
        }
    }

    /// The message supplied by the server, if there was one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Renders the user-visible notification text.
    #[must_use]
    pub fn notification(&self) -> String {
        let detail: String = match self {
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected {
                status,
                message: None,
                ..
            } => format!("the grouping service returned status {status}"),
            Self::Transport { message, .. } => {
                format!("the grouping service could not be reached ({message})")
            }
            Self::Decode { message, .. } => {
                format!("the grouping service sent an unexpected response ({message})")
            }
        };
        format!("Could not {}: {detail}", self.operation().description())
    }
}

/// Misuse of the dialog state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The action is not allowed in the current phase.
    #[error("Cannot {action} while the dialog is {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },
    /// Blocking validation errors prevent submission.
    #[error("Submission is blocked by {errors} validation error(s)")]
    BlockedByValidation { errors: usize },
    /// No preview has been loaded yet.
    #[error("No preview session is loaded")]
    NoSession,
}

/// Errors surfaced by the API layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// An edit was refused.
    #[error(transparent)]
    Edit(#[from] CoreError),
    /// The grouping service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The dialog was driven out of order.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// A preview response violated the data model.
    #[error("Invalid preview response: {0}")]
    InvalidPreview(String),
    /// Grouping parameters are inconsistent.
    #[error("Invalid grouping parameters: {0}")]
    InvalidParameters(String),
}
