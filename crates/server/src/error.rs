// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plotgroup::CoreError;
use plotgroup_api::{ApiError, ProtocolError, ServiceError};
use plotgroup_map::MapError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error indicator.
    pub error: bool,
    /// Error message.
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error message.
    pub message: String,
}

impl HttpError {
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        let status: StatusCode = match err {
            CoreError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::GroupNotFound(_)
            | CoreError::PlotNotFound(_)
            | CoreError::SupervisorNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::AccountingViolation { .. } => {
                error!(error = %err, "Session accounting violated");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        warn!(error = %err, "Grouping service call failed");
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.notification(),
        }
    }
}

impl From<ProtocolError> for HttpError {
    fn from(err: ProtocolError) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Edit(e) => e.into(),
            ApiError::Service(e) => e.into(),
            ApiError::Protocol(e) => e.into(),
            ApiError::InvalidPreview(_) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: err.to_string(),
            },
            ApiError::InvalidParameters(_) => Self::bad_request(err.to_string()),
        }
    }
}

impl From<MapError> for HttpError {
    fn from(err: MapError) -> Self {
        error!(error = %err, "Map update failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}
