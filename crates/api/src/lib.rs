// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod controller;
mod error;
mod http_client;
mod mapping;
mod params;
mod protocol;
mod request_response;
mod service;

#[cfg(test)]
mod tests;

pub use controller::{
    CachedView, DialogObserver, INVALIDATED_ON_SUBMIT, NoopObserver, PreviewController,
    notify_submitted,
};
pub use error::{ApiError, Operation, ProtocolError, ServiceError};
pub use http_client::{HttpGroupingService, server_message};
pub use mapping::{reported_summary, session_seed_from_preview, submission_from_session};
pub use params::{GroupingParameters, GroupingStrategy, SeasonContext};
pub use protocol::{DialogPhase, PreviewDialog, PreviewTicket, ResponseOutcome, SubmitTicket};
pub use request_response::{
    FetchPreviewRequest, NearbyGroupDto, PlotDto, PreviewResponse, PreviewSummaryDto,
    ProposedGroupDto, SubmitGroupDto, SubmitGroupsRequest, SubmitGroupsResponse, SupervisorDto,
    UngroupedPlotDto,
};
pub use service::{FixtureGroupingService, GroupingService, ServiceFuture};
