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

mod dates;
mod error;
mod geometry;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use dates::{iso_date, median_date, parse_iso_date};
pub use error::{BoundaryFormat, DomainError, EditRejection};
pub use geometry::{
    BoundingWindow, Coord, Geometry, GeometryKind, RawBoundary, Ring, centroid, parse_boundary,
    try_parse_geojson_value, try_parse_text, try_parse_wkt,
};
pub use types::{
    AssignedSupervisor, FarmerId, NearbyGroup, Plot, PlotId, PreviewGroup, PreviewSummary,
    RiceVarietyId, SupervisorForAssignment, SupervisorId, UngroupReason, UngroupedPlot,
};
pub use validation::{
    Severity, ValidationFinding, ValidationRules, can_add_plot, can_remove_plot,
    count_by_severity, has_blocking_errors, validate, validate_with_rules,
};
