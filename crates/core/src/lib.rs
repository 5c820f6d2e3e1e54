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

mod apply;
mod command;
mod error;
mod session;

#[cfg(test)]
mod tests;

pub use apply::{EditOutcome, apply};
pub use command::{EditCommand, GroupPatch, SupervisorChoice};
pub use error::CoreError;
pub use session::{PreviewSession, SessionSeed, SessionSummary, SupervisorOption};
