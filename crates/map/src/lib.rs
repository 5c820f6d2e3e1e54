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

mod config;
mod error;
pub mod ids;
mod legend;
mod palette;
mod popup;
mod renderer;
mod scene;
mod surface;
mod viewport;

#[cfg(test)]
mod tests;

pub use config::MapConfig;
pub use error::MapError;
pub use legend::{LegendEntry, build_legend};
pub use palette::{GROUP_PALETTE, Palette, UNGROUPED_COLOR, UNGROUPED_DASH};
pub use popup::{PopupContent, PopupRow, group_plot_popup, ungrouped_plot_popup};
pub use renderer::{HighlightState, MapRenderer, RenderKey, RenderReport};
pub use scene::{SceneSurface, Viewport};
pub use surface::{
    FeatureRef, Interaction, Layer, LayerKind, MapSurface, Marker, Paint, PaintProperty,
};
pub use viewport::{Bounds, ViewportFit, fit_viewport, synthetic_position};
