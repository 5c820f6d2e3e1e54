// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plotgroup_domain::{BoundingWindow, Coord};
use serde::{Deserialize, Serialize};

/// Rendering settings for one deployment region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Coordinates outside this window are ignored when fitting the viewport.
    pub valid_window: BoundingWindow,
    /// Where the viewport goes when nothing can be fitted.
    pub default_center: Coord,
    /// Zoom used together with `default_center`.
    pub default_zoom: f64,
    /// Padding around fitted bounds, in pixels.
    pub fit_padding_px: u32,
    /// Length of the fit animation.
    pub fit_duration_ms: u64,
    /// Distance between synthetic placements, in degrees.
    pub synthetic_spacing_deg: f64,
    /// Synthetic placements per row.
    pub synthetic_columns: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            valid_window: BoundingWindow::default(),
            default_center: Coord::new(105.78, 10.03),
            default_zoom: 12.0,
            fit_padding_px: 50,
            fit_duration_ms: 1000,
            synthetic_spacing_deg: 0.002,
            synthetic_columns: 5,
        }
    }
}
