// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::config::MapConfig;
use crate::surface::MapSurface;
use plotgroup_domain::Coord;
use serde::Serialize;

/// An axis-aligned lng/lat box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: Coord,
    pub north_east: Coord,
}

impl Bounds {
    /// Returns the smallest box containing every coordinate.
    #[must_use]
    pub fn enclosing(coords: &[Coord]) -> Option<Self> {
        let first: Coord = *coords.first()?;
        let mut bounds: Self = Self {
            south_west: first,
            north_east: first,
        };
        for c in &coords[1..] {
            bounds.south_west.lng = bounds.south_west.lng.min(c.lng);
            bounds.south_west.lat = bounds.south_west.lat.min(c.lat);
            bounds.north_east.lng = bounds.north_east.lng.max(c.lng);
            bounds.north_east.lat = bounds.north_east.lat.max(c.lat);
        }
        Some(bounds)
    }

    /// Returns whether the box has no extent.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        (self.north_east.lng - self.south_west.lng).abs() < f64::EPSILON
            && (self.north_east.lat - self.south_west.lat).abs() < f64::EPSILON
    }

    #[must_use]
    pub fn center(&self) -> Coord {
        Coord::new(
            f64::midpoint(self.south_west.lng, self.north_east.lng),
            f64::midpoint(self.south_west.lat, self.north_east.lat),
        )
    }
}

/// What the fitting pass did with the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "fit", rename_all = "snake_case")]
pub enum ViewportFit {
    /// Fitted to the bounds of the valid coordinates.
    Bounds { bounds: Bounds, coordinates: usize },
    /// All valid coordinates coincide; centered on them.
    Point { center: Coord },
    /// No valid coordinates; fell back to the regional default.
    Default,
}

/// Moves the viewport to show the coordinates inside the valid window.
///
/// Coordinates outside the window are ignored. With none left, the viewport
/// goes to the configured default center and zoom.
pub fn fit_viewport<M: MapSurface>(
    surface: &mut M,
    coords: &[Coord],
    config: &MapConfig,
) -> ViewportFit {
    let valid: Vec<Coord> = coords
        .iter()
        .copied()
        .filter(|c| config.valid_window.contains(*c))
        .collect();

    match Bounds::enclosing(&valid) {
        None => {
            surface.jump_to(config.default_center, config.default_zoom);
            ViewportFit::Default
        }
        Some(bounds) if bounds.is_degenerate() => {
            let center: Coord = bounds.center();
            surface.jump_to(center, config.default_zoom);
            ViewportFit::Point { center }
        }
        Some(bounds) => {
            surface.fit_bounds(bounds, config.fit_padding_px, config.fit_duration_ms);
            ViewportFit::Bounds {
                bounds,
                coordinates: valid.len(),
            }
        }
    }
}

/// Returns a stand-in position for the `index`th plot without a boundary.
///
/// Positions form a grid of `synthetic_columns` columns starting at the
/// default center and growing south, so the same index always lands on the
/// same spot.
#[must_use]
pub fn synthetic_position(index: usize, config: &MapConfig) -> Coord {
    let columns: usize = config.synthetic_columns.max(1);
    #[allow(clippy::cast_precision_loss)]
    let (column, row): (f64, f64) = ((index % columns) as f64, (index / columns) as f64);
    Coord::new(
        config.default_center.lng + column * config.synthetic_spacing_deg,
        config.default_center.lat - row * config.synthetic_spacing_deg,
    )
}
