// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The seam between the renderer and a concrete map backend.

use crate::error::MapError;
use crate::popup::PopupContent;
use crate::viewport::Bounds;
use plotgroup_domain::{Coord, PlotId};
use serde::Serialize;

/// How a layer draws its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Polygon interior.
    Fill,
    /// Polygon outline.
    Line,
    /// Point.
    Circle,
}

/// Paint properties of a layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Paint {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dasharray: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl Paint {
    #[must_use]
    pub const fn fill(color: String, opacity: f64) -> Self {
        Self {
            color,
            opacity: Some(opacity),
            width: None,
            dasharray: None,
            radius: None,
        }
    }

    #[must_use]
    pub const fn line(color: String, width: f64, dasharray: Option<[f64; 2]>) -> Self {
        Self {
            color,
            opacity: None,
            width: Some(width),
            dasharray,
            radius: None,
        }
    }

    #[must_use]
    pub const fn circle(color: String, radius: f64, opacity: f64, stroke_width: f64) -> Self {
        Self {
            color,
            opacity: Some(opacity),
            width: Some(stroke_width),
            dasharray: None,
            radius: Some(radius),
        }
    }
}

/// A single paint update applied to an existing layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "property", content = "value", rename_all = "kebab-case")]
pub enum PaintProperty {
    /// Fill or circle opacity.
    Opacity(f64),
    /// Outline or circle stroke width.
    Width(f64),
}

impl PaintProperty {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Opacity(_) => "opacity",
            Self::Width(_) => "width",
        }
    }
}

/// The plot a layer or marker stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureRef {
    /// A plot inside a group.
    GroupPlot {
        /// The owning group.
        group_number: u32,
        /// The plot.
        plot_id: PlotId,
    },
    /// An ungrouped plot.
    Ungrouped {
        /// The plot.
        plot_id: PlotId,
    },
}

/// Click and hover wiring for a layer.
///
/// Clicking opens the popup; hovering reports the feature so the owner can
/// issue a highlight pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    /// What the layer stands for.
    pub feature: FeatureRef,
    /// Popup shown on click.
    pub popup: PopupContent,
}

/// A styled layer over one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub paint: Paint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
}

/// A labelled circular marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub position: Coord,
    pub label: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
}

/// A map backend.
///
/// Removal of an id the surface does not hold is not an error; it reports
/// `false` so clearing can be repeated safely.
pub trait MapSurface {
    /// Adds or replaces a GeoJSON source.
    fn add_source(&mut self, id: &str, data: serde_json::Value);

    /// Removes a source, returning whether it existed.
    fn remove_source(&mut self, id: &str) -> bool;

    /// Adds or replaces a layer.
    fn add_layer(&mut self, layer: Layer);

    /// Removes a layer, returning whether it existed.
    fn remove_layer(&mut self, id: &str) -> bool;

    /// Adds or replaces a marker.
    fn add_marker(&mut self, marker: Marker);

    /// Removes a marker, returning whether it existed.
    fn remove_marker(&mut self, id: &str) -> bool;

    /// Ids of every source currently on the surface.
    fn source_ids(&self) -> Vec<String>;

    /// Ids of every layer currently on the surface.
    fn layer_ids(&self) -> Vec<String>;

    /// Ids of every marker currently on the surface.
    fn marker_ids(&self) -> Vec<String>;

    /// Updates one paint property of an existing layer.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnknownLayer` if the layer is not on the surface
    /// and `MapError::PaintMismatch` if the property does not apply.
    fn set_paint_property(&mut self, layer_id: &str, property: PaintProperty)
    -> Result<(), MapError>;

    /// Animates the viewport to show the bounds.
    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32, duration_ms: u64);

    /// Moves the viewport without animation.
    fn jump_to(&mut self, center: Coord, zoom: f64);
}
