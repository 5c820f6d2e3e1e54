// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::MapError;
use crate::surface::{Layer, LayerKind, MapSurface, Marker, PaintProperty};
use crate::viewport::Bounds;
use plotgroup_domain::Coord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Where the viewport was last sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Viewport {
    /// Nothing has moved the viewport yet.
    #[default]
    Unset,
    /// Fitted to bounds.
    Fitted {
        bounds: Bounds,
        padding_px: u32,
        duration_ms: u64,
    },
    /// Centered on a point.
    Centered { center: Coord, zoom: f64 },
}

/// A headless surface that records the scene it is given.
///
/// Layers keep their insertion order, which is their draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneSurface {
    sources: BTreeMap<String, serde_json::Value>,
    layers: Vec<Layer>,
    markers: Vec<Marker>,
    viewport: Viewport,
}

impl SceneSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn source(&self, id: &str) -> Option<&serde_json::Value> {
        self.sources.get(id)
    }

    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[must_use]
    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl MapSurface for SceneSurface {
    fn add_source(&mut self, id: &str, data: serde_json::Value) {
        self.sources.insert(id.to_string(), data);
    }

    fn remove_source(&mut self, id: &str) -> bool {
        self.sources.remove(id).is_some()
    }

    fn add_layer(&mut self, layer: Layer) {
        match self.layers.iter_mut().find(|l| l.id == layer.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    fn remove_layer(&mut self, id: &str) -> bool {
        let before: usize = self.layers.len();
        self.layers.retain(|l| l.id != id);
        self.layers.len() != before
    }

    fn add_marker(&mut self, marker: Marker) {
        match self.markers.iter_mut().find(|m| m.id == marker.id) {
            Some(existing) => *existing = marker,
            None => self.markers.push(marker),
        }
    }

    fn remove_marker(&mut self, id: &str) -> bool {
        let before: usize = self.markers.len();
        self.markers.retain(|m| m.id != id);
        self.markers.len() != before
    }

    fn source_ids(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    fn marker_ids(&self) -> Vec<String> {
        self.markers.iter().map(|m| m.id.clone()).collect()
    }

    fn set_paint_property(
        &mut self,
        layer_id: &str,
        property: PaintProperty,
    ) -> Result<(), MapError> {
        let layer: &mut Layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == layer_id)
            .ok_or_else(|| MapError::UnknownLayer(layer_id.to_string()))?;

        match (layer.kind, property) {
            (LayerKind::Fill | LayerKind::Circle, PaintProperty::Opacity(opacity)) => {
                layer.paint.opacity = Some(opacity);
            }
            (LayerKind::Line | LayerKind::Circle, PaintProperty::Width(width)) => {
                layer.paint.width = Some(width);
            }
            _ => {
                return Err(MapError::PaintMismatch {
                    layer_id: layer_id.to_string(),
                    property: property.name(),
                });
            }
        }
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32, duration_ms: u64) {
        self.viewport = Viewport::Fitted {
            bounds,
            padding_px,
            duration_ms,
        };
    }

    fn jump_to(&mut self, center: Coord, zoom: f64) {
        self.viewport = Viewport::Centered { center, zoom };
    }
}
