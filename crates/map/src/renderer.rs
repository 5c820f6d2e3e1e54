// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The single owner of a map surface.
//!
//! A render pass clears everything the renderer previously drew, draws the
//! groups, then the ungrouped plots, then fits the viewport. Highlighting is
//! a separate pass that only touches paint properties of existing layers.

use crate::config::MapConfig;
use crate::error::MapError;
use crate::ids;
use crate::legend::{LegendEntry, build_legend};
use crate::palette::{Palette, UNGROUPED_COLOR, UNGROUPED_DASH};
use crate::popup::{PopupContent, group_plot_popup, ungrouped_plot_popup};
use crate::surface::{
    FeatureRef, Interaction, Layer, LayerKind, MapSurface, Marker, Paint, PaintProperty,
};
use crate::viewport::{ViewportFit, fit_viewport, synthetic_position};
use plotgroup::PreviewSession;
use plotgroup_domain::{Coord, Geometry, Plot, PlotId, centroid};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

const FILL_OPACITY: f64 = 0.35;
const HOVERED_FILL_OPACITY: f64 = 0.6;
const EXPANDED_FILL_OPACITY: f64 = 0.5;
const UNGROUPED_FILL_OPACITY: f64 = 0.25;
const BORDER_WIDTH: f64 = 2.0;
const HIGHLIGHTED_BORDER_WIDTH: f64 = 4.0;
const POINT_RADIUS: f64 = 6.0;

/// Identity of the session state a scene was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderKey {
    pub session_id: u64,
    pub revision: u64,
}

impl RenderKey {
    #[must_use]
    pub const fn of(session: &PreviewSession) -> Self {
        Self {
            session_id: session.session_id(),
            revision: session.revision(),
        }
    }
}

/// Transient hover and selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightState {
    /// The plot under the pointer.
    pub hovered_plot: Option<PlotId>,
    /// The group expanded in the side list.
    pub expanded_group: Option<u32>,
}

/// What a render call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderReport {
    pub key: RenderKey,
    /// The scene was already current and nothing was drawn.
    pub skipped: bool,
    pub layers: usize,
    pub markers: usize,
    /// Plots drawn at a synthetic position for lack of a boundary.
    pub synthetic: usize,
    pub viewport: Option<ViewportFit>,
}

#[derive(Debug, Clone)]
struct RenderedPlot {
    plot_id: PlotId,
    group_number: Option<u32>,
    fill_layer: Option<String>,
    border_layer: Option<String>,
    point_layer: Option<String>,
}

struct PlotLayers<'a> {
    source: String,
    fill: String,
    border: String,
    point: String,
    color: &'a str,
    fill_opacity: f64,
    dash: Option<[f64; 2]>,
    interaction: Interaction,
}

/// Draws a preview session onto a map surface it exclusively owns.
#[derive(Debug)]
pub struct MapRenderer<M: MapSurface> {
    surface: M,
    config: MapConfig,
    palette: Palette,
    palette_session: Option<u64>,
    rendered: Option<RenderKey>,
    rendered_plots: Vec<RenderedPlot>,
    legend: Vec<LegendEntry>,
    highlight: HighlightState,
}

impl<M: MapSurface> MapRenderer<M> {
    #[must_use]
    pub fn new(surface: M, config: MapConfig) -> Self {
        Self {
            surface,
            config,
            palette: Palette::default(),
            palette_session: None,
            rendered: None,
            rendered_plots: Vec::new(),
            legend: Vec::new(),
            highlight: HighlightState::default(),
        }
    }

    #[must_use]
    pub const fn surface(&self) -> &M {
        &self.surface
    }

    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    #[must_use]
    pub const fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    /// The key of the scene currently on the surface.
    #[must_use]
    pub const fn rendered_key(&self) -> Option<RenderKey> {
        self.rendered
    }

    /// Draws the session unless the surface already shows this exact state.
    ///
    /// # Errors
    ///
    /// Returns an error if re-applying the highlight to the new layers fails.
    pub fn render(&mut self, session: &PreviewSession) -> Result<RenderReport, MapError> {
        let key: RenderKey = RenderKey::of(session);
        if self.rendered == Some(key) {
            trace!(?key, "Scene is current, skipping render");
            return Ok(RenderReport {
                key,
                skipped: true,
                layers: 0,
                markers: 0,
                synthetic: 0,
                viewport: None,
            });
        }
        self.force_render(session)
    }

    /// Draws the session unconditionally.
    ///
    /// # Errors
    ///
    /// Returns an error if re-applying the highlight to the new layers fails.
    #[allow(clippy::too_many_lines)]
    pub fn force_render(&mut self, session: &PreviewSession) -> Result<RenderReport, MapError> {
        let key: RenderKey = RenderKey::of(session);
        if self.palette_session != Some(key.session_id) {
            self.palette = Palette::seeded(session.edited_groups());
            self.palette_session = Some(key.session_id);
        }

        self.clear();

        let mut fit_coords: Vec<Coord> = Vec::new();
        let mut synthetic: usize = 0;
        let mut layers: usize = 0;
        let mut markers: usize = 0;

        for group in session.edited_groups() {
            let color: &'static str = self.palette.color_for(group.group_number);
            for plot in group.plots() {
                let plot_layers: PlotLayers<'_> = PlotLayers {
                    source: ids::plot_source(group.group_number, &plot.plot_id),
                    fill: ids::plot_fill(group.group_number, &plot.plot_id),
                    border: ids::plot_border(group.group_number, &plot.plot_id),
                    point: ids::plot_point(group.group_number, &plot.plot_id),
                    color,
                    fill_opacity: FILL_OPACITY,
                    dash: None,
                    interaction: Interaction {
                        feature: FeatureRef::GroupPlot {
                            group_number: group.group_number,
                            plot_id: plot.plot_id.clone(),
                        },
                        popup: group_plot_popup(group, plot),
                    },
                };
                let drawn: DrawnPlot =
                    self.draw_plot(plot, Some(group.group_number), plot_layers, &mut synthetic);
                layers += drawn.layers;
                fit_coords.extend(drawn.fit_coords);

                self.surface.add_marker(Marker {
                    id: ids::group_marker(group.group_number, &plot.plot_id),
                    position: drawn.anchor,
                    label: group.group_number.to_string(),
                    color: color.to_string(),
                    interaction: None,
                });
                markers += 1;
            }
        }

        for ungrouped in session.ungrouped_plots() {
            let plot: &Plot = &ungrouped.plot;
            let popup: PopupContent = ungrouped_plot_popup(ungrouped);
            let plot_layers: PlotLayers<'_> = PlotLayers {
                source: ids::ungrouped_source(&plot.plot_id),
                fill: ids::ungrouped_fill(&plot.plot_id),
                border: ids::ungrouped_border(&plot.plot_id),
                point: ids::ungrouped_point(&plot.plot_id),
                color: UNGROUPED_COLOR,
                fill_opacity: UNGROUPED_FILL_OPACITY,
                dash: Some(UNGROUPED_DASH),
                interaction: Interaction {
                    feature: FeatureRef::Ungrouped {
                        plot_id: plot.plot_id.clone(),
                    },
                    popup: popup.clone(),
                },
            };
            let drawn: DrawnPlot = self.draw_plot(plot, None, plot_layers, &mut synthetic);
            layers += drawn.layers;
            fit_coords.extend(drawn.fit_coords);

            self.surface.add_marker(Marker {
                id: ids::ungrouped_marker(&plot.plot_id),
                position: drawn.anchor,
                label: String::from("!"),
                color: UNGROUPED_COLOR.to_string(),
                interaction: Some(Interaction {
                    feature: FeatureRef::Ungrouped {
                        plot_id: plot.plot_id.clone(),
                    },
                    popup,
                }),
            });
            markers += 1;
        }

        let viewport: ViewportFit = fit_viewport(&mut self.surface, &fit_coords, &self.config);
        self.legend = build_legend(session, &mut self.palette);
        self.rendered = Some(key);
        self.apply_highlight()?;

        debug!(
            session_id = key.session_id,
            revision = key.revision,
            layers,
            markers,
            synthetic,
            "Rendered preview session"
        );

        Ok(RenderReport {
            key,
            skipped: false,
            layers,
            markers,
            synthetic,
            viewport: Some(viewport),
        })
    }

    fn draw_plot(
        &mut self,
        plot: &Plot,
        group_number: Option<u32>,
        plot_layers: PlotLayers<'_>,
        synthetic: &mut usize,
    ) -> DrawnPlot {
        let mut rendered: RenderedPlot = RenderedPlot {
            plot_id: plot.plot_id.clone(),
            group_number,
            fill_layer: None,
            border_layer: None,
            point_layer: None,
        };

        let (geometry, anchor, fit_coords): (Geometry, Coord, Vec<Coord>) = match plot.boundary()
        {
            Some(geometry @ Geometry::Polygon(_)) => {
                let vertices: Vec<Coord> = geometry.vertices();
                let anchor: Coord = centroid(&geometry)
                    .unwrap_or_else(|| synthetic_position(*synthetic, &self.config));
                (geometry, anchor, vertices)
            }
            Some(Geometry::Point(point)) => (Geometry::Point(point), point, vec![point]),
            None => {
                let position: Coord = synthetic_position(*synthetic, &self.config);
                *synthetic += 1;
                (Geometry::Point(position), position, Vec::new())
            }
        };

        self.surface.add_source(
            &plot_layers.source,
            json!({
                "type": "Feature",
                "geometry": geometry.to_geojson_value(),
                "properties": {
                    "plotId": plot.plot_id,
                    "groupNumber": group_number,
                },
            }),
        );

        let layers: usize = if matches!(geometry, Geometry::Polygon(_)) {
            self.surface.add_layer(Layer {
                id: plot_layers.fill.clone(),
                source: plot_layers.source.clone(),
                kind: LayerKind::Fill,
                paint: Paint::fill(plot_layers.color.to_string(), plot_layers.fill_opacity),
                interaction: Some(plot_layers.interaction),
            });
            self.surface.add_layer(Layer {
                id: plot_layers.border.clone(),
                source: plot_layers.source,
                kind: LayerKind::Line,
                paint: Paint::line(
                    plot_layers.color.to_string(),
                    BORDER_WIDTH,
                    plot_layers.dash,
                ),
                interaction: None,
            });
            rendered.fill_layer = Some(plot_layers.fill);
            rendered.border_layer = Some(plot_layers.border);
            2
        } else {
            self.surface.add_layer(Layer {
                id: plot_layers.point.clone(),
                source: plot_layers.source,
                kind: LayerKind::Circle,
                paint: Paint::circle(
                    plot_layers.color.to_string(),
                    POINT_RADIUS,
                    plot_layers.fill_opacity,
                    BORDER_WIDTH,
                ),
                interaction: Some(plot_layers.interaction),
            });
            rendered.point_layer = Some(plot_layers.point);
            1
        };

        self.rendered_plots.push(rendered);
        DrawnPlot {
            anchor,
            fit_coords,
            layers,
        }
    }

    /// Replaces the highlight state and updates paint on existing layers.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects a paint update.
    pub fn set_highlight(&mut self, state: HighlightState) -> Result<(), MapError> {
        self.highlight = state;
        self.apply_highlight()
    }

    fn apply_highlight(&mut self) -> Result<(), MapError> {
        for plot in &self.rendered_plots {
            let hovered: bool = self.highlight.hovered_plot.as_ref() == Some(&plot.plot_id);
            let expanded: bool =
                plot.group_number.is_some() && plot.group_number == self.highlight.expanded_group;

            let opacity: f64 = match (plot.group_number, hovered, expanded) {
                (_, true, _) => HOVERED_FILL_OPACITY,
                (Some(_), false, true) => EXPANDED_FILL_OPACITY,
                (Some(_), false, false) => FILL_OPACITY,
                (None, false, _) => UNGROUPED_FILL_OPACITY,
            };
            let width: f64 = if hovered || expanded {
                HIGHLIGHTED_BORDER_WIDTH
            } else {
                BORDER_WIDTH
            };

            if let Some(fill) = &plot.fill_layer {
                self.surface
                    .set_paint_property(fill, PaintProperty::Opacity(opacity))?;
            }
            if let Some(border) = &plot.border_layer {
                self.surface
                    .set_paint_property(border, PaintProperty::Width(width))?;
            }
            if let Some(point) = &plot.point_layer {
                self.surface
                    .set_paint_property(point, PaintProperty::Opacity(opacity))?;
                self.surface
                    .set_paint_property(point, PaintProperty::Width(width))?;
            }
        }
        Ok(())
    }

    /// Removes everything the renderer owns from the surface.
    ///
    /// Returns how many sources, layers and markers were removed. Ids
    /// outside the renderer's namespaces are left alone.
    pub fn clear(&mut self) -> usize {
        let mut removed: usize = 0;
        for id in self.surface.layer_ids() {
            if ids::is_managed(&id) && self.surface.remove_layer(&id) {
                removed += 1;
            }
        }
        for id in self.surface.source_ids() {
            if ids::is_managed(&id) && self.surface.remove_source(&id) {
                removed += 1;
            }
        }
        for id in self.surface.marker_ids() {
            if ids::is_managed(&id) && self.surface.remove_marker(&id) {
                removed += 1;
            }
        }
        self.rendered_plots.clear();
        self.legend.clear();
        self.rendered = None;
        removed
    }

    /// Clears the surface and hands it back.
    #[must_use]
    pub fn dispose(mut self) -> M {
        let removed: usize = self.clear();
        debug!(removed, "Map renderer disposed");
        self.surface
    }
}

struct DrawnPlot {
    anchor: Coord,
    fit_coords: Vec<Coord>,
    layers: usize,
}
