// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::create_test_session;
use crate::{
    FeatureRef, GROUP_PALETTE, HighlightState, Layer, LayerKind, LegendEntry, MapConfig,
    MapError, MapRenderer, MapSurface, Marker, Paint, PaintProperty, RenderReport,
    SceneSurface, UNGROUPED_COLOR, UNGROUPED_DASH, Viewport, ViewportFit, ids,
};
use plotgroup::{PreviewSession, SupervisorChoice};
use plotgroup_domain::{Coord, PlotId};
use serde_json::json;

fn create_test_renderer() -> MapRenderer<SceneSurface> {
    MapRenderer::new(SceneSurface::new(), MapConfig::default())
}

#[test]
fn test_render_draws_every_plot() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();

    let report: RenderReport = renderer.render(&session).unwrap();

    assert!(!report.skipped);
    assert_eq!(report.layers, 9);
    assert_eq!(report.markers, 6);
    assert_eq!(report.synthetic, 2);
    assert_eq!(renderer.surface().layers().len(), 9);
    assert_eq!(renderer.surface().markers().len(), 6);
    assert_eq!(renderer.surface().source_ids().len(), 6);
}

#[test]
fn test_group_polygons_use_group_color() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    let p1: PlotId = PlotId::new("p1");
    let fill: &Layer = renderer.surface().layer(&ids::plot_fill(1, &p1)).unwrap();
    assert_eq!(fill.kind, LayerKind::Fill);
    assert_eq!(fill.paint, Paint::fill(GROUP_PALETTE[0].to_string(), 0.35));
    assert_eq!(
        fill.interaction.as_ref().unwrap().feature,
        FeatureRef::GroupPlot {
            group_number: 1,
            plot_id: p1.clone(),
        }
    );

    let border: &Layer = renderer.surface().layer(&ids::plot_border(1, &p1)).unwrap();
    assert_eq!(border.kind, LayerKind::Line);
    assert_eq!(border.paint.width, Some(2.0));
    assert_eq!(border.paint.dasharray, None);

    let point: &Layer = renderer
        .surface()
        .layer(&ids::plot_point(2, &PlotId::new("p4")))
        .unwrap();
    assert_eq!(point.kind, LayerKind::Circle);
    assert_eq!(point.paint.color, GROUP_PALETTE[1]);
}

#[test]
fn test_label_marker_sits_on_centroid() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    let marker: &Marker = renderer
        .surface()
        .marker(&ids::group_marker(1, &PlotId::new("p1")))
        .unwrap();

    assert_eq!(marker.label, "1");
    assert!((marker.position.lng - 106.15).abs() < 1e-9);
    assert!((marker.position.lat - 10.15).abs() < 1e-9);
}

#[test]
fn test_ungrouped_plots_are_dashed_and_synthetic_when_boundless() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    let u1: PlotId = PlotId::new("u1");
    let fill: &Layer = renderer.surface().layer(&ids::ungrouped_fill(&u1)).unwrap();
    assert_eq!(fill.paint, Paint::fill(UNGROUPED_COLOR.to_string(), 0.25));
    let border: &Layer = renderer.surface().layer(&ids::ungrouped_border(&u1)).unwrap();
    assert_eq!(border.paint.dasharray, Some(UNGROUPED_DASH));

    // p3 is the first plot without a boundary, u2 the second
    let config: MapConfig = MapConfig::default();
    let p3: &Marker = renderer
        .surface()
        .marker(&ids::group_marker(1, &PlotId::new("p3")))
        .unwrap();
    assert_eq!(p3.position, config.default_center);
    let u2: &Marker = renderer
        .surface()
        .marker(&ids::ungrouped_marker(&PlotId::new("u2")))
        .unwrap();
    assert!((u2.position.lng - (config.default_center.lng + 0.002)).abs() < 1e-9);
    assert_eq!(u2.position.lat, config.default_center.lat);
    assert!(u2.interaction.is_some());
}

#[test]
fn test_viewport_fits_rendered_boundaries() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();

    let report: RenderReport = renderer.render(&session).unwrap();

    let Some(ViewportFit::Bounds {
        bounds,
        coordinates,
    }) = report.viewport
    else {
        panic!("expected a bounds fit, got {:?}", report.viewport);
    };
    // synthetic placements are not fitted
    assert_eq!(coordinates, 16);
    assert_eq!(bounds.south_west, Coord::new(106.0, 10.0));
    assert_eq!(bounds.north_east, Coord::new(106.5, 10.5));
    assert!(matches!(
        renderer.surface().viewport(),
        Viewport::Fitted {
            padding_px: 50,
            duration_ms: 1000,
            ..
        }
    ));
}

#[test]
fn test_render_skips_unchanged_session() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    let second: RenderReport = renderer.render(&session).unwrap();

    assert!(second.skipped);
    assert_eq!(renderer.surface().layers().len(), 9);

    let forced: RenderReport = renderer.force_render(&session).unwrap();
    assert!(!forced.skipped);
    assert_eq!(renderer.surface().layers().len(), 9);
}

#[test]
fn test_render_after_edit_reflects_session() {
    let mut session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    session.remove_plot(1, &PlotId::new("p1")).unwrap();
    let report: RenderReport = renderer.render(&session).unwrap();

    assert!(!report.skipped);
    assert_eq!(report.key.revision, 1);
    assert!(
        renderer
            .surface()
            .layer(&ids::plot_fill(1, &PlotId::new("p1")))
            .is_none()
    );
    assert!(
        renderer
            .surface()
            .marker(&ids::group_marker(1, &PlotId::new("p1")))
            .is_none()
    );
    assert_eq!(renderer.surface().layers().len(), 7);
}

#[test]
fn test_colors_survive_edits() {
    let mut session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    session
        .assign_supervisor(2, &SupervisorChoice::Unassigned)
        .unwrap();
    session.remove_plot(1, &PlotId::new("p2")).unwrap();
    renderer.render(&session).unwrap();

    let p4: &Layer = renderer
        .surface()
        .layer(&ids::plot_point(2, &PlotId::new("p4")))
        .unwrap();
    assert_eq!(p4.paint.color, GROUP_PALETTE[1]);
    assert_eq!(renderer.palette().assigned(1), Some(GROUP_PALETTE[0]));
}

#[test]
fn test_clear_leaves_foreign_layers() {
    let session: PreviewSession = create_test_session();
    let mut surface: SceneSurface = SceneSurface::new();
    surface.add_source("basemap", json!({"type": "raster"}));
    surface.add_layer(Layer {
        id: String::from("basemap"),
        source: String::from("basemap"),
        kind: LayerKind::Fill,
        paint: Paint::fill(String::from("#000000"), 1.0),
        interaction: None,
    });
    let mut renderer: MapRenderer<SceneSurface> = MapRenderer::new(surface, MapConfig::default());
    renderer.render(&session).unwrap();

    let removed: usize = renderer.clear();

    assert_eq!(removed, 9 + 6 + 6);
    assert_eq!(renderer.surface().layer_ids(), vec![String::from("basemap")]);
    assert_eq!(renderer.surface().source_ids(), vec![String::from("basemap")]);
    assert!(renderer.surface().markers().is_empty());
    assert_eq!(renderer.clear(), 0);
    assert_eq!(renderer.rendered_key(), None);
}

#[test]
fn test_highlight_only_touches_paint() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();
    let layers_before: Vec<String> = renderer.surface().layer_ids();

    renderer
        .set_highlight(HighlightState {
            hovered_plot: Some(PlotId::new("p1")),
            expanded_group: Some(1),
        })
        .unwrap();

    let surface: &SceneSurface = renderer.surface();
    assert_eq!(surface.layer_ids(), layers_before);
    let p1: PlotId = PlotId::new("p1");
    let p2: PlotId = PlotId::new("p2");
    assert_eq!(
        surface.layer(&ids::plot_fill(1, &p1)).unwrap().paint.opacity,
        Some(0.6)
    );
    assert_eq!(
        surface.layer(&ids::plot_border(1, &p1)).unwrap().paint.width,
        Some(4.0)
    );
    assert_eq!(
        surface.layer(&ids::plot_fill(1, &p2)).unwrap().paint.opacity,
        Some(0.5)
    );
    assert_eq!(
        surface
            .layer(&ids::ungrouped_fill(&PlotId::new("u1")))
            .unwrap()
            .paint
            .opacity,
        Some(0.25)
    );

    renderer.set_highlight(HighlightState::default()).unwrap();
    assert_eq!(
        renderer
            .surface()
            .layer(&ids::plot_fill(1, &p1))
            .unwrap()
            .paint
            .opacity,
        Some(0.35)
    );
    assert_eq!(
        renderer
            .surface()
            .layer(&ids::plot_border(1, &p1))
            .unwrap()
            .paint
            .width,
        Some(2.0)
    );
}

#[test]
fn test_highlight_survives_rerender() {
    let mut session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();
    renderer
        .set_highlight(HighlightState {
            hovered_plot: Some(PlotId::new("u1")),
            expanded_group: None,
        })
        .unwrap();

    session.remove_plot(1, &PlotId::new("p3")).unwrap();
    renderer.render(&session).unwrap();

    assert_eq!(
        renderer
            .surface()
            .layer(&ids::ungrouped_fill(&PlotId::new("u1")))
            .unwrap()
            .paint
            .opacity,
        Some(0.6)
    );
}

#[test]
fn test_legend_lists_groups_then_ungrouped() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    let legend: &[LegendEntry] = renderer.legend();

    assert_eq!(legend.len(), 3);
    assert_eq!(legend[0].group_number, Some(1));
    assert_eq!(legend[0].color, GROUP_PALETTE[0]);
    assert_eq!(legend[0].plot_count, 3);
    assert_eq!(legend[0].total_area, 10.0);
    assert_eq!(legend[2].group_number, None);
    assert_eq!(legend[2].color, UNGROUPED_COLOR);
    assert!(legend[2].dashed);
    assert_eq!(legend[2].plot_count, 2);
    assert_eq!(legend[2].total_area, 1.5);
}

#[test]
fn test_dispose_returns_clean_surface() {
    let session: PreviewSession = create_test_session();
    let mut renderer: MapRenderer<SceneSurface> = create_test_renderer();
    renderer.render(&session).unwrap();

    let surface: SceneSurface = renderer.dispose();

    assert!(surface.layers().is_empty());
    assert!(surface.markers().is_empty());
    assert!(surface.source_ids().is_empty());
}

#[test]
fn test_paint_update_on_unknown_layer() {
    let mut surface: SceneSurface = SceneSurface::new();

    let result: Result<(), MapError> =
        surface.set_paint_property("plot-1-x-fill", PaintProperty::Opacity(0.5));

    assert_eq!(
        result,
        Err(MapError::UnknownLayer(String::from("plot-1-x-fill")))
    );
}

#[test]
fn test_paint_update_must_match_layer_kind() {
    let mut surface: SceneSurface = SceneSurface::new();
    surface.add_layer(Layer {
        id: String::from("plot-1-x-border"),
        source: String::from("plot-1-x"),
        kind: LayerKind::Line,
        paint: Paint::line(String::from("#3b82f6"), 2.0, None),
        interaction: None,
    });

    let result: Result<(), MapError> =
        surface.set_paint_property("plot-1-x-border", PaintProperty::Opacity(0.5));

    assert!(matches!(result, Err(MapError::PaintMismatch { .. })));
}
