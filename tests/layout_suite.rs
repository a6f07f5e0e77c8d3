use std::path::Path;

use float_cmp::approx_eq;
use mindflow_renderer::layout::geometry::{containment_minimum, text_half_extents};
use mindflow_renderer::layout::{layout_document, resolve_positions};
use mindflow_renderer::{
    Config, DiagramKind, DiagramView, GraphDocument, Point, RenderWarning, SurfaceSize,
    ViewportState, render_document,
};

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn load_fixture(name: &str) -> GraphDocument {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    GraphDocument::from_json(&input).expect("fixture should load")
}

// Keep this list explicit so new fixtures must be added intentionally.
const FIXTURES: [&str; 5] = [
    "flowchart/decision.json",
    "flowchart/unpositioned.json",
    "mindmap/cells.json",
    "mindmap/fallback.json",
    "mindmap/dangling_edge.json",
];

#[test]
fn render_all_fixtures() {
    let config = Config::default();
    for fixture in FIXTURES {
        let document = load_fixture(fixture);
        let svg = render_document(
            &document,
            &ViewportState::IDENTITY,
            SurfaceSize::new(1200.0, 800.0),
            &config,
        );
        assert_valid_svg(&svg, fixture);
        let export = mindflow_renderer::export_document_svg(&document, &config);
        assert_valid_svg(&export, fixture);
    }
}

#[test]
fn every_fixture_node_contains_its_label() {
    let config = Config::default();
    for fixture in FIXTURES {
        let document = load_fixture(fixture);
        let layout = layout_document(&document, &config.theme, &config.layout);
        for node in &layout.nodes {
            let minimum = containment_minimum(
                node.shape,
                text_half_extents(&node.label),
                &config.layout.geometry,
            );
            assert!(
                node.geometry.contains(&minimum),
                "{fixture}: node {} is {:?}, needs {:?}",
                node.id,
                node.geometry,
                minimum
            );
        }
    }
}

#[test]
fn upstream_mindmap_keeps_its_coordinates() {
    let document = load_fixture("mindmap/cells.json");
    assert_eq!(document.kind, DiagramKind::Mindmap);
    let resolved = resolve_positions(&document, &Config::default().layout);
    assert_eq!(resolved.positions["sub_2_1"], Point::new(1700.0, 2000.0));
    assert!(resolved.warnings.is_empty());
}

#[test]
fn fallback_mindmap_surrounds_the_root() {
    let config = Config::default();
    let document = load_fixture("mindmap/fallback.json");
    let resolved = resolve_positions(&document, &config.layout);
    let radius = config.layout.fallback_radius;
    let expected = [
        ("central", 2500.0, 2000.0),
        ("light", 2500.0 + radius, 2000.0),
        ("calvin", 2500.0, 2000.0 + radius),
        ("chloro", 2500.0 - radius, 2000.0),
        ("inputs", 2500.0, 2000.0 - radius),
    ];
    for (id, x, y) in expected {
        let p = resolved.positions[id];
        assert!(approx_eq!(f32, p.x, x, epsilon = 1e-2), "{id}.x = {}", p.x);
        assert!(approx_eq!(f32, p.y, y, epsilon = 1e-2), "{id}.y = {}", p.y);
    }
}

#[test]
fn flowchart_without_positions_uses_its_start_node_as_root() {
    let config = Config::default();
    let document = load_fixture("flowchart/unpositioned.json");
    let resolved = resolve_positions(&document, &config.layout);
    assert_eq!(resolved.positions["start"], Point::new(900.0, 700.0));
    assert_eq!(resolved.positions.len(), 4);
}

#[test]
fn dangling_edge_is_dropped_with_warning() {
    let mut view = DiagramView::default();
    view.load(load_fixture("mindmap/dangling_edge.json"))
        .expect("dangling edges are not fatal");
    assert_eq!(
        view.warnings(),
        &[RenderWarning::UnknownEndpoint {
            from: "central".to_string(),
            to: "rna".to_string(),
            missing: "rna".to_string(),
        }]
    );
    let svg = view.render();
    assert_eq!(svg.matches("<line").count(), 1);
    assert!(view.export_svg().is_ok());
}

#[test]
fn decision_fixture_draws_badges_and_plain_labels() {
    let config = Config::default();
    let document = load_fixture("flowchart/decision.json");
    let svg = mindflow_renderer::export_document_svg(&document, &config);
    assert_eq!(svg.matches("font-weight=\"bold\"").count(), 2);
    assert!(svg.contains(">retry</text>"));
    assert!(svg.contains("stroke-dasharray=\"8 6\""));
    assert!(svg.contains("Pause &amp; repair &lt;damage&gt;"));
    // one arrowhead per directed edge
    assert_eq!(svg.matches("<path d=\"M").count(), 5);
}

#[test]
fn live_view_renders_through_the_viewport() {
    let mut view = DiagramView::default();
    view.load(load_fixture("flowchart/decision.json")).unwrap();
    view.zoom_at(Point::new(600.0, 400.0), -100.0).unwrap();
    let svg = view.render();
    assert!(svg.contains(&format!("<g transform=\"{}\">", view.viewport().svg_matrix())));
}
