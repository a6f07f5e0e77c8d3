pub mod geometry;
pub mod text;
pub(crate) mod types;
pub use types::*;

use crate::config::LayoutConfig;
use crate::error::RenderWarning;
use crate::ir::{DiagramKind, Edge, GraphDocument, Node, Point};
use crate::theme::Theme;
use log::{debug, warn};
use std::collections::HashMap;
use std::f32::consts::PI;
use text::{NodeFont, max_label_width, wrap_label};

/// Ids the upstream service gives the root of a mindmap and the entry of a
/// flowchart.
const ROOT_SENTINELS: [&str; 2] = ["central", "start"];

/// Assigns a world-space center to every node.
///
/// Upstream coordinates are trusted as-is. Nodes without one are placed by the
/// fallback: the root goes to the middle of the logical canvas and the other
/// unplaced nodes, in document order, go evenly around a fixed-radius circle
/// starting at angle 0.
pub fn resolve_positions(document: &GraphDocument, config: &LayoutConfig) -> ResolvedPositions {
    let mut resolved = ResolvedPositions::default();
    let mut pending: Vec<&Node> = Vec::new();
    for node in &document.nodes {
        match node.position {
            Some(point) if point.is_finite() => {
                resolved.positions.insert(node.id.clone(), point);
            }
            Some(_) => {
                resolved.warnings.push(RenderWarning::InvalidPosition {
                    node: node.id.clone(),
                });
                pending.push(node);
            }
            None => pending.push(node),
        }
    }
    if pending.is_empty() {
        return resolved;
    }

    let (width, height) = document.logical_size();
    let center = Point::new(width / 2.0, height / 2.0);
    // A root that already has a position keeps it.
    let root_id: Option<&str> = match find_root(document) {
        Some(root) => pending
            .iter()
            .any(|node| node.id == root.id)
            .then_some(root.id.as_str()),
        None => pending.first().copied().map(|node| node.id.as_str()),
    };
    if let Some(root_id) = root_id {
        resolved.positions.insert(root_id.to_string(), center);
    }
    let ring: Vec<&Node> = pending
        .into_iter()
        .filter(|node| Some(node.id.as_str()) != root_id)
        .collect();
    debug!(
        root:? = root_id,
        ring = ring.len(),
        radius = config.fallback_radius;
        "Applying fallback circular layout"
    );
    place_on_circle(&ring, center, config.fallback_radius, &mut resolved.positions);
    resolved
}

fn find_root(document: &GraphDocument) -> Option<&Node> {
    document
        .nodes
        .iter()
        .find(|node| ROOT_SENTINELS.iter().any(|sentinel| *sentinel == node.id))
        .or_else(|| document.nodes.iter().find(|node| node.level == 0))
}

fn place_on_circle(ring: &[&Node], center: Point, radius: f32, positions: &mut Positions) {
    // A root-only document leaves nothing to spread out.
    if ring.is_empty() {
        return;
    }
    let count = ring.len() as f32;
    for (idx, node) in ring.iter().enumerate() {
        let angle = 2.0 * PI * idx as f32 / count;
        positions.insert(
            node.id.clone(),
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            ),
        );
    }
}

/// Builds the world-space scene for one frame: wrapped labels, shape extents
/// and edge endpoints. Nothing here is cached between frames, and the
/// returned warnings are left to the caller to report.
pub fn compute_layout(
    document: &GraphDocument,
    positions: &Positions,
    theme: &Theme,
    config: &LayoutConfig,
) -> Layout {
    let kind = document.kind;
    let (width, height) = document.logical_size();
    let mut warnings = Vec::new();
    let mut nodes: Vec<NodeLayout> = Vec::with_capacity(document.nodes.len());
    let mut placed: HashMap<&str, usize> = HashMap::new();

    for node in &document.nodes {
        let Some(center) = positions.get(&node.id).copied().filter(|p| p.is_finite()) else {
            warnings.push(RenderWarning::UnresolvedPosition {
                node: node.id.clone(),
            });
            continue;
        };
        let font = NodeFont::for_node(kind, node.level, config);
        let label = wrap_label(&node.label, font, max_label_width(kind, config), theme, config);
        let geometry = geometry::resolve(node, &label, &config.geometry);
        placed.insert(node.id.as_str(), nodes.len());
        nodes.push(NodeLayout {
            id: node.id.clone(),
            center,
            shape: node.shape,
            geometry,
            font,
            label,
            color: node.color.unwrap_or(theme.node_color),
        });
    }

    let mut edges = Vec::with_capacity(document.edges.len());
    for edge in &document.edges {
        if let Some(missing) = [&edge.from, &edge.to]
            .into_iter()
            .find(|id| document.node(id).is_none())
        {
            warnings.push(RenderWarning::UnknownEndpoint {
                from: edge.from.clone(),
                to: edge.to.clone(),
                missing: missing.clone(),
            });
            continue;
        }
        // Endpoints without a position were already reported above.
        let (Some(&from), Some(&to)) = (placed.get(edge.from.as_str()), placed.get(edge.to.as_str()))
        else {
            continue;
        };
        edges.push(edge_layout(edge, &nodes[from], &nodes[to], kind, theme, config));
    }

    Layout {
        kind,
        width,
        height,
        nodes,
        edges,
        warnings,
    }
}

/// Positions plus scene in one call, with the warnings of both steps logged
/// and kept on the layout.
pub fn layout_document(document: &GraphDocument, theme: &Theme, config: &LayoutConfig) -> Layout {
    let resolved = resolve_positions(document, config);
    let mut layout = compute_layout(document, &resolved.positions, theme, config);
    let mut warnings = resolved.warnings;
    warnings.append(&mut layout.warnings);
    report_warnings(&warnings);
    layout.warnings = warnings;
    layout
}

pub(crate) fn report_warnings(warnings: &[RenderWarning]) {
    for warning in warnings {
        warn!("{warning}");
    }
}

fn edge_layout(
    edge: &Edge,
    from: &NodeLayout,
    to: &NodeLayout,
    kind: DiagramKind,
    theme: &Theme,
    config: &LayoutConfig,
) -> EdgeLayout {
    let directed = edge.is_directed(kind);
    let (start, end) = if directed {
        trim_to_outlines(from, to)
    } else {
        (from.center, to.center)
    };
    let stroke_width = match kind {
        DiagramKind::Flowchart => config.edges.flowchart_width,
        DiagramKind::Mindmap => {
            let weight = edge
                .width
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(config.edges.default_weight);
            weight * config.edges.mindmap_width_scale
        }
    };
    EdgeLayout {
        from: edge.from.clone(),
        to: edge.to.clone(),
        start,
        end,
        directed,
        dashed: edge.dashed,
        label: edge.label.clone(),
        color: edge.color.unwrap_or(theme.edge_color),
        stroke_width,
    }
}

/// Clips the center-to-center segment to the two outlines so the arrowhead
/// sits on the destination border instead of under its fill.
fn trim_to_outlines(from: &NodeLayout, to: &NodeLayout) -> (Point, Point) {
    let dx = to.center.x - from.center.x;
    let dy = to.center.y - from.center.y;
    let length = dx.hypot(dy);
    if length <= f32::EPSILON {
        return (from.center, to.center);
    }
    let (ux, uy) = (dx / length, dy / length);
    let start_offset = geometry::boundary_distance(from.shape, from.geometry, ux, uy);
    let end_offset = geometry::boundary_distance(to.shape, to.geometry, -ux, -uy);
    if start_offset + end_offset >= length {
        // Overlapping shapes: nothing visible between them to clip.
        return (from.center, to.center);
    }
    (
        Point::new(from.center.x + ux * start_offset, from.center.y + uy * start_offset),
        Point::new(to.center.x - ux * end_offset, to.center.y - uy * end_offset),
    )
}
