//! Shape sizing. Every shape is sized from its wrapped label so the label can
//! never spill over the outline, whatever the shape kind.

use std::f32::consts::SQRT_2;

use crate::config::GeometryConfig;
use crate::ir::{Node, ShapeKind};

use super::{NodeGeometry, WrappedText};

/// Half-extents of the label block. A blank label has no extent, so its shape
/// falls back to padding and base size alone.
pub fn text_half_extents(text: &WrappedText) -> (f32, f32) {
    if text.is_blank() {
        return (0.0, 0.0);
    }
    (text.width() / 2.0, text.height() / 2.0)
}

pub fn resolve(node: &Node, text: &WrappedText, config: &GeometryConfig) -> NodeGeometry {
    let (hx, hy) = text_half_extents(text);
    let sized = match node.shape {
        ShapeKind::Box | ShapeKind::Ellipse => {
            NodeGeometry::new(hx + config.padding_x, hy + config.padding_y)
        }
        ShapeKind::Diamond => NodeGeometry::new(
            hx + config.padding_x + config.diamond_extra_x,
            hy + config.padding_y + config.diamond_extra_y,
        ),
        ShapeKind::Circle => {
            let base = node.base_size.filter(|size| size.is_finite() && *size > 0.0);
            let base = base.unwrap_or(config.default_base_size) * config.base_size_scale;
            let radius = base.max(hx.hypot(hy) + config.circle_margin);
            NodeGeometry::new(radius, radius)
        }
    };
    let minimum = containment_minimum(node.shape, (hx, hy), config);
    NodeGeometry::new(
        sized.half_width.max(minimum.half_width),
        sized.half_height.max(minimum.half_height),
    )
}

/// Smallest half-extents of `shape` whose interior still holds the label block
/// grown by `content_inset` on every side.
pub fn containment_minimum(
    shape: ShapeKind,
    text_half: (f32, f32),
    config: &GeometryConfig,
) -> NodeGeometry {
    let hx = text_half.0 + config.content_inset;
    let hy = text_half.1 + config.content_inset;
    match shape {
        ShapeKind::Box => NodeGeometry::new(hx, hy),
        // The ellipse through the rectangle's corners with the same aspect.
        ShapeKind::Ellipse => NodeGeometry::new(hx * SQRT_2, hy * SQRT_2),
        // The rhombus through the rectangle's corners with the same aspect.
        ShapeKind::Diamond => NodeGeometry::new(hx * 2.0, hy * 2.0),
        ShapeKind::Circle => {
            let radius = hx.hypot(hy);
            NodeGeometry::new(radius, radius)
        }
    }
}

/// Distance from the shape center to its outline along the unit vector
/// `(ux, uy)`.
pub fn boundary_distance(shape: ShapeKind, geometry: NodeGeometry, ux: f32, uy: f32) -> f32 {
    let a = geometry.half_width.max(f32::EPSILON);
    let b = geometry.half_height.max(f32::EPSILON);
    match shape {
        ShapeKind::Circle => a,
        ShapeKind::Box => {
            let tx = if ux.abs() > f32::EPSILON { a / ux.abs() } else { f32::INFINITY };
            let ty = if uy.abs() > f32::EPSILON { b / uy.abs() } else { f32::INFINITY };
            let t = tx.min(ty);
            if t.is_finite() { t } else { 0.0 }
        }
        ShapeKind::Ellipse => {
            let denom = ((ux / a).powi(2) + (uy / b).powi(2)).sqrt();
            if denom > 0.0 { 1.0 / denom } else { 0.0 }
        }
        ShapeKind::Diamond => {
            let denom = ux.abs() / a + uy.abs() / b;
            if denom > 0.0 { 1.0 / denom } else { 0.0 }
        }
    }
}

/// Whether the point `(dx, dy)`, relative to the shape center, lies inside
/// the outline.
pub fn contains_point(shape: ShapeKind, geometry: NodeGeometry, dx: f32, dy: f32) -> bool {
    let a = geometry.half_width;
    let b = geometry.half_height;
    if a <= 0.0 || b <= 0.0 {
        return dx == 0.0 && dy == 0.0;
    }
    let tolerance = 1e-4;
    match shape {
        ShapeKind::Box => dx.abs() <= a + tolerance && dy.abs() <= b + tolerance,
        ShapeKind::Ellipse => (dx / a).powi(2) + (dy / b).powi(2) <= 1.0 + tolerance,
        ShapeKind::Diamond => dx.abs() / a + dy.abs() / b <= 1.0 + tolerance,
        ShapeKind::Circle => dx.hypot(dy) <= a + tolerance,
    }
}
