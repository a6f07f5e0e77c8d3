use std::collections::BTreeMap;

use crate::error::RenderWarning;
use crate::ir::{DiagramKind, Point, ShapeKind};
use crate::theme::Rgb;

use super::text::NodeFont;

/// World-space node centers keyed by node id.
pub type Positions = BTreeMap<String, Point>;

#[derive(Debug, Clone, Default)]
pub struct ResolvedPositions {
    pub positions: Positions,
    pub warnings: Vec<RenderWarning>,
}

/// A label broken into lines for one font. Rebuilt on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub line_widths: Vec<f32>,
    pub line_height: f32,
}

impl WrappedText {
    pub fn width(&self) -> f32 {
        self.line_widths.iter().copied().fold(0.0, f32::max)
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeGeometry {
    pub half_width: f32,
    pub half_height: f32,
}

impl NodeGeometry {
    pub const fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    pub fn contains(&self, other: &NodeGeometry) -> bool {
        self.half_width >= other.half_width && self.half_height >= other.half_height
    }
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub center: Point,
    pub shape: ShapeKind,
    pub geometry: NodeGeometry,
    pub font: NodeFont,
    pub label: WrappedText,
    pub color: Rgb,
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub start: Point,
    /// Destination outline for directed edges, destination center otherwise.
    pub end: Point,
    pub directed: bool,
    pub dashed: bool,
    pub label: Option<String>,
    pub color: Rgb,
    pub stroke_width: f32,
}

impl EdgeLayout {
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// Everything a renderer needs for one frame, in world space.
#[derive(Debug, Clone)]
pub struct Layout {
    pub kind: DiagramKind,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub warnings: Vec<RenderWarning>,
}
