use crate::error::DocumentError;
use crate::theme::Rgb;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Mindmap,
    Flowchart,
}

impl DiagramKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "mindmap" | "mind_map" => Some(Self::Mindmap),
            "flowchart" | "flow" => Some(Self::Flowchart),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mindmap => "mindmap",
            Self::Flowchart => "flowchart",
        }
    }

    /// Export resolution used when a document does not carry its own.
    pub fn default_logical_size(self) -> (f32, f32) {
        match self {
            Self::Mindmap => (5000.0, 4000.0),
            Self::Flowchart => (1800.0, 1400.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Box,
    Diamond,
    Ellipse,
}

impl ShapeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(Self::Circle),
            "box" | "rect" | "rectangle" => Some(Self::Box),
            "diamond" | "rhombus" => Some(Self::Diamond),
            "ellipse" | "oval" => Some(Self::Ellipse),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Box => "box",
            Self::Diamond => "diamond",
            Self::Ellipse => "ellipse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: ShapeKind,
    pub level: u32,
    pub color: Option<Rgb>,
    pub position: Option<Point>,
    pub base_size: Option<f32>,
}

impl Node {
    pub fn new(id: &str, label: &str, shape: ShapeKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            shape,
            level: 0,
            color: None,
            position: None,
            base_size: None,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub color: Option<Rgb>,
    pub width: Option<f32>,
    pub directed: Option<bool>,
    pub dashed: bool,
}

impl Edge {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            label: None,
            color: None,
            width: None,
            directed: None,
            dashed: false,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Flowchart edges are directed and mindmap edges are not, unless the edge
    /// says otherwise.
    pub fn is_directed(&self, kind: DiagramKind) -> bool {
        self.directed.unwrap_or(kind == DiagramKind::Flowchart)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphDocument {
    pub id: String,
    pub kind: DiagramKind,
    pub title: String,
    pub logical_width: Option<f32>,
    pub logical_height: Option<f32>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    pub fn new(id: &str, kind: DiagramKind, title: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            logical_width: None,
            logical_height: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn logical_size(&self) -> (f32, f32) {
        let (width, height) = self.kind.default_logical_size();
        (
            self.logical_width.unwrap_or(width),
            self.logical_height.unwrap_or(height),
        )
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Parses a single document. The upstream service wraps documents as
    /// `{"mindmap": {...}}`; that envelope is accepted too.
    pub fn from_json(input: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    /// Parses either one document or a JSON array of documents.
    pub fn many_from_json(input: &str) -> Result<Vec<Self>, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(input)?;
        match value {
            serde_json::Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            other => Ok(vec![Self::from_value(other)?]),
        }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let value = match value {
            serde_json::Value::Object(mut map) if map.get("mindmap").is_some_and(|v| v.is_object()) => {
                map.remove("mindmap").unwrap_or_default()
            }
            other => other,
        };
        let raw = RawDocument::deserialize(value)?;
        let document = Self::try_from(raw)?;
        document.validate()?;
        Ok(document)
    }

    /// Checks the invariants every renderable document must hold. Edges with
    /// unknown endpoints are not an error here; they are skipped at render time.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.id.trim().is_empty() {
            return Err(DocumentError::MissingId);
        }
        let mut seen = HashSet::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(DocumentError::EmptyNodeId { index });
            }
            if !seen.insert(node.id.as_str()) {
                return Err(DocumentError::DuplicateNodeId(node.id.clone()));
            }
        }
        if self.kind == DiagramKind::Mindmap {
            let roots = self.nodes.iter().filter(|node| node.level == 0).count();
            if roots != 1 {
                return Err(DocumentError::RootCount { found: roots });
            }
        }
        let (width, height) = self.logical_size();
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(DocumentError::InvalidLogicalSize { width, height });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(alias = "_id")]
    id: RawId,
    #[serde(alias = "type")]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(alias = "canvas_width")]
    logical_width: Option<f32>,
    #[serde(alias = "canvas_height")]
    logical_height: Option<f32>,
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    id: RawId,
    label: String,
    #[serde(alias = "shape")]
    shape_kind: Option<String>,
    #[serde(default)]
    level: u32,
    color: Option<String>,
    position: Option<RawPoint>,
    x: Option<f32>,
    y: Option<f32>,
    #[serde(alias = "size")]
    base_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEdge {
    #[serde(alias = "from")]
    from_id: Option<RawId>,
    #[serde(alias = "to")]
    to_id: Option<RawId>,
    label: Option<String>,
    color: Option<String>,
    width: Option<f32>,
    directed: Option<bool>,
    arrows: Option<String>,
    #[serde(default)]
    dashed: bool,
}

impl TryFrom<RawDocument> for GraphDocument {
    type Error = DocumentError;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        let kind = DiagramKind::from_token(&raw.kind)
            .ok_or_else(|| DocumentError::UnknownKind(raw.kind.clone()))?;
        let nodes = raw
            .nodes
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let edges = raw
            .edges
            .into_iter()
            .enumerate()
            .map(|(index, edge)| edge_from_raw(index, edge))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id: raw.id.into_string(),
            kind,
            title: raw.title,
            logical_width: raw.logical_width,
            logical_height: raw.logical_height,
            nodes,
            edges,
        })
    }
}

impl TryFrom<RawNode> for Node {
    type Error = DocumentError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let id = raw.id.into_string();
        let shape = match raw.shape_kind.as_deref() {
            None => ShapeKind::Circle,
            Some(token) => ShapeKind::from_token(token).ok_or_else(|| DocumentError::UnknownShape {
                node: id.clone(),
                shape: token.to_string(),
            })?,
        };
        let color = parse_color(raw.color.as_deref(), || format!("node {id:?}"))?;
        let position = match (raw.position, raw.x, raw.y) {
            (Some(point), _, _) => Some(Point::new(point.x, point.y)),
            (None, Some(x), Some(y)) => Some(Point::new(x, y)),
            (None, None, None) => None,
            _ => return Err(DocumentError::IncompletePosition { node: id }),
        };
        Ok(Node {
            id,
            label: raw.label,
            shape,
            level: raw.level,
            color,
            position,
            base_size: raw.base_size,
        })
    }
}

fn edge_from_raw(index: usize, raw: RawEdge) -> Result<Edge, DocumentError> {
    let from = raw
        .from_id
        .map(RawId::into_string)
        .ok_or(DocumentError::MissingEndpoint { index, field: "from" })?;
    let to = raw
        .to_id
        .map(RawId::into_string)
        .ok_or(DocumentError::MissingEndpoint { index, field: "to" })?;
    let color = parse_color(raw.color.as_deref(), || format!("edge {from:?} -> {to:?}"))?;
    let directed = raw
        .directed
        .or_else(|| raw.arrows.as_deref().map(|arrows| arrows.contains("to")));
    Ok(Edge {
        from,
        to,
        label: raw.label.filter(|label| !label.trim().is_empty()),
        color,
        width: raw.width,
        directed,
        dashed: raw.dashed,
    })
}

fn parse_color(
    value: Option<&str>,
    owner: impl FnOnce() -> String,
) -> Result<Option<Rgb>, DocumentError> {
    match value {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => Rgb::parse_hex(text)
            .map(Some)
            .ok_or_else(|| DocumentError::InvalidColor {
                owner: owner(),
                value: text.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_mindmap_payload() {
        let input = r##"{
            "mindmap": {
                "id": 42, "type": "mindmap", "title": "Cells",
                "canvas_width": 5000, "canvas_height": 4000,
                "nodes": [
                    {"id": "central", "label": "Cells", "level": 0, "color": "#8b5cf6", "size": 40, "shape": "circle", "x": 2500, "y": 2000},
                    {"id": "topic_1", "label": "Organelles", "level": 1, "color": "#ec4899", "size": 30, "shape": "box", "x": 2900, "y": 2000}
                ],
                "edges": [{"from": "central", "to": "topic_1", "width": 4, "color": "#ec4899"}]
            }
        }"##;
        let doc = GraphDocument::from_json(input).expect("payload should load");
        assert_eq!(doc.id, "42");
        assert_eq!(doc.kind, DiagramKind::Mindmap);
        assert_eq!(doc.nodes[1].shape, ShapeKind::Box);
        assert_eq!(doc.nodes[1].position, Some(Point::new(2900.0, 2000.0)));
        assert_eq!(doc.nodes[0].base_size, Some(40.0));
        assert_eq!(doc.edges[0].width, Some(4.0));
        assert!(!doc.edges[0].is_directed(doc.kind));
    }

    #[test]
    fn parses_canonical_field_names() {
        let input = r##"{
            "id": "doc", "kind": "flowchart", "title": "Flow", "logicalWidth": 1800,
            "nodes": [
                {"id": "a", "label": "A", "shapeKind": "box", "position": {"x": 1, "y": 2}},
                {"id": "b", "label": "B", "shapeKind": "diamond", "baseSize": 28}
            ],
            "edges": [{"fromId": "a", "toId": "b", "label": "Yes", "dashed": true}]
        }"##;
        let doc = GraphDocument::from_json(input).expect("document should load");
        assert_eq!(doc.logical_size(), (1800.0, 1400.0));
        assert_eq!(doc.nodes[0].position, Some(Point::new(1.0, 2.0)));
        assert_eq!(doc.nodes[1].position, None);
        assert!(doc.edges[0].dashed);
        assert!(doc.edges[0].is_directed(doc.kind));
    }

    #[test]
    fn arrows_field_sets_direction() {
        let input = r#"{
            "id": "m", "type": "mindmap",
            "nodes": [{"id": "r", "label": "R"}, {"id": "c", "label": "C", "level": 1}],
            "edges": [{"from": "r", "to": "c", "arrows": "to"}]
        }"#;
        let doc = GraphDocument::from_json(input).expect("document should load");
        assert!(doc.edges[0].is_directed(doc.kind));
    }

    #[test]
    fn rejects_missing_required_fields() {
        let err = GraphDocument::from_json(r#"{"id": "x", "kind": "mindmap"}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
        let err = GraphDocument::from_json(
            r#"{"id": "x", "kind": "flowchart", "nodes": [{"id": "a"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn rejects_duplicate_ids_and_unknown_shapes() {
        let err = GraphDocument::from_json(
            r#"{"id": "x", "kind": "flowchart", "nodes": [{"id": "a", "label": ""}, {"id": "a", "label": ""}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::DuplicateNodeId(id) if id == "a"));
        let err = GraphDocument::from_json(
            r#"{"id": "x", "kind": "flowchart", "nodes": [{"id": "a", "label": "", "shape": "star"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::UnknownShape { .. }));
    }

    #[test]
    fn mindmap_requires_single_root() {
        let err = GraphDocument::from_json(
            r#"{"id": "x", "kind": "mindmap", "nodes": [{"id": "a", "label": "", "level": 1}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::RootCount { found: 0 }));
    }

    #[test]
    fn half_positions_are_rejected() {
        let err = GraphDocument::from_json(
            r#"{"id": "x", "kind": "flowchart", "nodes": [{"id": "a", "label": "", "x": 4}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocumentError::IncompletePosition { .. }));
    }

    #[test]
    fn many_from_json_accepts_arrays() {
        let input = r#"[
            {"id": "1", "kind": "flowchart", "nodes": []},
            {"id": "2", "kind": "flowchart", "nodes": []}
        ]"#;
        let docs = GraphDocument::many_from_json(input).expect("array should load");
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn unknown_edge_endpoints_are_not_fatal() {
        let mut doc = GraphDocument::new("d", DiagramKind::Flowchart, "t");
        doc.nodes.push(Node::new("a", "A", ShapeKind::Box));
        doc.edges.push(Edge::new("a", "ghost"));
        assert!(doc.validate().is_ok());
    }
}
