use crate::ir::GraphDocument;
use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON snapshot of a computed scene, for debugging layout and sizing.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub shape: String,
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
    pub font_size: f32,
    pub font_weight: u16,
    pub label_width: f32,
    pub label_height: f32,
    pub label_lines: Vec<String>,
    /// Whether the position came with the document or from the fallback.
    pub upstream_position: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub directed: bool,
    pub dashed: bool,
    pub label: Option<String>,
    pub stroke_width: f32,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout, document: &GraphDocument) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                shape: node.shape.as_str().to_string(),
                x: node.center.x,
                y: node.center.y,
                half_width: node.geometry.half_width,
                half_height: node.geometry.half_height,
                font_size: node.font.size,
                font_weight: node.font.weight,
                label_width: node.label.width(),
                label_height: node.label.height(),
                label_lines: node.label.lines.clone(),
                upstream_position: document
                    .node(&node.id)
                    .and_then(|source| source.position)
                    .is_some_and(|position| position.is_finite()),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                directed: edge.directed,
                dashed: edge.dashed,
                label: edge.label.clone(),
                stroke_width: edge.stroke_width,
                points: vec![[edge.start.x, edge.start.y], [edge.end.x, edge.end.y]],
            })
            .collect();

        LayoutDump {
            id: document.id.clone(),
            kind: layout.kind.as_str().to_string(),
            title: document.title.clone(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
            warnings: layout.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout, document: &GraphDocument) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, document);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
