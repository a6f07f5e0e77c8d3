//! Error and warning types shared by the loader, the viewport and the exporters.

use thiserror::Error;

/// A document that cannot be displayed at all. This is the only fatal
/// condition: the view refuses to load rather than rendering a partial diagram.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document id is missing or empty")]
    MissingId,

    #[error("unknown diagram kind {0:?}")]
    UnknownKind(String),

    #[error("node #{index} has an empty id")]
    EmptyNodeId { index: usize },

    #[error("duplicate node id {0:?}")]
    DuplicateNodeId(String),

    #[error("node {node:?} has unknown shape {shape:?}")]
    UnknownShape { node: String, shape: String },

    #[error("{owner} has invalid color {value:?}")]
    InvalidColor { owner: String, value: String },

    #[error("node {node:?} has only one of its x/y coordinates")]
    IncompletePosition { node: String },

    #[error("edge #{index} is missing its {field} endpoint")]
    MissingEndpoint { index: usize, field: &'static str },

    #[error("mindmap must have exactly one root node (level 0), found {found}")]
    RootCount { found: usize },

    #[error("logical size must be positive and finite, got {width}x{height}")]
    InvalidLogicalSize { width: f32, height: f32 },
}

/// Rejected viewport update. The caller keeps its previous state.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ViewportError {
    #[error("viewport transform is not finite (pan=({pan_x}, {pan_y}), zoom={zoom})")]
    NonFinite { pan_x: f32, pan_y: f32, zoom: f32 },

    #[error("zoom factor must be positive and finite, got {0}")]
    InvalidFactor(f32),

    #[error("surface size must be positive and finite, got {width}x{height}")]
    InvalidSurface { width: f32, height: f32 },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no diagram is loaded")]
    NothingLoaded,

    #[error("export size {width}x{height} cannot be rasterized")]
    InvalidSize { width: f32, height: f32 },

    #[cfg(feature = "png")]
    #[error("failed to parse export surface: {0}")]
    Svg(#[from] usvg::Error),

    #[error("failed to allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Non-fatal problem found while laying out or drawing a document. The
/// offending element is skipped and everything else still renders.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderWarning {
    #[error("edge {from:?} -> {to:?} references unknown node {missing:?}; edge skipped")]
    UnknownEndpoint {
        from: String,
        to: String,
        missing: String,
    },

    #[error("node {node:?} has no resolved position; node skipped")]
    UnresolvedPosition { node: String },

    #[error("node {node:?} has a non-finite position; placed by fallback layout")]
    InvalidPosition { node: String },
}
