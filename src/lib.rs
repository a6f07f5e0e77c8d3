#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;
pub mod view;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use error::{DocumentError, ExportError, RenderWarning, ViewportError};
pub use ir::{DiagramKind, Edge, GraphDocument, Node, Point, ShapeKind};
pub use view::DiagramView;
pub use viewport::{SurfaceSize, ViewportState};

/// Renders a document as the live view would, at the given pan/zoom.
pub fn render_document(
    document: &GraphDocument,
    viewport: &ViewportState,
    surface: SurfaceSize,
    config: &Config,
) -> String {
    let layout = layout::layout_document(document, &config.theme, &config.layout);
    render::render_svg(&layout, viewport, surface, config)
}

/// The export surface of a document as SVG text.
pub fn export_document_svg(document: &GraphDocument, config: &Config) -> String {
    let layout = layout::layout_document(document, &config.theme, &config.layout);
    export::export_svg(&layout, config)
}

#[cfg(feature = "png")]
pub fn export_document_png(
    document: &GraphDocument,
    config: &Config,
) -> Result<Vec<u8>, ExportError> {
    let layout = layout::layout_document(document, &config.theme, &config.layout);
    export::export_png(&layout, config)
}
