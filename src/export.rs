//! Off-screen rendering at the document's logical resolution. The live
//! viewport never reaches this module, so the output depends on the scene
//! alone.

use crate::config::Config;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
#[cfg(feature = "png")]
use crate::error::ExportError;
use crate::ir::GraphDocument;
use crate::layout::Layout;
use crate::render::{draw_diagram, open_surface};
#[cfg(feature = "png")]
use log::info;

/// The export surface as SVG text: logical size, identity transform.
pub fn export_svg(layout: &Layout, config: &Config) -> String {
    let mut svg = String::new();
    open_surface(&mut svg, layout.width, layout.height, &config.theme);
    svg.push_str("<g>");
    draw_diagram(&mut svg, layout, config);
    svg.push_str("</g></svg>");
    svg
}

#[cfg(feature = "png")]
pub fn export_pixmap(layout: &Layout, config: &Config) -> Result<resvg::tiny_skia::Pixmap, ExportError> {
    let svg = export_svg(layout, config);
    rasterize(&svg, layout.width, layout.height, &config.render)
}

#[cfg(feature = "png")]
pub fn export_png(layout: &Layout, config: &Config) -> Result<Vec<u8>, ExportError> {
    let pixmap = export_pixmap(layout, config)?;
    let bytes = pixmap
        .encode_png()
        .map_err(|err| ExportError::Encode(err.to_string()))?;
    info!(
        width = pixmap.width(),
        height = pixmap.height(),
        bytes = bytes.len();
        "Exported diagram image"
    );
    Ok(bytes)
}

/// Rasterizes an SVG document onto a `width` x `height` pixmap.
#[cfg(feature = "png")]
pub fn rasterize(
    svg: &str,
    width: f32,
    height: f32,
    render_cfg: &RenderConfig,
) -> Result<resvg::tiny_skia::Pixmap, ExportError> {
    if !(width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0)
        || width > u32::MAX as f32
        || height > u32::MAX as f32
    {
        return Err(ExportError::InvalidSize { width, height });
    }
    let (pixel_width, pixel_height) = (width.ceil() as u32, height.ceil() as u32);

    let mut opt = usvg::Options::default();
    if render_cfg.system_fonts {
        opt.fontdb_mut().load_system_fonts();
    }
    if let Some(size) = usvg::Size::from_wh(width, height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixel_width, pixel_height).ok_or(
        ExportError::Pixmap {
            width: pixel_width,
            height: pixel_height,
        },
    )?;
    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap)
}

/// Download name for an exported image, `"{kind}_{title}.png"`.
pub fn export_file_name(document: &GraphDocument) -> String {
    let title: String = document
        .title
        .trim()
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    let title = if title.is_empty() {
        "untitled"
    } else {
        title.as_str()
    };
    format!("{}_{}.png", document.kind.as_str(), title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DiagramKind, Edge, Node, ShapeKind};
    use crate::layout::layout_document;

    fn small_flow() -> (GraphDocument, Config) {
        let mut config = Config::default();
        config.render.system_fonts = false;
        let mut doc = GraphDocument::new("f", DiagramKind::Flowchart, "Cell cycle");
        doc.logical_width = Some(300.0);
        doc.logical_height = Some(200.0);
        doc.nodes.push(Node::new("a", "", ShapeKind::Box).at(80.0, 100.0));
        doc.nodes.push(Node::new("b", "", ShapeKind::Circle).at(230.0, 100.0));
        doc.edges.push(Edge::new("a", "b"));
        (doc, config)
    }

    #[test]
    fn export_svg_uses_logical_size_and_no_transform() {
        let (doc, config) = small_flow();
        let layout = layout_document(&doc, &config.theme, &config.layout);
        let svg = export_svg(&layout, &config);
        assert!(svg.contains("width=\"300\" height=\"200\" viewBox=\"0 0 300 200\""));
        assert!(!svg.contains("transform="));
    }

    #[test]
    fn file_name_uses_kind_and_sanitized_title() {
        let (mut doc, _) = small_flow();
        assert_eq!(export_file_name(&doc), "flowchart_Cell cycle.png");
        doc.title = "a/b: c?".to_string();
        assert_eq!(export_file_name(&doc), "flowchart_a_b_ c_.png");
        doc.title = "   ".to_string();
        assert_eq!(export_file_name(&doc), "flowchart_untitled.png");
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_has_logical_dimensions() {
        let (doc, config) = small_flow();
        let layout = layout_document(&doc, &config.theme, &config.layout);
        let pixmap = export_pixmap(&layout, &config).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (300, 200));
        let png = export_png(&layout, &config).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[cfg(feature = "png")]
    #[test]
    fn rejects_unrasterizable_sizes() {
        let config = RenderConfig::default();
        assert!(matches!(
            rasterize("<svg xmlns=\"http://www.w3.org/2000/svg\"/>", 0.0, 10.0, &config),
            Err(ExportError::InvalidSize { .. })
        ));
        assert!(rasterize("<svg", 10.0, 10.0, &config).is_err());
    }
}
