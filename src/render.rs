use crate::config::Config;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::ir::{DiagramKind, Point, ShapeKind};
use crate::layout::{EdgeLayout, Layout, NodeLayout};
use crate::theme::Theme;
use crate::viewport::{SurfaceSize, ViewportState};
use anyhow::Result;
use std::path::Path;

/// Draws the live view: a surface of the container's size with the viewport
/// applied as a single group transform over the world-space drawing.
pub fn render_svg(
    layout: &Layout,
    viewport: &ViewportState,
    surface: SurfaceSize,
    config: &Config,
) -> String {
    let mut svg = String::new();
    open_surface(&mut svg, surface.width, surface.height, &config.theme);
    svg.push_str(&format!("<g transform=\"{}\">", viewport.svg_matrix()));
    draw_diagram(&mut svg, layout, config);
    svg.push_str("</g></svg>");
    svg
}

pub(crate) fn open_surface(svg: &mut String, width: f32, height: f32, theme: &Theme) {
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
}

/// World-space drawing shared by the live view and the export: gradient
/// defs, then every edge, then every node with its label on top.
pub(crate) fn draw_diagram(svg: &mut String, layout: &Layout, config: &Config) {
    let theme = &config.theme;
    svg.push_str("<defs>");
    for (idx, node) in layout.nodes.iter().enumerate() {
        svg.push_str(&node_gradient(idx, node, theme, config));
    }
    svg.push_str("</defs>");

    for edge in &layout.edges {
        draw_edge(svg, edge, layout.kind, config);
    }

    for (idx, node) in layout.nodes.iter().enumerate() {
        draw_node(svg, idx, node, config);
        svg.push_str(&text_block_svg(node, theme));
    }
}

fn node_gradient(idx: usize, node: &NodeLayout, theme: &Theme, config: &Config) -> String {
    let Point { x, y } = node.center;
    let offset = config.render.gradient_offset;
    format!(
        "<radialGradient id=\"node-fill-{idx}\" gradientUnits=\"userSpaceOnUse\" cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{:.2}\" fx=\"{:.2}\" fy=\"{:.2}\"><stop offset=\"0\" stop-color=\"{}\"/><stop offset=\"1\" stop-color=\"{}\"/></radialGradient>",
        (node.geometry.half_width * 2.0).max(1.0),
        x - offset,
        y - offset,
        node.color.lighten(theme.gradient_lighten),
        node.color
    )
}

fn draw_edge(svg: &mut String, edge: &EdgeLayout, kind: DiagramKind, config: &Config) {
    let dash = if edge.dashed {
        format!(" stroke-dasharray=\"{}\"", config.layout.edges.dash_pattern)
    } else {
        String::new()
    };
    let cap = match kind {
        DiagramKind::Mindmap => " stroke-linecap=\"round\"",
        DiagramKind::Flowchart => "",
    };
    svg.push_str(&format!(
        "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\"{cap}{dash}/>",
        edge.start.x, edge.start.y, edge.end.x, edge.end.y, edge.color, edge.stroke_width
    ));

    if edge.directed {
        svg.push_str(&arrow_head(edge, config));
    }

    if let Some(label) = edge.label.as_deref() {
        let mid = edge.midpoint();
        if is_boolean_label(label) {
            svg.push_str(&badge_svg(mid, label, edge, config));
        } else {
            let theme = &config.theme;
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
                mid.x,
                mid.y,
                escape_xml(&theme.font_family),
                theme.badge_font_size,
                theme.text_color,
                escape_xml(label)
            ));
        }
    }
}

fn arrow_head(edge: &EdgeLayout, config: &Config) -> String {
    let dx = edge.end.x - edge.start.x;
    let dy = edge.end.y - edge.start.y;
    if dx == 0.0 && dy == 0.0 {
        return String::new();
    }
    let angle = dy.atan2(dx);
    let length = config.layout.edges.arrow_head_length;
    let spread = config.layout.edges.arrow_head_angle.to_radians();
    let tip = edge.end;
    let left = Point::new(
        tip.x - length * (angle - spread).cos(),
        tip.y - length * (angle - spread).sin(),
    );
    let right = Point::new(
        tip.x - length * (angle + spread).cos(),
        tip.y - length * (angle + spread).sin(),
    );
    format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} L {:.2} {:.2} Z\" fill=\"{}\"/>",
        tip.x, tip.y, left.x, left.y, right.x, right.y, edge.color
    )
}

fn is_boolean_label(label: &str) -> bool {
    let label = label.trim();
    label.eq_ignore_ascii_case("yes") || label.eq_ignore_ascii_case("no")
}

fn badge_svg(mid: Point, label: &str, edge: &EdgeLayout, config: &Config) -> String {
    let render = &config.render;
    let theme = &config.theme;
    let x = mid.x - render.badge_width / 2.0;
    let y = mid.y - render.badge_height / 2.0;
    let mut badge = format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
        render.badge_width,
        render.badge_height,
        render.badge_radius,
        render.badge_radius,
        theme.badge_fill,
        edge.color,
        render.badge_stroke_width
    );
    badge.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        mid.x,
        mid.y,
        escape_xml(&theme.font_family),
        theme.badge_font_size,
        edge.color,
        escape_xml(label.trim())
    ));
    badge
}

fn draw_node(svg: &mut String, idx: usize, node: &NodeLayout, config: &Config) {
    let Point { x, y } = node.center;
    let hw = node.geometry.half_width;
    let hh = node.geometry.half_height;
    let paint = format!(
        "fill=\"url(#node-fill-{idx})\" stroke=\"{}\" stroke-width=\"{}\"",
        node.color.darken(config.theme.stroke_darken),
        config.theme.node_stroke_width
    );
    let shape = match node.shape {
        ShapeKind::Circle => format!("<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{hw:.2}\" {paint}/>"),
        ShapeKind::Ellipse => format!(
            "<ellipse cx=\"{x:.2}\" cy=\"{y:.2}\" rx=\"{hw:.2}\" ry=\"{hh:.2}\" {paint}/>"
        ),
        ShapeKind::Box => {
            let radius = config.layout.geometry.box_corner_radius.min(hw).min(hh);
            format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" {paint}/>",
                x - hw,
                y - hh,
                hw * 2.0,
                hh * 2.0
            )
        }
        ShapeKind::Diamond => format!(
            "<polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" {paint}/>",
            x,
            y - hh,
            x + hw,
            y,
            x,
            y + hh,
            x - hw,
            y
        ),
    };
    svg.push_str(&shape);
}

/// Lines stacked around the node center, one `tspan` per wrapped line.
fn text_block_svg(node: &NodeLayout, theme: &Theme) -> String {
    if node.label.is_blank() {
        return String::new();
    }
    let Point { x, y } = node.center;
    let line_height = node.label.line_height;
    let first_y = y - (node.label.lines.len() as f32 - 1.0) * line_height / 2.0;
    let mut text = String::new();
    text.push_str(&format!(
        "<text text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        node.font.size,
        node.font.weight,
        theme.text_color
    ));
    for (idx, line) in node.label.lines.iter().enumerate() {
        let line_y = first_y + idx as f32 * line_height;
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" y=\"{line_y:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    width: f32,
    height: f32,
    render_cfg: &RenderConfig,
) -> Result<()> {
    let pixmap = crate::export::rasterize(svg, width, height, render_cfg)?;
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
