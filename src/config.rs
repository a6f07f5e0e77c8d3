use crate::theme::{Rgb, Theme};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    pub size: f32,
    pub weight: u16,
}

impl FontConfig {
    pub const fn new(size: f32, weight: u16) -> Self {
        Self { size, weight }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub padding_x: f32,
    pub padding_y: f32,
    pub diamond_extra_x: f32,
    pub diamond_extra_y: f32,
    pub circle_margin: f32,
    pub base_size_scale: f32,
    pub default_base_size: f32,
    /// Gap kept between the text block and the shape outline when checking
    /// containment.
    pub content_inset: f32,
    pub box_corner_radius: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            padding_x: 35.0,
            padding_y: 28.0,
            diamond_extra_x: 20.0,
            diamond_extra_y: 15.0,
            circle_margin: 25.0,
            base_size_scale: 1.5,
            default_base_size: 20.0,
            content_inset: 6.0,
            box_corner_radius: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub flowchart_width: f32,
    pub mindmap_width_scale: f32,
    pub default_weight: f32,
    pub arrow_head_length: f32,
    /// Half-angle of the arrowhead, in degrees.
    pub arrow_head_angle: f32,
    pub dash_pattern: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            flowchart_width: 3.0,
            mindmap_width_scale: 2.0,
            default_weight: 2.0,
            arrow_head_length: 15.0,
            arrow_head_angle: 30.0,
            dash_pattern: "8 6".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub label_line_height: f32,
    /// Use the built-in character width table instead of system fonts. Keeps
    /// wrapping identical across hosts and avoids touching the font directories.
    pub fast_text_metrics: bool,
    pub flowchart_font: FontConfig,
    /// Fonts by mindmap level; levels past the end reuse the last entry.
    pub mindmap_fonts: Vec<FontConfig>,
    pub flowchart_max_label_width: f32,
    pub mindmap_max_label_width: f32,
    pub fallback_radius: f32,
    pub geometry: GeometryConfig,
    pub edges: EdgeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            label_line_height: 1.5,
            fast_text_metrics: true,
            flowchart_font: FontConfig::new(14.0, 400),
            mindmap_fonts: vec![
                FontConfig::new(20.0, 700),
                FontConfig::new(16.0, 600),
                FontConfig::new(14.0, 500),
            ],
            flowchart_max_label_width: 150.0,
            mindmap_max_label_width: 200.0,
            fallback_radius: 400.0,
            geometry: GeometryConfig::default(),
            edges: EdgeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub wheel_step: f32,
    pub button_factor: f32,
    pub default_zoom: f32,
    /// World-space gap above the diagram after a reset.
    pub top_margin: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 3.0,
            wheel_step: 0.1,
            button_factor: 1.5,
            default_zoom: 0.5,
            top_margin: 100.0,
        }
    }
}

impl ViewportConfig {
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Live surface size used when no container size is given.
    pub width: f32,
    pub height: f32,
    pub badge_width: f32,
    pub badge_height: f32,
    pub badge_radius: f32,
    pub badge_stroke_width: f32,
    /// Offset of the gradient highlight from the node center, up and left.
    pub gradient_offset: f32,
    /// Load host fonts so exported PNGs contain their labels.
    pub system_fonts: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            badge_width: 56.0,
            badge_height: 28.0,
            badge_radius: 6.0,
            badge_stroke_width: 2.0,
            gradient_offset: 20.0,
            system_fonts: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    background: Option<Rgb>,
    text_color: Option<Rgb>,
    node_color: Option<Rgb>,
    edge_color: Option<Rgb>,
    badge_fill: Option<Rgb>,
    badge_font_size: Option<f32>,
    node_stroke_width: Option<f32>,
    gradient_lighten: Option<f32>,
    stroke_darken: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    viewport: Option<ViewportConfig>,
    render: Option<RenderConfig>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON (or JSON5) config file on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme {theme_name:?}"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.node_color {
            theme.node_color = v;
        }
        if let Some(v) = vars.edge_color {
            theme.edge_color = v;
        }
        if let Some(v) = vars.badge_fill {
            theme.badge_fill = v;
        }
        if let Some(v) = vars.badge_font_size {
            theme.badge_font_size = v;
        }
        if let Some(v) = vars.node_stroke_width {
            theme.node_stroke_width = v;
        }
        if let Some(v) = vars.gradient_lighten {
            theme.gradient_lighten = v;
        }
        if let Some(v) = vars.stroke_darken {
            theme.stroke_darken = v;
        }
    }

    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(viewport) = parsed.viewport {
        if !(viewport.min_zoom > 0.0 && viewport.min_zoom <= viewport.max_zoom) {
            return Err(anyhow::anyhow!(
                "viewport zoom range {}..{} is invalid",
                viewport.min_zoom,
                viewport.max_zoom
            ));
        }
        config.viewport = viewport;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.viewport.max_zoom, 3.0);
        assert_eq!(config.layout.geometry.padding_x, 35.0);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = parse_config(
            r##"{
                theme: "paper",
                themeVariables: { textColor: "#333333" },
                layout: { fallback_radius: 250, geometry: { padding_x: 40 } },
                viewport: { max_zoom: 4 },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, Rgb::new(255, 255, 255));
        assert_eq!(config.theme.text_color, Rgb::new(0x33, 0x33, 0x33));
        assert_eq!(config.layout.fallback_radius, 250.0);
        assert_eq!(config.layout.geometry.padding_x, 40.0);
        assert_eq!(config.layout.geometry.padding_y, 28.0);
        assert_eq!(config.layout.label_line_height, 1.5);
        assert_eq!(config.viewport.max_zoom, 4.0);
        assert_eq!(config.viewport.min_zoom, 0.1);
    }

    #[test]
    fn rejects_unknown_theme_and_bad_zoom_range() {
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
        assert!(parse_config(r#"{"viewport": {"min_zoom": 2, "max_zoom": 1}}"#).is_err());
    }

    #[test]
    fn zoom_clamps_to_range() {
        let viewport = ViewportConfig::default();
        assert_eq!(viewport.clamp_zoom(10.0), 3.0);
        assert_eq!(viewport.clamp_zoom(0.0), 0.1);
    }
}
