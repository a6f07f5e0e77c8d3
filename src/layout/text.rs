use crate::config::{FontConfig, LayoutConfig};
use crate::ir::DiagramKind;
use crate::text_metrics;
use crate::theme::Theme;

use super::WrappedText;

/// Font a node label is set in. Chosen by diagram kind and node level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeFont {
    pub size: f32,
    pub weight: u16,
}

impl NodeFont {
    pub fn for_node(kind: DiagramKind, level: u32, config: &LayoutConfig) -> Self {
        let font = match kind {
            DiagramKind::Flowchart => config.flowchart_font,
            DiagramKind::Mindmap => config
                .mindmap_fonts
                .get(level as usize)
                .or_else(|| config.mindmap_fonts.last())
                .copied()
                .unwrap_or(config.flowchart_font),
        };
        Self::from(font)
    }

    pub fn line_height(&self, config: &LayoutConfig) -> f32 {
        self.size * config.label_line_height
    }
}

impl From<FontConfig> for NodeFont {
    fn from(font: FontConfig) -> Self {
        Self {
            size: font.size,
            weight: font.weight,
        }
    }
}

pub fn max_label_width(kind: DiagramKind, config: &LayoutConfig) -> f32 {
    match kind {
        DiagramKind::Flowchart => config.flowchart_max_label_width,
        DiagramKind::Mindmap => config.mindmap_max_label_width,
    }
}

/// Greedy word wrap. Explicit line breaks are honored first and every segment
/// is packed independently. A word wider than `max_width` keeps a line of its
/// own and is never broken.
pub fn wrap<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    for segment in split_lines(text) {
        let wrapped = wrap_line(&segment, max_width, &measure);
        if wrapped.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(wrapped);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Wraps a node label with the configured measurer and records line widths.
pub fn wrap_label(
    text: &str,
    font: NodeFont,
    max_width: f32,
    theme: &Theme,
    config: &LayoutConfig,
) -> WrappedText {
    let measure =
        |line: &str| text_width(line, font, theme.font_family.as_str(), config.fast_text_metrics);
    let lines = wrap(text, max_width, &measure);
    let line_widths = lines.iter().map(|line| measure(line)).collect();
    WrappedText {
        lines,
        line_widths,
        line_height: font.line_height(config),
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    let current = text
        .replace("\r\n", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("\\n", "\n");
    current.split('\n').map(|line| line.trim().to_string()).collect()
}

fn wrap_line<F>(line: &str, max_width: f32, measure: &F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    if measure(line) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if measure(&candidate) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn text_width(text: &str, font: NodeFont, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics {
        return fallback_text_width(text, font);
    }
    text_metrics::measure_text_width(text, font.size, font_family, font.weight)
        .unwrap_or_else(|| fallback_text_width(text, font))
}

fn fallback_text_width(text: &str, font: NodeFont) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font.size * weight_factor(font.weight)
}

/// Heavier weights set wider; approximates Arial's bold/regular advance ratio.
fn weight_factor(weight: u16) -> f32 {
    match weight {
        0..=449 => 1.0,
        450..=549 => 1.02,
        550..=649 => 1.05,
        _ => 1.08,
    }
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Per-character advances at 1px for a sans-serif stack.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        _ => 0.568,
    }
}
