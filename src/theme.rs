use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit RGB color parsed from `#rrggbb` or `#rgb` hex notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let num = u32::from_str_radix(hex, 16).ok()?;
                Some(Self::new(
                    ((num >> 16) & 0xff) as u8,
                    ((num >> 8) & 0xff) as u8,
                    (num & 0xff) as u8,
                ))
            }
            3 => {
                let mut channels = hex.chars().map(|ch| {
                    let v = ch.to_digit(16).unwrap_or(0) as u8;
                    v * 16 + v
                });
                Some(Self::new(
                    channels.next()?,
                    channels.next()?,
                    channels.next()?,
                ))
            }
            _ => None,
        }
    }

    /// Adds `round(2.55 * percent)` to every channel, saturating at 255.
    pub fn lighten(self, percent: f32) -> Self {
        let amount = percent_amount(percent);
        Self::new(
            (self.r as i32 + amount).clamp(0, 255) as u8,
            (self.g as i32 + amount).clamp(0, 255) as u8,
            (self.b as i32 + amount).clamp(0, 255) as u8,
        )
    }

    /// Subtracts `round(2.55 * percent)` from every channel, saturating at 0.
    pub fn darken(self, percent: f32) -> Self {
        self.lighten(-percent)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn percent_amount(percent: f32) -> i32 {
    if !percent.is_finite() {
        return 0;
    }
    (2.55 * percent).round() as i32
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| format!("invalid hex color {value:?}"))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: Rgb,
    pub text_color: Rgb,
    pub node_color: Rgb,
    pub edge_color: Rgb,
    pub badge_fill: Rgb,
    pub badge_font_size: f32,
    pub node_stroke_width: f32,
    pub gradient_lighten: f32,
    pub stroke_darken: f32,
}

impl Theme {
    /// Slate-tinted canvas used by the interactive view.
    pub fn classic() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            background: Rgb::new(0xf8, 0xfa, 0xfc),
            text_color: Rgb::new(0x00, 0x00, 0x00),
            node_color: Rgb::new(0x8b, 0x5c, 0xf6),
            edge_color: Rgb::new(0x8b, 0x5c, 0xf6),
            badge_fill: Rgb::new(0xff, 0xff, 0xff),
            badge_font_size: 13.0,
            node_stroke_width: 3.5,
            gradient_lighten: 35.0,
            stroke_darken: 20.0,
        }
    }

    /// Plain white background, suited to printed downloads.
    pub fn paper() -> Self {
        Self {
            background: Rgb::new(0xff, 0xff, 0xff),
            ..Self::classic()
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" => Some(Self::classic()),
            "paper" | "light" => Some(Self::paper()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::parse_hex("#8b5cf6"), Some(Rgb::new(0x8b, 0x5c, 0xf6)));
        assert_eq!(Rgb::parse_hex("#FFF"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::parse_hex("8b5cf6"), None);
        assert_eq!(Rgb::parse_hex("#12345"), None);
        assert_eq!(Rgb::parse_hex("#gg0000"), None);
    }

    #[test]
    fn lighten_and_darken_clamp_channels() {
        let base = Rgb::new(0x8b, 0x5c, 0xf6);
        // round(2.55 * 35) = 89
        assert_eq!(base.lighten(35.0), Rgb::new(0xe4, 0xb5, 0xff));
        // round(2.55 * 20) = 51
        assert_eq!(base.darken(20.0), Rgb::new(0x58, 0x29, 0xc3));
        assert_eq!(Rgb::new(10, 10, 10).darken(20.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn hex_round_trips_through_display() {
        let color = Rgb::new(0x10, 0xb9, 0x81);
        assert_eq!(color.to_string(), "#10b981");
        assert_eq!(Rgb::parse_hex(&color.to_string()), Some(color));
    }

    #[test]
    fn theme_names_resolve() {
        assert!(Theme::from_name("paper").is_some());
        assert!(Theme::from_name("Classic").is_some());
        assert!(Theme::from_name("neon").is_none());
    }
}
