//! # Style Primitives
//!
//! The small set of visual properties a report page needs: colors, the
//! light/dark theme, font style and horizontal alignment. Everything else
//! (sizes, spacing) is owned by the individual content operations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build a color from 0-255 channel values.
    pub fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    /// A neutral gray from a single 0-255 level.
    pub fn gray(level: u8) -> Self {
        Self::rgb8(level, level, level)
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn hex(hex: &str) -> Self {
        Self::parse_hex(hex).unwrap_or(Color::BLACK)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => Some(Self::rgb8(
                channel(&hex[0..1].repeat(2))?,
                channel(&hex[1..2].repeat(2))?,
                channel(&hex[2..3].repeat(2))?,
            )),
            6 => Some(Self::rgb8(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Some(
                Self::rgb8(
                    channel(&hex[0..2])?,
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                )
                .with_alpha(channel(&hex[6..8])? as f64 / 255.0),
            ),
            _ => None,
        }
    }

    /// Parse a CSS-style color string.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` and a handful of named colors. Returns `None`
    /// for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.starts_with('#') {
            return Self::parse_hex(s);
        }

        let lower = s.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return None;
            }
            let mut channels = [0u8; 3];
            for (slot, part) in channels.iter_mut().zip(&parts) {
                let v: f64 = part.parse().ok()?;
                *slot = v.clamp(0.0, 255.0).round() as u8;
            }
            let alpha = match parts.get(3) {
                Some(a) => a.parse::<f64>().ok()?,
                None => 1.0,
            };
            return Some(Self::rgb8(channels[0], channels[1], channels[2]).with_alpha(alpha));
        }

        match lower.as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "transparent" => Some(Color::TRANSPARENT),
            "red" => Some(Self::rgb8(255, 0, 0)),
            "green" => Some(Self::rgb8(0, 128, 0)),
            "blue" => Some(Self::rgb8(0, 0, 255)),
            "gray" | "grey" => Some(Self::gray(128)),
            _ => None,
        }
    }

    /// Channels as 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Report theme. Chart backdrops, axes and chart text follow it; page text
/// stays dark-on-white so printed output is readable either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Opaque color composited behind every chart.
    pub fn backdrop(&self) -> Color {
        match self {
            Theme::Light => Color::hex("#ffffff"),
            Theme::Dark => Color::hex("#2c3136"),
        }
    }

    /// Axis and grid ink for charts drawn on this theme's backdrop.
    pub fn chart_ink(&self) -> Color {
        match self {
            Theme::Light => Color::gray(90),
            Theme::Dark => Color::gray(200),
        }
    }

    /// Tick, category and legend text on this theme's backdrop.
    pub fn chart_text(&self) -> Color {
        match self {
            Theme::Light => Color::hex("#212529"),
            Theme::Dark => Color::hex("#f8f9fa"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Base-font style, mirroring the four Helvetica faces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub fn is_bold(&self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}
