//! # Font Management
//!
//! Reports use a single fixed base font: the Helvetica family from the 14
//! standard PDF fonts. These need no embedding, so this module only has to
//! name the faces and measure text with their metrics.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::style::FontStyle;

/// The four standard Helvetica faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
}

impl StandardFont {
    /// The face used to draw text in the given style.
    pub fn for_style(style: FontStyle) -> Self {
        match style {
            FontStyle::Normal => Self::Helvetica,
            FontStyle::Bold => Self::HelveticaBold,
            FontStyle::Italic => Self::HelveticaOblique,
            FontStyle::BoldItalic => Self::HelveticaBoldOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA_METRICS,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD_METRICS,
        }
    }

    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.metrics().char_width(ch, font_size)
    }

    /// Measure the width of a string in points.
    pub fn measure(&self, text: &str, font_size: f64) -> f64 {
        self.metrics().measure_string(text, font_size, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space_width() {
        let w = StandardFont::Helvetica.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_bold_wider() {
        let regular = StandardFont::Helvetica.char_width('b', 12.0);
        let bold = StandardFont::HelveticaBold.char_width('b', 12.0);
        assert!(bold > regular, "Bold b should be wider than regular b");
    }

    #[test]
    fn test_oblique_shares_upright_widths() {
        let upright = StandardFont::Helvetica.measure("Payroll", 10.0);
        let oblique = StandardFont::HelveticaOblique.measure("Payroll", 10.0);
        assert!((upright - oblique).abs() < f64::EPSILON);
    }

    #[test]
    fn test_style_mapping() {
        assert_eq!(StandardFont::for_style(FontStyle::Bold).pdf_name(), "Helvetica-Bold");
        assert_eq!(
            StandardFont::for_style(FontStyle::BoldItalic).pdf_name(),
            "Helvetica-BoldOblique"
        );
    }
}
