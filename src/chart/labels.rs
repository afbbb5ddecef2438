//! Chart text: tick values, category names and the legend.
//!
//! tiny-skia has no text API, so chart text is collected into an SVG
//! overlay of `<text>` nodes, parsed by `usvg` against one process-wide
//! font database and rendered onto the chart surface by `resvg`.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use tiny_skia::{Pixmap, Transform};

use crate::error::RasterError;
use crate::font::StandardFont;
use crate::style::Color;

/// Tried in order; the first family the font database knows wins.
const FONT_FAMILIES: &str = "Helvetica, Arial, 'Liberation Sans', 'DejaVu Sans', sans-serif";

fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    let fonts = FONTS.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("Loaded {} font faces for chart text", db.faces().count());
        Arc::new(db)
    });
    Arc::clone(fonts)
}

/// True when at least one font face is installed to draw chart text with.
pub fn fonts_available() -> bool {
    font_database().faces().next().is_some()
}

/// Horizontal alignment of a label relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn svg_name(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone)]
struct Label {
    x: f32,
    /// Vertical center of the text.
    y: f32,
    anchor: Anchor,
    text: String,
}

/// Labels for one surface, all in one size and color.
#[derive(Debug)]
pub(crate) struct TextOverlay {
    width: u32,
    height: u32,
    size: f32,
    color: Color,
    labels: Vec<Label>,
}

impl TextOverlay {
    pub(crate) fn new(width: u32, height: u32, size: f32, color: Color) -> Self {
        Self {
            width,
            height,
            size,
            color,
            labels: Vec::new(),
        }
    }

    pub(crate) fn size(&self) -> f32 {
        self.size
    }

    /// Approximate advance of `text`, using Helvetica metrics.
    pub(crate) fn measure(&self, text: &str) -> f32 {
        StandardFont::Helvetica.measure(text, self.size as f64) as f32
    }

    /// `text` cut down with an ellipsis until it fits in `max_width`.
    pub(crate) fn fit(&self, text: &str, max_width: f32) -> String {
        if self.measure(text) <= max_width {
            return text.to_string();
        }
        let mut chars: Vec<char> = text.chars().collect();
        while !chars.is_empty() {
            chars.pop();
            let candidate: String = chars.iter().collect::<String>() + "…";
            if self.measure(&candidate) <= max_width {
                return candidate;
            }
        }
        String::new()
    }

    pub(crate) fn push(&mut self, x: f32, y: f32, anchor: Anchor, text: impl Into<String>) {
        let text = text.into();
        if !text.trim().is_empty() {
            self.labels.push(Label { x, y, anchor, text });
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    fn to_svg(&self) -> String {
        let [r, g, b, a] = self.color.to_rgba8();
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
            self.width, self.height, self.width, self.height
        );
        let _ = write!(
            svg,
            "<g font-family=\"{}\" font-size=\"{:.2}\" fill=\"rgb({},{},{})\" fill-opacity=\"{:.3}\">",
            FONT_FAMILIES,
            self.size,
            r,
            g,
            b,
            a as f32 / 255.0
        );
        // Cap height is about 0.7em, so the baseline sits 0.35em below center.
        let drop = self.size * 0.35;
        for label in &self.labels {
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\">{}</text>",
                label.x,
                label.y + drop,
                label.anchor.svg_name(),
                escape_xml(&label.text)
            );
        }
        svg.push_str("</g></svg>");
        svg
    }

    /// Draw every label onto `surface`.
    pub(crate) fn render(&self, surface: &mut Pixmap) -> Result<(), RasterError> {
        if self.labels.is_empty() {
            return Ok(());
        }
        let mut options = usvg::Options::default();
        options.fontdb = font_database();
        let tree = usvg::Tree::from_str(&self.to_svg(), &options).map_err(|e| RasterError::Text(e.to_string()))?;
        resvg::render(&tree, Transform::identity(), &mut surface.as_mut());
        Ok(())
    }
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> TextOverlay {
        TextOverlay::new(200, 100, 12.0, Color::BLACK)
    }

    #[test]
    fn escapes_markup_in_labels() {
        let mut labels = overlay();
        labels.push(10.0, 10.0, Anchor::Start, "R&D <Ops>");
        let svg = labels.to_svg();
        assert!(svg.contains("R&amp;D &lt;Ops&gt;"));
        assert!(svg.contains("text-anchor=\"start\""));
    }

    #[test]
    fn blank_labels_are_skipped() {
        let mut labels = overlay();
        labels.push(0.0, 0.0, Anchor::Middle, "  ");
        assert_eq!(labels.len(), 0);
    }

    #[test]
    fn long_text_is_shortened_to_fit() {
        let labels = overlay();
        let fitted = labels.fit("Warehouse Operations Supervisor", 60.0);
        assert!(fitted.ends_with('…'));
        assert!(labels.measure(&fitted) <= 60.0);
        assert_eq!(labels.fit("Packer", 200.0), "Packer");
    }

    #[test]
    fn text_reaches_the_surface() {
        if !fonts_available() {
            return;
        }
        let mut surface = Pixmap::new(200, 100).unwrap();
        let mut labels = overlay();
        labels.push(100.0, 50.0, Anchor::Middle, "Headcount");
        labels.render(&mut surface).unwrap();
        assert!(surface.pixels().iter().any(|p| p.alpha() > 0));
    }
}
