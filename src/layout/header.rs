//! Page header and footer.
//!
//! The header is drawn on page 1 when the engine is built and again on
//! every page break. Footers carry "Page i of N" and can only be drawn once
//! all content has flowed, so they are stamped in a second pass over the
//! finished page list.

use std::sync::{Arc, OnceLock};

use tiny_skia::{Paint, Pixmap, Rect, Transform};

use super::{Canvas, MARGIN};
use crate::error::LayoutError;
use crate::font::StandardFont;
use crate::image_loader::{decode_image_bytes, LoadedImage};
use crate::style::{Color, TextAlign};

const LOGO_Y: f64 = 20.0;
const LOGO_WIDTH: f64 = 80.0;
const LOGO_HEIGHT: f64 = 26.0;
const TITLE_BASELINE: f64 = 40.0;
const TITLE_SIZE: f64 = 18.0;
const DATE_BASELINE: f64 = 55.0;
const DATE_SIZE: f64 = 10.0;
const RULE_Y: f64 = 70.0;

/// Cursor position after the header: the first writable y on a page.
pub const POST_HEADER_Y: f64 = 85.0;

const FOOTER_OFFSET: f64 = 20.0;
const FOOTER_SIZE: f64 = 8.0;
const FOOTER_GRAY: u8 = 150;

#[derive(Debug, Clone)]
pub struct PageHeader {
    title: String,
    generated_on: String,
    logo: Option<Arc<LoadedImage>>,
}

impl PageHeader {
    /// `logo: None` draws a grey placeholder in the logo slot.
    pub fn new(title: impl Into<String>, generated_on: impl Into<String>, logo: Option<Arc<LoadedImage>>) -> Self {
        Self {
            title: title.into(),
            generated_on: generated_on.into(),
            logo,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Draw the header on the current page. Returns the y content starts at.
    pub fn draw(&self, canvas: &mut Canvas) -> f64 {
        let right = canvas.page_width() - MARGIN;

        match &self.logo {
            Some(logo) => canvas.image(Arc::clone(logo), MARGIN, LOGO_Y, LOGO_WIDTH, LOGO_HEIGHT),
            None => canvas.image_placeholder(MARGIN, LOGO_Y, LOGO_WIDTH, LOGO_HEIGHT),
        }
        canvas.text(
            &self.title,
            right,
            TITLE_BASELINE,
            StandardFont::HelveticaBold,
            TITLE_SIZE,
            Color::BLACK,
            TextAlign::Right,
        );
        canvas.text(
            &format!("Generated on: {}", self.generated_on),
            right,
            DATE_BASELINE,
            StandardFont::Helvetica,
            DATE_SIZE,
            Color::BLACK,
            TextAlign::Right,
        );
        canvas.line(MARGIN, RULE_Y, right, RULE_Y, Color::BLACK, 1.0);

        POST_HEADER_Y
    }
}

pub fn footer_text(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// Stamp "Page i of N" on every page in order, leaving the last page current.
pub fn stamp_footers(canvas: &mut Canvas) -> Result<(), LayoutError> {
    let total = canvas.page_count();
    let x = canvas.page_width() / 2.0;
    let y = canvas.page_height() - FOOTER_OFFSET;
    for page in 1..=total {
        canvas.set_page(page)?;
        canvas.text(
            &footer_text(page, total),
            x,
            y,
            StandardFont::Helvetica,
            FOOTER_SIZE,
            Color::gray(FOOTER_GRAY),
            TextAlign::Center,
        );
    }
    canvas.set_page(total)
}

/// Today's date as month/day/year.
pub fn today() -> String {
    chrono::Local::now().format("%-m/%-d/%Y").to_string()
}

/// The bundled logo mark, rendered once per process.
///
/// Returns `None` (after logging a warning) if the mark cannot be produced;
/// headers then fall back to a placeholder box.
pub fn builtin_logo() -> Option<Arc<LoadedImage>> {
    static LOGO: OnceLock<Option<Arc<LoadedImage>>> = OnceLock::new();
    LOGO.get_or_init(|| match render_logo() {
        Ok(image) => Some(Arc::new(image)),
        Err(e) => {
            log::warn!("Built-in logo unavailable, using placeholder: {}", e);
            None
        }
    })
    .clone()
}

fn render_logo() -> Result<LoadedImage, LayoutError> {
    // 3x the slot size so the mark stays crisp in print.
    let (w, h) = ((LOGO_WIDTH * 3.0) as u32, (LOGO_HEIGHT * 3.0) as u32);
    let mut surface = Pixmap::new(w, h).ok_or_else(|| LayoutError::Image("logo surface".to_string()))?;

    let mut brand = Paint::default();
    brand.set_color_rgba8(25, 135, 84, 255);
    let mut white = Paint::default();
    white.set_color_rgba8(255, 255, 255, 255);

    let square = h as f32;
    if let Some(rect) = Rect::from_xywh(0.0, 0.0, square, square) {
        surface.fill_rect(rect, &brand, Transform::identity(), None);
    }
    // Three rising bars inside the square.
    let bar = square / 7.0;
    for (i, frac) in [0.35f32, 0.55, 0.75].iter().enumerate() {
        let bar_h = square * frac;
        let x = bar * (1.0 + 2.0 * i as f32);
        if let Some(rect) = Rect::from_xywh(x, square * 0.88 - bar_h, bar, bar_h) {
            surface.fill_rect(rect, &white, Transform::identity(), None);
        }
    }
    // Wordmark rule to the right of the square.
    let mut muted = Paint::default();
    muted.set_color_rgba8(45, 55, 72, 255);
    if let Some(rect) = Rect::from_xywh(square * 1.2, square * 0.4, w as f32 - square * 1.2, square * 0.2) {
        surface.fill_rect(rect, &muted, Transform::identity(), None);
    }

    let png = surface
        .encode_png()
        .map_err(|e| LayoutError::Image(format!("logo encode: {}", e)))?;
    decode_image_bytes(&png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{DrawCommand, A4_HEIGHT, A4_WIDTH};

    #[test]
    fn header_draws_title_date_and_rule() {
        let mut canvas = Canvas::new(A4_WIDTH, A4_HEIGHT);
        let header = PageHeader::new("Company Positions Report", "10/19/2026", None);
        assert_eq!(header.draw(&mut canvas), POST_HEADER_Y);

        let page = &canvas.pages()[0];
        let text = page.text_content();
        assert!(text.contains("Company Positions Report"));
        assert!(text.contains("Generated on: 10/19/2026"));
        assert!(page
            .elements
            .iter()
            .any(|e| matches!(e.draw, DrawCommand::Line { .. }) && e.y == RULE_Y));
        assert!(page
            .elements
            .iter()
            .any(|e| matches!(e.draw, DrawCommand::ImagePlaceholder)));
    }

    #[test]
    fn footers_number_every_page() {
        let mut canvas = Canvas::new(A4_WIDTH, A4_HEIGHT);
        canvas.add_page();
        canvas.add_page();
        canvas.set_page(1).unwrap();
        stamp_footers(&mut canvas).unwrap();
        assert_eq!(canvas.current_page(), 3);
        for (i, page) in canvas.pages().iter().enumerate() {
            assert_eq!(page.text_content(), format!("Page {} of 3", i + 1));
        }
    }

    #[test]
    fn builtin_logo_is_shared_with_transparent_ground() {
        let a = builtin_logo().unwrap();
        let b = builtin_logo().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.is_opaque());
        assert_eq!(a.width_px, 240);
    }

    #[test]
    fn today_has_no_zero_padding() {
        let date = today();
        assert_eq!(date.split('/').count(), 3);
        assert!(!date.starts_with('0'));
    }
}
