//! # Page-Native Layout
//!
//! Reports are composed directly into fixed-size pages. There is no tall
//! canvas that gets sliced afterwards: every content operation asks "does
//! this fit on the current page?" *before* it draws, and opens a new page
//! when the answer is no.
//!
//! This module holds the page model the PDF writer consumes
//! ([`LayoutPage`], [`LayoutElement`], [`DrawCommand`]) and the [`Canvas`],
//! the ordered page list plus a "current page" pointer that drawing goes to.
//! The cursor-driven [`LayoutEngine`] lives in [`engine`]; the page header
//! and footer in [`header`].
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page and y growing downwards. Text is positioned by its baseline.

pub mod engine;
pub mod header;

pub use engine::{
    ChartOptions, EngineOptions, LayoutEngine, Output, OutputKind, TextOptions, TitleOptions,
};
pub use header::PageHeader;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::font::StandardFont;
use crate::image_loader::LoadedImage;
use crate::style::{Color, TextAlign};

/// A4 width in points.
pub const A4_WIDTH: f64 = 595.28;
/// A4 height in points.
pub const A4_HEIGHT: f64 = 841.89;
/// Page margin on every side.
pub const MARGIN: f64 = 40.0;
/// Space kept free above the bottom margin for the page footer.
pub const FOOTER_RESERVE: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Page (width, height) in points for A4 paper.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            Orientation::Portrait => (A4_WIDTH, A4_HEIGHT),
            Orientation::Landscape => (A4_HEIGHT, A4_WIDTH),
        }
    }
}

/// A single laid-out page, ready for PDF serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Every text line on the page, in drawing order.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.elements.iter().flat_map(|e| match &e.draw {
            DrawCommand::Text { lines, .. } => lines.as_slice(),
            _ => &[],
        })
    }

    /// All text on the page joined with newlines.
    pub fn text_content(&self) -> String {
        self.text_lines()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Elements that embed an image.
    pub fn images(&self) -> impl Iterator<Item = &LayoutElement> {
        self.elements
            .iter()
            .filter(|e| matches!(e.draw, DrawCommand::Image { .. }))
    }
}

/// A positioned element on a page.
#[derive(Debug, Clone)]
pub struct LayoutElement {
    /// Top-left corner.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub draw: DrawCommand,
}

/// What to draw for an element.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Lines of text in a single face, size and color.
    Text {
        lines: Vec<TextLine>,
        font: StandardFont,
        font_size: f64,
        color: Color,
    },
    /// A filled and/or stroked rectangle covering the element box.
    Rect {
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
    },
    /// A straight line from `(x, y)` to `(x + width, y + height)`.
    Line { color: Color, line_width: f64 },
    /// An image scaled to the element box.
    Image { image: Arc<LoadedImage> },
    /// Grey box standing in for an image that could not be loaded.
    ImagePlaceholder,
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub x: f64,
    /// Baseline position.
    pub y: f64,
    pub text: String,
    pub width: f64,
}

/// The pages of a document plus the page drawing currently goes to.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f64,
    height: f64,
    pages: Vec<LayoutPage>,
    /// Index into `pages`.
    current: usize,
}

impl Canvas {
    /// A canvas holding one empty page.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: vec![LayoutPage::new(width, height)],
            current: 0,
        }
    }

    pub fn page_width(&self) -> f64 {
        self.width
    }

    pub fn page_height(&self) -> f64 {
        self.height
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based number of the page drawing goes to.
    pub fn current_page(&self) -> usize {
        self.current + 1
    }

    /// Append a blank page and make it current. Returns its 1-based number.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(LayoutPage::new(self.width, self.height));
        self.current = self.pages.len() - 1;
        self.pages.len()
    }

    /// Point drawing at an existing page (1-based).
    pub fn set_page(&mut self, page: usize) -> Result<(), LayoutError> {
        if page == 0 || page > self.pages.len() {
            return Err(LayoutError::PageOutOfRange {
                page,
                count: self.pages.len(),
            });
        }
        self.current = page - 1;
        Ok(())
    }

    pub fn pages(&self) -> &[LayoutPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<LayoutPage> {
        self.pages
    }

    pub fn push(&mut self, element: LayoutElement) {
        self.pages[self.current].elements.push(element);
    }

    /// Draw one line of text with its baseline at `y`.
    ///
    /// With [`TextAlign::Right`] `x` is the right edge of the text, with
    /// [`TextAlign::Center`] its midpoint.
    #[allow(clippy::too_many_arguments)]
    pub fn text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        font: StandardFont,
        font_size: f64,
        color: Color,
        align: TextAlign,
    ) {
        let width = font.measure(text, font_size);
        let left = match align {
            TextAlign::Left => x,
            TextAlign::Center => x - width / 2.0,
            TextAlign::Right => x - width,
        };
        self.text_block(
            vec![TextLine {
                x: left,
                y,
                text: text.to_string(),
                width,
            }],
            font,
            font_size,
            color,
        );
    }

    /// Draw pre-positioned lines sharing one face, size and color.
    pub fn text_block(&mut self, lines: Vec<TextLine>, font: StandardFont, font_size: f64, color: Color) {
        let Some(first) = lines.first() else {
            return;
        };
        let x = lines.iter().map(|l| l.x).fold(first.x, f64::min);
        let right = lines.iter().map(|l| l.x + l.width).fold(first.x, f64::max);
        let top = first.y - font_size * 0.8;
        let bottom = lines.iter().map(|l| l.y).fold(first.y, f64::max) + font_size * 0.2;
        self.push(LayoutElement {
            x,
            y: top,
            width: right - x,
            height: bottom - top,
            draw: DrawCommand::Text {
                lines,
                font,
                font_size,
                color,
            },
        });
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Option<Color>, stroke: Option<(Color, f64)>) {
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Rect { fill, stroke },
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Color, line_width: f64) {
        self.push(LayoutElement {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
            draw: DrawCommand::Line { color, line_width },
        });
    }

    pub fn image(&mut self, image: Arc<LoadedImage>, x: f64, y: f64, width: f64, height: f64) {
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::Image { image },
        });
    }

    pub fn image_placeholder(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(LayoutElement {
            x,
            y,
            width,
            height,
            draw: DrawCommand::ImagePlaceholder,
        });
    }
}
