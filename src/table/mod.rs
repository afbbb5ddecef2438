//! # Tables
//!
//! The layout engine does not lay tables out itself. It hands the rows to a
//! [`TableLayout`] together with a page-continuation callback, and only reads
//! back where the table ended. [`AutoTable`] is the bundled implementation:
//! auto-sized columns, wrapped cell text, and the head row repeated at the
//! top of every page the table runs onto.
//!
//! ```text
//! start_y ──► head ──► row ──► row ──► ... row does not fit above `bottom`
//!                                          │
//!              canvas.add_page(); y = on_new_page(canvas)
//!                                          │
//!                              head ──► row ──► ... ──► final_y
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::font::StandardFont;
use crate::layout::{Canvas, TextLine};
use crate::style::Color;
use crate::text::wrap_text;

/// Line height as a multiple of the font size inside cells.
const CELL_LINE_HEIGHT: f64 = 1.15;
/// Narrowest width an auto-sized column is given before scaling.
const MIN_COLUMN_WIDTH: f64 = 30.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableTheme {
    /// Filled head row, alternate body rows tinted.
    #[default]
    Striped,
    /// Filled head row, every cell outlined.
    Grid,
    /// No fills or borders.
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub theme: TableTheme,
    pub font_size: f64,
    pub cell_padding: f64,
    /// Fixed column widths in points. Scaled down if wider than the table.
    pub column_widths: Option<Vec<f64>>,
    pub head_fill: Color,
    pub head_text: Color,
    pub body_text: Color,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            theme: TableTheme::Striped,
            font_size: 10.0,
            cell_padding: 5.0,
            column_widths: None,
            head_fill: Color::rgb8(25, 135, 84),
            head_text: Color::WHITE,
            body_text: Color::gray(40),
        }
    }
}

/// Everything a table layout needs to know about where it may draw.
#[derive(Debug, Clone, Copy)]
pub struct TableRequest<'a> {
    pub head: &'a [String],
    pub body: &'a [Vec<String>],
    /// Left edge of the table.
    pub x: f64,
    pub width: f64,
    /// Top of the first row on the current page.
    pub start_y: f64,
    /// Rows may not extend below this y on any page.
    pub bottom: f64,
    pub options: &'a TableOptions,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableOutcome {
    /// Bottom edge of the last row drawn, on the page that is now current.
    pub final_y: f64,
    pub pages_added: usize,
}

/// The tabular-layout capability the layout engine delegates to.
pub trait TableLayout: Send + Sync {
    /// Draw the table starting on the canvas's current page.
    ///
    /// When a row does not fit, the implementation appends a page with
    /// [`Canvas::add_page`] and then calls `on_new_page`, which draws any
    /// page furniture and returns the y the table continues at.
    fn layout(
        &self,
        canvas: &mut Canvas,
        request: &TableRequest<'_>,
        on_new_page: &mut dyn FnMut(&mut Canvas) -> f64,
    ) -> Result<TableOutcome, LayoutError>;
}

/// Auto-sizing table layout with wrapped cells and a repeated head row.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoTable;

struct PreparedRow {
    cells: Vec<Vec<String>>,
    height: f64,
}

impl AutoTable {
    fn column_count(request: &TableRequest<'_>) -> usize {
        request
            .body
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(request.head.len()))
            .max()
            .unwrap_or(0)
    }

    fn column_widths(request: &TableRequest<'_>, columns: usize) -> Result<Vec<f64>, LayoutError> {
        let opts = request.options;
        let widths = match &opts.column_widths {
            Some(fixed) if fixed.len() != columns => {
                return Err(LayoutError::Table(format!(
                    "{} column widths given for {} columns",
                    fixed.len(),
                    columns
                )));
            }
            Some(fixed) if fixed.iter().any(|w| !w.is_finite() || *w <= 0.0) => {
                return Err(LayoutError::Table("column widths must be positive".to_string()));
            }
            Some(fixed) => fixed.clone(),
            None => {
                // Natural single-line width of the widest cell per column.
                let mut natural = vec![MIN_COLUMN_WIDTH; columns];
                let mut track = |i: usize, text: &str, font: StandardFont| {
                    let w = font.measure(text, opts.font_size) + 2.0 * opts.cell_padding;
                    natural[i] = natural[i].max(w.min(request.width));
                };
                for (i, cell) in request.head.iter().enumerate() {
                    track(i, cell, StandardFont::HelveticaBold);
                }
                for row in request.body {
                    for (i, cell) in row.iter().enumerate() {
                        track(i, cell, StandardFont::Helvetica);
                    }
                }
                let total: f64 = natural.iter().sum();
                if total <= request.width {
                    // Spread the slack evenly so the table spans the full width.
                    let extra = (request.width - total) / columns as f64;
                    return Ok(natural.into_iter().map(|w| w + extra).collect());
                }
                natural
            }
        };

        let total: f64 = widths.iter().sum();
        if total > request.width {
            let scale = request.width / total;
            Ok(widths.into_iter().map(|w| w * scale).collect())
        } else {
            Ok(widths)
        }
    }

    fn prepare_row(cells: &[String], widths: &[f64], font: StandardFont, opts: &TableOptions) -> PreparedRow {
        let wrapped: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                wrap_text(text, (w - 2.0 * opts.cell_padding).max(1.0), font, opts.font_size)
                    .into_iter()
                    .map(|l| l.text)
                    .collect()
            })
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        PreparedRow {
            cells: wrapped,
            height: lines as f64 * opts.font_size * CELL_LINE_HEIGHT + 2.0 * opts.cell_padding,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_row(
        canvas: &mut Canvas,
        row: &PreparedRow,
        widths: &[f64],
        x: f64,
        y: f64,
        font: StandardFont,
        text_color: Color,
        fill: Option<Color>,
        opts: &TableOptions,
    ) {
        let grid = matches!(opts.theme, TableTheme::Grid).then(|| (Color::gray(200), 0.5));
        let mut cell_x = x;
        for (i, width) in widths.iter().enumerate() {
            if fill.is_some() || grid.is_some() {
                canvas.rect(cell_x, y, *width, row.height, fill, grid);
            }
            let lines: Vec<TextLine> = row.cells[i]
                .iter()
                .enumerate()
                .filter(|(_, text)| !text.is_empty())
                .map(|(n, text)| TextLine {
                    x: cell_x + opts.cell_padding,
                    y: y + opts.cell_padding
                        + opts.font_size * 0.85
                        + n as f64 * opts.font_size * CELL_LINE_HEIGHT,
                    text: text.clone(),
                    width: font.measure(text, opts.font_size),
                })
                .collect();
            canvas.text_block(lines, font, opts.font_size, text_color);
            cell_x += width;
        }
    }
}

impl TableLayout for AutoTable {
    fn layout(
        &self,
        canvas: &mut Canvas,
        request: &TableRequest<'_>,
        on_new_page: &mut dyn FnMut(&mut Canvas) -> f64,
    ) -> Result<TableOutcome, LayoutError> {
        let opts = request.options;
        if opts.font_size <= 0.0 || opts.cell_padding < 0.0 {
            return Err(LayoutError::Table(format!(
                "invalid font size {} / padding {}",
                opts.font_size, opts.cell_padding
            )));
        }

        let columns = Self::column_count(request);
        if columns == 0 {
            return Ok(TableOutcome {
                final_y: request.start_y,
                pages_added: 0,
            });
        }
        let widths = Self::column_widths(request, columns)?;

        let has_head = !request.head.is_empty();
        let head = Self::prepare_row(request.head, &widths, StandardFont::HelveticaBold, opts);
        let head_height = if has_head { head.height } else { 0.0 };
        let (head_fill, head_color) = match opts.theme {
            TableTheme::Plain => (None, opts.body_text),
            _ => (Some(opts.head_fill), opts.head_text),
        };
        let stripe = Color::gray(245);

        let mut y = request.start_y;
        let mut pages_added = 0;
        let mut rows_on_page = 0usize;

        let draw_head = |canvas: &mut Canvas, y: f64| {
            if has_head {
                Self::draw_row(
                    canvas,
                    &head,
                    &widths,
                    request.x,
                    y,
                    StandardFont::HelveticaBold,
                    head_color,
                    head_fill,
                    opts,
                );
            }
            y + head_height
        };

        // Keep the head with at least the first body row.
        let first_height = request
            .body
            .first()
            .map(|r| Self::prepare_row(r, &widths, StandardFont::Helvetica, opts).height)
            .unwrap_or(0.0);
        if y + head_height + first_height > request.bottom {
            canvas.add_page();
            y = on_new_page(canvas);
            pages_added += 1;
        }
        y = draw_head(canvas, y);

        for (index, cells) in request.body.iter().enumerate() {
            let row = Self::prepare_row(cells, &widths, StandardFont::Helvetica, opts);
            // A row taller than a whole page is drawn anyway rather than
            // breaking forever.
            if y + row.height > request.bottom && rows_on_page > 0 {
                canvas.add_page();
                y = on_new_page(canvas);
                pages_added += 1;
                rows_on_page = 0;
                log::debug!(
                    "Table continues on page {} at row {} of {}",
                    canvas.current_page(),
                    index + 1,
                    request.body.len()
                );
                y = draw_head(canvas, y);
            }

            let fill = match opts.theme {
                TableTheme::Striped if index % 2 == 1 => Some(stripe),
                _ => None,
            };
            Self::draw_row(
                canvas,
                &row,
                &widths,
                request.x,
                y,
                StandardFont::Helvetica,
                opts.body_text,
                fill,
                opts,
            );
            y += row.height;
            rows_on_page += 1;
        }

        Ok(TableOutcome {
            final_y: y,
            pages_added,
        })
    }
}
