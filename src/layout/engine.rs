//! The cursor-driven layout engine.
//!
//! One engine composes one document. It tracks the next writable y on the
//! current page and offers block-level operations (section titles, wrapped
//! text, charts, tables, key/value rows). Every operation predicts its
//! height and calls [`LayoutEngine::ensure_space`] *before* drawing, so
//! content never runs into the footer reservation and is never clipped.
//!
//! The engine is not reentrant. [`LayoutEngine::add_chart`] suspends while
//! the chart rasterizes, and it holds `&mut self` across that suspension,
//! so no other call can reach the same engine until the chart is placed.

use std::sync::Arc;

use base64::Engine as _;

use super::header::{self, PageHeader};
use super::{Canvas, LayoutPage, Orientation, TextLine, FOOTER_RESERVE, MARGIN};
use crate::chart::{ChartRasterizer, ChartSpec, RasterOptions};
use crate::error::LayoutError;
use crate::font::StandardFont;
use crate::image_loader::{decode_image_bytes, LoadedImage};
use crate::pdf::{Metadata, PdfWriter};
use crate::style::{Color, FontStyle, TextAlign, Theme};
use crate::table::{AutoTable, TableLayout, TableOptions, TableRequest};
use crate::text::wrap_text;

/// Charts are rasterized at this multiple of their size on the page.
const RASTER_SCALE: f64 = 2.5;
/// Gap left below every chart.
const CHART_GAP: f64 = 20.0;
/// Minimum room a table needs on the current page to start there.
const TABLE_MIN_SPACE: f64 = 40.0;
const TABLE_GAP: f64 = 20.0;
const KEY_VALUE_INDENT: f64 = 120.0;
const KEY_VALUE_ROW: f64 = 15.0;
const KEY_VALUE_GAP: f64 = 10.0;
const KEY_VALUE_SIZE: f64 = 10.0;

/// Construction-time switches.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Full-page custom layouts draw their own header.
    pub skip_header: bool,
    pub skip_footer: bool,
    /// Replaces the built-in logo mark.
    pub logo: Option<Arc<LoadedImage>>,
    /// Date shown in the header. Defaults to today.
    pub generated_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleOptions {
    pub font_size: f64,
    pub style: FontStyle,
    pub space_before: f64,
    pub space_after: f64,
    pub color: Color,
}

impl Default for TitleOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            style: FontStyle::Bold,
            space_before: 20.0,
            space_after: 15.0,
            color: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub font_size: f64,
    pub style: FontStyle,
    pub space_before: f64,
    pub space_after: f64,
    pub color: Color,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_size: 10.0,
            style: FontStyle::Normal,
            space_before: 0.0,
            space_after: 25.0,
            color: Color::rgb8(45, 55, 72),
            line_height: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// Defaults to the full content width.
    pub width: Option<f64>,
    pub height: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: 150.0,
        }
    }
}

impl ChartOptions {
    pub fn with_height(height: f64) -> Self {
        Self {
            height,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputKind {
    #[default]
    Blob,
    DataUri,
}

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Blob(Vec<u8>),
    /// `data:application/pdf;base64,...`
    DataUri(String),
}

impl Output {
    /// The PDF bytes, decoding a data URI if needed.
    pub fn into_bytes(self) -> Result<Vec<u8>, LayoutError> {
        match self {
            Output::Blob(bytes) => Ok(bytes),
            Output::DataUri(uri) => {
                let payload = uri
                    .split_once(',')
                    .map(|(_, b64)| b64)
                    .ok_or_else(|| LayoutError::Pdf("malformed data URI".to_string()))?;
                base64::engine::general_purpose::STANDARD
                    .decode(payload)
                    .map_err(|e| LayoutError::Pdf(format!("data URI decode: {}", e)))
            }
        }
    }
}

pub struct LayoutEngine {
    canvas: Canvas,
    cursor_y: f64,
    title: String,
    theme: Theme,
    /// `None` when the header is suppressed.
    header: Option<PageHeader>,
    skip_footer: bool,
    rasterizer: ChartRasterizer,
    tables: Arc<dyn TableLayout>,
    footers_stamped: bool,
}

impl LayoutEngine {
    /// Open page 1 and draw its header unless `options.skip_header`.
    pub fn new(orientation: Orientation, title: impl Into<String>, theme: Theme, options: EngineOptions) -> Self {
        let (width, height) = orientation.dimensions();
        let title = title.into();
        let mut canvas = Canvas::new(width, height);

        let header = (!options.skip_header).then(|| {
            let logo = options.logo.or_else(header::builtin_logo);
            let date = options.generated_on.unwrap_or_else(header::today);
            PageHeader::new(title.clone(), date, logo)
        });
        let cursor_y = match &header {
            Some(h) => h.draw(&mut canvas),
            None => MARGIN,
        };

        Self {
            canvas,
            cursor_y,
            title,
            theme,
            header,
            skip_footer: options.skip_footer,
            rasterizer: ChartRasterizer::new(),
            tables: Arc::new(AutoTable),
            footers_stamped: false,
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: ChartRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_table_layout(mut self, tables: Arc<dyn TableLayout>) -> Self {
        self.tables = tables;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn margin(&self) -> f64 {
        MARGIN
    }

    pub fn page_width(&self) -> f64 {
        self.canvas.page_width()
    }

    pub fn page_height(&self) -> f64 {
        self.canvas.page_height()
    }

    pub fn content_width(&self) -> f64 {
        self.page_width() - 2.0 * MARGIN
    }

    pub fn cursor_y(&self) -> f64 {
        self.cursor_y
    }

    /// Move the cursor. For generators that position content themselves.
    pub fn set_cursor_y(&mut self, y: f64) {
        self.cursor_y = y;
    }

    pub fn current_page(&self) -> usize {
        self.canvas.current_page()
    }

    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    pub fn header_suppressed(&self) -> bool {
        self.header.is_none()
    }

    pub fn footer_suppressed(&self) -> bool {
        self.skip_footer
    }

    pub fn pages(&self) -> &[LayoutPage] {
        self.canvas.pages()
    }

    /// Direct access for free-form drawing on the current page.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Lowest y content may reach on any page.
    pub fn bottom_limit(&self) -> f64 {
        self.page_height() - (MARGIN + FOOTER_RESERVE)
    }

    /// Where content starts on a freshly opened page.
    fn fresh_page_top(&self) -> f64 {
        match self.header {
            Some(_) => header::POST_HEADER_Y,
            None => MARGIN,
        }
    }

    /// Start a new page if `needed` points do not fit below the cursor.
    /// Returns true when a page was added.
    pub fn ensure_space(&mut self, needed: f64) -> bool {
        if self.cursor_y + needed <= self.bottom_limit() {
            return false;
        }
        self.new_page();
        true
    }

    /// Append a page, draw its header and reset the cursor.
    pub fn new_page(&mut self) {
        let page = self.canvas.add_page();
        self.cursor_y = match &self.header {
            Some(h) => h.draw(&mut self.canvas),
            None => MARGIN,
        };
        log::debug!("Page break: now on page {} (cursor at {})", page, self.cursor_y);
    }

    /// A single-line heading at the margin.
    pub fn add_section_title(&mut self, text: &str, options: TitleOptions) {
        self.cursor_y += options.space_before;
        self.ensure_space(options.font_size + options.space_after);

        let font = StandardFont::for_style(options.style);
        self.canvas.text(
            text,
            MARGIN,
            self.cursor_y,
            font,
            options.font_size,
            options.color,
            TextAlign::Left,
        );
        self.cursor_y += options.space_after;
    }

    /// Wrapped paragraph across the content width.
    ///
    /// The paragraph moves to the next page as a whole when it does not
    /// fit. A paragraph taller than a full page flows line by line instead.
    pub fn add_summary_text(&mut self, text: &str, options: TextOptions) {
        self.cursor_y += options.space_before;

        let font = StandardFont::for_style(options.style);
        let line_height = options.font_size * options.line_height;
        let wrapped = wrap_text(text, self.content_width(), font, options.font_size);
        let block_height = wrapped.len() as f64 * line_height;

        if block_height + options.space_after <= self.bottom_limit() - self.fresh_page_top() {
            self.ensure_space(block_height + options.space_after);
            let top = self.cursor_y;
            let lines = wrapped
                .into_iter()
                .enumerate()
                .map(|(i, l)| TextLine {
                    x: MARGIN,
                    y: top + i as f64 * line_height,
                    text: l.text,
                    width: l.width,
                })
                .collect();
            self.canvas.text_block(lines, font, options.font_size, options.color);
            self.cursor_y += block_height;
        } else {
            for line in wrapped {
                self.ensure_space(line_height);
                self.canvas.text_block(
                    vec![TextLine {
                        x: MARGIN,
                        y: self.cursor_y,
                        text: line.text,
                        width: line.width,
                    }],
                    font,
                    options.font_size,
                    options.color,
                );
                self.cursor_y += line_height;
            }
        }
        self.cursor_y += options.space_after;
    }

    /// Rasterize `spec` and place it at the margin.
    ///
    /// Space is reserved before the rasterizer is awaited, so the chart
    /// lands on the page that was current once the break check ran.
    pub async fn add_chart(&mut self, spec: &ChartSpec, options: ChartOptions) -> Result<(), LayoutError> {
        let width = options.width.unwrap_or_else(|| self.content_width());
        let height = self.fit_chart_height(options.height, 0.0);
        self.ensure_space(height + CHART_GAP);

        let raster_options = RasterOptions::new(
            (width * RASTER_SCALE).round() as u32,
            (height * RASTER_SCALE).round() as u32,
            self.theme,
        );
        let raster = self.rasterizer.rasterize(spec, raster_options).await?;
        let image = decode_image_bytes(&raster.data)?;

        self.canvas
            .image(Arc::new(image), MARGIN, self.cursor_y, width, height);
        self.cursor_y += height + CHART_GAP;
        Ok(())
    }

    /// A 14pt title directly followed by a chart.
    ///
    /// Title and chart break together: room for both is checked before
    /// the title is drawn.
    pub async fn add_chart_with_title(
        &mut self,
        title: &str,
        spec: &ChartSpec,
        options: ChartOptions,
    ) -> Result<(), LayoutError> {
        let title_options = TitleOptions {
            font_size: 14.0,
            space_before: 0.0,
            ..Default::default()
        };
        let title_room = title_options.font_size + title_options.space_after;
        let height = self.fit_chart_height(options.height, title_room);
        self.ensure_space(title_room + height + CHART_GAP);

        self.add_section_title(title, title_options);
        self.add_chart(spec, ChartOptions { height, ..options }).await
    }

    /// `requested`, shrunk so that the chart plus `reserved` points above
    /// it fit on a fresh page.
    fn fit_chart_height(&self, requested: f64, reserved: f64) -> f64 {
        let usable = self.bottom_limit() - self.fresh_page_top() - CHART_GAP - reserved;
        if requested > usable {
            log::warn!(
                "Chart height {} exceeds a page, shrinking to {}",
                requested,
                usable
            );
            return usable;
        }
        requested
    }

    /// Lay out a table through the configured [`TableLayout`].
    ///
    /// Every page the table runs onto gets the page header, and the table
    /// continues below it. Afterwards the cursor sits below the table on
    /// whichever page it ended.
    pub fn add_table(&mut self, head: &[String], body: &[Vec<String>], options: TableOptions) -> Result<(), LayoutError> {
        self.ensure_space(TABLE_MIN_SPACE);

        let request = TableRequest {
            head,
            body,
            x: MARGIN,
            width: self.content_width(),
            start_y: self.cursor_y,
            bottom: self.bottom_limit(),
            options: &options,
        };
        let header = self.header.as_ref();
        let mut on_new_page = |canvas: &mut Canvas| match header {
            Some(h) => h.draw(canvas),
            None => MARGIN,
        };
        let outcome = self
            .tables
            .layout(&mut self.canvas, &request, &mut on_new_page)?;

        if outcome.pages_added > 0 {
            log::debug!(
                "Table of {} rows spanned {} extra page(s)",
                body.len(),
                outcome.pages_added
            );
        }
        self.cursor_y = outcome.final_y + TABLE_GAP;
        Ok(())
    }

    /// Bold `key:` labels with their values in a second column.
    pub fn add_key_value_rows<K, V>(&mut self, rows: &[(K, V)])
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in rows {
            self.ensure_space(KEY_VALUE_ROW);
            self.canvas.text(
                &format!("{}:", key.as_ref()),
                MARGIN,
                self.cursor_y,
                StandardFont::HelveticaBold,
                KEY_VALUE_SIZE,
                Color::BLACK,
                TextAlign::Left,
            );
            self.canvas.text(
                value.as_ref(),
                MARGIN + KEY_VALUE_INDENT,
                self.cursor_y,
                StandardFont::Helvetica,
                KEY_VALUE_SIZE,
                Color::BLACK,
                TextAlign::Left,
            );
            self.cursor_y += KEY_VALUE_ROW;
        }
        self.cursor_y += KEY_VALUE_GAP;
    }

    /// Stamp footers (once) and serialize the document.
    ///
    /// Afterwards the current page is the last page.
    pub fn finish(&mut self, kind: OutputKind) -> Result<Output, LayoutError> {
        if !self.skip_footer && !self.footers_stamped {
            header::stamp_footers(&mut self.canvas)?;
            self.footers_stamped = true;
        } else {
            self.canvas.set_page(self.canvas.page_count())?;
        }

        let metadata = Metadata {
            title: Some(self.title.clone()),
        };
        let bytes = PdfWriter::new().write(self.canvas.pages(), &metadata)?;
        log::info!(
            "Finished \"{}\": {} page(s), {} bytes",
            self.title,
            self.page_count(),
            bytes.len()
        );

        Ok(match kind {
            OutputKind::Blob => Output::Blob(bytes),
            OutputKind::DataUri => Output::DataUri(format!(
                "data:application/pdf;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(&bytes)
            )),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Dataset;
    use crate::layout::DrawCommand;

    fn engine(skip: bool) -> LayoutEngine {
        LayoutEngine::new(
            Orientation::Portrait,
            "Test Report",
            Theme::Light,
            EngineOptions {
                skip_header: skip,
                skip_footer: skip,
                generated_on: Some("10/19/2026".to_string()),
                ..Default::default()
            },
        )
    }

    fn chart() -> ChartSpec {
        ChartSpec::new(
            "bar",
            vec!["A".into(), "B".into()],
            vec![Dataset::new("Count", vec![2.0, 5.0])],
        )
    }

    #[test]
    fn header_sets_initial_cursor() {
        assert_eq!(engine(false).cursor_y(), 85.0);
        assert_eq!(engine(true).cursor_y(), 40.0);
        assert!(engine(true).pages()[0].elements.is_empty());
    }

    #[test]
    fn ensure_space_breaks_before_footer_reserve() {
        let mut e = engine(false);
        e.set_cursor_y(700.0);
        assert!(!e.ensure_space(81.0));
        assert_eq!(e.page_count(), 1);
        assert!(e.ensure_space(82.0));
        assert_eq!((e.page_count(), e.current_page()), (2, 2));
        assert_eq!(e.cursor_y(), 85.0);
        assert!(e.pages()[1].text_content().contains("Generated on: 10/19/2026"));
    }

    #[test]
    fn suppressed_header_resets_to_margin() {
        let mut e = engine(true);
        e.set_cursor_y(780.0);
        e.ensure_space(10.0);
        assert_eq!(e.cursor_y(), 40.0);
        assert!(e.pages()[1].elements.is_empty());
    }

    #[test]
    fn section_title_advances_by_spacing() {
        let mut e = engine(false);
        e.add_section_title("Daily Attendance Log", TitleOptions::default());
        // 85 + 20 before, drawn at 105, +15 after.
        assert_eq!(e.cursor_y(), 120.0);
        let line = e.pages()[0]
            .text_lines()
            .find(|l| l.text == "Daily Attendance Log")
            .unwrap()
            .clone();
        assert_eq!((line.x, line.y), (40.0, 105.0));
    }

    #[test]
    fn summary_text_height_from_wrapped_lines() {
        let mut e = engine(false);
        let text = "word ".repeat(200);
        e.add_summary_text(&text, TextOptions::default());
        let lines = e.pages()[0]
            .elements
            .iter()
            .find_map(|el| match &el.draw {
                DrawCommand::Text { lines, color, .. } if lines.len() > 1 => {
                    assert_eq!(*color, Color::rgb8(45, 55, 72));
                    Some(lines.len())
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(e.cursor_y(), 85.0 + lines as f64 * 15.0 + 25.0);
    }

    #[test]
    fn summary_text_does_not_leak_color() {
        let mut e = engine(false);
        e.add_summary_text("Shaded paragraph.", TextOptions::default());
        e.add_section_title("Next", TitleOptions::default());
        let color = e.pages()[0]
            .elements
            .iter()
            .rev()
            .find_map(|el| match &el.draw {
                DrawCommand::Text { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap();
        assert_eq!(color, Color::BLACK);
    }

    #[test]
    fn oversized_text_flows_across_pages() {
        let mut e = engine(false);
        let text = "lorem ipsum dolor sit amet ".repeat(600);
        e.add_summary_text(&text, TextOptions::default());
        assert!(e.page_count() >= 3);
        for page in e.pages() {
            for line in page.text_lines() {
                assert!(line.y <= e.bottom_limit());
            }
        }
    }

    #[tokio::test]
    async fn chart_breaks_page_when_short_on_room() {
        let mut e = engine(false);
        // 100pt left above the footer reserve.
        e.set_cursor_y(e.bottom_limit() - 100.0);
        e.add_chart(&chart(), ChartOptions::with_height(150.0)).await.unwrap();

        assert_eq!(e.page_count(), 2);
        assert!(e.pages()[0].images().all(|el| el.y < 85.0), "only the logo on page 1");
        let placed = e.pages()[1].images().find(|el| el.y >= 85.0).unwrap();
        assert_eq!((placed.x, placed.y, placed.height), (40.0, 85.0, 150.0));
        assert_eq!(placed.width, e.content_width());
        assert_eq!(e.cursor_y(), 85.0 + 150.0 + 20.0);
    }

    #[tokio::test]
    async fn chart_title_moves_with_its_chart() {
        let mut e = engine(false);
        e.set_cursor_y(e.bottom_limit() - 100.0);
        e.add_chart_with_title("Headcount", &chart(), ChartOptions::with_height(150.0))
            .await
            .unwrap();

        assert_eq!(e.page_count(), 2);
        assert!(e.pages()[0].text_lines().all(|l| l.text != "Headcount"));
        let title = e.pages()[1]
            .text_lines()
            .find(|l| l.text == "Headcount")
            .unwrap()
            .clone();
        let placed = e.pages()[1].images().find(|el| el.y >= 85.0).unwrap();
        assert_eq!((title.x, title.y), (40.0, 85.0));
        assert_eq!(placed.y, 85.0 + 15.0);
    }

    #[tokio::test]
    async fn titled_chart_taller_than_a_page_stays_together() {
        let mut e = engine(false);
        e.add_chart_with_title("Trend", &chart(), ChartOptions::with_height(2000.0))
            .await
            .unwrap();

        let page = e
            .pages()
            .iter()
            .find(|p| p.text_lines().any(|l| l.text == "Trend"))
            .unwrap();
        let placed = page.images().find(|el| el.y >= 85.0).expect("chart left the title's page");
        assert!(placed.height < 2000.0);
        assert!(placed.y + placed.height + 20.0 <= e.bottom_limit() + 1e-6);
    }

    #[tokio::test]
    async fn chart_raster_is_scaled_for_print() {
        let mut e = engine(true);
        let options = ChartOptions {
            width: Some(200.0),
            height: 100.0,
        };
        e.add_chart(&chart(), options).await.unwrap();
        let placed = e.pages()[0].images().next().unwrap();
        match &placed.draw {
            DrawCommand::Image { image } => {
                assert_eq!((image.width_px, image.height_px), (500, 250));
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn chart_error_propagates() {
        let mut e = engine(false);
        let spec = ChartSpec::new("radar", vec![], vec![]);
        let err = e.add_chart(&spec, ChartOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("radar"));
    }

    #[test]
    fn table_of_200_rows_spans_three_pages() {
        let mut e = engine(false);
        let head: Vec<String> = vec!["ID".into(), "Name".into(), "Status".into()];
        let body: Vec<Vec<String>> = (0..200)
            .map(|i| vec![i.to_string(), format!("Employee {}", i), "Active".into()])
            .collect();
        let options = TableOptions {
            font_size: 6.0,
            cell_padding: 1.0,
            ..Default::default()
        };
        e.add_table(&head, &body, options).unwrap();
        e.finish(OutputKind::Blob).unwrap();

        assert_eq!(e.page_count(), 3);
        assert_eq!(e.current_page(), 3);
        for (i, page) in e.pages().iter().enumerate() {
            let text = page.text_content();
            assert!(text.contains("Generated on: 10/19/2026"), "page {} lacks header", i + 1);
            assert!(text.contains(&format!("Page {} of 3", i + 1)));
        }
    }

    #[test]
    fn table_continuation_respects_suppressed_header() {
        let mut e = engine(true);
        let head: Vec<String> = vec!["Key".into()];
        let body: Vec<Vec<String>> = (0..50).map(|i| vec![i.to_string()]).collect();
        e.add_table(&head, &body, TableOptions::default()).unwrap();
        assert_eq!(e.page_count(), 2);
        let first = e.pages()[1].text_lines().next().unwrap();
        assert_eq!(first.text, "Key");
        assert!(first.y < 60.0);
    }

    #[test]
    fn key_value_rows_spacing() {
        let mut e = engine(false);
        e.add_key_value_rows(&[("Period", "Oct 2026"), ("Employees", "42")]);
        assert_eq!(e.cursor_y(), 85.0 + 2.0 * 15.0 + 10.0);
        let text = e.pages()[0].text_content();
        assert!(text.contains("Period:"));
        let value = e.pages()[0].text_lines().find(|l| l.text == "42").unwrap().clone();
        assert_eq!(value.x, 160.0);
    }

    #[test]
    fn finish_twice_stamps_footers_once() {
        let mut e = engine(false);
        e.finish(OutputKind::Blob).unwrap();
        e.finish(OutputKind::Blob).unwrap();
        let footers = e.pages()[0].text_content().matches("Page 1 of 1").count();
        assert_eq!(footers, 1);
    }

    #[test]
    fn skip_footer_leaves_pages_unnumbered() {
        let mut e = engine(true);
        e.new_page();
        let bytes = e.finish(OutputKind::Blob).unwrap().into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(e.pages().iter().all(|p| !p.text_content().contains("Page ")));
        assert_eq!(e.current_page(), 2);
    }

    #[test]
    fn data_uri_output_round_trips() {
        let mut e = engine(false);
        let uri = match e.finish(OutputKind::DataUri).unwrap() {
            Output::DataUri(uri) => uri,
            other => panic!("expected data URI, got {:?}", other),
        };
        assert!(uri.starts_with("data:application/pdf;base64,"));
        let bytes = Output::DataUri(uri).into_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
    }
}
