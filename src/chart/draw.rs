//! Chart drawing onto a `tiny-skia` pixmap.
//!
//! Drawing is a single deterministic frame (there is no animation to wait
//! for). The render lifecycle is explicit: [`RenderHooks::before_draw`] runs
//! on the bare surface, the legend, axes and series are drawn, the text
//! overlay goes on last, and [`RenderHooks::on_complete`] fires once the
//! last stroke is down. Anything that wants the finished picture must take
//! it from `on_complete`.

use std::f32::consts::PI;

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use super::labels::{Anchor, TextOverlay};
use super::{palette, ChartSpec, Dataset};
use crate::error::RasterError;
use crate::style::{Color, Theme};

/// Lifecycle callbacks around a single chart render.
pub trait RenderHooks {
    /// Runs before any chart ink is laid down.
    fn before_draw(&mut self, _surface: &mut Pixmap) {}

    /// Runs exactly once, after the chart is completely drawn.
    fn on_complete(&mut self, surface: &Pixmap);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar { horizontal: bool },
    Line,
    Pie,
    Doughnut,
}

impl ChartKind {
    pub fn from_spec(spec: &ChartSpec) -> Result<Self, RasterError> {
        match spec.kind.as_str() {
            "bar" => Ok(ChartKind::Bar {
                horizontal: spec.is_horizontal(),
            }),
            "line" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            "doughnut" => Ok(ChartKind::Doughnut),
            other => Err(RasterError::UnsupportedChartType(other.to_string())),
        }
    }
}

/// Theme-dependent colors for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartInk {
    /// Axis lines; grid lines use it at reduced opacity.
    pub axis: Color,
    /// Tick values, category names and legend text.
    pub text: Color,
    /// Opaque fill behind the chart, also used to separate slices.
    pub backdrop: Color,
}

impl ChartInk {
    pub fn for_theme(theme: Theme) -> Self {
        Self {
            axis: theme.chart_ink(),
            text: theme.chart_text(),
            backdrop: theme.backdrop(),
        }
    }
}

/// A validated chart, ready to render.
pub struct Chart<'a> {
    spec: &'a ChartSpec,
    kind: ChartKind,
    ink: ChartInk,
}

/// A rectangle on the surface, in pixels.
#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl PlotArea {
    fn inset(width: u32, height: u32, pad: f32) -> Self {
        Self {
            left: pad,
            top: pad,
            right: width as f32 - pad,
            bottom: height as f32 - pad,
        }
    }

    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// A numeric axis scaled to "nice" tick steps.
#[derive(Debug, Clone, Copy)]
struct ValueScale {
    min: f64,
    max: f64,
    step: f64,
}

impl ValueScale {
    fn for_values<'v>(values: impl Iterator<Item = &'v f64>) -> Self {
        let (mut lo, mut hi) = (0.0f64, 0.0f64);
        for &v in values {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if (hi - lo).abs() < f64::EPSILON {
            hi = lo + 1.0;
        }
        let step = nice_step((hi - lo) / 5.0);
        Self {
            min: (lo / step).floor() * step,
            max: (hi / step).ceil() * step,
            step,
        }
    }

    /// Fraction of the axis length at which `v` sits (0 = min, 1 = max).
    fn fraction(&self, v: f64) -> f32 {
        ((v - self.min) / (self.max - self.min)) as f32
    }

    fn ticks(&self) -> impl Iterator<Item = f64> + '_ {
        let count = ((self.max - self.min) / self.step).round() as usize;
        (0..=count).map(move |i| self.min + i as f64 * self.step)
    }

    fn label(&self, tick: f64) -> String {
        format_tick(tick, self.step)
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Tick text with thousands separators and as many decimals as the step needs.
fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()).max(0.0) as usize
    };
    let value = if value.abs() < step * 1e-6 { 0.0 } else { value };
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Label size in pixels for a surface.
fn label_size(width: u32, height: u32) -> f32 {
    (height as f32 / 25.0).min(width as f32 / 40.0).max(8.0)
}

fn paint_for(color: Color) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn series_color(dataset: &Dataset, dataset_index: usize, point_index: usize, per_point: bool) -> Color {
    let fallback = if per_point {
        palette(point_index)
    } else {
        palette(dataset_index)
    };
    dataset
        .background_color
        .as_ref()
        .and_then(|list| list.at(point_index))
        .unwrap_or(fallback)
}

fn line_color(dataset: &Dataset, dataset_index: usize) -> Color {
    dataset
        .border_color
        .as_ref()
        .and_then(|list| list.at(0))
        .or_else(|| dataset.background_color.as_ref().and_then(|list| list.at(0)))
        .map(|c| c.with_alpha(1.0))
        .unwrap_or_else(|| palette(dataset_index))
}

impl<'a> Chart<'a> {
    /// Validate a spec. Fails on an unknown chart type or undrawable data.
    pub fn new(spec: &'a ChartSpec, ink: ChartInk) -> Result<Self, RasterError> {
        let kind = ChartKind::from_spec(spec)?;

        for (i, dataset) in spec.data.datasets.iter().enumerate() {
            if let Some(v) = dataset.data.iter().find(|v| !v.is_finite()) {
                return Err(RasterError::InvalidData(format!(
                    "dataset {} contains non-finite value {}",
                    i, v
                )));
            }
            if matches!(kind, ChartKind::Pie | ChartKind::Doughnut) {
                if let Some(v) = dataset.data.iter().find(|v| **v < 0.0) {
                    return Err(RasterError::InvalidData(format!(
                        "{} slices cannot be negative (dataset {} has {})",
                        spec.kind, i, v
                    )));
                }
            }
        }

        Ok(Self { spec, kind, ink })
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Draw the chart onto `surface`, firing the lifecycle hooks around it.
    pub fn render(&self, surface: &mut Pixmap, hooks: &mut dyn RenderHooks) -> Result<(), RasterError> {
        hooks.before_draw(surface);

        let (width, height) = (surface.width(), surface.height());
        let mut labels = TextOverlay::new(width, height, label_size(width, height), self.ink.text);
        let frame = PlotArea::inset(width, height, 0.04 * width.min(height) as f32);
        let frame = self.draw_legend(surface, &mut labels, frame);

        match self.kind {
            ChartKind::Bar { horizontal } => self.draw_bars(surface, &mut labels, frame, horizontal),
            ChartKind::Line => self.draw_lines(surface, &mut labels, frame),
            ChartKind::Pie => self.draw_arcs(surface, frame, 0.0),
            ChartKind::Doughnut => self.draw_arcs(surface, frame, 0.5),
        }
        labels.render(surface)?;

        hooks.on_complete(surface);
        Ok(())
    }

    /// Legend text and swatch color: one entry per slice for pie and
    /// doughnut charts, one per labelled dataset otherwise.
    fn legend_entries(&self) -> Vec<(String, Color)> {
        let datasets = &self.spec.data.datasets;
        match self.kind {
            ChartKind::Pie | ChartKind::Doughnut => match datasets.first() {
                Some(dataset) => self
                    .spec
                    .data
                    .labels
                    .iter()
                    .enumerate()
                    .map(|(i, label)| (label.clone(), series_color(dataset, 0, i, true)))
                    .collect(),
                None => Vec::new(),
            },
            ChartKind::Line => datasets
                .iter()
                .enumerate()
                .filter_map(|(j, d)| d.label.clone().map(|label| (label, line_color(d, j))))
                .collect(),
            ChartKind::Bar { .. } => datasets
                .iter()
                .enumerate()
                .filter_map(|(j, d)| d.label.clone().map(|label| (label, series_color(d, j, 0, false))))
                .collect(),
        }
    }

    /// Centered legend rows across the top of `frame`. Returns what is left
    /// of the frame below them.
    fn draw_legend(&self, surface: &mut Pixmap, labels: &mut TextOverlay, frame: PlotArea) -> PlotArea {
        const MAX_ROWS: usize = 3;

        let entries = self.legend_entries();
        if entries.is_empty() {
            return frame;
        }
        let size = labels.size();
        let swatch = size * 2.5;
        let gap = size * 0.5;
        let spacing = size * 1.2;
        let row_height = size * 1.6;

        let mut rows: Vec<(f32, Vec<(String, Color)>)> = vec![(0.0, Vec::new())];
        for (text, color) in entries {
            let text = labels.fit(&text, frame.width() - swatch - gap);
            let item = swatch + gap + labels.measure(&text);
            let needs_row = rows
                .last()
                .map(|(used, row)| !row.is_empty() && used + spacing + item > frame.width())
                .unwrap_or(false);
            if needs_row {
                rows.push((0.0, Vec::new()));
            }
            if let Some((used, row)) = rows.last_mut() {
                *used += if row.is_empty() { item } else { spacing + item };
                row.push((text, color));
            }
        }
        rows.truncate(MAX_ROWS);

        for (r, (used, row)) in rows.iter().enumerate() {
            let mut x = frame.left + (frame.width() - used) / 2.0;
            let cy = frame.top + row_height * (r as f32 + 0.5);
            for (text, color) in row {
                if let Some(rect) = Rect::from_xywh(x, cy - size / 2.0, swatch, size) {
                    surface.fill_rect(rect, &paint_for(*color), Transform::identity(), None);
                }
                labels.push(x + swatch + gap, cy, Anchor::Start, text.clone());
                x += swatch + gap + labels.measure(text) + spacing;
            }
        }

        PlotArea {
            top: frame.top + rows.len() as f32 * row_height + size * 0.5,
            ..frame
        }
    }

    fn category_count(&self) -> usize {
        let longest = self
            .spec
            .data
            .datasets
            .iter()
            .map(|d| d.data.len())
            .max()
            .unwrap_or(0);
        self.spec.data.labels.len().max(longest)
    }

    fn value_scale(&self) -> ValueScale {
        ValueScale::for_values(self.spec.data.datasets.iter().flat_map(|d| d.data.iter()))
    }

    /// Shrink `frame` to leave gutters for tick values and category names.
    fn axis_area(&self, labels: &TextOverlay, frame: PlotArea, scale: &ValueScale, horizontal: bool) -> PlotArea {
        let size = labels.size();
        let gap = size * 0.5;
        let widest_tick = scale
            .ticks()
            .map(|t| labels.measure(&scale.label(t)))
            .fold(0.0f32, f32::max);

        if horizontal {
            let widest_category = self
                .spec
                .data
                .labels
                .iter()
                .map(|l| labels.measure(l))
                .fold(0.0f32, f32::max)
                .min(frame.width() * 0.3);
            PlotArea {
                left: frame.left + widest_category + gap,
                top: frame.top,
                right: frame.right - widest_tick / 2.0,
                bottom: frame.bottom - size * 1.5,
            }
        } else {
            PlotArea {
                left: frame.left + widest_tick + gap,
                top: frame.top + size / 2.0,
                right: frame.right,
                bottom: frame.bottom - size * 1.5,
            }
        }
    }

    fn draw_value_grid(
        &self,
        surface: &mut Pixmap,
        labels: &mut TextOverlay,
        area: PlotArea,
        scale: &ValueScale,
        horizontal: bool,
    ) {
        let grid = paint_for(self.ink.axis.with_alpha(0.25));
        let axis = paint_for(self.ink.axis);
        let thin = Stroke {
            width: 1.0,
            ..Default::default()
        };
        let thick = Stroke {
            width: 2.0,
            ..Default::default()
        };
        let size = labels.size();

        for tick in scale.ticks() {
            let f = scale.fraction(tick);
            let mut pb = PathBuilder::new();
            if horizontal {
                let x = area.left + f * area.width();
                pb.move_to(x, area.top);
                pb.line_to(x, area.bottom);
                labels.push(x, area.bottom + size * 0.9, Anchor::Middle, scale.label(tick));
            } else {
                let y = area.bottom - f * area.height();
                pb.move_to(area.left, y);
                pb.line_to(area.right, y);
                labels.push(area.left - size * 0.5, y, Anchor::End, scale.label(tick));
            }
            if let Some(path) = pb.finish() {
                let stroke = if tick == 0.0 { &thick } else { &thin };
                let paint = if tick == 0.0 { &axis } else { &grid };
                surface.stroke_path(&path, paint, stroke, Transform::identity(), None);
            }
        }

        let mut pb = PathBuilder::new();
        pb.move_to(area.left, area.top);
        pb.line_to(area.left, area.bottom);
        pb.line_to(area.right, area.bottom);
        if let Some(path) = pb.finish() {
            surface.stroke_path(&path, &axis, &thin, Transform::identity(), None);
        }
    }

    /// Category names centered on their bands.
    fn label_categories(&self, labels: &mut TextOverlay, area: PlotArea, band: f32, horizontal: bool) {
        let size = labels.size();
        for (i, name) in self.spec.data.labels.iter().enumerate() {
            let center = (i as f32 + 0.5) * band;
            if horizontal {
                let room = area.left - size * 0.5;
                let text = labels.fit(name, room);
                labels.push(area.left - size * 0.5, area.top + center, Anchor::End, text);
            } else {
                let text = labels.fit(name, band * 0.95);
                labels.push(area.left + center, area.bottom + size * 0.9, Anchor::Middle, text);
            }
        }
    }

    fn draw_bars(&self, surface: &mut Pixmap, labels: &mut TextOverlay, frame: PlotArea, horizontal: bool) {
        let scale = self.value_scale();
        let area = self.axis_area(labels, frame, &scale, horizontal);
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }
        self.draw_value_grid(surface, labels, area, &scale, horizontal);

        let categories = self.category_count();
        let series = self.spec.data.datasets.len();
        if categories == 0 || series == 0 {
            return;
        }

        let band = if horizontal { area.height() } else { area.width() } / categories as f32;
        self.label_categories(labels, area, band, horizontal);
        let bar = band * 0.8 / series as f32;
        let zero = scale.fraction(0.0);

        for (j, dataset) in self.spec.data.datasets.iter().enumerate() {
            for (i, &value) in dataset.data.iter().enumerate() {
                let paint = paint_for(series_color(dataset, j, i, false));
                let offset = i as f32 * band + band * 0.1 + j as f32 * bar;
                let (from, to) = {
                    let v = scale.fraction(value);
                    (zero.min(v), zero.max(v))
                };
                let rect = if horizontal {
                    Rect::from_xywh(
                        area.left + from * area.width(),
                        area.top + offset,
                        (to - from) * area.width(),
                        bar,
                    )
                } else {
                    Rect::from_xywh(
                        area.left + offset,
                        area.bottom - to * area.height(),
                        bar,
                        (to - from) * area.height(),
                    )
                };
                // Zero-height bars have nothing to draw.
                if let Some(rect) = rect {
                    surface.fill_rect(rect, &paint, Transform::identity(), None);
                }
            }
        }
    }

    fn draw_lines(&self, surface: &mut Pixmap, labels: &mut TextOverlay, frame: PlotArea) {
        let scale = self.value_scale();
        let area = self.axis_area(labels, frame, &scale, false);
        if area.width() <= 0.0 || area.height() <= 0.0 {
            return;
        }
        self.draw_value_grid(surface, labels, area, &scale, false);

        let categories = self.category_count();
        if categories == 0 {
            return;
        }
        let band = area.width() / categories as f32;
        self.label_categories(labels, area, band, false);
        let stroke_width = (surface.height() as f32 / 200.0).max(2.0);
        let zero_y = area.bottom - scale.fraction(0.0) * area.height();

        for (j, dataset) in self.spec.data.datasets.iter().enumerate() {
            let points: Vec<(f32, f32)> = dataset
                .data
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    (
                        area.left + (i as f32 + 0.5) * band,
                        area.bottom - scale.fraction(v) * area.height(),
                    )
                })
                .collect();
            let color = line_color(dataset, j);

            if dataset.fill && points.len() > 1 {
                let mut pb = PathBuilder::new();
                pb.move_to(points[0].0, zero_y);
                for &(x, y) in &points {
                    pb.line_to(x, y);
                }
                pb.line_to(points[points.len() - 1].0, zero_y);
                pb.close();
                if let Some(path) = pb.finish() {
                    let paint = paint_for(color.with_alpha(0.2));
                    surface.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }

            let paint = paint_for(color);
            if points.len() > 1 {
                let mut pb = PathBuilder::new();
                pb.move_to(points[0].0, points[0].1);
                for &(x, y) in &points[1..] {
                    pb.line_to(x, y);
                }
                if let Some(path) = pb.finish() {
                    let stroke = Stroke {
                        width: stroke_width,
                        ..Default::default()
                    };
                    surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
            for &(x, y) in &points {
                if let Some(dot) = PathBuilder::from_circle(x, y, stroke_width * 1.5) {
                    surface.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
        }
    }

    /// Pie (`cutout == 0`) and doughnut slices from the first dataset.
    fn draw_arcs(&self, surface: &mut Pixmap, area: PlotArea, cutout: f32) {
        let Some(dataset) = self.spec.data.datasets.first() else {
            return;
        };
        let cx = area.left + area.width() / 2.0;
        let cy = area.top + area.height() / 2.0;
        let outer = area.width().min(area.height()) / 2.0;
        if outer <= 0.0 {
            return;
        }
        let inner = outer * cutout;

        let total: f64 = dataset.data.iter().sum();
        if total <= 0.0 {
            // Nothing to apportion: outline the empty chart.
            if let Some(ring) = PathBuilder::from_circle(cx, cy, outer) {
                let stroke = Stroke {
                    width: 1.0,
                    ..Default::default()
                };
                surface.stroke_path(&ring, &paint_for(self.ink.axis), &stroke, Transform::identity(), None);
            }
            return;
        }

        let separator = paint_for(self.ink.backdrop);
        let separator_stroke = Stroke {
            width: (outer / 100.0).max(1.0),
            ..Default::default()
        };
        let mut start = -PI / 2.0;
        for (i, &value) in dataset.data.iter().enumerate() {
            let sweep = (value / total) as f32 * 2.0 * PI;
            if sweep <= 0.0 {
                continue;
            }
            if let Some(path) = arc_segment(cx, cy, outer, inner, start, sweep) {
                let paint = paint_for(series_color(dataset, 0, i, true));
                surface.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                surface.stroke_path(&path, &separator, &separator_stroke, Transform::identity(), None);
            }
            start += sweep;
        }
    }
}

/// Build a pie slice or ring segment as a polygon approximating the arcs.
fn arc_segment(cx: f32, cy: f32, outer: f32, inner: f32, start: f32, sweep: f32) -> Option<tiny_skia::Path> {
    let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
    let point = |r: f32, a: f32| (cx + r * a.cos(), cy + r * a.sin());

    let mut pb = PathBuilder::new();
    let (x0, y0) = point(outer, start);
    if inner > 0.0 {
        pb.move_to(x0, y0);
    } else {
        pb.move_to(cx, cy);
        pb.line_to(x0, y0);
    }
    for s in 1..=steps {
        let (x, y) = point(outer, start + sweep * s as f32 / steps as f32);
        pb.line_to(x, y);
    }
    if inner > 0.0 {
        for s in (0..=steps).rev() {
            let (x, y) = point(inner, start + sweep * s as f32 / steps as f32);
            pb.line_to(x, y);
        }
    }
    pb.close();
    pb.finish()
}
