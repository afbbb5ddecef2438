//! # Charts
//!
//! A chart is described declaratively by a [`ChartSpec`] (the familiar
//! `{ type, data, options }` shape) and turned into a fixed-size bitmap by
//! the [`ChartRasterizer`]. A spec is a plain value: it never points back
//! at the document it will end up in.
//!
//! ```text
//! ChartSpec ──► Chart::new (validate) ──► Chart::render onto an off-screen
//!              pixmap: before_draw (opaque backdrop) → series → on_complete
//!              (capture as PNG) ──► RasterImage
//! ```

pub mod draw;
mod labels;
pub mod rasterizer;

pub use draw::{Chart, ChartInk, ChartKind, RenderHooks};
pub use labels::fonts_available;
pub use rasterizer::{ChartRasterizer, RasterImage, RasterOptions};

use serde::{Deserialize, Serialize};

use crate::style::Color;

/// Declarative description of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Chart type name: `bar`, `line`, `pie` or `doughnut`.
    ///
    /// Kept as free text so that an unknown type is reported by the
    /// renderer, the same way a malformed spec would be.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: ChartData,
    /// Renderer options. Only `indexAxis` is interpreted (`"y"` turns a
    /// bar chart horizontal); everything else is carried along untouched.
    #[serde(default)]
    pub options: serde_json::Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(default)]
    pub background_color: Option<ColorList>,
    #[serde(default)]
    pub border_color: Option<ColorList>,
    /// Line charts only: shade the area between the line and the baseline.
    #[serde(default)]
    pub fill: bool,
}

/// One color for the whole dataset, or one per data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorList {
    One(String),
    Many(Vec<String>),
}

/// Fallback series colors, cycled by dataset (bar/line) or slice (pie).
const PALETTE: [&str; 6] = [
    "#198754", "#0dcaf0", "#ffc107", "#dc3545", "#6f42c1", "#fd7e14",
];

pub(crate) fn palette(index: usize) -> Color {
    Color::hex(PALETTE[index % PALETTE.len()])
}

impl ColorList {
    /// Resolve the color for the data point at `index`, if one is given
    /// and parses.
    pub fn at(&self, index: usize) -> Option<Color> {
        match self {
            ColorList::One(s) => Color::parse(s),
            ColorList::Many(list) if !list.is_empty() => Color::parse(&list[index % list.len()]),
            ColorList::Many(_) => None,
        }
    }
}

impl ChartSpec {
    pub fn new(kind: impl Into<String>, labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Self {
            kind: kind.into(),
            data: ChartData { labels, datasets },
            options: serde_json::Value::Null,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }

    /// True when bars run along the x axis (`options.indexAxis == "y"`).
    pub fn is_horizontal(&self) -> bool {
        self.options
            .get("indexAxis")
            .and_then(serde_json::Value::as_str)
            == Some("y")
    }
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<f64>) -> Self {
        Self {
            label: Some(label.into()),
            data,
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(ColorList::One(color.into()));
        self
    }

    pub fn with_colors(mut self, colors: Vec<String>) -> Self {
        self.background_color = Some(ColorList::Many(colors));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_chart_js_shape() {
        let json = r##"{
            "type": "bar",
            "data": {
                "labels": ["Engineer", "Analyst"],
                "datasets": [{
                    "label": "Number of Employees",
                    "data": [4, 2],
                    "backgroundColor": "rgba(25, 135, 84, 0.6)"
                }]
            },
            "options": { "indexAxis": "y", "plugins": { "legend": { "display": false } } }
        }"##;
        let spec: ChartSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.kind, "bar");
        assert!(spec.is_horizontal());
        assert_eq!(spec.data.datasets[0].data, vec![4.0, 2.0]);
        let color = spec.data.datasets[0].background_color.as_ref().unwrap().at(1).unwrap();
        assert_eq!(color.to_rgba8(), [25, 135, 84, 153]);
    }

    #[test]
    fn per_point_colors_cycle() {
        let list = ColorList::Many(vec!["#198754".into(), "#ffc107".into()]);
        assert_eq!(list.at(2), list.at(0));
        assert_ne!(list.at(1), list.at(0));
        assert_eq!(ColorList::Many(vec![]).at(0), None);
    }
}
