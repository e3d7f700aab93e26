//! One-page per-subject figure: a grid of line panels.

use std::path::Path;

/// A4 portrait at 96 dpi
pub const A4_PORTRAIT: (u32, u32) = (794, 1123);

/// Panels per row
const GRID_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    /// One value per volume; the x axis is the volume index
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self { label: label.into(), values }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl Panel {
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
        }
    }

    pub fn with_series(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        self.series.push(Series::new(label, values));
        self
    }

    /// Three series labelled x, y and z
    pub fn with_xyz(self, x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Self {
        self.with_series("x", x).with_series("y", y).with_series("z", z)
    }

    /// (min, max) over all finite values, or `None` when there are none
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Longest series length
    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Figure {
    /// `"<kind> QC for Subject <subject> <ddmmyy>"`
    pub fn for_subject(kind: &str, subject: &str) -> Self {
        Self { title: format!("{kind} QC for Subject {subject} {}", today_stamp()), panels: Vec::new() }
    }

    pub fn push(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }
}

/// Local date as `ddmmyy`
pub fn today_stamp() -> String {
    chrono::Local::now().format("%d%m%y").to_string()
}

/// y axis bounds with a 5% margin; flat or empty data gets a unit-wide range
fn padded_range(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        None => (0.0, 1.0),
        Some((lo, hi)) if hi - lo <= f64::EPSILON * hi.abs().max(1.0) => (lo - 0.5, hi + 0.5),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
    }
}

#[cfg(feature = "plots")]
pub fn render_figure(figure: &Figure, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    use plotters::prelude::*;

    let root = SVGBackend::new(path, A4_PORTRAIT).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&figure.title, ("sans-serif", 20))?;

    let rows = figure.panels.len().div_ceil(GRID_COLUMNS).max(1);
    let areas = root.split_evenly((rows, GRID_COLUMNS));
    for (panel, area) in figure.panels.iter().zip(areas.iter()) {
        draw_panel(panel, area)?;
    }
    root.present()?;
    Ok(())
}

#[cfg(feature = "plots")]
const PALETTE: [plotters::style::RGBColor; 4] = [
    plotters::style::RGBColor(214, 39, 40),
    plotters::style::RGBColor(44, 160, 44),
    plotters::style::RGBColor(31, 119, 180),
    plotters::style::RGBColor(255, 127, 14),
];

#[cfg(feature = "plots")]
fn draw_panel(
    panel: &Panel,
    area: &plotters::drawing::DrawingArea<plotters::prelude::SVGBackend<'_>, plotters::coord::Shift>,
) -> Result<(), Box<dyn std::error::Error>> {
    use plotters::prelude::*;

    let x_max = panel.len().saturating_sub(1).max(1) as f64;
    let (y_lo, y_hi) = padded_range(panel.value_range());
    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .caption(&panel.title, ("sans-serif", 13))
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .label_style(("sans-serif", 10))
        .draw()?;

    for (i, series) in panel.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<(f64, f64)> = series
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(x, v)| (x as f64, *v))
            .collect();
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }
    if !panel.series.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 10))
            .draw()?;
    }
    Ok(())
}

#[cfg(not(feature = "plots"))]
pub fn render_figure(_figure: &Figure, _path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    Err("plots feature is not enabled".into())
}
