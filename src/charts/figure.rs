// Drawing primitives shared by the dashboard charts.
//
// Everything renders into an in-memory RGB buffer through the plotters bitmap
// backend and is then PNG-encoded, so no display or system font is needed.
use crate::error::ChartError;
use crate::util::format_int;
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use tracing::warn;

pub const FIGURE_WIDTH: u32 = 800;
pub const FIGURE_HEIGHT: u32 = 600;
const LEGEND_WIDTH: u32 = 130;
const FONT_FAMILY: &str = "sans-serif";

pub const FRAUD_RED: RGBColor = RGBColor(0xc3, 0x44, 0x54);
pub const TEAL: RGBColor = RGBColor(0x53, 0xa4, 0xb1);
pub const LIME: RGBColor = RGBColor(0x00, 0xff, 0x00);
pub const ORANGE: RGBColor = RGBColor(0xff, 0x99, 0x00);
pub const PURE_BLUE: RGBColor = RGBColor(0x00, 0x00, 0xff);

static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

static FONT_READY: Lazy<bool> = Lazy::new(|| {
    let ok = register_font(FONT_FAMILY, FontStyle::Normal, FONT_BYTES).is_ok();
    if !ok {
        warn!("bundled font rejected by the rasterizer");
    }
    ok
});

type AreaResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Something that can paint itself onto a drawing area.
pub trait Figure {
    fn title(&self) -> &'static str;

    /// Whether the white background is saved as transparent.
    fn transparent(&self) -> bool {
        false
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> AreaResult<DB>;
}

/// Render a figure to PNG bytes at the fixed dashboard size.
///
/// The output only depends on the figure, so equal figures encode to equal
/// bytes.
pub fn render_png<F: Figure>(figure: &F) -> Result<Vec<u8>, ChartError> {
    if !*FONT_READY {
        return Err(ChartError::Font);
    }
    let chart = figure.title();
    let draw_err = |message: String| ChartError::Draw { chart, message };

    let mut pixels = vec![0u8; (FIGURE_WIDTH * FIGURE_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut pixels, (FIGURE_WIDTH, FIGURE_HEIGHT)).into_drawing_area();
        figure.draw(&root).map_err(|e| draw_err(e.to_string()))?;
        root.present().map_err(|e| draw_err(e.to_string()))?;
    }
    if figure.transparent() {
        let rgba = clear_white(&pixels);
        return encode_png(&rgba, FIGURE_WIDTH, FIGURE_HEIGHT, png::ColorType::Rgba);
    }
    encode_png(&pixels, FIGURE_WIDTH, FIGURE_HEIGHT, png::ColorType::Rgb)
}

/// RGB to RGBA, with pure white pixels made fully transparent.
fn clear_white(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .flat_map(|px| {
            let alpha = if px == [255, 255, 255] { 0 } else { 255 };
            [px[0], px[1], px[2], alpha]
        })
        .collect()
}

pub fn encode_png(
    pixels: &[u8],
    width: u32,
    height: u32,
    color: png::ColorType,
) -> Result<Vec<u8>, ChartError> {
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, width, height);
    encoder.set_color(color);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    writer.finish()?;
    Ok(out)
}

/// Title the figure and, when there is a legend, split a column off the right
/// edge for it. Returns the area left for the plot itself.
fn frame<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    legend: &[(&str, RGBColor)],
) -> Result<DrawingArea<DB, Shift>, DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let body = root.titled(title, (FONT_FAMILY, 22))?;
    if legend.is_empty() {
        return Ok(body);
    }
    let (width, _) = body.dim_in_pixel();
    let (plot, side) = body.split_horizontally(width.saturating_sub(LEGEND_WIDTH));
    draw_side_legend(&side, legend)?;
    Ok(plot)
}

fn draw_side_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    entries: &[(&str, RGBColor)],
) -> AreaResult<DB> {
    let style = (FONT_FAMILY, 15).into_font().color(&BLACK);
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = 24 + i as i32 * 24;
        area.draw(&Rectangle::new([(8, y), (24, y + 14)], color.filled()))?;
        area.draw(&Text::new(*label, (32, y), style.clone()))?;
    }
    Ok(())
}

/// Axis label for the category at integral position `v`, blank elsewhere.
fn category_label(categories: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

fn value_label(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format_int(v as i64)
    } else {
        format!("{v:.1}")
    }
}

/// Pad a data range so points do not sit on the frame.
fn padded(min: f64, max: f64) -> std::ops::Range<f64> {
    if (max - min).abs() < f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLayout {
    Stacked,
    Grouped,
}

#[derive(Debug, Clone)]
pub struct BarSeries {
    pub label: &'static str,
    pub color: RGBColor,
    pub values: Vec<f64>,
}

/// Bar chart over a categorical axis with one or more series.
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: &'static str,
    pub category_desc: Option<&'static str>,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
    pub layout: BarLayout,
    pub orientation: Orientation,
    pub legend: bool,
    pub transparent: bool,
}

impl BarChart {
    /// Legend entries drawn beside the plot, empty when the legend is off.
    pub fn legend_entries(&self) -> Vec<(&'static str, RGBColor)> {
        if !self.legend {
            return Vec::new();
        }
        self.series.iter().map(|s| (s.label, s.color)).collect()
    }

    fn value_max(&self) -> f64 {
        let per_category = (0..self.categories.len()).map(|i| {
            let values = self.series.iter().map(|s| s.values.get(i).copied().unwrap_or(0.0));
            match self.layout {
                BarLayout::Stacked => values.sum::<f64>(),
                BarLayout::Grouped => values.fold(0.0, f64::max),
            }
        });
        let max = per_category.fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.05
        } else {
            1.0
        }
    }

    /// Bar rectangles for one series in data coordinates: (category span,
    /// value span). `base` holds the running stack height per category.
    fn bars(&self, index: usize, base: &mut [f64]) -> Vec<((f64, f64), (f64, f64))> {
        let series = &self.series[index];
        let count = self.series.len().max(1) as f64;
        series
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let center = i as f64;
                match self.layout {
                    BarLayout::Stacked => {
                        let lo = base[i];
                        base[i] += v;
                        ((center - 0.4, center + 0.4), (lo, lo + v))
                    }
                    BarLayout::Grouped => {
                        let width = 0.8 / count;
                        let start = center - 0.4 + index as f64 * width;
                        ((start, start + width), (0.0, *v))
                    }
                }
            })
            .collect()
    }
}

impl Figure for BarChart {
    fn title(&self) -> &'static str {
        self.title
    }

    fn transparent(&self) -> bool {
        self.transparent
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> AreaResult<DB> {
        let area = frame(root, self.title, &self.legend_entries())?;

        let n = self.categories.len();
        let category_range = -0.5..(n as f64 - 0.5);
        let value_range = 0.0..self.value_max();
        let vertical = self.orientation == Orientation::Vertical;
        let (x_range, y_range) = if vertical {
            (category_range, value_range)
        } else {
            (value_range, category_range)
        };

        let mut chart = ChartBuilder::on(&area)
            .margin(12)
            .x_label_area_size(if vertical { 48 } else { 36 })
            .y_label_area_size(if vertical { 64 } else { 110 })
            .build_cartesian_2d(x_range, y_range)?;

        let categories = &self.categories;
        let category_fmt = |v: &f64| category_label(categories, *v);
        let value_fmt = |v: &f64| value_label(*v);

        let mut mesh = chart.configure_mesh();
        mesh.label_style((FONT_FAMILY, 13))
            .axis_desc_style((FONT_FAMILY, 15));
        if vertical {
            mesh.disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&category_fmt)
                .y_label_formatter(&value_fmt);
            if let Some(desc) = self.category_desc {
                mesh.x_desc(desc);
            }
        } else {
            mesh.disable_y_mesh()
                .y_labels(n)
                .y_label_formatter(&category_fmt)
                .x_label_formatter(&value_fmt);
            if let Some(desc) = self.category_desc {
                mesh.y_desc(desc);
            }
        }
        mesh.draw()?;

        let mut base = vec![0.0; n];
        for (index, series) in self.series.iter().enumerate() {
            let color = series.color;
            let rects = self.bars(index, &mut base).into_iter().map(|(span, (lo, hi))| {
                if vertical {
                    Rectangle::new([(span.0, lo), (span.1, hi)], color.filled())
                } else {
                    Rectangle::new([(lo, span.0), (hi, span.1)], color.filled())
                }
            });
            chart.draw_series(rects)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ScatterGroup {
    pub label: &'static str,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct ScatterChart {
    pub title: &'static str,
    pub x_desc: &'static str,
    pub y_desc: &'static str,
    pub groups: Vec<ScatterGroup>,
}

impl Figure for ScatterChart {
    fn title(&self) -> &'static str {
        self.title
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> AreaResult<DB> {
        let area = frame(root, self.title, &[])?;
        let all = || self.groups.iter().flat_map(|g| g.points.iter());
        let (x_min, x_max) = all().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
        let (y_min, y_max) = all().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));

        let mut chart = ChartBuilder::on(&area)
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(padded(x_min, x_max), padded(y_min, y_max))?;

        let value_fmt = |v: &f64| value_label(*v);
        chart
            .configure_mesh()
            .label_style((FONT_FAMILY, 13))
            .axis_desc_style((FONT_FAMILY, 15))
            .x_desc(self.x_desc)
            .y_desc(self.y_desc)
            .x_label_formatter(&value_fmt)
            .y_label_formatter(&value_fmt)
            .draw()?;

        for group in &self.groups {
            let color = group.color;
            chart
                .draw_series(
                    group
                        .points
                        .iter()
                        .map(|p| Circle::new(*p, 3, color.filled())),
                )?
                .label(group.label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((FONT_FAMILY, 15))
            .background_style(WHITE.mix(0.9))
            .border_style(BLACK)
            .draw()?;
        Ok(())
    }
}

/// Single line over consecutive days starting at `start`.
#[derive(Debug, Clone)]
pub struct DailyLineChart {
    pub title: &'static str,
    pub color: RGBColor,
    pub start: NaiveDate,
    pub values: Vec<f64>,
}

impl Figure for DailyLineChart {
    fn title(&self) -> &'static str {
        self.title
    }

    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> AreaResult<DB> {
        let area = frame(root, self.title, &[])?;
        let last = self.values.len().saturating_sub(1).max(1) as f64;
        let top = self.values.iter().copied().fold(0.0, f64::max).max(1.0) * 1.05;

        let mut chart = ChartBuilder::on(&area)
            .margin(12)
            .margin_right(28)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(0.0..last, 0.0..top)?;

        let start = self.start;
        let date_fmt = |v: &f64| {
            if v.fract().abs() > 1e-6 {
                return String::new();
            }
            (start + Duration::days(*v as i64)).format("%Y-%m-%d").to_string()
        };
        let value_fmt = |v: &f64| value_label(*v);
        chart
            .configure_mesh()
            .label_style((FONT_FAMILY, 13))
            .x_labels(6)
            .x_label_formatter(&date_fmt)
            .y_label_formatter(&value_fmt)
            .draw()?;

        chart.draw_series(LineSeries::new(
            self.values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            self.color.stroke_width(2),
        ))?;
        Ok(())
    }
}
