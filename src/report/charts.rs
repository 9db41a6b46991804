//! Chart descriptions and PNG rendering.
//!
//! Analysis passes describe what to draw with [`Chart`]; a
//! [`ChartRenderer`] turns that description into an image. The production
//! renderer uses the [`plotters`] bitmap backend. Styling is passed to
//! every render call so no rendering state is shared between charts.

use crate::analysis::{BoxPlotStats, HistogramBin};
use crate::config::{parse_hex_color, ChartsConfig};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid chart style: {0}")]
    InvalidStyle(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Colors and resolution used when drawing charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub dpi: u32,
    pub bar_color: RGBColor,
    pub line_color: RGBColor,
    pub histogram_color: RGBColor,
    pub box_color: RGBColor,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            dpi: 300,
            bar_color: RGBColor(0xF0, 0x80, 0x80),
            line_color: RGBColor(0x1F, 0x77, 0xB4),
            histogram_color: RGBColor(0x90, 0xEE, 0x90),
            box_color: RGBColor(0x1F, 0x77, 0xB4),
        }
    }
}

impl ChartStyle {
    /// Build a style from the `[charts]` configuration section.
    pub fn from_config(config: &ChartsConfig) -> Result<Self> {
        let color = |name: &str, value: &str| {
            parse_hex_color(value)
                .ok_or_else(|| PlotError::InvalidStyle(format!("{} '{}'", name, value)))
        };

        Ok(Self {
            dpi: config.dpi,
            bar_color: color("bar_color", &config.bar_color)?,
            line_color: color("line_color", &config.line_color)?,
            histogram_color: color("histogram_color", &config.histogram_color)?,
            box_color: color("box_color", &config.box_color)?,
        })
    }

    /// Convert inches to pixels at the configured resolution.
    fn px(&self, inches: f64) -> u32 {
        (inches * f64::from(self.dpi)).round().max(1.0) as u32
    }

    /// Font of the given point size at the configured resolution.
    fn font(&self, points: f64) -> FontDesc<'static> {
        FontDesc::new(
            FontFamily::SansSerif,
            points * f64::from(self.dpi) / 72.0,
            FontStyle::Normal,
        )
    }

    fn bold_font(&self, points: f64) -> FontDesc<'static> {
        FontDesc::new(
            FontFamily::SansSerif,
            points * f64::from(self.dpi) / 72.0,
            FontStyle::Bold,
        )
    }
}

/// A chart to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// Labeled bars, in display order.
    Bar {
        title: String,
        x_label: String,
        y_label: String,
        bars: Vec<(String, f64)>,
    },
    /// Points joined by a line, with a marker at each point.
    Line {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<(f64, f64)>,
    },
    /// A histogram and a box plot of the same values, side by side.
    Distribution {
        histogram_title: String,
        box_title: String,
        value_label: String,
        bins: Vec<HistogramBin>,
        box_plot: BoxPlotStats,
    },
}

impl Chart {
    /// Figure size in inches (width, height).
    pub fn figure_size(&self) -> (f64, f64) {
        match self {
            Chart::Bar { .. } | Chart::Line { .. } => (12.0, 6.0),
            Chart::Distribution { .. } => (12.0, 5.0),
        }
    }
}

/// Draws charts to image files.
pub trait ChartRenderer {
    /// Render `chart` with `style` to `path`, overwriting any existing file.
    fn render(&self, chart: &Chart, style: &ChartStyle, path: &Path) -> Result<()>;
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for &R {
    fn render(&self, chart: &Chart, style: &ChartStyle, path: &Path) -> Result<()> {
        (**self).render(chart, style, path)
    }
}

/// Renders PNG files with the plotters bitmap backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersRenderer;

impl ChartRenderer for PlottersRenderer {
    fn render(&self, chart: &Chart, style: &ChartStyle, path: &Path) -> Result<()> {
        let (width, height) = chart.figure_size();
        let root = BitMapBackend::new(path, (style.px(width), style.px(height))).into_drawing_area();

        root.fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        match chart {
            Chart::Bar {
                title,
                x_label,
                y_label,
                bars,
            } => draw_bar_chart(&root, style, title, x_label, y_label, bars)?,
            Chart::Line {
                title,
                x_label,
                y_label,
                points,
            } => draw_line_chart(&root, style, title, x_label, y_label, points)?,
            Chart::Distribution {
                histogram_title,
                box_title,
                value_label,
                bins,
                box_plot,
            } => {
                let panels = root.split_evenly((1, 2));
                draw_histogram(&panels[0], style, histogram_title, value_label, bins)?;
                draw_box_plot(&panels[1], style, box_title, box_plot)?;
            }
        }

        root.present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        Ok(())
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Label for integral tick positions only.
fn integral_label(value: f64) -> Option<i64> {
    ((value - value.round()).abs() < 1e-6).then(|| value.round() as i64)
}

/// Upper bound of a count axis with some headroom.
fn count_axis_max(max: f64) -> f64 {
    if max <= 0.0 {
        1.0
    } else {
        max * 1.05
    }
}

fn draw_bar_chart(
    area: &Area<'_>,
    style: &ChartStyle,
    title: &str,
    x_label: &str,
    y_label: &str,
    bars: &[(String, f64)],
) -> Result<()> {
    let slots = bars.len().max(1);
    let y_max = count_axis_max(bars.iter().map(|(_, v)| *v).fold(0.0, f64::max));

    let mut chart = ChartBuilder::on(area)
        .caption(title, style.bold_font(14.0))
        .margin(style.px(0.15))
        .x_label_area_size(style.px(0.7))
        .y_label_area_size(style.px(0.8))
        .build_cartesian_2d(-0.5..(slots as f64 - 0.5), 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let x_formatter = |x: &f64| {
        integral_label(*x)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| bars.get(i))
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(11.0))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let center = i as f64;
            Rectangle::new(
                [(center - 0.4, 0.0), (center + 0.4, *value)],
                style.bar_color.filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_line_chart(
    area: &Area<'_>,
    style: &ChartStyle,
    title: &str,
    x_label: &str,
    y_label: &str,
    points: &[(f64, f64)],
) -> Result<()> {
    let x_min = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = points
        .iter()
        .map(|(x, _)| *x)
        .fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max) = if points.is_empty() {
        (0.0, 1.0)
    } else {
        (x_min - 0.5, x_max + 0.5)
    };
    let y_max = count_axis_max(points.iter().map(|(_, y)| *y).fold(0.0, f64::max));

    let mut chart = ChartBuilder::on(area)
        .caption(title, style.bold_font(14.0))
        .margin(style.px(0.15))
        .x_label_area_size(style.px(0.5))
        .y_label_area_size(style.px(0.8))
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05).stroke_width(1))
        .bold_line_style(BLACK.mix(0.15).stroke_width(1))
        .x_label_formatter(&|x| integral_label(*x).map(|y| y.to_string()).unwrap_or_default())
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc(x_label)
        .y_desc(y_label)
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(11.0))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            style.line_color.stroke_width(style.px(2.0 / 72.0)),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, style.px(4.0 / 72.0), style.line_color.filled())),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_histogram(
    area: &Area<'_>,
    style: &ChartStyle,
    title: &str,
    value_label: &str,
    bins: &[HistogramBin],
) -> Result<()> {
    let (x_min, x_max) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let y_max = count_axis_max(bins.iter().map(|b| b.count as f64).fold(0.0, f64::max));

    let mut chart = ChartBuilder::on(area)
        .caption(title, style.font(12.0))
        .margin(style.px(0.15))
        .x_label_area_size(style.px(0.5))
        .y_label_area_size(style.px(0.7))
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc(value_label)
        .y_desc("Frequency")
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(11.0))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.lower, 0.0), (bin.upper, bin.count as f64)],
                style.histogram_color.mix(0.7).filled(),
            )
        }))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_box_plot(
    area: &Area<'_>,
    style: &ChartStyle,
    title: &str,
    stats: &BoxPlotStats,
) -> Result<()> {
    let low = stats
        .outliers
        .iter()
        .copied()
        .fold(stats.whisker_low, f64::min);
    let high = stats
        .outliers
        .iter()
        .copied()
        .fold(stats.whisker_high, f64::max);
    let pad = ((high - low) * 0.05).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(title, style.font(12.0))
        .margin(style.px(0.15))
        .x_label_area_size(style.px(0.5))
        .y_label_area_size(style.px(0.7))
        .build_cartesian_2d(0.0..2.0, (low - pad)..(high + pad))
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(0)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .y_desc("Length (characters)")
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(11.0))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let stroke = style.box_color.stroke_width(style.px(1.5 / 72.0));
    let median_stroke = RGBColor(0xFF, 0x7F, 0x0E).stroke_width(style.px(1.5 / 72.0));

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.75, stats.q1), (1.25, stats.q3)],
            stroke,
        )))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let segments = vec![
        (vec![(0.75, stats.median), (1.25, stats.median)], median_stroke),
        (vec![(1.0, stats.q1), (1.0, stats.whisker_low)], stroke),
        (vec![(1.0, stats.q3), (1.0, stats.whisker_high)], stroke),
        (
            vec![(0.875, stats.whisker_low), (1.125, stats.whisker_low)],
            stroke,
        ),
        (
            vec![(0.875, stats.whisker_high), (1.125, stats.whisker_high)],
            stroke,
        ),
    ];
    chart
        .draw_series(
            segments
                .into_iter()
                .map(|(points, line_style)| PathElement::new(points, line_style)),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            stats
                .outliers
                .iter()
                .map(|&y| Circle::new((1.0, y), style.px(3.0 / 72.0), stroke)),
        )
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{box_plot_stats, histogram};
    use tempfile::TempDir;

    fn low_res_style() -> ChartStyle {
        ChartStyle {
            dpi: 72,
            ..ChartStyle::default()
        }
    }

    /// Width and height from the PNG IHDR chunk.
    fn png_dimensions(path: &Path) -> (u32, u32) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.len() > 24, "{} is truncated", path.display());
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
        let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
        (width, height)
    }

    fn render_and_check(chart: &Chart, file_name: &str) {
        let dir = TempDir::new().unwrap();
        let style = low_res_style();
        let path = dir.path().join(file_name);

        PlottersRenderer.render(chart, &style, &path).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let (width, height) = chart.figure_size();
        assert_eq!(png_dimensions(&path), (style.px(width), style.px(height)));
    }

    fn distribution(values: &[f64]) -> Chart {
        Chart::Distribution {
            histogram_title: "Abstract Length Distribution".to_string(),
            box_title: "Abstract Length Box Plot".to_string(),
            value_label: "Abstract Length (characters)".to_string(),
            bins: histogram(values, 20),
            box_plot: box_plot_stats(values).unwrap(),
        }
    }

    #[test]
    fn test_plotters_renders_bar_chart() {
        let chart = Chart::Bar {
            title: "Top 3 Research Categories in Sample".to_string(),
            x_label: "Category".to_string(),
            y_label: "Number of Papers".to_string(),
            bars: vec![
                ("cs.AI".to_string(), 30.0),
                ("cs.LG".to_string(), 25.0),
                ("cs.CV".to_string(), 20.0),
            ],
        };
        render_and_check(&chart, "top_categories.png");
    }

    #[test]
    fn test_plotters_renders_line_chart() {
        let chart = Chart::Line {
            title: "Publication Timeline".to_string(),
            x_label: "Year".to_string(),
            y_label: "Number of Publications".to_string(),
            points: vec![(2020.0, 33.0), (2021.0, 34.0), (2022.0, 33.0)],
        };
        render_and_check(&chart, "publication_timeline.png");
    }

    #[test]
    fn test_plotters_renders_distribution() {
        let values: Vec<f64> = (1..=100).map(|i| f64::from(64 + i % 3)).chain([400.0]).collect();
        render_and_check(&distribution(&values), "abstract_analysis.png");
    }

    #[test]
    fn test_plotters_renders_constant_distribution() {
        render_and_check(&distribution(&[66.0, 66.0, 66.0]), "abstract_analysis.png");
    }

    #[test]
    fn test_plotters_renders_empty_series() {
        let chart = Chart::Bar {
            title: "Top 10 Research Categories in Sample".to_string(),
            x_label: "Category".to_string(),
            y_label: "Number of Papers".to_string(),
            bars: Vec::new(),
        };
        render_and_check(&chart, "top_categories.png");

        let chart = Chart::Line {
            title: "Publication Timeline".to_string(),
            x_label: "Year".to_string(),
            y_label: "Number of Publications".to_string(),
            points: Vec::new(),
        };
        render_and_check(&chart, "publication_timeline.png");
    }

    #[test]
    fn test_plotters_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("top_categories.png");
        std::fs::write(&path, b"stale").unwrap();

        let chart = Chart::Bar {
            title: "Top 1 Research Categories in Sample".to_string(),
            x_label: "Category".to_string(),
            y_label: "Number of Papers".to_string(),
            bars: vec![("cs.AI".to_string(), 1.0)],
        };
        PlottersRenderer
            .render(&chart, &low_res_style(), &path)
            .unwrap();

        assert_eq!(png_dimensions(&path), (864, 432));
    }

    #[test]
    fn test_style_from_config() {
        let config = ChartsConfig::default();
        let style = ChartStyle::from_config(&config).unwrap();
        assert_eq!(style, ChartStyle::default());
    }

    #[test]
    fn test_style_rejects_invalid_color() {
        let config = ChartsConfig {
            bar_color: "coral".to_string(),
            ..ChartsConfig::default()
        };
        assert!(matches!(
            ChartStyle::from_config(&config),
            Err(PlotError::InvalidStyle(_))
        ));
    }

    #[test]
    fn test_pixel_scaling() {
        let style = ChartStyle {
            dpi: 100,
            ..ChartStyle::default()
        };
        assert_eq!(style.px(12.0), 1200);
        assert_eq!(style.px(0.0), 1);

        let chart = Chart::Line {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            points: Vec::new(),
        };
        assert_eq!(chart.figure_size(), (12.0, 6.0));
    }

    #[test]
    fn test_integral_label() {
        assert_eq!(integral_label(2020.0), Some(2020));
        assert_eq!(integral_label(2020.5), None);
        assert_eq!(integral_label(-0.0), Some(0));
    }

    #[test]
    fn test_count_axis_max() {
        assert_eq!(count_axis_max(0.0), 1.0);
        assert!(count_axis_max(30.0) > 30.0);
    }
}
