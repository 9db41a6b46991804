//! The three chart-producing analysis passes.

use super::aggregator::{
    abstract_lengths, box_plot_stats, describe, histogram, top_categories, yearly_counts,
};
use super::AnalysisError;
use crate::config::Config;
use crate::models::{CategoryCount, LengthSummary, Record, YearCount};
use crate::report::charts::{Chart, ChartRenderer, ChartStyle, PlotError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the category bar chart.
pub const CATEGORIES_CHART: &str = "top_categories.png";
/// File name of the publication timeline chart.
pub const TIMELINE_CHART: &str = "publication_timeline.png";
/// File name of the abstract length chart.
pub const ABSTRACTS_CHART: &str = "abstract_analysis.png";

/// Runs analysis passes and renders their charts into one directory.
///
/// Each pass is independent and overwrites its own chart file.
pub struct PublicationAnalyzer<R: ChartRenderer> {
    renderer: R,
    style: ChartStyle,
    output_dir: PathBuf,
    top_n: usize,
    histogram_bins: usize,
}

impl<R: ChartRenderer> PublicationAnalyzer<R> {
    /// Create an analyzer writing charts to `output_dir`.
    pub fn new(renderer: R, style: ChartStyle, output_dir: PathBuf) -> Self {
        Self {
            renderer,
            style,
            output_dir,
            top_n: 10,
            histogram_bins: 20,
        }
    }

    /// Create an analyzer from the application configuration.
    pub fn from_config(renderer: R, config: &Config) -> Result<Self, PlotError> {
        let style = ChartStyle::from_config(&config.charts)?;
        Ok(Self {
            top_n: config.sampling.top_n,
            histogram_bins: config.charts.histogram_bins,
            ..Self::new(renderer, style, config.paths.output_dir.clone())
        })
    }

    /// Full path of a chart file.
    pub fn chart_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Rank category tokens and render the top ones as a bar chart.
    pub fn analyze_categories(
        &self,
        records: &[Record],
    ) -> Result<Vec<CategoryCount>, AnalysisError> {
        info!("Analyzing research categories");

        let top = top_categories(records, self.top_n);
        debug!("Top categories: {:?}", top);

        let chart = Chart::Bar {
            title: format!("Top {} Research Categories in Sample", self.top_n),
            x_label: "Category".to_string(),
            y_label: "Number of Papers".to_string(),
            bars: top
                .iter()
                .map(|c| (c.category.clone(), c.count as f64))
                .collect(),
        };
        self.render(&chart, CATEGORIES_CHART)?;

        Ok(top)
    }

    /// Count records per year and render them as a line chart.
    pub fn analyze_timeline(&self, records: &[Record]) -> Result<Vec<YearCount>, AnalysisError> {
        info!("Analyzing publication timeline");

        let years = yearly_counts(records)?;
        debug!("Yearly counts: {:?}", years);

        let chart = Chart::Line {
            title: "Publication Timeline".to_string(),
            x_label: "Year".to_string(),
            y_label: "Number of Publications".to_string(),
            points: years
                .iter()
                .map(|y| (f64::from(y.year), y.count as f64))
                .collect(),
        };
        self.render(&chart, TIMELINE_CHART)?;

        Ok(years)
    }

    /// Summarize abstract lengths and render a histogram with a box plot.
    pub fn analyze_abstracts(&self, records: &[Record]) -> Result<LengthSummary, AnalysisError> {
        info!("Analyzing paper abstracts");

        let lengths: Vec<f64> = abstract_lengths(records)
            .into_iter()
            .map(|len| len as f64)
            .collect();
        let summary = describe(&lengths)?;
        let box_plot = box_plot_stats(&lengths).ok_or(AnalysisError::EmptyInput)?;

        let chart = Chart::Distribution {
            histogram_title: "Abstract Length Distribution".to_string(),
            box_title: "Abstract Length Box Plot".to_string(),
            value_label: "Abstract Length (characters)".to_string(),
            bins: histogram(&lengths, self.histogram_bins),
            box_plot,
        };
        self.render(&chart, ABSTRACTS_CHART)?;

        info!(
            "Abstract lengths: mean {:.0}, max {}, min {}",
            summary.mean, summary.max, summary.min
        );
        Ok(summary)
    }

    fn render(&self, chart: &Chart, file_name: &str) -> Result<(), AnalysisError> {
        ensure_dir(&self.output_dir)?;
        let path = self.chart_path(file_name);
        self.renderer.render(chart, &self.style, &path)?;
        debug!("Chart written to {}", path.display());
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<(), AnalysisError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source| AnalysisError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::demo::generate_records;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Captures charts instead of drawing them.
    #[derive(Default)]
    struct RecordingRenderer {
        rendered: RefCell<Vec<(Chart, PathBuf)>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, chart: &Chart, _style: &ChartStyle, path: &Path) -> Result<(), PlotError> {
            self.rendered
                .borrow_mut()
                .push((chart.clone(), path.to_path_buf()));
            Ok(())
        }
    }

    fn record(categories: &str, update_date: &str, abstract_text: &str) -> Record {
        Record {
            id: "r".to_string(),
            title: String::new(),
            authors: String::new(),
            categories: categories.to_string(),
            abstract_text: abstract_text.to_string(),
            update_date: update_date.to_string(),
            versions: 1,
        }
    }

    fn analyzer<'a>(
        renderer: &'a RecordingRenderer,
        dir: &TempDir,
    ) -> PublicationAnalyzer<&'a RecordingRenderer> {
        PublicationAnalyzer::new(renderer, ChartStyle::default(), dir.path().join("charts"))
    }

    #[test]
    fn test_analyze_categories_multi_token() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let records: Vec<_> = (0..6).map(|_| record("cs.AI cs.LG", "", "")).collect();

        let top = analyzer(&renderer, &dir)
            .analyze_categories(&records)
            .unwrap();

        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|c| c.count == records.len()));

        let rendered = renderer.rendered.borrow();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].1, dir.path().join("charts").join(CATEGORIES_CHART));
        match &rendered[0].0 {
            Chart::Bar { bars, .. } => assert_eq!(bars.len(), 2),
            other => panic!("unexpected chart: {:?}", other),
        }
        assert!(dir.path().join("charts").is_dir());
    }

    #[test]
    fn test_analyze_categories_demo_data() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();

        let top = analyzer(&renderer, &dir)
            .analyze_categories(&generate_records())
            .unwrap();

        let pairs: Vec<_> = top.iter().map(|c| (c.category.as_str(), c.count)).collect();
        assert_eq!(
            pairs,
            vec![
                ("cs.AI", 30),
                ("cs.LG", 25),
                ("cs.CV", 20),
                ("stat.ML", 15),
                ("math.OC", 10)
            ]
        );
    }

    #[test]
    fn test_analyze_timeline() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let records = vec![
            record("", "2020-01-01", ""),
            record("", "2020-06-01", ""),
            record("", "2021-01-01", ""),
        ];

        let years = analyzer(&renderer, &dir).analyze_timeline(&records).unwrap();

        let pairs: Vec<_> = years.iter().map(|y| (y.year, y.count)).collect();
        assert_eq!(pairs, vec![(2020, 2), (2021, 1)]);

        let rendered = renderer.rendered.borrow();
        match &rendered[0].0 {
            Chart::Line { points, .. } => {
                assert_eq!(points, &vec![(2020.0, 2.0), (2021.0, 1.0)])
            }
            other => panic!("unexpected chart: {:?}", other),
        }
    }

    #[test]
    fn test_analyze_timeline_invalid_date_aborts() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let records = vec![record("", "2020-13-45", "")];

        let result = analyzer(&renderer, &dir).analyze_timeline(&records);

        assert!(matches!(result, Err(AnalysisError::InvalidDate { .. })));
        assert!(renderer.rendered.borrow().is_empty());
    }

    #[test]
    fn test_analyze_abstracts() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let records = vec![
            record("", "", "abc"),
            record("", "", "abcde"),
            record("", "", "abcdefg"),
        ];

        let summary = analyzer(&renderer, &dir)
            .analyze_abstracts(&records)
            .unwrap();

        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.max, 7.0);
        assert_eq!(summary.min, 3.0);

        let rendered = renderer.rendered.borrow();
        match &rendered[0].0 {
            Chart::Distribution { bins, box_plot, .. } => {
                assert_eq!(bins.len(), 20);
                assert_eq!(box_plot.median, 5.0);
            }
            other => panic!("unexpected chart: {:?}", other),
        }
    }

    #[test]
    fn test_analyze_abstracts_empty_table() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();

        let result = analyzer(&renderer, &dir).analyze_abstracts(&[]);
        assert!(matches!(result, Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn test_passes_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        let pass = analyzer(&renderer, &dir);
        let records = generate_records();

        let first = pass.analyze_timeline(&records).unwrap();
        let second = pass.analyze_timeline(&records).unwrap();

        assert_eq!(first, second);
        let rendered = renderer.rendered.borrow();
        assert_eq!(rendered[0].1, rendered[1].1);
    }

    #[test]
    fn test_demo_passes_write_png_charts() {
        let dir = TempDir::new().unwrap();
        let style = ChartStyle {
            dpi: 72,
            ..ChartStyle::default()
        };
        let pass = PublicationAnalyzer::new(
            crate::report::PlottersRenderer,
            style,
            dir.path().join("charts"),
        );
        let records = generate_records();

        assert_eq!(pass.analyze_categories(&records).unwrap().len(), 5);
        assert_eq!(pass.analyze_timeline(&records).unwrap().len(), 3);
        assert_eq!(pass.analyze_abstracts(&records).unwrap().count, 100);

        for name in [CATEGORIES_CHART, TIMELINE_CHART, ABSTRACTS_CHART] {
            let path = pass.chart_path(name);
            assert!(path.exists(), "{} missing", name);
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }
}
