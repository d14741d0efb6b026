//! Dashboard assembly
//!
//! Runs every view of [`HrvAnalyzer`] over one window and packages each as a
//! [`Section`] holding formatted tables and chart specifications, or the
//! reason it has nothing to show.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    HeartRateSummary, HrvAnalyzer, MonthlyComparison, OverviewSummary, QuartileSplit,
    SwingAnalysis, WeekdayWeekendSplit,
};
use crate::charts::{self, ChartSpec};
use crate::error::AnalysisError;
use crate::models::{Dataset, DatedValue};

/// Window sizes offered when nothing else is configured
pub const DEFAULT_WINDOW_SIZES: [usize; 3] = [7, 30, 90];

/// Placeholder shown wherever a value could not be computed
pub const NOT_ENOUGH_DATA: &str = "not enough data";

/// A titled table of preformatted cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MetricTable {
    fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        MetricTable {
            title: title.into(),
            caption: None,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn caption(mut self, caption: String) -> Self {
        self.caption = Some(caption);
        self
    }

    fn row<const N: usize>(mut self, cells: [String; N]) -> Self {
        self.rows.push(cells.into());
        self
    }

    /// Look up the value column of a metric/value table by metric name
    pub fn value_of(&self, metric: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(metric))
            .and_then(|row| row.get(1))
            .map(String::as_str)
    }
}

/// One dashboard section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Ready {
        heading: String,
        result: T,
        tables: Vec<MetricTable>,
        charts: Vec<ChartSpec>,
    },
    InsufficientData {
        heading: String,
        reason: String,
    },
}

impl<T> Section<T> {
    fn from_result(
        heading: &str,
        result: Result<T, AnalysisError>,
        present: impl FnOnce(&T) -> (Vec<MetricTable>, Vec<ChartSpec>),
    ) -> Self {
        match result {
            Ok(result) => {
                let (tables, charts) = present(&result);
                Section::Ready {
                    heading: heading.to_string(),
                    result,
                    tables,
                    charts,
                }
            }
            Err(err) => {
                tracing::info!(section = heading, error = %err, "Section has insufficient data");
                Section::InsufficientData {
                    heading: heading.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            Section::Ready { heading, .. } | Section::InsufficientData { heading, .. } => heading,
        }
    }

    pub fn result(&self) -> Option<&T> {
        match self {
            Section::Ready { result, .. } => Some(result),
            Section::InsufficientData { .. } => None,
        }
    }

    pub fn tables(&self) -> &[MetricTable] {
        match self {
            Section::Ready { tables, .. } => tables,
            Section::InsufficientData { .. } => &[],
        }
    }

    pub fn charts(&self) -> &[ChartSpec] {
        match self {
            Section::Ready { charts, .. } => charts,
            Section::InsufficientData { .. } => &[],
        }
    }

    pub fn insufficient_reason(&self) -> Option<&str> {
        match self {
            Section::Ready { .. } => None,
            Section::InsufficientData { reason, .. } => Some(reason),
        }
    }

    /// Type-erased view for renderers
    pub fn view(&self) -> SectionView<'_> {
        SectionView {
            heading: self.heading(),
            tables: self.tables(),
            charts: self.charts(),
            insufficient_reason: self.insufficient_reason(),
        }
    }
}

/// Borrowed, type-erased view of a [`Section`]
#[derive(Debug, Clone, Copy)]
pub struct SectionView<'a> {
    pub heading: &'a str,
    pub tables: &'a [MetricTable],
    pub charts: &'a [ChartSpec],
    pub insufficient_reason: Option<&'a str>,
}

/// Every view computed for one window size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Requested window size in days
    pub window_size: usize,
    /// Observations actually in the window
    pub window_days: usize,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub cutoff: Option<NaiveDate>,
    pub overview: Section<OverviewSummary>,
    pub quartiles: Section<QuartileSplit>,
    pub weekday_weekend: Section<WeekdayWeekendSplit>,
    pub heart_rate: Section<HeartRateSummary>,
    pub monthly: Section<MonthlyComparison>,
    pub swings: Section<SwingAnalysis>,
}

impl DashboardReport {
    pub fn title(&self) -> String {
        format!("HRV Dashboard for {}-Day Period", self.window_size)
    }

    /// Sections in display order
    pub fn sections(&self) -> [SectionView<'_>; 6] {
        [
            self.overview.view(),
            self.quartiles.view(),
            self.weekday_weekend.view(),
            self.heart_rate.view(),
            self.monthly.view(),
            self.swings.view(),
        ]
    }

    pub fn charts(&self) -> Vec<&ChartSpec> {
        self.sections()
            .into_iter()
            .flat_map(|section| section.charts.iter())
            .collect()
    }
}

/// Builds [`DashboardReport`]s for a fixed set of permitted window sizes
#[derive(Debug, Clone)]
pub struct Dashboard {
    analyzer: HrvAnalyzer,
    allowed_sizes: Vec<usize>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard::new(HrvAnalyzer::new(), DEFAULT_WINDOW_SIZES.to_vec())
    }
}

impl Dashboard {
    pub fn new(analyzer: HrvAnalyzer, allowed_sizes: Vec<usize>) -> Self {
        Dashboard {
            analyzer,
            allowed_sizes,
        }
    }

    pub fn allowed_sizes(&self) -> &[usize] {
        &self.allowed_sizes
    }

    /// Compute every section for the last `window_size` observations
    pub fn build(&self, dataset: &Dataset, window_size: usize) -> Result<DashboardReport, AnalysisError> {
        if !self.allowed_sizes.contains(&window_size) {
            return Err(AnalysisError::InvalidWindowSize {
                size: window_size,
                allowed: self.allowed_sizes.clone(),
            });
        }

        let _span = tracing::info_span!("dashboard", window_size).entered();

        let observations = dataset.observations();
        let window = HrvAnalyzer::select_window(observations, window_size);
        let analyzer = &self.analyzer;
        let prior_days = analyzer.config().prior_window_days;

        tracing::info!(
            window_days = window.len(),
            total = observations.len(),
            "Selected dashboard window"
        );

        let quartile_result = analyzer.quartile_split(window);
        let weekday_result = match &quartile_result {
            Ok(split) => analyzer.weekday_weekend_split(window, split.q75),
            Err(err) => Err(err.clone()),
        };

        let overview = Section::from_result(
            "1. HRV Overview",
            analyzer.overview_summary(window),
            |o| (vec![overview_table(o)], vec![charts::overview_chart(o, window_size)]),
        );
        let quartiles = Section::from_result("2. HRV Quartile Analysis", quartile_result, |q| {
            (quartile_tables(q), vec![charts::quartile_chart(q, window_size)])
        });
        let weekday_weekend = Section::from_result(
            "3. Weekday vs Weekend Recovery",
            weekday_result,
            |w| (vec![weekday_weekend_table(w)], vec![charts::weekday_weekend_chart(w)]),
        );
        let heart_rate = Section::from_result(
            "4. Advanced HRV and Heart Rate Metrics",
            analyzer.heart_rate_summary(window),
            |h| (vec![heart_rate_table(h)], vec![charts::heart_rate_chart(h, window_size)]),
        );
        let monthly = Section::from_result(
            &format!("5. Monthly Trends (Last {} Days)", prior_days),
            analyzer.monthly_comparison(observations, window),
            |m| {
                (
                    vec![monthly_table(m, prior_days)],
                    vec![charts::monthly_box_chart(m), charts::monthly_heatmap(m)],
                )
            },
        );
        let swings = Section::from_result(
            "6. HRV Swings",
            analyzer.swing_analysis(window),
            |s| (vec![swing_table(s)], vec![charts::swing_chart(s, window_size)]),
        );

        Ok(DashboardReport {
            window_size,
            window_days: window.len(),
            window_start: window.first().map(|obs| obs.day),
            window_end: window.last().map(|obs| obs.day),
            cutoff: dataset.cutoff(),
            overview,
            quartiles,
            weekday_weekend,
            heart_rate,
            monthly,
            swings,
        })
    }
}

fn ms(value: f64) -> String {
    format!("{:.2} ms", value)
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

fn on_day(reading: &DatedValue) -> String {
    format!("{:.2} ms on {}", reading.value, reading.date)
}

fn overview_table(overview: &OverviewSummary) -> MetricTable {
    MetricTable::new("HRV Overview", &["Metric", "Value"])
        .row(["Average HRV".into(), ms(overview.average)])
        .row(["Peak HRV".into(), on_day(&overview.peak)])
        .row(["Lowest HRV".into(), on_day(&overview.low)])
        .row(["HRV Variability".into(), format!("{:.2} ms²", overview.variance)])
        .row([
            "Percent of Days Above Baseline HRV".into(),
            percent(overview.percent_above_baseline),
        ])
        .row([
            "Percent of Days Below Baseline HRV".into(),
            percent(overview.percent_below_baseline),
        ])
}

fn quartile_tables(split: &QuartileSplit) -> Vec<MetricTable> {
    let days = |title: &str, caption: String, readings: &[DatedValue]| {
        readings.iter().fold(
            MetricTable::new(title, &["Day", "HRV (ms)"]).caption(caption),
            |table, r| table.row([r.date.to_string(), format!("{:.2}", r.value)]),
        )
    };

    vec![
        days(
            "Top 25% HRV Days",
            format!("HRV Range: {:.2} ms and above", split.q75),
            &split.top_quartile,
        ),
        days(
            "Bottom 25% HRV Days",
            format!("HRV Range: {:.2} ms and below", split.q25),
            &split.bottom_quartile,
        ),
    ]
}

fn weekday_weekend_table(split: &WeekdayWeekendSplit) -> MetricTable {
    [&split.weekday, &split.weekend].into_iter().fold(
        MetricTable::new("Weekday vs Weekend Recovery", &["Day Type", "Percentage in Top 25% HRV"]),
        |table, share| {
            let value = share
                .percent_in_top_quartile
                .map(percent)
                .unwrap_or_else(|| NOT_ENOUGH_DATA.to_string());
            table.row([share.day_type.label().to_string(), value])
        },
    )
}

fn heart_rate_table(summary: &HeartRateSummary) -> MetricTable {
    MetricTable::new("Heart Rate Metrics", &["Metric", "Value"])
        .row(["Mean HR".into(), format!("{:.2} bpm", summary.mean)])
        .row(["Max HR".into(), format!("{:.2} bpm", summary.max)])
        .row(["Min HR".into(), format!("{:.2} bpm", summary.min)])
}

fn monthly_table(comparison: &MonthlyComparison, prior_days: u32) -> MetricTable {
    let prior = format!("Previous {}-Day", prior_days);
    MetricTable::new("HRV Comparison", &["Metric", "Value"])
        .caption(format!(
            "Previous period: {} to {}",
            comparison.prior_start,
            comparison.window_start.pred_opt().unwrap_or(comparison.window_start)
        ))
        .row([format!("{} Average HRV", prior), ms(comparison.prior_average)])
        .row(["Current Period Average HRV".into(), ms(comparison.current_average)])
        .row(["Difference in Average HRV".into(), ms(comparison.difference)])
        .row([
            format!("{} HRV Variability", prior),
            format!("{:.2} ms²", comparison.prior_variance),
        ])
        .row([
            "Current Period HRV Variability".into(),
            format!("{:.2} ms²", comparison.current_variance),
        ])
        .row([
            format!("{} Days Above Current Average", prior),
            comparison.prior_days_above_baseline.to_string(),
        ])
        .row([
            format!("{} Days Below Current Average", prior),
            comparison.prior_days_below_baseline.to_string(),
        ])
}

fn swing_table(swings: &SwingAnalysis) -> MetricTable {
    MetricTable::new("HRV Swings", &["Metric", "Value", "Date"])
        .row([
            "Biggest Increase in HRV".into(),
            ms(swings.biggest_increase.change),
            swings.biggest_increase.date.to_string(),
        ])
        .row([
            "Biggest Decrease in HRV".into(),
            ms(swings.biggest_decrease.change),
            swings.biggest_decrease.date.to_string(),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use chrono::Duration;

    fn dataset(days: i64) -> Dataset {
        let start = NaiveDate::from_ymd_opt(2022, 11, 1).unwrap();
        let observations = (0..days)
            .map(|i| {
                let hrv = 40.0 + ((i * 7) % 23) as f64;
                let hr = 55.0 + (i % 5) as f64;
                Observation::new(start + Duration::days(i), Some(hrv), Some(hr))
            })
            .collect();
        Dataset::new(observations, None)
    }

    #[test]
    fn test_rejects_unlisted_window_size() {
        let dashboard = Dashboard::default();
        let err = dashboard.build(&dataset(10), 14).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidWindowSize {
                size: 14,
                allowed: vec![7, 30, 90],
            }
        );
    }

    #[test]
    fn test_all_sections_ready_with_history() {
        let report = Dashboard::default().build(&dataset(60), 7).unwrap();

        assert_eq!(report.window_days, 7);
        assert_eq!(report.title(), "HRV Dashboard for 7-Day Period");
        for section in report.sections() {
            assert!(
                section.insufficient_reason.is_none(),
                "{} had no data",
                section.heading
            );
            assert!(!section.tables.is_empty());
        }
        assert_eq!(report.charts().len(), 7);
    }

    #[test]
    fn test_monthly_section_without_history() {
        let report = Dashboard::default().build(&dataset(20), 30).unwrap();

        assert_eq!(report.window_days, 20);
        assert!(report.overview.result().is_some());
        assert!(report.monthly.insufficient_reason().is_some());
        assert!(report.monthly.charts().is_empty());
    }

    #[test]
    fn test_empty_dataset_reports_every_section_insufficient() {
        let report = Dashboard::default().build(&Dataset::new(Vec::new(), None), 7).unwrap();

        assert_eq!(report.window_days, 0);
        assert!(report
            .sections()
            .iter()
            .all(|section| section.insufficient_reason.is_some()));
    }

    #[test]
    fn test_overview_table_formatting() {
        let start = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        let observations = [50.0, 60.0, 40.0]
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(start + Duration::days(i as i64), Some(*v), None))
            .collect();
        let report = Dashboard::default()
            .build(&Dataset::new(observations, None), 7)
            .unwrap();

        let table = &report.overview.tables()[0];
        assert_eq!(table.value_of("Average HRV"), Some("50.00 ms"));
        assert_eq!(table.value_of("Peak HRV"), Some("60.00 ms on 2023-02-02"));
        assert_eq!(table.value_of("Lowest HRV"), Some("40.00 ms on 2023-02-03"));
        assert_eq!(table.value_of("Percent of Days Above Baseline HRV"), Some("33.33%"));
        assert!(report.heart_rate.insufficient_reason().is_some());
    }
}
