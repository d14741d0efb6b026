//! Renderer-agnostic chart specifications for the dashboard views
//!
//! A [`ChartSpec`] describes what to draw (series, reference lines,
//! highlighted markers) and leaves the drawing to whatever front end consumes
//! the JSON. Colors are hints only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::{
    HeartRateSummary, MonthlyComparison, OverviewSummary, QuartileSplit, SwingAnalysis,
    WeekdayWeekendSplit,
};

/// Overall chart layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    LineMarkers,
    BoxPlot,
    Bar,
    CalendarHeatmap,
    GroupedBox,
    LineBar,
}

/// How a single series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMode {
    Lines,
    LinesMarkers,
    Markers,
    Bars,
    Box,
    Heat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: String,
    /// `None` leaves a gap
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Point {
    fn new(x: impl Into<String>, y: Option<f64>) -> Self {
        Point {
            x: x.into(),
            y,
            color: None,
        }
    }

    fn dated(date: NaiveDate, y: Option<f64>) -> Self {
        Point::new(date.format("%Y-%m-%d").to_string(), y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub mode: SeriesMode,
    pub points: Vec<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub dashed: bool,
}

impl Series {
    fn new(name: impl Into<String>, mode: SeriesMode, points: Vec<Point>) -> Self {
        Series {
            name: name.into(),
            mode,
            points,
            color: None,
            dashed: false,
        }
    }

    fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    /// A distribution series; x is unused so every point shares the series name
    fn distribution(name: &str, values: &[f64]) -> Self {
        let points = values.iter().map(|v| Point::new(name, Some(*v))).collect();
        Series::new(name, SeriesMode::Box, points)
    }
}

/// Horizontal reference line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    pub y: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Highlighted single point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub x: String,
    pub y: f64,
    pub label: String,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Complete description of one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<String>,
    pub y_axis: String,
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_lines: Vec<ReferenceLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: impl Into<String>, y_axis: &str) -> Self {
        ChartSpec {
            kind,
            title: title.into(),
            x_axis: None,
            y_axis: y_axis.to_string(),
            series: Vec::new(),
            reference_lines: Vec::new(),
            markers: Vec::new(),
        }
    }

    fn x_axis(mut self, title: &str) -> Self {
        self.x_axis = Some(title.to_string());
        self
    }

    fn series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    fn reference_line(mut self, y: f64, label: String, color: &str) -> Self {
        self.reference_lines.push(ReferenceLine {
            y,
            label,
            color: Some(color.to_string()),
        });
        self
    }

    fn marker(mut self, date: NaiveDate, y: f64, label: &str, color: &str) -> Self {
        self.markers.push(Marker {
            x: date.format("%Y-%m-%d").to_string(),
            y,
            label: label.to_string(),
            symbol: "star".to_string(),
            color: Some(color.to_string()),
        });
        self
    }
}

/// HRV readings over time with the baseline as a dashed line
pub fn overview_chart(overview: &OverviewSummary, days: usize) -> ChartSpec {
    let readings: Vec<Point> = overview
        .readings
        .iter()
        .map(|r| Point::dated(r.date, Some(r.value)))
        .collect();
    let baseline: Vec<Point> = overview
        .readings
        .iter()
        .map(|r| Point::dated(r.date, Some(overview.average)))
        .collect();

    ChartSpec::new(
        ChartKind::LineMarkers,
        format!("HRV Over the Last {} Days", days),
        "HRV (ms)",
    )
    .x_axis("Date")
    .series(Series::new("HRV", SeriesMode::LinesMarkers, readings))
    .series(
        Series::new(
            format!("Average HRV: {:.2} ms", overview.average),
            SeriesMode::Lines,
            baseline,
        )
        .dashed(),
    )
}

/// HRV distribution with the quartile thresholds marked
pub fn quartile_chart(split: &QuartileSplit, days: usize) -> ChartSpec {
    ChartSpec::new(
        ChartKind::BoxPlot,
        format!("HRV Distribution for Last {} Days", days),
        "HRV (ms)",
    )
    .series(Series::distribution("HRV", &split.distribution))
    .reference_line(split.q75, format!("Top 25% HRV: {:.2} ms", split.q75), "green")
    .reference_line(split.q25, format!("Bottom 25% HRV: {:.2} ms", split.q25), "blue")
}

/// Share of top-quartile nights per day type; an empty day type draws no bar
pub fn weekday_weekend_chart(split: &WeekdayWeekendSplit) -> ChartSpec {
    let mut chart = ChartSpec::new(
        ChartKind::Bar,
        "HRV in Top 25%: Weekday vs Weekend",
        "Percentage of Days in Top 25%",
    );
    for share in [&split.weekday, &split.weekend] {
        let label = share.day_type.label();
        chart = chart.series(Series::new(
            label,
            SeriesMode::Bars,
            vec![Point::new(label, share.percent_in_top_quartile)],
        ));
    }
    chart
}

/// Average heart rate distribution
pub fn heart_rate_chart(summary: &HeartRateSummary, days: usize) -> ChartSpec {
    ChartSpec::new(
        ChartKind::BoxPlot,
        format!("Heart Rate Distribution and Metrics for Last {} Days", days),
        "Heart Rate (bpm)",
    )
    .x_axis("Metric")
    .series(Series::distribution("Heart Rate Distribution", &summary.distribution))
}

fn prior_days(comparison: &MonthlyComparison) -> i64 {
    (comparison.window_start - comparison.prior_start).num_days()
}

/// Prior window against the current window, side by side
pub fn monthly_box_chart(comparison: &MonthlyComparison) -> ChartSpec {
    let prior = format!("Previous {} Days", prior_days(comparison));
    ChartSpec::new(
        ChartKind::GroupedBox,
        format!("HRV Comparison: {} vs Current Period", prior),
        "HRV (ms)",
    )
    .series(Series::distribution(&prior, &comparison.prior_values).color("blue"))
    .series(Series::distribution("Current Period", &comparison.current_values).color("red"))
}

/// One cell per prior-window day
pub fn monthly_heatmap(comparison: &MonthlyComparison) -> ChartSpec {
    let cells = comparison
        .calendar
        .iter()
        .map(|cell| Point::dated(cell.date, cell.value))
        .collect();

    ChartSpec::new(
        ChartKind::CalendarHeatmap,
        format!("HRV Calendar Heatmap (Last {} Days)", prior_days(comparison)),
        "HRV",
    )
    .x_axis("Date")
    .series(Series::new("HRV", SeriesMode::Heat, cells).color("RdYlGn"))
}

/// HRV line with daily change bars and the two extreme swings starred
pub fn swing_chart(swings: &SwingAnalysis, days: usize) -> ChartSpec {
    let line = swings
        .changes
        .iter()
        .map(|c| Point::dated(c.date, c.hrv))
        .collect();
    let bars = swings
        .changes
        .iter()
        .map(|c| {
            let mut point = Point::dated(c.date, c.change);
            point.color = c
                .change
                .map(|delta| if delta > 0.0 { "green" } else { "red" }.to_string());
            point
        })
        .collect();

    let increase = swings.biggest_increase;
    let decrease = swings.biggest_decrease;

    ChartSpec::new(
        ChartKind::LineBar,
        format!("HRV and Daily Changes Over the Last {} Days", days),
        "HRV (ms) / HRV Change",
    )
    .x_axis("Date")
    .series(Series::new("HRV", SeriesMode::LinesMarkers, line).color("blue"))
    .series(Series::new("HRV Change", SeriesMode::Bars, bars))
    .marker(increase.date, increase.hrv, "Biggest Increase", "green")
    .marker(decrease.date, decrease.hrv, "Biggest Decrease", "red")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HrvAnalyzer;
    use crate::models::Observation;
    use chrono::Duration;

    fn window() -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2023, 2, 20).unwrap();
        [Some(10.0), Some(12.0), None, Some(8.0), Some(15.0)]
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(start + Duration::days(i as i64), *v, Some(60.0)))
            .collect()
    }

    #[test]
    fn test_overview_chart_has_baseline() {
        let analyzer = HrvAnalyzer::new();
        let overview = analyzer.overview_summary(&window()).unwrap();
        let chart = overview_chart(&overview, 7);

        assert_eq!(chart.kind, ChartKind::LineMarkers);
        assert_eq!(chart.title, "HRV Over the Last 7 Days");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].points.len(), 4);
        assert!(chart.series[1].dashed);
        assert!(chart.series[1]
            .points
            .iter()
            .all(|p| p.y == Some(overview.average)));
    }

    #[test]
    fn test_quartile_chart_reference_lines() {
        let analyzer = HrvAnalyzer::new();
        let split = analyzer.quartile_split(&window()).unwrap();
        let chart = quartile_chart(&split, 30);

        assert_eq!(chart.reference_lines.len(), 2);
        assert_eq!(chart.reference_lines[0].y, split.q75);
        assert_eq!(chart.reference_lines[1].y, split.q25);
    }

    #[test]
    fn test_swing_chart_colors_and_markers() {
        let analyzer = HrvAnalyzer::new();
        let swings = analyzer.swing_analysis(&window()).unwrap();
        let chart = swing_chart(&swings, 7);

        let bars = &chart.series[1].points;
        assert_eq!(bars[0].color, None);
        assert_eq!(bars[1].color.as_deref(), Some("green"));
        assert_eq!(bars[4].color.as_deref(), Some("green"));
        assert_eq!(chart.markers.len(), 2);
        assert_eq!(chart.markers[0].x, "2023-02-24");
        assert_eq!(chart.markers[0].y, 15.0);
    }

    #[test]
    fn test_chart_serializes_without_empty_fields() {
        let analyzer = HrvAnalyzer::new();
        let hr = analyzer.heart_rate_summary(&window()).unwrap();
        let json = serde_json::to_string(&heart_rate_chart(&hr, 7)).unwrap();

        assert!(json.contains("\"kind\":\"box_plot\""));
        assert!(!json.contains("reference_lines"));
        assert!(!json.contains("markers"));
    }
}
