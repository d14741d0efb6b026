//! Nocturnal HRV statistics pipeline
//!
//! Every view is a pure function of the selected window (and, for the
//! month-over-month comparison, of the full observation history). Views that
//! would otherwise aggregate an empty sample return
//! [`AnalysisError::InsufficientData`] instead of NaN.
//!
//! # Views
//!
//! - **Overview**: baseline (mean), population variance, peak and lowest night,
//!   share of nights above and below baseline
//! - **Quartiles**: nights at or above the 75th percentile and at or below the
//!   25th percentile
//! - **Weekday vs weekend**: share of top-quartile nights per day type
//! - **Heart rate**: mean, max and min of the average nightly heart rate
//! - **Monthly comparison**: current window against the 30 days before it
//! - **Swings**: largest night-over-night increase and decrease

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::descriptive::{
    first_max, first_min, mean, percent_where, percentile, population_variance,
};
use crate::error::AnalysisError;
use crate::models::{DatedValue, DayType, Observation};

/// Days of history compared against the current window by default
pub const DEFAULT_PRIOR_WINDOW_DAYS: u32 = 30;

/// Longest prior window a configuration may ask for (ten years)
pub const MAX_PRIOR_WINDOW_DAYS: u32 = 3660;

/// Tunables for the statistics pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Calendar days before the window start used for the monthly comparison
    pub prior_window_days: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            prior_window_days: DEFAULT_PRIOR_WINDOW_DAYS,
        }
    }
}

/// HRV overview for the selected window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewSummary {
    /// Nights in the window with an HRV reading
    pub days_with_readings: usize,
    /// Mean HRV, used as the window baseline
    pub average: f64,
    /// Population variance of HRV
    pub variance: f64,
    pub std_dev: f64,
    /// Highest reading, first occurrence on ties
    pub peak: DatedValue,
    /// Lowest reading, first occurrence on ties
    pub low: DatedValue,
    /// Percent of nights strictly above baseline
    pub percent_above_baseline: f64,
    /// Percent of nights strictly below baseline
    pub percent_below_baseline: f64,
    /// Readings in window order
    pub readings: Vec<DatedValue>,
}

/// Nights in the upper and lower HRV quartile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuartileSplit {
    pub q25: f64,
    pub q75: f64,
    /// Readings >= q75, ascending by date
    pub top_quartile: Vec<DatedValue>,
    /// Readings <= q25, ascending by date
    pub bottom_quartile: Vec<DatedValue>,
    /// All readings of the window, for the distribution plot
    pub distribution: Vec<f64>,
}

/// Top-quartile share for one day type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTypeShare {
    pub day_type: DayType,
    /// Nights of this type with an HRV reading
    pub entries: usize,
    /// Nights of this type with HRV >= q75
    pub top_quartile_entries: usize,
    /// `None` when no night of this type has a reading
    pub percent_in_top_quartile: Option<f64>,
}

/// Weekday vs weekend recovery comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayWeekendSplit {
    pub q75: f64,
    pub weekday: DayTypeShare,
    pub weekend: DayTypeShare,
}

/// Average nightly heart rate summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSummary {
    pub readings: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    pub distribution: Vec<f64>,
}

/// One day of the prior-window calendar heatmap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

/// Current window compared with the days immediately before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyComparison {
    /// First day included in the prior window
    pub prior_start: NaiveDate,
    /// First day of the current window; the prior window ends before it
    pub window_start: NaiveDate,
    pub prior_average: f64,
    pub prior_variance: f64,
    pub current_average: f64,
    pub current_variance: f64,
    /// Current average minus prior average
    pub difference: f64,
    /// Prior nights strictly above the current baseline
    pub prior_days_above_baseline: usize,
    /// Prior nights strictly below the current baseline
    pub prior_days_below_baseline: usize,
    /// Prior observations in date order, gaps kept as `None`
    pub calendar: Vec<CalendarCell>,
    pub prior_values: Vec<f64>,
    pub current_values: Vec<f64>,
}

/// Night-over-night HRV change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    pub hrv: Option<f64>,
    /// Change from the previous night; `None` for the first night or when
    /// either night lacks a reading
    pub change: Option<f64>,
}

/// An extreme night-over-night change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Swing {
    /// Later of the two nights
    pub date: NaiveDate,
    pub change: f64,
    /// HRV on `date`
    pub hrv: f64,
}

/// Largest HRV swings in the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingAnalysis {
    pub changes: Vec<DailyChange>,
    pub biggest_increase: Swing,
    pub biggest_decrease: Swing,
}

/// Stateless calculator for every dashboard view
#[derive(Debug, Clone, Default)]
pub struct HrvAnalyzer {
    config: AnalysisConfig,
}

impl HrvAnalyzer {
    pub fn new() -> Self {
        HrvAnalyzer::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        HrvAnalyzer { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Last `min(size, len)` observations, order preserved
    pub fn select_window(observations: &[Observation], size: usize) -> &[Observation] {
        let start = observations.len().saturating_sub(size);
        &observations[start..]
    }

    /// Baseline, spread and extremes of the window's HRV readings
    pub fn overview_summary(&self, window: &[Observation]) -> Result<OverviewSummary, AnalysisError> {
        let readings = hrv_readings(window);
        let values: Vec<f64> = readings.iter().map(|r| r.value).collect();

        let (Some(average), Some(variance), Some((peak_idx, _)), Some((low_idx, _))) = (
            mean(&values),
            population_variance(&values),
            first_max(&values),
            first_min(&values),
        ) else {
            return Err(AnalysisError::insufficient(
                "HRV overview",
                "no HRV readings in the selected window",
            ));
        };

        let percent_above_baseline = percent_where(&values, |v| v > average).unwrap_or(0.0);
        let percent_below_baseline = percent_where(&values, |v| v < average).unwrap_or(0.0);

        tracing::debug!(
            readings = values.len(),
            average,
            variance,
            "Computed HRV overview"
        );

        Ok(OverviewSummary {
            days_with_readings: values.len(),
            average,
            variance,
            std_dev: variance.sqrt(),
            peak: readings[peak_idx],
            low: readings[low_idx],
            percent_above_baseline,
            percent_below_baseline,
            readings,
        })
    }

    /// Upper and lower quartile nights
    ///
    /// The two partitions overlap when q25 == q75 and are never empty for a
    /// window with at least one reading.
    pub fn quartile_split(&self, window: &[Observation]) -> Result<QuartileSplit, AnalysisError> {
        let mut readings = hrv_readings(window);
        let distribution: Vec<f64> = readings.iter().map(|r| r.value).collect();

        let (Some(q25), Some(q75)) = (
            percentile(&distribution, 25.0),
            percentile(&distribution, 75.0),
        ) else {
            return Err(AnalysisError::insufficient(
                "HRV quartiles",
                "no HRV readings in the selected window",
            ));
        };

        readings.sort_by_key(|r| r.date);
        let top_quartile = readings.iter().copied().filter(|r| r.value >= q75).collect();
        let bottom_quartile = readings.iter().copied().filter(|r| r.value <= q25).collect();

        Ok(QuartileSplit {
            q25,
            q75,
            top_quartile,
            bottom_quartile,
            distribution,
        })
    }

    /// Share of top-quartile nights on weekdays and weekends
    pub fn weekday_weekend_split(
        &self,
        window: &[Observation],
        q75: f64,
    ) -> Result<WeekdayWeekendSplit, AnalysisError> {
        let readings = hrv_readings(window);
        if readings.is_empty() {
            return Err(AnalysisError::insufficient(
                "weekday vs weekend recovery",
                "no HRV readings in the selected window",
            ));
        }

        let share = |day_type: DayType| {
            let values: Vec<f64> = readings
                .iter()
                .filter(|r| DayType::of(r.date) == day_type)
                .map(|r| r.value)
                .collect();
            DayTypeShare {
                day_type,
                entries: values.len(),
                top_quartile_entries: values.iter().filter(|&&v| v >= q75).count(),
                percent_in_top_quartile: percent_where(&values, |v| v >= q75),
            }
        };

        Ok(WeekdayWeekendSplit {
            q75,
            weekday: share(DayType::Weekday),
            weekend: share(DayType::Weekend),
        })
    }

    /// Mean, max and min of the average nightly heart rate, ignoring gaps
    pub fn heart_rate_summary(&self, window: &[Observation]) -> Result<HeartRateSummary, AnalysisError> {
        let distribution: Vec<f64> = window.iter().filter_map(|obs| obs.average_heart_rate).collect();

        let (Some(average), Some((_, max)), Some((_, min))) =
            (mean(&distribution), first_max(&distribution), first_min(&distribution))
        else {
            return Err(AnalysisError::insufficient(
                "heart rate metrics",
                "no heart rate readings in the selected window",
            ));
        };

        Ok(HeartRateSummary {
            readings: distribution.len(),
            mean: average,
            max,
            min,
            distribution,
        })
    }

    /// Compare the window with the `prior_window_days` calendar days before it
    ///
    /// The prior window covers `[start - prior_window_days, start)` where
    /// `start` is the window's first date, taken from the full history.
    /// Membership is by calendar date, so gaps shrink the prior sample. A span
    /// reaching past the earliest representable date is clamped to it.
    pub fn monthly_comparison(
        &self,
        observations: &[Observation],
        window: &[Observation],
    ) -> Result<MonthlyComparison, AnalysisError> {
        let Some(window_start) = window.iter().map(|obs| obs.day).min() else {
            return Err(AnalysisError::insufficient(
                "monthly comparison",
                "the selected window is empty",
            ));
        };
        let prior_start = window_start
            .checked_sub_days(Days::new(u64::from(self.config.prior_window_days)))
            .unwrap_or(NaiveDate::MIN);

        let mut prior: Vec<&Observation> = observations
            .iter()
            .filter(|obs| obs.day >= prior_start && obs.day < window_start)
            .collect();
        prior.sort_by_key(|obs| obs.day);

        let prior_values: Vec<f64> = prior.iter().filter_map(|obs| obs.nocturnal_hrv).collect();
        let current_values: Vec<f64> = window.iter().filter_map(|obs| obs.nocturnal_hrv).collect();

        let (Some(prior_average), Some(prior_variance)) =
            (mean(&prior_values), population_variance(&prior_values))
        else {
            return Err(AnalysisError::insufficient(
                "monthly comparison",
                format!(
                    "no HRV readings between {} and {}",
                    prior_start,
                    window_start.pred_opt().unwrap_or(window_start)
                ),
            ));
        };
        let (Some(current_average), Some(current_variance)) =
            (mean(&current_values), population_variance(&current_values))
        else {
            return Err(AnalysisError::insufficient(
                "monthly comparison",
                "no HRV readings in the selected window",
            ));
        };

        let calendar = prior
            .iter()
            .map(|obs| CalendarCell {
                date: obs.day,
                value: obs.nocturnal_hrv,
            })
            .collect();

        tracing::debug!(
            %prior_start,
            %window_start,
            prior_readings = prior_values.len(),
            "Computed monthly comparison"
        );

        Ok(MonthlyComparison {
            prior_start,
            window_start,
            prior_average,
            prior_variance,
            current_average,
            current_variance,
            difference: current_average - prior_average,
            prior_days_above_baseline: prior_values.iter().filter(|&&v| v > current_average).count(),
            prior_days_below_baseline: prior_values.iter().filter(|&&v| v < current_average).count(),
            calendar,
            prior_values,
            current_values,
        })
    }

    /// Largest night-over-night increase and decrease
    pub fn swing_analysis(&self, window: &[Observation]) -> Result<SwingAnalysis, AnalysisError> {
        let changes: Vec<DailyChange> = window
            .iter()
            .enumerate()
            .map(|(i, obs)| {
                let change = match (i.checked_sub(1).map(|p| window[p].nocturnal_hrv), obs.nocturnal_hrv) {
                    (Some(Some(previous)), Some(current)) => Some(current - previous),
                    _ => None,
                };
                DailyChange {
                    date: obs.day,
                    hrv: obs.nocturnal_hrv,
                    change,
                }
            })
            .collect();

        let swings: Vec<Swing> = changes
            .iter()
            .filter_map(|c| match (c.change, c.hrv) {
                (Some(change), Some(hrv)) => Some(Swing {
                    date: c.date,
                    change,
                    hrv,
                }),
                _ => None,
            })
            .collect();
        let deltas: Vec<f64> = swings.iter().map(|s| s.change).collect();

        let (Some((inc_idx, _)), Some((dec_idx, _))) = (first_max(&deltas), first_min(&deltas)) else {
            return Err(AnalysisError::insufficient(
                "HRV swings",
                "fewer than two consecutive nights with HRV readings",
            ));
        };

        Ok(SwingAnalysis {
            biggest_increase: swings[inc_idx],
            biggest_decrease: swings[dec_idx],
            changes,
        })
    }
}

fn hrv_readings(window: &[Observation]) -> Vec<DatedValue> {
    window.iter().filter_map(Observation::hrv_point).collect()
}
