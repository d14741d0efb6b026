use chrono::{Duration, NaiveDate};
use hrvdash::{Dashboard, Dataset, HrvAnalyzer, Observation};
use proptest::prelude::*;

/// Property tests for the statistics pipeline over arbitrary night series

fn nights(values: &[(Option<f64>, Option<f64>)]) -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2022, 10, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, (hrv, hr))| Observation::new(start + Duration::days(i as i64), *hrv, *hr))
        .collect()
}

/// Nights separated by random gaps, duplicates included (step 0)
fn gapped_nights(steps: &[(i64, Option<f64>)]) -> Vec<Observation> {
    let mut day = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
    steps
        .iter()
        .map(|(step, hrv)| {
            day += Duration::days(*step);
            Observation::new(day, *hrv, None)
        })
        .collect()
}

fn night_values() -> impl Strategy<Value = Vec<(Option<f64>, Option<f64>)>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.85, 10.0f64..150.0),
            prop::option::weighted(0.9, 40.0f64..90.0),
        ),
        0..140,
    )
}

proptest! {
    #[test]
    fn select_window_takes_last_n_in_order(values in night_values(), size in 0usize..200) {
        let observations = nights(&values);
        let window = HrvAnalyzer::select_window(&observations, size);

        prop_assert_eq!(window.len(), size.min(observations.len()));
        prop_assert!(window.windows(2).all(|pair| pair[0].day < pair[1].day));
        if let Some(last) = window.last() {
            prop_assert_eq!(Some(last), observations.last());
        }
    }

    #[test]
    fn quartile_partitions_respect_thresholds(values in night_values()) {
        let observations = nights(&values);
        let analyzer = HrvAnalyzer::new();

        match analyzer.quartile_split(&observations) {
            Ok(split) => {
                prop_assert!(split.q25 <= split.q75);
                prop_assert!(!split.top_quartile.is_empty());
                prop_assert!(!split.bottom_quartile.is_empty());
                prop_assert!(split.top_quartile.iter().all(|r| r.value >= split.q75));
                prop_assert!(split.bottom_quartile.iter().all(|r| r.value <= split.q25));
                prop_assert!(split
                    .top_quartile
                    .iter()
                    .chain(&split.bottom_quartile)
                    .all(|r| split.distribution.contains(&r.value)));
            }
            Err(_) => prop_assert!(observations.iter().all(|o| o.nocturnal_hrv.is_none())),
        }
    }

    #[test]
    fn overview_shares_never_exceed_hundred(values in night_values()) {
        let observations = nights(&values);

        if let Ok(overview) = HrvAnalyzer::new().overview_summary(&observations) {
            let total = overview.percent_above_baseline + overview.percent_below_baseline;
            prop_assert!(total <= 100.0 + 1e-9);
            prop_assert!(overview.low.value <= overview.average + 1e-9);
            prop_assert!(overview.peak.value >= overview.average - 1e-9);
            prop_assert!(overview.variance >= 0.0);
        }
    }

    #[test]
    fn swings_bracket_every_change(values in night_values()) {
        let observations = nights(&values);

        if let Ok(swings) = HrvAnalyzer::new().swing_analysis(&observations) {
            for change in swings.changes.iter().filter_map(|c| c.change) {
                prop_assert!(change <= swings.biggest_increase.change);
                prop_assert!(change >= swings.biggest_decrease.change);
            }
        }
    }

    #[test]
    fn monthly_prior_window_precedes_window(values in night_values(), size in prop::sample::select(vec![7usize, 30, 90])) {
        let observations = nights(&values);
        let window = HrvAnalyzer::select_window(&observations, size);

        if let Ok(monthly) = HrvAnalyzer::new().monthly_comparison(&observations, window) {
            prop_assert_eq!(monthly.window_start - monthly.prior_start, Duration::days(30));
            prop_assert!(monthly
                .calendar
                .iter()
                .all(|c| c.date >= monthly.prior_start && c.date < monthly.window_start));
        }
    }

    #[test]
    fn monthly_prior_window_follows_calendar_dates(
        steps in prop::collection::vec((0i64..40, prop::option::weighted(0.8, 10.0f64..150.0)), 1..120),
        size in prop::sample::select(vec![7usize, 30, 90]),
    ) {
        let observations = gapped_nights(&steps);
        let window = HrvAnalyzer::select_window(&observations, size);
        let window_start = window[0].day;
        let prior_start = window_start - Duration::days(30);

        let expected: Vec<f64> = observations
            .iter()
            .filter(|o| o.day >= prior_start && o.day < window_start)
            .filter_map(|o| o.nocturnal_hrv)
            .collect();

        match HrvAnalyzer::new().monthly_comparison(&observations, window) {
            Ok(monthly) => {
                prop_assert_eq!(monthly.prior_start, prior_start);
                prop_assert_eq!(&monthly.prior_values, &expected);
                prop_assert!(monthly
                    .calendar
                    .iter()
                    .all(|c| c.date >= prior_start && c.date < window_start));
            }
            Err(_) => prop_assert!(
                expected.is_empty() || window.iter().all(|o| o.nocturnal_hrv.is_none())
            ),
        }
    }

    #[test]
    fn cutoff_bounds_every_report(values in night_values(), offset in 0i64..140) {
        let cutoff = NaiveDate::from_ymd_opt(2022, 10, 1).unwrap() + Duration::days(offset);
        let dataset = Dataset::new(nights(&values), Some(cutoff));

        prop_assert!(dataset.observations().iter().all(|o| o.day <= cutoff));

        let report = Dashboard::default().build(&dataset, 30).unwrap();
        if let Some(end) = report.window_end {
            prop_assert!(end <= cutoff);
        }
        prop_assert_eq!(report.clone(), Dashboard::default().build(&dataset, 30).unwrap());
    }
}
