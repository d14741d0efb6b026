use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One night of wearable data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Calendar day the night is attributed to
    pub day: NaiveDate,

    /// Nocturnal heart-rate variability in milliseconds
    pub nocturnal_hrv: Option<f64>,

    /// Average heart rate during the night in beats per minute
    pub average_heart_rate: Option<f64>,
}

impl Observation {
    pub fn new(day: NaiveDate, nocturnal_hrv: Option<f64>, average_heart_rate: Option<f64>) -> Self {
        Observation {
            day,
            nocturnal_hrv,
            average_heart_rate,
        }
    }

    /// The HRV reading paired with its date, if present
    pub fn hrv_point(&self) -> Option<DatedValue> {
        self.nocturnal_hrv.map(|value| DatedValue::new(self.day, value))
    }
}

/// A value attached to the day it was recorded
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

impl DatedValue {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        DatedValue { date, value }
    }
}

/// Weekday/weekend classification of a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayType::Weekday => "Weekdays",
            DayType::Weekend => "Weekends",
        }
    }
}

/// Immutable handle over every loaded observation
///
/// Built once by the loader; every query borrows from it. Cloning shares the
/// underlying storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    observations: Arc<[Observation]>,
    cutoff: Option<NaiveDate>,
}

impl Dataset {
    /// Drop observations dated after `cutoff` and order the rest by date.
    ///
    /// The sort is stable, so observations sharing a date keep their input order.
    pub fn new(mut observations: Vec<Observation>, cutoff: Option<NaiveDate>) -> Self {
        if let Some(cutoff) = cutoff {
            observations.retain(|obs| obs.day <= cutoff);
        }
        observations.sort_by_key(|obs| obs.day);

        Dataset {
            observations: observations.into(),
            cutoff,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn cutoff(&self) -> Option<NaiveDate> {
        self.cutoff
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.observations.first().map(|obs| obs.day)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.observations.last().map(|obs| obs.day)
    }

    /// Number of observations carrying an HRV reading
    pub fn hrv_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|obs| obs.nocturnal_hrv.is_some())
            .count()
    }

    /// Number of observations carrying a heart-rate reading
    pub fn heart_rate_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|obs| obs.average_heart_rate.is_some())
            .count()
    }
}
