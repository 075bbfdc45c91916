use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl Period {
    fn secs(self) -> u64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3_600,
            Self::Days => 86_400,
        }
    }
}

/// "Every N periods".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSchedule {
    pub every: u64,
    pub period: Period,
}

impl IntervalSchedule {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.every.saturating_mul(self.period.secs()))
    }
}

/// When the periodic recompute last ran and how often it runs.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    intervals: Vec<IntervalSchedule>,
    last_pass: Option<DateTime<Utc>>,
}

impl Schedule {
    pub fn new(intervals: Vec<IntervalSchedule>) -> Self {
        Self {
            intervals,
            last_pass: None,
        }
    }

    /// Period of the recompute job: the shortest configured interval.
    pub fn tick_interval(&self) -> Option<Duration> {
        self.intervals
            .iter()
            .map(IntervalSchedule::duration)
            .filter(|d| !d.is_zero())
            .min()
    }

    pub fn last_pass(&self) -> Option<DateTime<Utc>> {
        self.last_pass
    }

    pub fn record_pass(&mut self, at: DateTime<Utc>) {
        self.last_pass = Some(at);
    }

    /// Soonest `last_pass + interval` over all intervals. `None` before the
    /// first pass or with no intervals.
    pub fn next_computation(&self) -> Option<DateTime<Utc>> {
        let base = self.last_pass?;
        self.intervals
            .iter()
            .filter_map(|i| TimeDelta::from_std(i.duration()).ok())
            .filter_map(|delta| base.checked_add_signed(delta))
            .min()
    }
}
