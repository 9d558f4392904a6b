use crate::models::Completions;
use crate::parsers::{parse_distance, parse_duration};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Totals for one trailing window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    /// Miles
    pub distance: Decimal,

    /// Seconds
    pub duration_seconds: u32,

    pub workouts: u32,
}

/// Trailing 7/14/28-day totals keyed by completion timestamp
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RollingStats {
    pub last_7_days: WindowStats,
    pub last_14_days: WindowStats,
    pub last_28_days: WindowStats,
}

/// Aggregates completions by calendar recency, independent of plan weeks
#[derive(Debug, Clone)]
pub struct RollingWindowCalculator {
    training_start: NaiveDate,
}

impl RollingWindowCalculator {
    pub fn new(training_start: NaiveDate) -> Self {
        RollingWindowCalculator { training_start }
    }

    pub fn training_start(&self) -> NaiveDate {
        self.training_start
    }

    /// Windows ending at the current time
    pub fn compute(&self, completions: &Completions) -> RollingStats {
        self.compute_at(completions, Utc::now())
    }

    /// Windows ending at `now`
    pub fn compute_at(&self, completions: &Completions, now: DateTime<Utc>) -> RollingStats {
        let stats = RollingStats {
            last_7_days: window(completions, now, 7),
            last_14_days: window(completions, now, 14),
            last_28_days: window(completions, now, 28),
        };

        debug!(
            training_start = %self.training_start,
            now = %now,
            week_workouts = stats.last_7_days.workouts,
            "Rolling stats computed"
        );

        stats
    }
}

/// Completed workouts with `completed_at` in `[now - days, now]`
fn window(completions: &Completions, now: DateTime<Utc>, days: i64) -> WindowStats {
    let start = now - Duration::days(days);

    completions
        .values()
        .filter(|c| c.is_complete())
        .filter(|c| {
            c.completed_at
                .is_some_and(|completed_at| completed_at >= start && completed_at <= now)
        })
        .fold(WindowStats::default(), |mut stats, c| {
            stats.distance = stats
                .distance
                .saturating_add(parse_distance(c.distance.as_deref()));
            stats.duration_seconds = stats
                .duration_seconds
                .saturating_add(parse_duration(c.duration.as_deref()));
            stats.workouts += 1;
            stats
        })
}

/// Rolling windows over a completion snapshot; `now` defaults to the current time
pub fn compute_rolling_stats(
    completions: &Completions,
    training_start: NaiveDate,
    now: Option<DateTime<Utc>>,
) -> RollingStats {
    let calculator = RollingWindowCalculator::new(training_start);
    match now {
        Some(now) => calculator.compute_at(completions, now),
        None => calculator.compute(completions),
    }
}
