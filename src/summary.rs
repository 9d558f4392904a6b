use crate::models::{Completions, DayName, SlotKey};
use crate::parsers::{parse_distance, parse_duration, parse_heart_rate, parse_pace};
use crate::plan::{MarathonPlan, PlanRepository};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One week of completions measured against that week's plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    /// Plan week number
    pub week: u8,

    /// Non-rest days in the week's plan
    pub planned_workouts: u8,

    /// Planned non-rest days marked complete
    pub completed_workouts: u8,

    /// Completed / planned as a percentage (0 when nothing was planned)
    pub adherence_rate: Decimal,

    /// Total distance in miles
    pub total_distance: Decimal,

    /// Total duration in seconds
    pub total_duration_seconds: u32,

    /// Mean pace in seconds per mile over workouts that reported one
    pub avg_pace_seconds: Decimal,

    /// Mean heart rate over workouts that reported one
    pub avg_heart_rate: Option<Decimal>,

    /// Mean perceived effort over workouts that reported one
    pub avg_effort: Option<Decimal>,

    /// Sum of category intensity weights of completed workouts
    pub intensity_score: Decimal,

    /// Rest days in the week's plan
    pub recovery_days: u8,
}

impl WeeklySummary {
    /// Summary for a week with no plan data
    pub fn empty(week: u8) -> Self {
        WeeklySummary {
            week,
            planned_workouts: 0,
            completed_workouts: 0,
            adherence_rate: Decimal::ZERO,
            total_distance: Decimal::ZERO,
            total_duration_seconds: 0,
            avg_pace_seconds: Decimal::ZERO,
            avg_heart_rate: None,
            avg_effort: None,
            intensity_score: Decimal::ZERO,
            recovery_days: 0,
        }
    }
}

/// Running sum and count for fields that are averaged only where supplied
#[derive(Debug, Default)]
struct Average {
    total: Decimal,
    count: u32,
}

impl Average {
    fn add(&mut self, value: Decimal) {
        self.total = self.total.saturating_add(value);
        self.count += 1;
    }

    fn mean(&self) -> Option<Decimal> {
        if self.count == 0 {
            None
        } else {
            Some(self.total / Decimal::from(self.count))
        }
    }
}

/// Aggregates a week of completions against a plan
pub struct WeeklySummaryCalculator<'a> {
    plan: &'a dyn PlanRepository,
}

impl<'a> WeeklySummaryCalculator<'a> {
    pub fn new(plan: &'a dyn PlanRepository) -> Self {
        WeeklySummaryCalculator { plan }
    }

    /// Summarize one week; weeks without plan data yield an all-zero summary
    pub fn summarize(&self, week: u8, completions: &Completions) -> WeeklySummary {
        if !self.plan.has_week(week) {
            return WeeklySummary::empty(week);
        }

        let mut summary = WeeklySummary::empty(week);
        let mut pace = Average::default();
        let mut heart_rate = Average::default();
        let mut effort = Average::default();

        for day in DayName::ALL {
            let Some(workout) = self.plan.workout(week, day) else {
                continue;
            };

            if workout.category.is_rest() {
                summary.recovery_days += 1;
                continue;
            }

            summary.planned_workouts += 1;

            let Some(completion) = completions
                .get(&SlotKey::new(week, day))
                .filter(|c| c.is_complete())
            else {
                continue;
            };

            summary.completed_workouts += 1;
            summary.total_distance = summary
                .total_distance
                .saturating_add(parse_distance(completion.distance.as_deref()));
            summary.total_duration_seconds = summary
                .total_duration_seconds
                .saturating_add(parse_duration(completion.duration.as_deref()));

            let pace_seconds = parse_pace(completion.pace.as_deref());
            if pace_seconds > 0 {
                pace.add(Decimal::from(pace_seconds));
            }

            let bpm = parse_heart_rate(completion.heart_rate.as_deref());
            if bpm > 0 {
                heart_rate.add(Decimal::from(bpm));
            }

            if let Some(rpe) = completion.effort.filter(|&e| e > 0) {
                effort.add(Decimal::from(rpe));
            }

            summary.intensity_score += workout.category.intensity_weight();
        }

        summary.adherence_rate = if summary.planned_workouts > 0 {
            Decimal::from(summary.completed_workouts) / Decimal::from(summary.planned_workouts)
                * dec!(100)
        } else {
            Decimal::ZERO
        };
        summary.avg_pace_seconds = pace.mean().unwrap_or(Decimal::ZERO);
        summary.avg_heart_rate = heart_rate.mean();
        summary.avg_effort = effort.mean();

        debug!(
            week,
            planned = summary.planned_workouts,
            completed = summary.completed_workouts,
            distance = %summary.total_distance,
            "Weekly summary computed"
        );

        summary
    }

    /// Summaries for weeks `1..=current_week`, oldest first
    pub fn summarize_through(&self, current_week: u8, completions: &Completions) -> Vec<WeeklySummary> {
        (1..=current_week)
            .map(|week| self.summarize(week, completions))
            .collect()
    }
}

/// Summarize a week of the built-in marathon plan
pub fn compute_weekly_summary(week: u8, completions: &Completions) -> WeeklySummary {
    WeeklySummaryCalculator::new(&MarathonPlan).summarize(week, completions)
}
