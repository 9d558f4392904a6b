use crate::models::{Completions, DayName, SlotKey};
use crate::parsers::{parse_distance, parse_duration};
use crate::plan::{MarathonPlan, PlanRepository};
use crate::summary::WeeklySummaryCalculator;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

/// Direction of recent weekly training volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    /// Classify the last three weekly distances; fewer than three is stable
    pub fn from_recent(weekly_distances: &[Decimal]) -> Self {
        let [first, _, last] = match weekly_distances {
            [.., a, b, c] => [*a, *b, *c],
            _ => return TrendDirection::Stable,
        };

        let change = last - first;
        let threshold = first * dec!(0.1);

        if change > threshold {
            TrendDirection::Improving
        } else if change < -threshold {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Stable => "stable",
            TrendDirection::Declining => "declining",
        }
    }
}

/// Whole-history training snapshot as of the current plan week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetrics {
    /// Most recent run of consecutive completed non-rest slots
    pub current_streak: u32,

    /// Longest run of consecutive completed non-rest slots
    pub longest_streak: u32,

    /// Miles across every completed workout
    pub total_distance: Decimal,

    /// Seconds across every completed workout
    pub total_duration_seconds: u32,

    /// Count of completed workouts
    pub total_workouts: u32,

    pub avg_weekly_distance: Decimal,

    pub avg_weekly_duration_seconds: Decimal,

    /// Completed workouts over planned non-rest slots to date, capped at 100
    pub adherence_rate: Decimal,

    /// Percent change of mean weekly distance, second half of the elapsed
    /// weeks over the first half
    pub volume_change: Decimal,

    /// 0-100, higher means less week-to-week distance variation
    pub consistency_score: Decimal,

    pub weekly_trend: TrendDirection,
}

/// Streak lengths found by a backward scan over plan slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Aggregates the whole completion history against a plan
pub struct TrainingMetricsCalculator<'a> {
    plan: &'a dyn PlanRepository,
}

impl<'a> TrainingMetricsCalculator<'a> {
    pub fn new(plan: &'a dyn PlanRepository) -> Self {
        TrainingMetricsCalculator { plan }
    }

    /// Compute metrics for weeks `1..=current_week`
    pub fn calculate(&self, completions: &Completions, current_week: u8) -> TrainingMetrics {
        let elapsed_weeks = current_week.min(self.plan.total_weeks());

        let mut total_distance = Decimal::ZERO;
        let mut total_duration_seconds: u32 = 0;
        let mut total_workouts: u32 = 0;

        for completion in completions.values().filter(|c| c.is_complete()) {
            total_distance =
                total_distance.saturating_add(parse_distance(completion.distance.as_deref()));
            total_duration_seconds = total_duration_seconds
                .saturating_add(parse_duration(completion.duration.as_deref()));
            total_workouts += 1;
        }

        let weekly_distances: Vec<Decimal> = WeeklySummaryCalculator::new(self.plan)
            .summarize_through(elapsed_weeks, completions)
            .into_iter()
            .map(|summary| summary.total_distance)
            .collect();

        let streaks = self.streaks(completions, elapsed_weeks);

        let total_planned: u32 = (1..=elapsed_weeks)
            .map(|week| u32::from(self.plan.planned_workouts(week)))
            .sum();

        let adherence_rate = if total_planned > 0 {
            (Decimal::from(total_workouts) / Decimal::from(total_planned) * dec!(100))
                .min(dec!(100))
        } else {
            Decimal::ZERO
        };

        let (avg_weekly_distance, avg_weekly_duration_seconds) = if elapsed_weeks > 0 {
            let weeks = Decimal::from(elapsed_weeks);
            (
                total_distance / weeks,
                Decimal::from(total_duration_seconds) / weeks,
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let metrics = TrainingMetrics {
            current_streak: streaks.current,
            longest_streak: streaks.longest,
            total_distance,
            total_duration_seconds,
            total_workouts,
            avg_weekly_distance,
            avg_weekly_duration_seconds,
            adherence_rate,
            volume_change: volume_change(&weekly_distances),
            consistency_score: consistency_score(&weekly_distances),
            weekly_trend: TrendDirection::from_recent(&weekly_distances),
        };

        debug!(
            current_week,
            workouts = metrics.total_workouts,
            current_streak = metrics.current_streak,
            trend = metrics.weekly_trend.as_str(),
            "Training metrics computed"
        );

        metrics
    }

    /// Scan slots from the end of `current_week` back to week 1.
    ///
    /// Rest and unplanned slots neither extend nor break a run. The current
    /// streak is the first non-empty run the scan meets, so days of the
    /// current week that have not happened yet do not zero it.
    pub fn streaks(&self, completions: &Completions, current_week: u8) -> Streaks {
        let mut streaks = Streaks::default();
        let mut run: u32 = 0;
        let mut current_found = false;

        for week in (1..=current_week).rev() {
            for day in DayName::ALL.iter().rev() {
                let scheduled = self
                    .plan
                    .workout(week, *day)
                    .is_some_and(|workout| !workout.category.is_rest());
                if !scheduled {
                    continue;
                }

                let done = completions
                    .get(&SlotKey::new(week, *day))
                    .is_some_and(|c| c.is_complete());

                if done {
                    run += 1;
                } else {
                    if run > 0 && !current_found {
                        streaks.current = run;
                        current_found = true;
                    }
                    streaks.longest = streaks.longest.max(run);
                    run = 0;
                }
            }
        }

        if !current_found {
            streaks.current = run;
        }
        streaks.longest = streaks.longest.max(run);

        streaks
    }
}

/// Percent change between the mean weekly distance of the second half and
/// the first half; 0 with fewer than four weeks, an empty first half, or a
/// change too large for a `Decimal`
pub fn volume_change(weekly_distances: &[Decimal]) -> Decimal {
    if weekly_distances.len() < 4 {
        return Decimal::ZERO;
    }

    let (first_half, second_half) = weekly_distances.split_at(weekly_distances.len() / 2);
    let first_avg = mean(first_half);
    let second_avg = mean(second_half);

    if first_avg > Decimal::ZERO {
        second_avg
            .checked_sub(first_avg)
            .and_then(|delta| delta.checked_div(first_avg))
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// `100 - stddev / max(peak, 1) * 100`, floored at 0.
///
/// Uses the population standard deviation; one week or less scores 100.
pub fn consistency_score(weekly_distances: &[Decimal]) -> Decimal {
    let distances: Vec<f64> = weekly_distances
        .iter()
        .map(|d| d.to_f64().unwrap_or(0.0))
        .collect();

    let std_dev = if distances.len() > 1 {
        distances.iter().population_std_dev()
    } else {
        0.0
    };
    let peak = distances.iter().copied().fold(1.0_f64, f64::max);

    let score = (100.0 - std_dev / peak * 100.0).clamp(0.0, 100.0);
    if score.is_finite() {
        Decimal::from_f64(score).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        Decimal::ZERO
    } else {
        let total = values
            .iter()
            .fold(Decimal::ZERO, |total, value| total.saturating_add(*value));
        total / Decimal::from(values.len())
    }
}

/// Metrics over the built-in marathon plan
pub fn compute_training_metrics(completions: &Completions, current_week: u8) -> TrainingMetrics {
    TrainingMetricsCalculator::new(&MarathonPlan).calculate(completions, current_week)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{completions_from, CompletionStatus, WorkoutCompletion};

    fn done(week: u8, day: DayName) -> WorkoutCompletion {
        WorkoutCompletion::new(week, day, CompletionStatus::Complete)
    }

    fn done_with_distance(week: u8, day: DayName, distance: &str) -> WorkoutCompletion {
        let mut completion = done(week, day);
        completion.distance = Some(distance.to_string());
        completion
    }

    /// Every non-rest day of the given weeks completed
    fn full_weeks(weeks: std::ops::RangeInclusive<u8>) -> Vec<WorkoutCompletion> {
        let plan = MarathonPlan;
        weeks
            .flat_map(|week| {
                plan.week_schedule(week)
                    .into_iter()
                    .filter(|(_, workout)| !workout.category.is_rest())
                    .map(move |(day, _)| done(week, day))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_extreme_distances_do_not_overflow() {
        let completions = completions_from(vec![
            done_with_distance(1, DayName::Monday, "0.0000000000000000000001"),
            done_with_distance(2, DayName::Monday, "0.0000000000000000000001"),
            done_with_distance(3, DayName::Monday, "10000000000000"),
            done_with_distance(4, DayName::Monday, "10000000000000"),
        ]);

        let metrics = compute_training_metrics(&completions, 4);
        assert_eq!(metrics.total_workouts, 4);
        assert_eq!(metrics.volume_change, Decimal::ZERO);
        assert!(metrics.consistency_score >= Decimal::ZERO);

        let huge = completions_from(vec![
            done_with_distance(1, DayName::Monday, "50000000000000000000000000000"),
            done_with_distance(1, DayName::Wednesday, "50000000000000000000000000000"),
        ]);
        assert_eq!(compute_training_metrics(&huge, 1).total_distance, Decimal::MAX);
    }

    #[test]
    fn test_empty_history() {
        let metrics = compute_training_metrics(&Completions::new(), 1);

        assert_eq!(metrics.current_streak, 0);
        assert_eq!(metrics.longest_streak, 0);
        assert_eq!(metrics.total_workouts, 0);
        assert_eq!(metrics.weekly_trend, TrendDirection::Stable);
        assert_eq!(metrics.consistency_score, dec!(100));
        assert_eq!(metrics.adherence_rate, Decimal::ZERO);
        assert_eq!(metrics.volume_change, Decimal::ZERO);
    }

    #[test]
    fn test_streak_spans_rest_days() {
        // Week 1 Friday + Saturday, then Sunday rest, then week 2 Monday
        let completions = completions_from(vec![
            done(1, DayName::Friday),
            done(1, DayName::Saturday),
            done(2, DayName::Monday),
        ]);

        let streaks = TrainingMetricsCalculator::new(&MarathonPlan).streaks(&completions, 2);
        assert_eq!(streaks.current, 3);
        assert_eq!(streaks.longest, 3);
    }

    #[test]
    fn test_current_streak_skips_upcoming_days() {
        // Week 3 so far: Monday and Tuesday done, rest of the week ahead
        let completions = completions_from(vec![done(3, DayName::Monday), done(3, DayName::Tuesday)]);

        let metrics = compute_training_metrics(&completions, 3);
        assert_eq!(metrics.current_streak, 2);
        assert_eq!(metrics.longest_streak, 2);
    }

    #[test]
    fn test_longest_streak_found_anywhere() {
        let mut records = full_weeks(1..=1);
        records.push(done(2, DayName::Friday));

        let metrics = compute_training_metrics(&completions_from(records), 2);
        assert_eq!(metrics.current_streak, 1);
        assert_eq!(metrics.longest_streak, 6);
    }

    #[test]
    fn test_full_adherence() {
        let metrics = compute_training_metrics(&completions_from(full_weeks(1..=4)), 4);

        assert_eq!(metrics.total_workouts, 24);
        assert_eq!(metrics.adherence_rate, dec!(100));
        assert_eq!(metrics.current_streak, 24);
        assert_eq!(metrics.longest_streak, 24);
    }

    #[test]
    fn test_adherence_is_capped() {
        // Future-week completions count toward totals but not the denominator
        let metrics = compute_training_metrics(&completions_from(full_weeks(1..=3)), 1);

        assert_eq!(metrics.total_workouts, 18);
        assert_eq!(metrics.adherence_rate, dec!(100));
    }

    #[test]
    fn test_totals_and_averages() {
        let mut long_run = done_with_distance(1, DayName::Saturday, "8");
        long_run.duration = Some("1:20:00".to_string());
        let completions = completions_from(vec![
            done_with_distance(1, DayName::Monday, "4"),
            long_run,
            done_with_distance(2, DayName::Monday, "6"),
        ]);

        let metrics = compute_training_metrics(&completions, 2);
        assert_eq!(metrics.total_distance, dec!(18));
        assert_eq!(metrics.total_duration_seconds, 4800);
        assert_eq!(metrics.avg_weekly_distance, dec!(9));
        assert_eq!(metrics.avg_weekly_duration_seconds, dec!(2400));
    }

    #[test]
    fn test_trend_classification() {
        assert_eq!(
            TrendDirection::from_recent(&[dec!(10), dec!(11), dec!(12)]),
            TrendDirection::Improving
        );
        assert_eq!(
            TrendDirection::from_recent(&[dec!(5), dec!(10), dec!(8), dec!(10.5)]),
            TrendDirection::Stable
        );
        assert_eq!(
            TrendDirection::from_recent(&[dec!(20), dec!(18), dec!(15)]),
            TrendDirection::Declining
        );
        assert_eq!(
            TrendDirection::from_recent(&[dec!(1), dec!(100)]),
            TrendDirection::Stable
        );
        // Any growth from a zero week counts as improving
        assert_eq!(
            TrendDirection::from_recent(&[dec!(0), dec!(0), dec!(3)]),
            TrendDirection::Improving
        );
    }

    #[test]
    fn test_volume_change() {
        assert_eq!(volume_change(&[dec!(10), dec!(10), dec!(12)]), Decimal::ZERO);
        assert_eq!(
            volume_change(&[dec!(10), dec!(10), dec!(15), dec!(15)]),
            dec!(50)
        );
        assert_eq!(
            volume_change(&[dec!(0), dec!(0), dec!(15), dec!(15)]),
            Decimal::ZERO
        );
        // Odd lengths put the extra week in the second half
        assert_eq!(
            volume_change(&[dec!(10), dec!(10), dec!(20), dec!(20), dec!(20)]),
            dec!(100)
        );
    }

    #[test]
    fn test_consistency_score() {
        assert_eq!(consistency_score(&[]), dec!(100));
        assert_eq!(consistency_score(&[dec!(12)]), dec!(100));
        assert_eq!(consistency_score(&[dec!(10), dec!(10), dec!(10)]), dec!(100));

        // mean 10, population stddev 10, peak 20
        assert_eq!(consistency_score(&[dec!(0), dec!(20)]), dec!(50));

        let score = consistency_score(&[dec!(0), dec!(0), dec!(0), dec!(30)]);
        assert!(score >= Decimal::ZERO && score < dec!(100));
    }

    #[test]
    fn test_metrics_beyond_plan_are_clamped() {
        let metrics = compute_training_metrics(&completions_from(full_weeks(1..=16)), 30);

        assert_eq!(metrics.total_workouts, 95);
        assert_eq!(metrics.adherence_rate, dec!(100));
        assert_eq!(metrics.current_streak, 95);
    }

    #[test]
    fn test_week_zero() {
        let metrics = compute_training_metrics(&completions_from(full_weeks(1..=1)), 0);

        assert_eq!(metrics.total_workouts, 6);
        assert_eq!(metrics.adherence_rate, Decimal::ZERO);
        assert_eq!(metrics.avg_weekly_distance, Decimal::ZERO);
        assert_eq!(metrics.current_streak, 0);
    }
}
