//! Rule-based insight generation
//!
//! Insights come from a fixed, ordered table of rules. Each rule pairs a
//! predicate over the [`InsightContext`] with a constructor for the insight
//! it produces; every rule whose predicate holds contributes one insight.
//! The result is ordered by severity and capped at [`MAX_INSIGHTS`].

use crate::metrics::{TrainingMetrics, TrendDirection};
use crate::models::Completions;
use crate::summary::WeeklySummary;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Maximum number of insights returned per call
pub const MAX_INSIGHTS: usize = 6;

/// Cumulative distance thresholds (miles) that earn a milestone insight
pub const DISTANCE_MILESTONES: [u32; 6] = [10, 25, 50, 100, 150, 200];

/// How far past a milestone (miles) it is still celebrated
const MILESTONE_WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Consistency,
    Performance,
    Recovery,
    Trend,
    Milestone,
    Recommendation,
}

/// Severity levels, declared from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Critical,
    Warning,
    Success,
    Info,
}

impl InsightSeverity {
    /// Sort rank, lower shows first
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightSeverity::Critical => "critical",
            InsightSeverity::Warning => "warning",
            InsightSeverity::Success => "success",
            InsightSeverity::Info => "info",
        }
    }
}

/// A human-readable observation about the training history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub category: InsightCategory,
    pub severity: InsightSeverity,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    /// Percent change the insight refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub completions: &'a Completions,
    pub current_week: u8,
    pub metrics: &'a TrainingMetrics,
    /// Weekly summaries, oldest first; the last entry is the current week
    pub weekly_summaries: &'a [WeeklySummary],
}

impl<'a> InsightContext<'a> {
    pub fn new(
        completions: &'a Completions,
        current_week: u8,
        metrics: &'a TrainingMetrics,
        weekly_summaries: &'a [WeeklySummary],
    ) -> Self {
        InsightContext {
            completions,
            current_week,
            metrics,
            weekly_summaries,
        }
    }

    pub fn this_week(&self) -> Option<&'a WeeklySummary> {
        self.weekly_summaries.last()
    }

    pub fn last_week(&self) -> Option<&'a WeeklySummary> {
        self.weekly_summaries
            .len()
            .checked_sub(2)
            .and_then(|index| self.weekly_summaries.get(index))
    }

    /// Percent change in distance from last week to this week; 0 when last
    /// week had no distance or the change does not fit a `Decimal`
    pub fn distance_change(&self) -> Option<Decimal> {
        let this_week = self.this_week()?;
        let last_week = self.last_week()?;

        if last_week.total_distance > Decimal::ZERO {
            let change = this_week
                .total_distance
                .checked_sub(last_week.total_distance)
                .and_then(|delta| delta.checked_div(last_week.total_distance))
                .and_then(|ratio| ratio.checked_mul(dec!(100)))
                .unwrap_or(Decimal::ZERO);
            Some(change)
        } else {
            Some(Decimal::ZERO)
        }
    }

    /// First milestone the total distance sits just past
    pub fn distance_milestone(&self) -> Option<u32> {
        let total = self.metrics.total_distance;
        DISTANCE_MILESTONES.iter().copied().find(|&milestone| {
            total >= Decimal::from(milestone) && total < Decimal::from(milestone + MILESTONE_WINDOW)
        })
    }
}

/// Insight contents before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq)]
struct InsightDraft {
    category: InsightCategory,
    severity: InsightSeverity,
    title: String,
    message: String,
    value: Option<Decimal>,
    change: Option<Decimal>,
    week: Option<u8>,
}

impl InsightDraft {
    fn new(
        category: InsightCategory,
        severity: InsightSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        InsightDraft {
            category,
            severity,
            title: title.into(),
            message: message.into(),
            value: None,
            change: None,
            week: None,
        }
    }

    fn value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    fn change(mut self, change: Decimal) -> Self {
        self.change = Some(change);
        self
    }

    fn week(mut self, week: u8) -> Self {
        self.week = Some(week);
        self
    }

    fn into_insight(self, created_at: DateTime<Utc>) -> Insight {
        Insight {
            id: Uuid::new_v4().to_string(),
            category: self.category,
            severity: self.severity,
            title: self.title,
            message: self.message,
            value: self.value,
            change: self.change,
            week: self.week,
            created_at,
        }
    }
}

/// One row of the rule table
pub struct InsightRule {
    pub name: &'static str,
    applies: fn(&InsightContext) -> bool,
    build: fn(&InsightContext) -> InsightDraft,
}

impl InsightRule {
    pub fn applies(&self, context: &InsightContext) -> bool {
        (self.applies)(context)
    }

    fn evaluate(&self, context: &InsightContext) -> Option<InsightDraft> {
        if self.applies(context) {
            Some((self.build)(context))
        } else {
            None
        }
    }
}

impl std::fmt::Debug for InsightRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightRule").field("name", &self.name).finish()
    }
}

/// Round half away from zero, for percentages shown in messages
fn whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

static RULES: [InsightRule; 13] = [
    InsightRule {
        name: "outstanding_consistency",
        applies: outstanding_consistency_applies,
        build: outstanding_consistency,
    },
    InsightRule {
        name: "good_consistency",
        applies: good_consistency_applies,
        build: good_consistency,
    },
    InsightRule {
        name: "consistency_slipping",
        applies: consistency_slipping_applies,
        build: consistency_slipping,
    },
    InsightRule {
        name: "long_streak",
        applies: long_streak_applies,
        build: long_streak,
    },
    InsightRule {
        name: "building_momentum",
        applies: building_momentum_applies,
        build: building_momentum,
    },
    InsightRule {
        name: "volume_increasing",
        applies: volume_increasing_applies,
        build: volume_increasing,
    },
    InsightRule {
        name: "volume_declining",
        applies: volume_declining_applies,
        build: volume_declining,
    },
    InsightRule {
        name: "volume_jump",
        applies: volume_jump_applies,
        build: volume_jump,
    },
    InsightRule {
        name: "recovery_check",
        applies: recovery_check_applies,
        build: recovery_check,
    },
    InsightRule {
        name: "distance_milestone",
        applies: distance_milestone_applies,
        build: distance_milestone,
    },
    InsightRule {
        name: "race_week",
        applies: race_week_applies,
        build: race_week,
    },
    InsightRule {
        name: "taper_time",
        applies: taper_time_applies,
        build: taper_time,
    },
    InsightRule {
        name: "consistent_runner",
        applies: consistent_runner_applies,
        build: consistent_runner,
    },
];

fn outstanding_consistency_applies(ctx: &InsightContext) -> bool {
    ctx.metrics.adherence_rate >= dec!(90)
}

fn outstanding_consistency(ctx: &InsightContext) -> InsightDraft {
    let rate = ctx.metrics.adherence_rate;
    InsightDraft::new(
        InsightCategory::Consistency,
        InsightSeverity::Success,
        "Outstanding Consistency",
        format!(
            "You've completed {}% of your planned workouts. Elite-level commitment!",
            whole(rate)
        ),
    )
    .value(rate)
}

fn good_consistency_applies(ctx: &InsightContext) -> bool {
    let rate = ctx.metrics.adherence_rate;
    rate >= dec!(75) && rate < dec!(90)
}

fn good_consistency(ctx: &InsightContext) -> InsightDraft {
    let rate = ctx.metrics.adherence_rate;
    InsightDraft::new(
        InsightCategory::Consistency,
        InsightSeverity::Info,
        "Good Training Consistency",
        format!("{}% completion rate - you're on track for race day.", whole(rate)),
    )
    .value(rate)
}

fn consistency_slipping_applies(ctx: &InsightContext) -> bool {
    ctx.metrics.adherence_rate < dec!(60) && ctx.current_week > 2
}

fn consistency_slipping(ctx: &InsightContext) -> InsightDraft {
    let rate = ctx.metrics.adherence_rate;
    InsightDraft::new(
        InsightCategory::Consistency,
        InsightSeverity::Warning,
        "Training Consistency Slipping",
        format!(
            "Only {}% completion. Consider adjusting your schedule to fit more workouts.",
            whole(rate)
        ),
    )
    .value(rate)
}

fn long_streak_applies(ctx: &InsightContext) -> bool {
    ctx.metrics.current_streak >= 7
}

fn long_streak(ctx: &InsightContext) -> InsightDraft {
    let streak = ctx.metrics.current_streak;
    InsightDraft::new(
        InsightCategory::Milestone,
        InsightSeverity::Success,
        format!("{}-Day Streak!", streak),
        format!(
            "Amazing dedication! You've trained {} days in a row.",
            streak
        ),
    )
    .value(Decimal::from(streak))
}

fn building_momentum_applies(ctx: &InsightContext) -> bool {
    (3..7).contains(&ctx.metrics.current_streak)
}

fn building_momentum(ctx: &InsightContext) -> InsightDraft {
    let streak = ctx.metrics.current_streak;
    InsightDraft::new(
        InsightCategory::Milestone,
        InsightSeverity::Info,
        "Building Momentum",
        format!("{}-day streak going. Keep it up!", streak),
    )
    .value(Decimal::from(streak))
}

fn volume_increasing_applies(ctx: &InsightContext) -> bool {
    ctx.metrics.weekly_trend == TrendDirection::Improving
}

fn volume_increasing(ctx: &InsightContext) -> InsightDraft {
    InsightDraft::new(
        InsightCategory::Trend,
        InsightSeverity::Success,
        "Training Volume Increasing",
        "Your weekly distance has been trending upward. Great progressive overload!",
    )
    .change(ctx.metrics.volume_change)
}

fn volume_declining_applies(ctx: &InsightContext) -> bool {
    ctx.metrics.weekly_trend == TrendDirection::Declining && ctx.current_week < 14
}

fn volume_declining(ctx: &InsightContext) -> InsightDraft {
    InsightDraft::new(
        InsightCategory::Trend,
        InsightSeverity::Warning,
        "Volume Declining",
        "Your training volume has decreased recently. Make sure this is intentional.",
    )
    .change(ctx.metrics.volume_change)
}

fn volume_jump_applies(ctx: &InsightContext) -> bool {
    ctx.current_week > 2
        && ctx.weekly_summaries.len() >= 2
        && ctx.distance_change().is_some_and(|change| change > dec!(20))
}

fn volume_jump(ctx: &InsightContext) -> InsightDraft {
    let change = ctx.distance_change().unwrap_or(Decimal::ZERO);
    InsightDraft::new(
        InsightCategory::Recovery,
        InsightSeverity::Warning,
        "Big Volume Jump",
        format!(
            "This week's distance is {}% higher than last week. Watch for fatigue.",
            whole(change)
        ),
    )
    .change(change)
    .week(ctx.current_week)
}

fn recovery_check_applies(ctx: &InsightContext) -> bool {
    ctx.current_week > 2
        && ctx.weekly_summaries.len() >= 2
        && ctx
            .this_week()
            .is_some_and(|week| week.recovery_days < 1 && week.intensity_score > dec!(8))
}

fn recovery_check(ctx: &InsightContext) -> InsightDraft {
    InsightDraft::new(
        InsightCategory::Recovery,
        InsightSeverity::Warning,
        "Recovery Check",
        "High intensity week with minimal rest. Consider adding an easy day.",
    )
    .week(ctx.current_week)
}

fn distance_milestone_applies(ctx: &InsightContext) -> bool {
    ctx.distance_milestone().is_some()
}

fn distance_milestone(ctx: &InsightContext) -> InsightDraft {
    let milestone = ctx.distance_milestone().unwrap_or_default();
    InsightDraft::new(
        InsightCategory::Milestone,
        InsightSeverity::Success,
        format!("{} Miles Club!", milestone),
        format!(
            "You've logged over {} miles of training. Incredible progress!",
            milestone
        ),
    )
    .value(Decimal::from(milestone))
}

fn race_week_applies(ctx: &InsightContext) -> bool {
    ctx.current_week == 16
}

fn race_week(_ctx: &InsightContext) -> InsightDraft {
    InsightDraft::new(
        InsightCategory::Recommendation,
        InsightSeverity::Info,
        "Race Week",
        "Focus on rest, hydration, and mental preparation. Trust your training!",
    )
    .week(16)
}

fn taper_time_applies(ctx: &InsightContext) -> bool {
    (14..16).contains(&ctx.current_week)
}

fn taper_time(ctx: &InsightContext) -> InsightDraft {
    InsightDraft::new(
        InsightCategory::Recommendation,
        InsightSeverity::Info,
        "Taper Time",
        "Your body is adapting from months of training. Reduce volume but maintain intensity.",
    )
    .week(ctx.current_week)
}

fn consistent_runner_applies(ctx: &InsightContext) -> bool {
    ctx.metrics.consistency_score > dec!(80)
}

fn consistent_runner(ctx: &InsightContext) -> InsightDraft {
    let score = ctx.metrics.consistency_score;
    InsightDraft::new(
        InsightCategory::Performance,
        InsightSeverity::Success,
        "Consistent Runner",
        format!(
            "Your training consistency score is {}%. This predicts race day success!",
            whole(score)
        ),
    )
    .value(score)
}

/// Evaluates the rule table against a context
#[derive(Debug, Clone, Copy)]
pub struct InsightGenerator {
    rules: &'static [InsightRule],
}

impl InsightGenerator {
    pub fn new() -> Self {
        InsightGenerator { rules: &RULES }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &'static [InsightRule] {
        self.rules
    }

    /// Insights stamped with the current time
    pub fn generate(&self, context: &InsightContext) -> Vec<Insight> {
        self.generate_at(context, Utc::now())
    }

    /// Insights stamped with `now`, most severe first, at most [`MAX_INSIGHTS`]
    pub fn generate_at(&self, context: &InsightContext, now: DateTime<Utc>) -> Vec<Insight> {
        let mut insights: Vec<Insight> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(context))
            .map(|draft| draft.into_insight(now))
            .collect();

        let fired = insights.len();
        insights.sort_by_key(|insight| insight.severity);
        insights.truncate(MAX_INSIGHTS);

        debug!(
            current_week = context.current_week,
            fired,
            returned = insights.len(),
            "Insights generated"
        );

        insights
    }
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the ranked insight list for a training snapshot
pub fn generate_insights(
    completions: &Completions,
    current_week: u8,
    metrics: &TrainingMetrics,
    weekly_summaries: &[WeeklySummary],
) -> Vec<Insight> {
    let context = InsightContext::new(completions, current_week, metrics, weekly_summaries);
    InsightGenerator::new().generate(&context)
}
