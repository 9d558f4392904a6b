use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// First and last week of the marathon plan
pub const FIRST_WEEK: u8 = 1;
pub const LAST_WEEK: u8 = 16;

/// Days of the training week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayName {
    /// All days in plan order
    pub const ALL: [DayName; 7] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
        DayName::Sunday,
    ];

    /// Zero-based position in the week (Monday = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayName::Monday => "monday",
            DayName::Tuesday => "tuesday",
            DayName::Wednesday => "wednesday",
            DayName::Thursday => "thursday",
            DayName::Friday => "friday",
            DayName::Saturday => "saturday",
            DayName::Sunday => "sunday",
        }
    }

    /// Capitalized name for display
    pub fn full_name(&self) -> &'static str {
        match self {
            DayName::Monday => "Monday",
            DayName::Tuesday => "Tuesday",
            DayName::Wednesday => "Wednesday",
            DayName::Thursday => "Thursday",
            DayName::Friday => "Friday",
            DayName::Saturday => "Saturday",
            DayName::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monday" | "mon" => Ok(DayName::Monday),
            "tuesday" | "tue" | "tues" => Ok(DayName::Tuesday),
            "wednesday" | "wed" => Ok(DayName::Wednesday),
            "thursday" | "thu" | "thurs" => Ok(DayName::Thursday),
            "friday" | "fri" => Ok(DayName::Friday),
            "saturday" | "sat" => Ok(DayName::Saturday),
            "sunday" | "sun" => Ok(DayName::Sunday),
            _ => Err(format!("Invalid day name: {}", s)),
        }
    }
}

/// Category of a planned workout, used for intensity weighting and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutCategory {
    Speed,
    Recovery,
    Aerobic,
    Tempo,
    Long,
    Rest,
    Race,
}

impl WorkoutCategory {
    /// Intensity points earned by completing a workout of this category
    pub fn intensity_weight(&self) -> Decimal {
        match self {
            WorkoutCategory::Speed => dec!(3),
            WorkoutCategory::Tempo => dec!(2.5),
            WorkoutCategory::Long => dec!(2),
            WorkoutCategory::Aerobic => dec!(1.5),
            WorkoutCategory::Recovery => dec!(0.5),
            WorkoutCategory::Rest => Decimal::ZERO,
            WorkoutCategory::Race => dec!(3),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, WorkoutCategory::Rest)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutCategory::Speed => "speed",
            WorkoutCategory::Recovery => "recovery",
            WorkoutCategory::Aerobic => "aerobic",
            WorkoutCategory::Tempo => "tempo",
            WorkoutCategory::Long => "long",
            WorkoutCategory::Rest => "rest",
            WorkoutCategory::Race => "race",
        }
    }
}

impl fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session type of a planned workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Intervals,
    Fartlek,
    Hills,
    Tempo,
    Recovery,
    Aerobic,
    Jog,
    Long,
    Rest,
    Race,
}

/// A single cell of the training plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Workout {
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub title: &'static str,
    pub details: &'static str,
    pub category: WorkoutCategory,
}

/// Completion state of a plan slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    #[default]
    Incomplete,
    Partial,
    Complete,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Incomplete => "incomplete",
            CompletionStatus::Partial => "partial",
            CompletionStatus::Complete => "complete",
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompletionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incomplete" => Ok(CompletionStatus::Incomplete),
            "partial" => Ok(CompletionStatus::Partial),
            "complete" | "done" => Ok(CompletionStatus::Complete),
            _ => Err(format!("Invalid completion status: {}", s)),
        }
    }
}

/// Identity of a plan slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub week: u8,
    pub day: DayName,
}

impl SlotKey {
    pub fn new(week: u8, day: DayName) -> Self {
        SlotKey { week, day }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.week, self.day)
    }
}

/// How a plan slot was (or wasn't) executed.
///
/// Measurement fields are kept as the free text the athlete entered; the
/// analytics layer normalizes them through [`crate::parsers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub week: u8,

    pub day: DayName,

    pub status: CompletionStatus,

    /// Distance in miles, e.g. "6.2" or "6.2 mi"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,

    /// Duration as "MM:SS", "H:MM:SS" or whole minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Pace per mile as "M:SS"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<String>,

    /// Perceived effort, 1-10
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Calendar date the workout was run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// When the workout was marked complete; drives the rolling windows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkoutCompletion {
    /// Create a bare completion record for a slot
    pub fn new(week: u8, day: DayName, status: CompletionStatus) -> Self {
        WorkoutCompletion {
            id: None,
            week,
            day,
            status,
            distance: None,
            duration: None,
            pace: None,
            elevation: None,
            heart_rate: None,
            effort: None,
            weather: None,
            notes: None,
            date: None,
            completed_at: None,
        }
    }

    pub fn key(&self) -> SlotKey {
        SlotKey::new(self.week, self.day)
    }

    pub fn is_complete(&self) -> bool {
        self.status == CompletionStatus::Complete
    }
}

/// Snapshot of every completion record, keyed by plan slot
pub type Completions = BTreeMap<SlotKey, WorkoutCompletion>;

/// Build a snapshot from a list of records; later records replace earlier ones
pub fn completions_from<I>(records: I) -> Completions
where
    I: IntoIterator<Item = WorkoutCompletion>,
{
    records.into_iter().map(|c| (c.key(), c)).collect()
}
