use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::calendar::TrainingCalendar;
use crate::error::{ImportExportError, Result};
use crate::import::{has_extension, ImportFormat};
use crate::models::{CompletionStatus, SlotKey, WorkoutCompletion};
use crate::parsers::{format_duration, format_pace};

const METERS_PER_MILE: Decimal = dec!(1609.344);
const FEET_PER_METER: Decimal = dec!(3.28084);

/// Activity types that count as runs
const RUN_TYPES: [&str; 3] = ["Run", "TrailRun", "VirtualRun"];

/// One activity from a provider's activity export
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderActivity {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub activity_type: String,

    pub start_date: DateTime<Utc>,

    /// Start in the athlete's timezone, used to pick the plan day.
    /// Providers write it with or without a trailing `Z`.
    #[serde(default)]
    pub start_date_local: Option<String>,

    /// Meters
    #[serde(default)]
    pub distance: f64,

    /// Seconds
    #[serde(default)]
    pub moving_time: u32,

    /// Seconds
    #[serde(default)]
    pub elapsed_time: Option<u32>,

    /// Meters
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,

    #[serde(default)]
    pub average_heartrate: Option<f64>,
}

impl ProviderActivity {
    pub fn is_run(&self) -> bool {
        RUN_TYPES.contains(&self.activity_type.as_str())
    }

    fn miles(&self) -> Decimal {
        Decimal::try_from(self.distance).unwrap_or(Decimal::ZERO) / METERS_PER_MILE
    }

    /// Convert to a completed record for `slot`
    pub fn to_completion(&self, slot: SlotKey) -> WorkoutCompletion {
        let miles = self.miles();
        let seconds = if self.moving_time > 0 {
            self.moving_time
        } else {
            self.elapsed_time.unwrap_or(0)
        };

        let mut completion = WorkoutCompletion::new(slot.week, slot.day, CompletionStatus::Complete);
        completion.distance = Some(format!("{:.2}", miles.round_dp(2)));

        if seconds > 0 {
            completion.duration = Some(format_duration(seconds));
        }

        if seconds > 0 && miles > Decimal::ZERO {
            let pace = Decimal::from(seconds)
                .checked_div(miles)
                .and_then(|pace| pace.round().to_u32())
                .unwrap_or(0);
            if pace > 0 {
                completion.pace = Some(format_pace(pace));
            }
        }

        completion.elevation = self
            .total_elevation_gain
            .and_then(|meters| Decimal::try_from(meters).ok())
            .and_then(|meters| meters.checked_mul(FEET_PER_METER))
            .map(|feet| format!("{} ft", feet.round()));

        completion.heart_rate = self
            .average_heartrate
            .and_then(|bpm| Decimal::try_from(bpm).ok())
            .map(|bpm| bpm.round().to_string());

        completion.notes = self.name.clone();
        completion.date = Some(self.local_start().date());
        completion.completed_at = Some(self.start_date);
        completion
    }

    fn local_start(&self) -> NaiveDateTime {
        self.start_date_local
            .as_deref()
            .map(|text| text.trim().trim_end_matches('Z'))
            .and_then(|text| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").ok())
            .unwrap_or_else(|| self.start_date.naive_utc())
    }
}

/// Imports runs from a provider activity export (JSON array)
#[derive(Debug, Clone)]
pub struct ActivityImporter {
    calendar: TrainingCalendar,
}

impl ActivityImporter {
    pub fn new(calendar: TrainingCalendar) -> Self {
        Self { calendar }
    }

    /// Place runs into plan slots; the longest run wins a contested slot
    pub fn convert(&self, activities: &[ProviderActivity]) -> Vec<WorkoutCompletion> {
        let mut best: BTreeMap<SlotKey, &ProviderActivity> = BTreeMap::new();

        for activity in activities.iter().filter(|a| a.is_run()) {
            let Some((week, day)) = self.calendar.slot_for(activity.local_start().date()) else {
                debug!(
                    start = %activity.start_date,
                    "Activity falls outside the training plan"
                );
                continue;
            };

            let slot = SlotKey::new(week, day);
            let longer = best
                .get(&slot)
                .map_or(true, |current| activity.distance > current.distance);
            if longer {
                best.insert(slot, activity);
            }
        }

        best.into_iter()
            .map(|(slot, activity)| activity.to_completion(slot))
            .collect()
    }
}

impl ImportFormat for ActivityImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutCompletion>> {
        let content = fs::read_to_string(file_path)?;
        let activities: Vec<ProviderActivity> =
            serde_json::from_str(&content).map_err(|e| ImportExportError::ParseError {
                format: self.get_format_name().to_string(),
                reason: e.to_string(),
            })?;

        let completions = self.convert(&activities);
        debug!(
            activities = activities.len(),
            placed = completions.len(),
            "Activity export converted"
        );
        Ok(completions)
    }

    fn get_format_name(&self) -> &'static str {
        "Activity JSON"
    }
}
