use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ImportExportError, Result};
use crate::import::{has_extension, ImportFormat};
use crate::models::{CompletionStatus, DayName, WorkoutCompletion};

/// One line of the completion log CSV.
///
/// Also written by the CSV exporter, so an exported log re-imports as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRow {
    pub week: u8,
    pub day: String,
    pub status: String,
    #[serde(default)]
    pub distance: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub pace: Option<String>,
    #[serde(default)]
    pub elevation: Option<String>,
    #[serde(default, alias = "heart_rate")]
    pub heart_rate: Option<String>,
    #[serde(default)]
    pub effort: Option<u8>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, alias = "completed_at")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&WorkoutCompletion> for CompletionRow {
    fn from(completion: &WorkoutCompletion) -> Self {
        CompletionRow {
            week: completion.week,
            day: completion.day.as_str().to_string(),
            status: completion.status.as_str().to_string(),
            distance: completion.distance.clone(),
            duration: completion.duration.clone(),
            pace: completion.pace.clone(),
            elevation: completion.elevation.clone(),
            heart_rate: completion.heart_rate.clone(),
            effort: completion.effort,
            weather: completion.weather.clone(),
            notes: completion.notes.clone(),
            date: completion.date,
            completed_at: completion.completed_at,
        }
    }
}

impl CompletionRow {
    fn into_completion(self) -> std::result::Result<WorkoutCompletion, String> {
        let day: DayName = self.day.parse()?;
        let status: CompletionStatus = self.status.parse()?;

        let mut completion = WorkoutCompletion::new(self.week, day, status);
        completion.distance = self.distance;
        completion.duration = self.duration;
        completion.pace = self.pace;
        completion.elevation = self.elevation;
        completion.heart_rate = self.heart_rate;
        completion.effort = self.effort;
        completion.weather = self.weather;
        completion.notes = self.notes;
        completion.date = self.date;
        completion.completed_at = self.completed_at;
        Ok(completion)
    }
}

/// Imports a completion log written as CSV with a header row
#[derive(Debug, Clone, Default)]
pub struct CompletionCsvImporter;

impl CompletionCsvImporter {
    pub fn new() -> Self {
        Self
    }

    fn parse_error(line: usize, reason: impl std::fmt::Display) -> ImportExportError {
        ImportExportError::ParseError {
            format: "CSV".to_string(),
            reason: format!("line {}: {}", line, reason),
        }
    }
}

impl ImportFormat for CompletionCsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<WorkoutCompletion>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(file_path)?;

        let mut completions = Vec::new();

        for (index, result) in reader.deserialize::<CompletionRow>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let row = result.map_err(|e| Self::parse_error(line, e))?;
            let completion = row
                .into_completion()
                .map_err(|reason| Self::parse_error(line, reason))?;
            completions.push(completion);
        }

        Ok(completions)
    }

    fn get_format_name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use std::fs;
    use tempfile::tempdir;

    fn import(content: &str) -> Result<Vec<WorkoutCompletion>> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.csv");
        fs::write(&path, content).unwrap();
        CompletionCsvImporter::new().import_file(&path)
    }

    #[test]
    fn test_can_import() {
        let importer = CompletionCsvImporter::new();
        assert!(importer.can_import(Path::new("log.csv")));
        assert!(importer.can_import(Path::new("LOG.CSV")));
        assert!(!importer.can_import(Path::new("log.json")));
    }

    #[test]
    fn test_import_full_row() {
        let completions = import(
            "week,day,status,distance,duration,pace,elevation,heartRate,effort,weather,notes,date,completedAt\n\
             3,Wed,complete,6.2,52:10,8:25,120 ft,148,6,sunny,felt good,2024-01-17,2024-01-17T07:30:00Z\n",
        )
        .unwrap();

        assert_eq!(completions.len(), 1);
        let completion = &completions[0];
        assert_eq!(completion.week, 3);
        assert_eq!(completion.day, DayName::Wednesday);
        assert!(completion.is_complete());
        assert_eq!(completion.heart_rate.as_deref(), Some("148"));
        assert_eq!(completion.effort, Some(6));
        assert_eq!(completion.date, NaiveDate::from_ymd_opt(2024, 1, 17));
        assert!(completion.completed_at.is_some());
    }

    #[test]
    fn test_missing_and_empty_columns_are_none() {
        let completions = import("week,day,status,distance,notes\n2, friday ,partial,,\n").unwrap();
        let completion = &completions[0];
        assert_eq!(completion.status, CompletionStatus::Partial);
        assert_eq!(completion.distance, None);
        assert_eq!(completion.notes, None);
        assert_eq!(completion.pace, None);
    }

    #[test]
    fn test_bad_day_reports_line() {
        let err = import("week,day,status\n1,monday,complete\n1,someday,complete\n").unwrap_err();
        match err {
            TrackerError::ImportExport(ImportExportError::ParseError { reason, .. }) => {
                assert!(reason.starts_with("line 3"));
                assert!(reason.contains("someday"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_row_from_completion() {
        let mut completion = WorkoutCompletion::new(5, DayName::Sunday, CompletionStatus::Incomplete);
        completion.weather = Some("rain".to_string());

        let row = CompletionRow::from(&completion);
        assert_eq!(row.day, "sunday");
        assert_eq!(row.status, "incomplete");
        assert_eq!(row.into_completion().unwrap(), completion);
    }
}
