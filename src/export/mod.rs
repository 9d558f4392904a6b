use crate::calendar::TrainingCalendar;
use crate::error::{ImportExportError, Result};
use crate::insights::{Insight, InsightContext, InsightGenerator};
use crate::metrics::{TrainingMetrics, TrainingMetricsCalculator};
use crate::models::{Completions, FIRST_WEEK, LAST_WEEK};
use crate::plan::PlanRepository;
use crate::rolling::{RollingStats, RollingWindowCalculator};
use crate::summary::{WeeklySummary, WeeklySummaryCalculator};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub mod csv;
pub mod json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = ImportExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ImportExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// What to export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportType {
    /// The raw completion log
    Completions,
    /// One row per plan week up to the current week
    WeeklySummaries,
    /// Summaries, metrics, rolling windows and insights together
    TrainingReport,
}

impl std::str::FromStr for ExportType {
    type Err = ImportExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "completions" | "log" => Ok(ExportType::Completions),
            "weekly_summaries" | "weekly" | "summaries" => Ok(ExportType::WeeklySummaries),
            "training_report" | "report" => Ok(ExportType::TrainingReport),
            _ => Err(ImportExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Full analytics snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub generated_at: DateTime<Utc>,
    pub current_week: u8,
    /// Week 1 Monday, when a training start is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_start: Option<NaiveDate>,
    pub weekly_summaries: Vec<WeeklySummary>,
    pub metrics: TrainingMetrics,
    /// Present only when the plan is anchored to the calendar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling: Option<RollingStats>,
    pub insights: Vec<Insight>,
}

impl TrainingReport {
    /// Run the whole analytics pipeline over a snapshot as of `now`
    pub fn generate(
        plan: &dyn PlanRepository,
        completions: &Completions,
        current_week: u8,
        calendar: Option<TrainingCalendar>,
        now: DateTime<Utc>,
    ) -> Self {
        let current_week = current_week.clamp(FIRST_WEEK, LAST_WEEK);

        let weekly_summaries =
            WeeklySummaryCalculator::new(plan).summarize_through(current_week, completions);
        let metrics = TrainingMetricsCalculator::new(plan).calculate(completions, current_week);
        let rolling = calendar.map(|calendar| {
            RollingWindowCalculator::new(calendar.start()).compute_at(completions, now)
        });

        let context = InsightContext::new(completions, current_week, &metrics, &weekly_summaries);
        let insights = InsightGenerator::new().generate_at(&context, now);

        TrainingReport {
            generated_at: now,
            current_week,
            training_start: calendar.map(|calendar| calendar.start()),
            weekly_summaries,
            metrics,
            rolling,
            insights,
        }
    }
}

/// Writes completions and analytics to files
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportManager;

impl ExportManager {
    pub fn new() -> Self {
        Self
    }

    pub fn export<P: AsRef<Path>>(
        &self,
        completions: &Completions,
        report: &TrainingReport,
        export_type: ExportType,
        format: ExportFormat,
        output_path: P,
    ) -> Result<()> {
        let output_path = output_path.as_ref();

        match (export_type, format) {
            (ExportType::Completions, ExportFormat::Csv) => {
                csv::export_completions(completions, output_path)?
            }
            (ExportType::Completions, ExportFormat::Json) => {
                let records: Vec<_> = completions.values().collect();
                json::export_json(&records, output_path)?
            }
            (ExportType::WeeklySummaries, ExportFormat::Csv) => {
                csv::export_weekly_summaries(&report.weekly_summaries, output_path)?
            }
            (ExportType::WeeklySummaries, ExportFormat::Json) => {
                json::export_json(&report.weekly_summaries, output_path)?
            }
            (ExportType::TrainingReport, ExportFormat::Json) => {
                json::export_training_report(report, output_path)?
            }
            (ExportType::TrainingReport, ExportFormat::Csv) => {
                return Err(ImportExportError::UnsupportedFormat {
                    format: "csv training report".to_string(),
                }
                .into());
            }
        }

        info!(
            path = %output_path.display(),
            export_type = ?export_type,
            format = ?format,
            "Export written"
        );
        Ok(())
    }
}
