// Library interface for marathon-tracker
// The CLI, integration tests and benchmarks all go through these modules

pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod insights;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod parsers;
pub mod plan;
pub mod rolling;
pub mod store;
pub mod summary;

// Re-export commonly used types for convenience
pub use calendar::TrainingCalendar;
pub use error::{Result, TrackerError};
pub use insights::{generate_insights, Insight, InsightCategory, InsightGenerator, InsightSeverity};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use metrics::{compute_training_metrics, TrainingMetrics, TrainingMetricsCalculator, TrendDirection};
pub use models::*;
pub use plan::{MarathonPlan, PlanRepository};
pub use rolling::{compute_rolling_stats, RollingStats, RollingWindowCalculator, WindowStats};
pub use store::{CompletionStore, JsonFileStore, MemoryStore};
pub use summary::{compute_weekly_summary, WeeklySummary, WeeklySummaryCalculator};
