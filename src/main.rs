use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{error, info, warn};

use marathon_tracker::config::{AppConfig, CONFIG_KEYS};
use marathon_tracker::error::{ErrorSeverity, TrackerError};
use marathon_tracker::export::{ExportFormat, ExportManager, ExportType, TrainingReport};
use marathon_tracker::import::ImportManager;
use marathon_tracker::insights::{Insight, InsightContext, InsightGenerator, InsightSeverity};
use marathon_tracker::logging::init_logging;
use marathon_tracker::metrics::TrainingMetricsCalculator;
use marathon_tracker::models::{
    CompletionStatus, Completions, DayName, SlotKey, WorkoutCompletion, LAST_WEEK,
};
use marathon_tracker::parsers::{format_duration, format_pace};
use marathon_tracker::plan::{MarathonPlan, PlanRepository};
use marathon_tracker::rolling::{RollingWindowCalculator, WindowStats};
use marathon_tracker::store::{CompletionStore, JsonFileStore};
use marathon_tracker::summary::{WeeklySummary, WeeklySummaryCalculator};

/// marathon-tracker - 16-week marathon training log and analytics
///
/// Records how each workout of the plan went and turns the log into weekly
/// summaries, training metrics, rolling windows and coaching insights.
#[derive(Parser)]
#[command(name = "marathon-tracker")]
#[command(version)]
#[command(about = "Marathon training log and analytics", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the training plan with completion status
    Plan {
        /// Only this week
        #[arg(short, long)]
        week: Option<u8>,
    },

    /// Record how a planned workout went
    Log {
        /// Plan week (1-16)
        week: u8,

        /// Day of the week (monday, tue, ...)
        day: DayName,

        /// complete, partial or incomplete
        #[arg(short, long, default_value = "complete")]
        status: CompletionStatus,

        /// Distance in miles
        #[arg(long)]
        distance: Option<String>,

        /// Duration as MM:SS, H:MM:SS or minutes
        #[arg(long)]
        duration: Option<String>,

        /// Pace per mile as M:SS
        #[arg(long)]
        pace: Option<String>,

        #[arg(long)]
        elevation: Option<String>,

        #[arg(long)]
        heart_rate: Option<String>,

        /// Perceived effort (1-10)
        #[arg(long)]
        effort: Option<u8>,

        #[arg(long)]
        weather: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Date the workout was run (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete the record for a plan slot
    Remove {
        week: u8,
        day: DayName,
    },

    /// Weekly summary for one week, or every week so far
    Summary {
        /// Week to summarize (defaults to the current week)
        #[arg(short, long)]
        week: Option<u8>,

        /// Show all weeks up to the current week
        #[arg(short, long)]
        all: bool,
    },

    /// Whole-plan training metrics
    Metrics {
        /// Treat this as the current week
        #[arg(short, long)]
        week: Option<u8>,
    },

    /// Distance and time over the last 7, 14 and 28 days
    Rolling,

    /// Coaching insights for the current state of training
    Insights {
        /// Treat this as the current week
        #[arg(short, long)]
        week: Option<u8>,
    },

    /// Import completions from a CSV log, an activity export, or a directory
    Import {
        /// File or directory to import
        path: PathBuf,

        /// Show what would be imported without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Export the log or the analytics
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (csv, json)
        #[arg(short = 'f', long, default_value = "json")]
        format: ExportFormat,

        /// What to export (completions, weekly-summaries, report)
        #[arg(short = 't', long = "type", default_value = "report")]
        export_type: ExportType,

        /// Treat this as the current week
        #[arg(short, long)]
        week: Option<u8>,
    },

    /// Configure application settings
    Config {
        /// List all configuration options
        #[arg(short, long)]
        list: bool,

        /// Set a configuration value (key=value)
        #[arg(short, long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(short, long)]
        get: Option<String>,
    },
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Week")]
    week: u8,
    #[tabled(rename = "Day")]
    day: &'static str,
    #[tabled(rename = "Workout")]
    title: &'static str,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Distance")]
    distance: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Week")]
    week: u8,
    #[tabled(rename = "Done")]
    done: String,
    #[tabled(rename = "Adherence")]
    adherence: String,
    #[tabled(rename = "Miles")]
    distance: String,
    #[tabled(rename = "Time")]
    duration: String,
    #[tabled(rename = "Avg Pace")]
    pace: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
}

impl From<&WeeklySummary> for SummaryRow {
    fn from(summary: &WeeklySummary) -> Self {
        SummaryRow {
            week: summary.week,
            done: format!("{}/{}", summary.completed_workouts, summary.planned_workouts),
            adherence: percent(summary.adherence_rate),
            distance: summary.total_distance.round_dp(2).to_string(),
            duration: format_duration(summary.total_duration_seconds),
            pace: pace_text(summary.avg_pace_seconds),
            intensity: summary.intensity_score.round_dp(1).to_string(),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Metric")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "Window")]
    window: &'static str,
    #[tabled(rename = "Workouts")]
    workouts: u32,
    #[tabled(rename = "Miles")]
    distance: String,
    #[tabled(rename = "Time")]
    duration: String,
}

impl WindowRow {
    fn new(window: &'static str, stats: &WindowStats) -> Self {
        WindowRow {
            window,
            workouts: stats.workouts,
            distance: stats.distance.round_dp(2).to_string(),
            duration: format_duration(stats.duration_seconds),
        }
    }
}

fn percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(1))
}

fn pace_text(seconds: Decimal) -> String {
    use rust_decimal::prelude::ToPrimitive;
    match seconds.round().to_u32() {
        Some(0) | None => "-".to_string(),
        Some(s) => format!("{}/mi", format_pace(s)),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    println!("{}", Table::new(rows).with(Style::rounded()));
}

/// Log a library error at its severity and convert it for display
fn report_error(err: TrackerError) -> anyhow::Error {
    match err.severity() {
        ErrorSeverity::Critical | ErrorSeverity::Error => error!(error = %err, "Command failed"),
        ErrorSeverity::Warning => warn!(error = %err, "Command rejected"),
        ErrorSeverity::Info => info!(error = %err, "Command stopped"),
    }
    anyhow!(err.user_message())
}

fn open_store(config: &AppConfig) -> Result<JsonFileStore> {
    JsonFileStore::open(config.completions_path()).map_err(report_error)
}

fn check_week(week: u8) -> Result<u8> {
    if (1..=LAST_WEEK).contains(&week) {
        Ok(week)
    } else {
        bail!("Week must be between 1 and {} (got {})", LAST_WEEK, week)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(Some(&config_path))
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.raised_by(cli.verbose);
    init_logging(&log_config)?;

    let today = Local::now().date_naive();
    let current_week = |requested: Option<u8>| -> Result<u8> {
        match requested {
            Some(week) => check_week(week),
            None => Ok(config.current_week(today)),
        }
    };

    match cli.command {
        Commands::Plan { week } => {
            let weeks = match week {
                Some(week) => check_week(week)?..=week,
                None => 1..=LAST_WEEK,
            };
            let completions = open_store(&config)?.all_completions();
            show_plan(weeks, &completions);
        }

        Commands::Log {
            week,
            day,
            status,
            distance,
            duration,
            pace,
            elevation,
            heart_rate,
            effort,
            weather,
            notes,
            date,
        } => {
            let mut store = open_store(&config)?;
            let mut completion = WorkoutCompletion::new(week, day, status);
            completion.distance = distance;
            completion.duration = duration;
            completion.pace = pace;
            completion.elevation = elevation;
            completion.heart_rate = heart_rate;
            completion.effort = effort;
            completion.weather = weather;
            completion.notes = notes;
            completion.date = date.or_else(|| config.calendar().map(|c| c.date_of(week, day)));

            let stored = store.upsert(completion).map_err(report_error)?;
            let title = MarathonPlan
                .workout(week, day)
                .map(|workout| workout.title)
                .unwrap_or("Workout");
            println!(
                "{} {} ({}): {}",
                "✓ Logged".green().bold(),
                SlotKey::new(week, day),
                title,
                stored.status
            );
        }

        Commands::Remove { week, day } => {
            let mut store = open_store(&config)?;
            match store.delete(week, day).map_err(report_error)? {
                Some(_) => println!("{} {}", "✓ Removed".green(), SlotKey::new(week, day)),
                None => println!("{} {}", "Nothing logged for".yellow(), SlotKey::new(week, day)),
            }
        }

        Commands::Summary { week, all } => {
            let week = current_week(week)?;
            let completions = open_store(&config)?.all_completions();
            let calculator = WeeklySummaryCalculator::new(&MarathonPlan);

            if all {
                let rows: Vec<SummaryRow> = calculator
                    .summarize_through(week, &completions)
                    .iter()
                    .map(SummaryRow::from)
                    .collect();
                print_table(rows);
            } else {
                let summary = calculator.summarize(week, &completions);
                println!("{}", format!("Week {} summary", week).cyan().bold());
                print_table(summary_fields(&summary));
            }
        }

        Commands::Metrics { week } => {
            let week = current_week(week)?;
            let completions = open_store(&config)?.all_completions();
            let metrics = TrainingMetricsCalculator::new(&MarathonPlan).calculate(&completions, week);

            println!("{}", format!("Training metrics through week {}", week).cyan().bold());
            print_table(vec![
                FieldRow { name: "Workouts", value: metrics.total_workouts.to_string() },
                FieldRow { name: "Total distance", value: format!("{} mi", metrics.total_distance.round_dp(2)) },
                FieldRow { name: "Total time", value: format_duration(metrics.total_duration_seconds) },
                FieldRow { name: "Avg weekly distance", value: format!("{} mi", metrics.avg_weekly_distance.round_dp(2)) },
                FieldRow { name: "Adherence", value: percent(metrics.adherence_rate) },
                FieldRow { name: "Current streak", value: metrics.current_streak.to_string() },
                FieldRow { name: "Longest streak", value: metrics.longest_streak.to_string() },
                FieldRow { name: "Volume change", value: percent(metrics.volume_change) },
                FieldRow { name: "Consistency", value: percent(metrics.consistency_score) },
                FieldRow { name: "Trend", value: metrics.weekly_trend.as_str().to_string() },
            ]);
        }

        Commands::Rolling => {
            let completions = open_store(&config)?.all_completions();
            let start = config.calendar().map(|c| c.start()).unwrap_or(today);
            let stats = RollingWindowCalculator::new(start).compute(&completions);

            print_table(vec![
                WindowRow::new("7 days", &stats.last_7_days),
                WindowRow::new("14 days", &stats.last_14_days),
                WindowRow::new("28 days", &stats.last_28_days),
            ]);
        }

        Commands::Insights { week } => {
            let week = current_week(week)?;
            let completions = open_store(&config)?.all_completions();
            let summaries =
                WeeklySummaryCalculator::new(&MarathonPlan).summarize_through(week, &completions);
            let metrics = TrainingMetricsCalculator::new(&MarathonPlan).calculate(&completions, week);
            let context = InsightContext::new(&completions, week, &metrics, &summaries);
            let insights = InsightGenerator::new().generate(&context);

            if insights.is_empty() {
                println!("{}", "No insights yet. Keep logging workouts!".dimmed());
            }
            for insight in &insights {
                print_insight(insight);
            }
        }

        Commands::Import { path, dry_run } => {
            let calendar = config.calendar();
            if calendar.is_none() && path.extension().is_some_and(|ext| ext == "json") {
                bail!(
                    "Activity exports need a training start date. Run: marathon-tracker config --set settings.training_start=YYYY-MM-DD"
                );
            }

            let manager = ImportManager::new(calendar);
            let completions = import_path(&manager, &path).map_err(report_error)?;

            if dry_run {
                println!("{} {} completions", "Would import".yellow(), completions.len());
                for completion in &completions {
                    println!("  {} {}", completion.key(), completion.status);
                }
            } else {
                let mut store = open_store(&config)?;
                let count = store.upsert_all(completions).map_err(report_error)?;
                println!("{} {} completions", "✓ Imported".green().bold(), count);
            }
        }

        Commands::Export {
            output,
            format,
            export_type,
            week,
        } => {
            let week = current_week(week)?;
            let completions = open_store(&config)?.all_completions();
            let report =
                TrainingReport::generate(&MarathonPlan, &completions, week, config.calendar(), Utc::now());

            ExportManager::new()
                .export(&completions, &report, export_type, format, &output)
                .map_err(report_error)?;
            println!("{} {}", "✓ Exported to".green().bold(), output.display());
        }

        Commands::Config { list, set, get } => {
            if let Some(key_value) = set {
                let (key, value) = key_value
                    .split_once('=')
                    .ok_or_else(|| anyhow!("Expected key=value, got '{}'", key_value))?;
                config.set(key.trim(), value)?;
                config.save_to_file(&config_path)?;
                println!("{} {} = {}", "✓ Set".green(), key.trim(), config.get(key.trim())?);
            } else if let Some(key) = get {
                println!("{}", config.get(&key)?);
            } else if list {
                for key in CONFIG_KEYS {
                    println!("{} = {}", key.bold(), config.get(key)?);
                }
            } else {
                println!("Config file: {}", config_path.display());
                println!("Completion log: {}", config.completions_path().display());
            }
        }
    }

    Ok(())
}

fn show_plan(weeks: std::ops::RangeInclusive<u8>, completions: &Completions) {
    let mut rows = Vec::new();
    for week in weeks {
        for (day, workout) in MarathonPlan.week_schedule(week) {
            let completion = completions.get(&SlotKey::new(week, day));
            let status = match completion.map(|c| c.status) {
                Some(CompletionStatus::Complete) => "✓",
                Some(CompletionStatus::Partial) => "~",
                Some(CompletionStatus::Incomplete) => "✗",
                None => "",
            };
            rows.push(PlanRow {
                week,
                day: day.full_name(),
                title: workout.title,
                category: workout.category.as_str(),
                status,
                distance: completion
                    .and_then(|c| c.distance.clone())
                    .unwrap_or_default(),
            });
        }
    }
    print_table(rows);
}

fn summary_fields(summary: &WeeklySummary) -> Vec<FieldRow> {
    let optional = |value: Option<Decimal>| {
        value
            .map(|v| v.round_dp(1).to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    vec![
        FieldRow {
            name: "Completed",
            value: format!("{} of {}", summary.completed_workouts, summary.planned_workouts),
        },
        FieldRow { name: "Adherence", value: percent(summary.adherence_rate) },
        FieldRow { name: "Distance", value: format!("{} mi", summary.total_distance.round_dp(2)) },
        FieldRow { name: "Time", value: format_duration(summary.total_duration_seconds) },
        FieldRow { name: "Avg pace", value: pace_text(summary.avg_pace_seconds) },
        FieldRow { name: "Avg heart rate", value: optional(summary.avg_heart_rate) },
        FieldRow { name: "Avg effort", value: optional(summary.avg_effort) },
        FieldRow { name: "Intensity", value: summary.intensity_score.round_dp(1).to_string() },
        FieldRow { name: "Recovery days", value: summary.recovery_days.to_string() },
    ]
}

fn print_insight(insight: &Insight) {
    let title = match insight.severity {
        InsightSeverity::Critical => insight.title.red().bold(),
        InsightSeverity::Warning => insight.title.yellow().bold(),
        InsightSeverity::Success => insight.title.green().bold(),
        InsightSeverity::Info => insight.title.blue().bold(),
    };
    println!("{} [{}]", title, insight.severity.as_str().dimmed());
    println!("  {}", insight.message);
}

fn import_path(
    manager: &ImportManager,
    path: &Path,
) -> marathon_tracker::Result<Vec<WorkoutCompletion>> {
    if path.is_dir() {
        manager.import_directory(path)
    } else {
        manager.import_file(path)
    }
}
