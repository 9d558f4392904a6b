use chrono::{NaiveDate, TimeZone, Utc};
use marathon_tracker::config::AppConfig;
use marathon_tracker::export::{ExportFormat, ExportManager, ExportType, TrainingReport};
use marathon_tracker::import::ImportManager;
use marathon_tracker::insights::InsightSeverity;
use marathon_tracker::models::{CompletionStatus, DayName, WorkoutCompletion};
use marathon_tracker::{
    compute_rolling_stats, compute_training_metrics, compute_weekly_summary, generate_insights,
    CompletionStore, JsonFileStore, MarathonPlan, PlanRepository, TrendDirection,
    WeeklySummaryCalculator,
};
use rust_decimal_macros::dec;
use tempfile::tempdir;

/// Integration tests that exercise the complete tracker workflows

fn complete(week: u8, day: DayName, distance: &str, duration: &str) -> WorkoutCompletion {
    let mut completion = WorkoutCompletion::new(week, day, CompletionStatus::Complete);
    completion.distance = Some(distance.to_string());
    completion.duration = Some(duration.to_string());
    completion
}

/// Log every planned workout of weeks 1..=weeks, `miles` per run
fn log_full_weeks(store: &mut dyn CompletionStore, weeks: u8, miles: impl Fn(u8) -> &'static str) {
    let plan = MarathonPlan;
    for week in 1..=weeks {
        for (day, workout) in plan.week_schedule(week) {
            if workout.category.is_rest() {
                continue;
            }
            store.upsert(complete(week, day, miles(week), "40:00")).unwrap();
        }
    }
}

#[test]
fn test_first_week_partial_log() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path().join("completions.json")).unwrap();

    store.upsert(complete(1, DayName::Monday, "3.1", "28:00")).unwrap();
    store.upsert(complete(1, DayName::Wednesday, "4.0", "36:00")).unwrap();
    store.upsert(complete(1, DayName::Saturday, "10.2", "1:32:00")).unwrap();

    let completions = store.all_completions();
    let summary = compute_weekly_summary(1, &completions);

    assert_eq!(summary.completed_workouts, 3);
    assert_eq!(summary.adherence_rate, dec!(50));
    assert_eq!(summary.total_distance, dec!(17.3));
    assert_eq!(summary.total_duration_seconds, 28 * 60 + 36 * 60 + 92 * 60);
    assert_eq!(summary.intensity_score, dec!(6.5));

    let metrics = compute_training_metrics(&completions, 1);
    assert_eq!(metrics.total_workouts, 3);
    assert_eq!(metrics.current_streak, 1);
    assert_eq!(metrics.longest_streak, 1);
    assert_eq!(metrics.consistency_score, dec!(100));
    assert_eq!(metrics.weekly_trend, TrendDirection::Stable);

    let insights = generate_insights(&completions, 1, &metrics, &[summary]);
    let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
    // 17.3 miles is past the 10-mile celebration window
    assert_eq!(titles, vec!["Consistent Runner"]);
}

#[test]
fn test_perfect_block_of_training() {
    let dir = tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path().join("completions.json")).unwrap();
    log_full_weeks(&mut store, 6, |week| if week <= 3 { "4" } else { "5" });

    let completions = store.all_completions();
    let metrics = compute_training_metrics(&completions, 6);

    assert_eq!(metrics.total_workouts, 36);
    assert_eq!(metrics.adherence_rate, dec!(100));
    assert_eq!(metrics.current_streak, 36);
    assert_eq!(metrics.longest_streak, 36);
    assert_eq!(metrics.volume_change, dec!(25));

    let summaries = WeeklySummaryCalculator::new(&MarathonPlan).summarize_through(6, &completions);
    let insights = generate_insights(&completions, 6, &metrics, &summaries);
    let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();

    assert!(titles.contains(&"Outstanding Consistency"));
    assert!(titles.contains(&"36-Day Streak!"));
    assert!(insights.iter().all(|i| i.severity == InsightSeverity::Success));
}

#[test]
fn test_rolling_windows_follow_completion_time() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();
    let mut recent = complete(5, DayName::Tuesday, "6", "50:00");
    recent.completed_at = Some(now - chrono::Duration::days(2));
    let mut older = complete(3, DayName::Tuesday, "4", "35:00");
    older.completed_at = Some(now - chrono::Duration::days(20));

    let completions = marathon_tracker::models::completions_from(vec![recent, older]);
    let stats = compute_rolling_stats(
        &completions,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        Some(now),
    );

    assert_eq!(stats.last_7_days.distance, dec!(6));
    assert_eq!(stats.last_14_days.workouts, 1);
    assert_eq!(stats.last_28_days.distance, dec!(10));
    assert_eq!(stats.last_28_days.duration_seconds, 85 * 60);
}

#[test]
fn test_import_then_export_round_trip() {
    let dir = tempdir().unwrap();

    let mut config = AppConfig::default();
    config.settings.data_dir = dir.path().to_path_buf();
    config.set("settings.training_start", "2024-01-01").unwrap();

    let export_path = dir.path().join("activities.json");
    std::fs::write(
        &export_path,
        r#"[
            {"name": "Intervals", "type": "Run", "start_date": "2024-01-08T12:00:00Z",
             "distance": 6437.376, "moving_time": 2700, "average_heartrate": 160},
            {"name": "Tempo", "type": "Run", "start_date": "2024-01-13T13:00:00Z",
             "distance": 17702.784, "moving_time": 6300}
        ]"#,
    )
    .unwrap();

    let manager = ImportManager::new(config.calendar());
    let imported = manager.import_file(&export_path).unwrap();
    assert_eq!(imported.len(), 2);

    let mut store = JsonFileStore::open(config.completions_path()).unwrap();
    assert_eq!(store.upsert_all(imported).unwrap(), 2);

    let completions = store.all_completions();
    let tempo_run = store.get(2, DayName::Saturday).unwrap();
    assert_eq!(tempo_run.distance.as_deref(), Some("11.00"));
    assert_eq!(tempo_run.duration.as_deref(), Some("1:45:00"));

    let now = Utc.with_ymd_and_hms(2024, 1, 14, 18, 0, 0).unwrap();
    let today = now.date_naive();
    let week = config.current_week(today);
    assert_eq!(week, 2);

    let report = TrainingReport::generate(&MarathonPlan, &completions, week, config.calendar(), now);
    assert_eq!(report.weekly_summaries[1].completed_workouts, 2);
    assert_eq!(report.rolling.as_ref().map(|r| r.last_7_days.workouts), Some(2));

    let exporter = ExportManager::new();
    let csv_path = dir.path().join("log.csv");
    exporter
        .export(&completions, &report, ExportType::Completions, ExportFormat::Csv, &csv_path)
        .unwrap();
    let report_path = dir.path().join("report.json");
    exporter
        .export(&completions, &report, ExportType::TrainingReport, ExportFormat::Json, &report_path)
        .unwrap();

    // The exported log re-imports into the same snapshot, apart from store-assigned ids
    let reimported = ImportManager::new(None).import_file(&csv_path).unwrap();
    let mut expected: Vec<WorkoutCompletion> = completions.values().cloned().collect();
    for completion in &mut expected {
        completion.id = None;
    }
    assert_eq!(reimported, expected);

    let report_json = std::fs::read_to_string(&report_path).unwrap();
    let parsed: TrainingReport = serde_json::from_str(&report_json).unwrap();
    assert_eq!(parsed.insights.len(), report.insights.len());
}
