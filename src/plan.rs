//! The fixed 16-week marathon plan
//!
//! The analytics layer reads the plan through [`PlanRepository`] so that
//! calculators can be exercised against alternative calendars in tests.

use crate::models::{DayName, Workout, WorkoutCategory, WorkoutType, FIRST_WEEK, LAST_WEEK};

use WorkoutCategory as C;
use WorkoutType as T;

/// Read-only lookup of planned workouts by week and day
pub trait PlanRepository {
    /// Workout planned for a slot, `None` for weeks outside the plan
    fn workout(&self, week: u8, day: DayName) -> Option<&Workout>;

    /// Number of weeks in the plan
    fn total_weeks(&self) -> u8;

    /// Whether the plan has any entry for this week
    fn has_week(&self, week: u8) -> bool {
        self.workout(week, DayName::Monday).is_some()
    }

    /// Count of non-rest days planned for a week
    fn planned_workouts(&self, week: u8) -> u8 {
        DayName::ALL
            .iter()
            .filter_map(|&day| self.workout(week, day))
            .filter(|workout| !workout.category.is_rest())
            .count() as u8
    }

    /// All seven days of a week paired with their workouts
    fn week_schedule(&self, week: u8) -> Vec<(DayName, &Workout)> {
        DayName::ALL
            .iter()
            .filter_map(|&day| self.workout(week, day).map(|workout| (day, workout)))
            .collect()
    }
}

/// The built-in 16-week marathon calendar
#[derive(Debug, Clone, Copy, Default)]
pub struct MarathonPlan;

impl MarathonPlan {
    pub fn new() -> Self {
        MarathonPlan
    }
}

impl PlanRepository for MarathonPlan {
    fn workout(&self, week: u8, day: DayName) -> Option<&Workout> {
        if !(FIRST_WEEK..=LAST_WEEK).contains(&week) {
            return None;
        }
        PLAN.get(usize::from(week - FIRST_WEEK))
            .map(|days| &days[day.index()])
    }

    fn total_weeks(&self) -> u8 {
        LAST_WEEK
    }
}

const fn workout(
    workout_type: WorkoutType,
    title: &'static str,
    details: &'static str,
    category: WorkoutCategory,
) -> Workout {
    Workout {
        workout_type,
        title,
        details,
        category,
    }
}

const RECOVERY_JOG: Workout = workout(
    T::Recovery,
    "20-30min Jog",
    "20-30min: Jog – or – 30min: Cross-train\n\nStrength",
    C::Recovery,
);

const REST: Workout = workout(T::Rest, "Rest", "Rest – or – Fun active play", C::Rest);

#[rustfmt::skip]
static PLAN: [[Workout; 7]; LAST_WEEK as usize] = [
    // Week 1
    [
        workout(T::Intervals, "5min Intervals x3", "5min intervals X 3\n• 1-2min walk/jog between intervals\n• Goal: 2 miles at 10K pace\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "30-40min Aerobic", "30-40min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "40min Jog", "40min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "60min Long Run", "60min: Long run", C::Long),
        REST,
    ],
    // Week 2
    [
        workout(T::Fartlek, "30min Fartlek", "30min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "40-45min Aerobic", "40-45 min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "40min Jog", "40min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "40min Tempo", "40min: Tempo run\nGo out easy, finish fast & strong", C::Tempo),
        REST,
    ],
    // Week 3
    [
        workout(T::Hills, "45min Hilly Run", "45min: Hilly run\nQuicker on the uphills. Practice opening your stride, increasing turnover and relaxing legs on the downhills.\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "40-45min Aerobic", "40-45min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "40min Jog", "40min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "60-70min Long Run", "60-70min: Long run", C::Long),
        REST,
    ],
    // Week 4
    [
        workout(T::Intervals, "4min Intervals x4", "4min intervals X 4\n• 1-2min walk/jog between intervals\n• Goal: 2-3 miles at 10K pace\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "45-50min Aerobic", "45-50min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "45min Jog", "45min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "50min Tempo", "50min: Tempo run\nGo out easy, finish fast & strong\n\nDrills – and/or – strides", C::Tempo),
        REST,
    ],
    // Week 5
    [
        workout(T::Fartlek, "45min Fartlek", "45min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "50-55min Aerobic", "50-55min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "45min Jog", "45min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "90min Long Run", "90min: Long run", C::Long),
        REST,
    ],
    // Week 6
    [
        workout(T::Fartlek, "50min Fartlek", "50min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "40-45min Aerobic", "40-45min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "45min Jog", "45min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "55min Tempo", "55min: Tempo run\nGo out easy, finish fast & strong\n\nDrills – and/or – strides", C::Tempo),
        REST,
    ],
    // Week 7
    [
        workout(T::Intervals, "5-6min Intervals x4", "5-6min intervals X 4\n• 1-2min walk/jog between intervals\n• Goal: approx. 3 miles at 10K pace\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "50-55min Aerobic", "50-55min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50min Jog", "50min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "100-120min Long Run", "100-120min: Long run", C::Long),
        REST,
    ],
    // Week 8
    [
        workout(T::Fartlek, "40-45min Fartlek", "40-45min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "60min Aerobic", "60min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50min Jog", "50min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "60-90min Long Run", "60-90min: Long run", C::Long),
        REST,
    ],
    // Week 9
    [
        workout(T::Fartlek, "40-45min Fartlek", "40-45min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "60min Aerobic", "60min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50min Jog", "50min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "55min Tempo", "55min: Tempo run\nGo out easy, finish fast & strong\n\nDrills – and/or – strides", C::Tempo),
        REST,
    ],
    // Week 10
    [
        workout(T::Intervals, "8min Intervals x3", "8min intervals X 3\n• Goal: approx. 3 miles at 10K pace\n• 1-2min walk/jog between intervals\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "70min Aerobic", "70min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50-60min Jog", "50-60min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "100-120min Long Run", "100-120min: Long run", C::Long),
        REST,
    ],
    // Week 11
    [
        workout(T::Fartlek, "50-55min Fartlek", "50-55min: Fartlek – or – hill run\n\nDrills – and/or – Strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "70min Aerobic", "70min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50-60min Jog", "50-60min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "60min Tempo", "60min: Tempo run\nGo out easy, finish fast & strong\n\nDrills – and/or – strides", C::Tempo),
        REST,
    ],
    // Week 12
    [
        workout(T::Fartlek, "45-50min Fartlek", "45-50min: Fartlek – or – hill run\n\nDrills – and/or – Strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "60min Aerobic", "60min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50-60min Jog", "50-60min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "120min Long Run", "120min: Long run", C::Long),
        REST,
    ],
    // Week 13
    [
        workout(T::Intervals, "5-6min Intervals x4", "5-6min intervals X 4\n• 1-2min walk/jog between intervals\n• Goal: approx. 3 miles at 10K pace\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "75min Aerobic", "75min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50-60min Jog", "50-60min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "55min Tempo", "55min: Tempo run\nGo out easy, finish fast and strong\n\nDrills – and/or – strides", C::Tempo),
        REST,
    ],
    // Week 14
    [
        workout(T::Fartlek, "45-50min Fartlek", "45-50min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "70min Aerobic", "70min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "50min Jog", "50min: Jog\n\nDrills", C::Aerobic),
        workout(T::Long, "90min Long Run", "90min: Long run", C::Long),
        REST,
    ],
    // Week 15
    [
        workout(T::Fartlek, "45-50min Fartlek", "45-50min: Fartlek – or – hill run\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "45-50min Aerobic", "45-50min: Aerobic run\n\nStrides", C::Aerobic),
        RECOVERY_JOG,
        workout(T::Jog, "40min Jog", "40min: Jog\n\nDrills", C::Aerobic),
        workout(T::Tempo, "45-50min Tempo", "45-50min: Tempo run\nGo out easy, finish fast and strong\n\nDrills – and/or – strides", C::Tempo),
        REST,
    ],
    // Week 16
    [
        workout(T::Intervals, "4min Intervals x3", "4min intervals X 3\n• 2-3min walk/jog between intervals\n• Stay relaxed, keeping some speed in taper\n\nDrills – and/or – strides", C::Speed),
        RECOVERY_JOG,
        workout(T::Aerobic, "30min Aerobic", "30min: Aerobic run\n\nStrides", C::Aerobic),
        workout(T::Rest, "Rest", "Rest", C::Rest),
        workout(T::Jog, "30min Easy", "30min: Easy run\n\nStrides", C::Aerobic),
        workout(T::Rest, "Rest", "Rest", C::Rest),
        workout(T::Race, "Marathon Day!", "Marathon Day!\n\nYou've trained for this. Trust your preparation and run YOUR race.", C::Race),
    ],
];
