//! Daily English Gym Summary - streaks and weekly aggregation

mod streak;
mod weekly;

pub use streak::{streak, streak_today};
pub use weekly::{
    empty_week_analysis, failed_week_analysis, week_end, week_start, weekly_summary,
    weekly_summary_today, AnalyzerError, WeeklyAnalyzer,
};
