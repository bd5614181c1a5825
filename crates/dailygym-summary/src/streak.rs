//! Consecutive-practice streak
//!
//! Walks backward one day at a time from today, bounded by the horizon.
//! A missing log for today does not break the streak; the walk just starts
//! from yesterday. The first gap after that ends it.

use chrono::{Local, NaiveDate};

use dailygym_core::{format_date_key, Streak, STREAK_HORIZON_DAYS};
use dailygym_logbook::LogStore;

/// Compute the streak as of `today`
pub async fn streak(store: &LogStore, today: NaiveDate) -> Streak {
    let mut current = today;
    let mut streak_days = 0;
    let mut last_learning_date: Option<String> = None;

    for i in 0..STREAK_HORIZON_DAYS {
        let key = format_date_key(current);
        if store.has_log(&key).await {
            if last_learning_date.is_none() {
                last_learning_date = Some(key);
            }
            streak_days += 1;
        } else if i > 0 {
            break;
        }
        let Some(prev) = current.pred_opt() else {
            break;
        };
        current = prev;
    }

    Streak {
        streak_days,
        last_learning_date,
    }
}

/// Streak as of the local wall-clock date
pub async fn streak_today(store: &LogStore) -> Streak {
    streak(store, Local::now().date_naive()).await
}
