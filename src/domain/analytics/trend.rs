//! Trend direction over a daily timeline

use serde::{Deserialize, Serialize};

use super::DailyCount;

/// Days averaged as the "recent" window
const RECENT_WINDOW_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// Compares the mean of the last seven days against the mean of the days
/// before them.
///
/// `daily_counts` must be sorted oldest first. With seven days or fewer
/// both windows are the same and the trend is stable. The percentage is
/// rounded to two decimals and is 0 when the older mean is 0.
pub fn compute_trend(daily_counts: &[DailyCount]) -> (TrendDirection, f64) {
    if daily_counts.len() < 2 {
        return (TrendDirection::Stable, 0.0);
    }

    let split = daily_counts.len().saturating_sub(RECENT_WINDOW_DAYS);
    let recent = mean(&daily_counts[split..]);
    let older = if split > 0 {
        mean(&daily_counts[..split])
    } else {
        recent
    };

    let direction = if recent > older {
        TrendDirection::Up
    } else if recent < older {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    let percentage = if older > 0.0 {
        round2((recent - older) / older * 100.0)
    } else {
        0.0
    };

    (direction, percentage)
}

/// Rounds to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(days: &[DailyCount]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    days.iter().map(|day| day.count as f64).sum::<f64>() / days.len() as f64
}
