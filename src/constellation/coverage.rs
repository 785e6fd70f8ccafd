use chrono::{DateTime, Duration, Utc};

use crate::constellation::types::CoverageWindow;
use crate::predict::Pass;

/// Clips passes to `[start, end]` and merges overlapping or touching ones.
///
/// The result is sorted, and no two windows overlap or touch.
pub fn merge_windows(
    passes: &[Pass],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<CoverageWindow> {
    let mut intervals: Vec<(DateTime<Utc>, DateTime<Utc>)> = passes
        .iter()
        .map(|p| (p.start.max(start), p.end.min(end)))
        .filter(|(s, e)| s < e)
        .collect();
    intervals.sort();

    let mut merged: Vec<CoverageWindow> = Vec::new();
    for (s, e) in intervals {
        match merged.last_mut() {
            Some(current) if s <= current.end => {
                current.end = current.end.max(e);
            }
            _ => merged.push(CoverageWindow { start: s, end: e }),
        }
    }
    merged
}

pub fn covered(windows: &[CoverageWindow]) -> Duration {
    windows
        .iter()
        .fold(Duration::zero(), |acc, w| acc + w.duration())
}

/// Share of `horizon` spent inside `windows`, in percent.
pub fn coverage_percent(windows: &[CoverageWindow], horizon: Duration) -> f64 {
    let horizon_ms = horizon.num_milliseconds();
    if horizon_ms <= 0 {
        return 0.0;
    }
    covered(windows).num_milliseconds() as f64 / horizon_ms as f64 * 100.0
}
