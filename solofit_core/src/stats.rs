//! Statistics derived from archived history.
//!
//! History is an insertion-ordered log, and insertion order is not assumed
//! to be chronological. Anything "latest" or "newest" sorts by `started_at`.

use crate::achievements::POINT_BADGES;
use crate::{AchievementType, CompletedSessionRecord};
use chrono::{NaiveDate, TimeZone};
use std::collections::BTreeMap;

/// Number of fully completed sessions
pub fn completed_count(history: &[CompletedSessionRecord]) -> usize {
    history.iter().filter(|r| r.completed).count()
}

/// Whole minutes across every archived session, stopped ones included
pub fn total_time_minutes(history: &[CompletedSessionRecord]) -> u32 {
    let seconds: u64 = history.iter().map(|r| u64::from(r.duration_seconds)).sum();
    u32::try_from(seconds / 60).unwrap_or(u32::MAX)
}

/// `"Xh Ym"` from an hour up, `"Ym"` below
pub fn format_total_time(minutes: u32) -> String {
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{}m", minutes)
    }
}

/// Minutes trained per local calendar day, oldest day first
///
/// Seconds are summed per day before converting, so short sessions on the
/// same day still add up.
pub fn daily_minutes<Tz: TimeZone>(
    history: &[CompletedSessionRecord],
    tz: &Tz,
) -> Vec<(NaiveDate, u32)> {
    let mut by_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for record in history {
        let day = record.started_at.with_timezone(tz).date_naive();
        *by_day.entry(day).or_default() += record.duration_seconds;
    }
    by_day
        .into_iter()
        .map(|(day, seconds)| (day, seconds / 60))
        .collect()
}

/// The session that started most recently
pub fn latest_session(history: &[CompletedSessionRecord]) -> Option<&CompletedSessionRecord> {
    history.iter().max_by_key(|r| r.started_at)
}

pub fn sessions_newest_first(history: &[CompletedSessionRecord]) -> Vec<&CompletedSessionRecord> {
    let mut sessions: Vec<_> = history.iter().collect();
    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    sessions
}

/// The next points badge still ahead of a total
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextBadge {
    pub kind: AchievementType,
    pub threshold: u32,
    pub remaining: u32,
}

/// `None` once every points badge threshold has been reached
pub fn next_points_badge(total_points: u32) -> Option<NextBadge> {
    POINT_BADGES
        .iter()
        .find(|(threshold, _)| *threshold > total_points)
        .map(|&(threshold, kind)| NextBadge {
            kind,
            threshold,
            remaining: threshold - total_points,
        })
}
