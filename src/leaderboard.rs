use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-day capture of a player's cumulative stats. One row per calendar
/// day, overwritten when re-taken the same day.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Snapshot {
    pub total_points: u64,
    pub total_clicks: u64,
    pub unique_rarities: u32,
    pub completion_percent: f64,
}

/// Everything the ranking needs about one player, assembled by the store.
#[derive(Clone, Debug)]
pub struct PlayerRow {
    pub player_id: Uuid,
    pub username: String,
    pub banned: bool,
    pub snapshots: HashMap<NaiveDate, Snapshot>,
    pub total_points: u64,
    pub unique_rarities: u32,
    pub completion_percent: f64,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    AllTime,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: Uuid,
    pub username: String,
    pub unique_rarities: u32,
    pub total_points: u64,
    pub completion_percent: f64,
    pub percent_change: f64,
}

/// Monday of the current week, UTC calendar.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - chrono::Days::new(today.weekday().num_days_from_monday() as u64)
}

/// First of the current month, UTC calendar.
pub fn month_start(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn baseline_date(period: Period, today: NaiveDate) -> Option<NaiveDate> {
    match period {
        Period::Daily => today.pred_opt(),
        Period::Weekly => Some(week_start(today)),
        Period::Monthly => Some(month_start(today)),
        Period::AllTime => None,
    }
}

/// Ranked list for a period. Banned players never appear. Delta periods
/// rank by completion gained since the baseline snapshot (missing sides
/// count as 0); weekly and monthly deltas are floored at 0 for display.
/// All-time ranks by unique rarities, tie-broken by total points.
pub fn top(rows: &[PlayerRow], period: Period, today: NaiveDate, limit: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = match period {
        Period::AllTime => rows
            .iter()
            .filter(|row| !row.banned)
            .map(|row| LeaderboardEntry {
                rank: 0,
                player_id: row.player_id,
                username: row.username.clone(),
                unique_rarities: row.unique_rarities,
                total_points: row.total_points,
                completion_percent: row.completion_percent,
                percent_change: 0.0,
            })
            .collect(),
        _ => {
            let baseline = baseline_date(period, today);
            rows.iter()
                .filter(|row| !row.banned)
                .filter(|row| !row.snapshots.is_empty())
                .map(|row| {
                    let current = row.snapshots.get(&today).copied().unwrap_or_default();
                    let base = baseline
                        .and_then(|d| row.snapshots.get(&d))
                        .copied()
                        .unwrap_or_default();
                    let change = current.completion_percent - base.completion_percent;
                    let display_change = match period {
                        Period::Daily => change,
                        _ => change.max(0.0),
                    };
                    LeaderboardEntry {
                        rank: 0,
                        player_id: row.player_id,
                        username: row.username.clone(),
                        unique_rarities: current
                            .unique_rarities
                            .saturating_sub(if period == Period::Daily { 0 } else { base.unique_rarities }),
                        total_points: current.total_points,
                        completion_percent: current.completion_percent,
                        percent_change: display_change,
                    }
                })
                .collect()
        }
    };

    match period {
        Period::AllTime => entries.sort_by(|a, b| {
            b.unique_rarities
                .cmp(&a.unique_rarities)
                .then(b.total_points.cmp(&a.total_points))
        }),
        _ => entries.sort_by(|a, b| {
            b.percent_change
                .partial_cmp(&a.percent_change)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    b.completion_percent
                        .partial_cmp(&a.completion_percent)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        }),
    }

    entries.truncate(limit);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as u32;
    }
    entries
}

/// 1-based rank of one player, scanning the full ordered list. None when
/// absent (banned, or never snapshotted for delta periods).
pub fn rank_of(rows: &[PlayerRow], period: Period, today: NaiveDate, player_id: Uuid) -> Option<u32> {
    top(rows, period, today, usize::MAX)
        .iter()
        .find(|entry| entry.player_id == player_id)
        .map(|entry| entry.rank)
}

/// A slice of the board centered on one player.
pub fn around(
    rows: &[PlayerRow],
    period: Period,
    today: NaiveDate,
    player_id: Uuid,
    range: usize,
) -> Vec<LeaderboardEntry> {
    let board = top(rows, period, today, usize::MAX);
    let Some(index) = board.iter().position(|e| e.player_id == player_id) else {
        return Vec::new();
    };
    let start = index.saturating_sub(range);
    let end = (index + range + 1).min(board.len());
    board[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snap(completion: f64, rarities: u32, points: u64) -> Snapshot {
        Snapshot {
            total_points: points,
            total_clicks: 0,
            unique_rarities: rarities,
            completion_percent: completion,
        }
    }

    fn row(name: &str, banned: bool, snapshots: Vec<(NaiveDate, Snapshot)>) -> PlayerRow {
        PlayerRow {
            player_id: Uuid::new_v4(),
            username: name.to_string(),
            banned,
            snapshots: snapshots.into_iter().collect(),
            total_points: 0,
            unique_rarities: 0,
            completion_percent: 0.0,
        }
    }

    #[test]
    fn daily_ranks_by_delta_then_today() {
        let today = date(2025, 6, 10);
        let yesterday = date(2025, 6, 9);

        let rows = vec![
            row("slow", false, vec![(yesterday, snap(40.0, 5, 0)), (today, snap(42.0, 6, 0))]),
            row("fast", false, vec![(yesterday, snap(10.0, 2, 0)), (today, snap(20.0, 4, 0))]),
            // Tie on delta with "slow", higher today wins the tiebreak.
            row("tied", false, vec![(yesterday, snap(50.0, 9, 0)), (today, snap(52.0, 9, 0))]),
        ];

        let board = top(&rows, Period::Daily, today, 10);
        let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["fast", "tied", "slow"]);
        assert_eq!(board[0].rank, 1);
        assert!((board[0].percent_change - 10.0).abs() < 1e-9);
    }

    #[test]
    fn missing_yesterday_counts_all_progress_as_delta() {
        let today = date(2025, 6, 10);
        let rows = vec![
            row("new", false, vec![(today, snap(15.0, 3, 0))]),
            row("old", false, vec![(date(2025, 6, 9), snap(30.0, 5, 0)), (today, snap(34.0, 5, 0))]),
        ];

        let board = top(&rows, Period::Daily, today, 10);
        assert_eq!(board[0].username, "new");
        assert!((board[0].percent_change - 15.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_baseline_is_monday_and_deltas_floor_at_zero() {
        // 2025-06-11 is a Wednesday; the week starts Monday 2025-06-09.
        let today = date(2025, 6, 11);
        assert_eq!(week_start(today), date(2025, 6, 9));

        let rows = vec![row(
            "p",
            false,
            vec![(date(2025, 6, 9), snap(30.0, 5, 0)), (today, snap(28.0, 5, 0))],
        )];

        let board = top(&rows, Period::Weekly, today, 10);
        assert_eq!(board[0].percent_change, 0.0);
    }

    #[test]
    fn monthly_baseline_is_the_first() {
        let today = date(2025, 6, 20);
        assert_eq!(month_start(today), date(2025, 6, 1));

        let rows = vec![row(
            "p",
            false,
            vec![(date(2025, 6, 1), snap(10.0, 1, 0)), (today, snap(25.0, 4, 0))],
        )];

        let board = top(&rows, Period::Monthly, today, 10);
        assert!((board[0].percent_change - 15.0).abs() < 1e-9);
        assert_eq!(board[0].unique_rarities, 3);
    }

    #[test]
    fn all_time_ranks_by_rarities_then_points() {
        let today = date(2025, 6, 10);
        let mut a = row("few_points", false, vec![]);
        a.unique_rarities = 20;
        a.total_points = 100;
        a.completion_percent = 40.0;
        let mut b = row("many_points", false, vec![]);
        b.unique_rarities = 20;
        b.total_points = 900;
        b.completion_percent = 45.0;
        let mut c = row("most_rarities", false, vec![]);
        c.unique_rarities = 30;
        c.total_points = 1;
        c.completion_percent = 60.0;

        let board = top(&[a, b, c], Period::AllTime, today, 10);
        let names: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, vec!["most_rarities", "many_points", "few_points"]);
    }

    #[test]
    fn banned_and_never_snapshotted_players_have_no_rank() {
        let today = date(2025, 6, 10);
        let banned = row("banned", true, vec![(today, snap(99.0, 30, 0))]);
        let ghost = row("ghost", false, vec![]);
        let active = row("active", false, vec![(today, snap(5.0, 1, 0))]);

        let banned_id = banned.player_id;
        let ghost_id = ghost.player_id;
        let active_id = active.player_id;
        let rows = vec![banned, ghost, active];

        assert_eq!(rank_of(&rows, Period::Daily, today, banned_id), None);
        assert_eq!(rank_of(&rows, Period::Daily, today, ghost_id), None);
        assert_eq!(rank_of(&rows, Period::Daily, today, active_id), Some(1));
    }

    #[test]
    fn around_returns_a_window_centered_on_the_player() {
        let today = date(2025, 6, 10);
        let rows: Vec<PlayerRow> = (0..9)
            .map(|i| {
                row(
                    &format!("p{i}"),
                    false,
                    vec![(today, snap(i as f64, i as u32, 0))],
                )
            })
            .collect();

        let middle = rows[4].player_id;
        let window = around(&rows, Period::Daily, today, middle, 2);
        assert_eq!(window.len(), 5);
        assert!(window.iter().any(|e| e.player_id == middle));
    }
}
