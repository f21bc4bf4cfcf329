use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::achievements::AchievementRecord;
use crate::challenges::ChallengeProgress;
use crate::completion::OwnedCounts;
use crate::errors::{GameError, GameResult};
use crate::leaderboard::{PlayerRow, Snapshot};
use crate::outbox::{Outbox, OutboxKind};
use crate::roll::ModifierState;
use crate::streaks::StreakRecord;
use crate::UnlockMethod;

/// Cumulative per-player counters. Owned exclusively by the engine layer
/// and mutated only through store closures.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct PlayerProgress {
    pub total_points: u64,
    pub total_clicks: u64,
    pub manual_clicks: u64,
    pub total_purchases: u64,
    pub owns_golden_mode: bool,
    pub completion_percent: f64,
    /// Days on which all three daily challenges were completed.
    pub daily_completions: u64,
    pub modifiers: ModifierState,
}

/// Per-(player, rarity) discovery record. At most one per pair.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RarityFind {
    pub first_found_at: DateTime<Utc>,
    pub find_count: u64,
}

/// Everything the store persists for one player. Records are created
/// lazily with zero-valued defaults and never deleted.
#[derive(Clone, Debug, Default)]
pub struct PlayerRecord {
    pub progress: PlayerProgress,
    pub rarity_finds: HashMap<String, RarityFind>,
    pub achievements: HashMap<String, AchievementRecord>,
    pub challenges: HashMap<NaiveDate, HashMap<String, ChallengeProgress>>,
    pub challenge_rewards_claimed: HashSet<NaiveDate>,
    pub streak: StreakRecord,
    pub skins: HashMap<String, UnlockMethod>,
    pub backgrounds: HashSet<String>,
    pub shop_items: HashSet<String>,
    pub snapshots: HashMap<NaiveDate, Snapshot>,
}

impl PlayerRecord {
    /// Creates or bumps the find record; true on first discovery.
    pub fn record_find(&mut self, rarity: &str, now: DateTime<Utc>) -> bool {
        match self.rarity_finds.get_mut(rarity) {
            Some(find) => {
                find.find_count += 1;
                false
            }
            None => {
                self.rarity_finds.insert(
                    rarity.to_string(),
                    RarityFind {
                        first_found_at: now,
                        find_count: 1,
                    },
                );
                true
            }
        }
    }

    /// Grants a skin if not already owned; already-owned is a no-op.
    pub fn grant_skin(&mut self, skin_id: &str, method: UnlockMethod) -> bool {
        if self.skins.contains_key(skin_id) {
            return false;
        }
        self.skins.insert(skin_id.to_string(), method);
        true
    }

    pub fn discovered(&self) -> HashSet<String> {
        self.rarity_finds.keys().cloned().collect()
    }

    pub fn unique_rarity_count(&self) -> u32 {
        self.rarity_finds.len() as u32
    }

    pub fn owned_counts(&self) -> OwnedCounts {
        OwnedCounts {
            rarities: self.unique_rarity_count(),
            backgrounds: self.backgrounds.len() as u32,
            shop_items: self.shop_items.len() as u32,
            skins: self.skins.len() as u32,
        }
    }

    pub fn challenges_for(&mut self, date: NaiveDate) -> &mut HashMap<String, ChallengeProgress> {
        self.challenges.entry(date).or_default()
    }
}

/// In-memory persistence collaborator. Every mutation happens inside one
/// write-lock scope, so a record is never observable half-updated.
#[derive(Clone)]
pub struct ProgressStore {
    records: Arc<RwLock<HashMap<Uuid, PlayerRecord>>>,
    outbox: Arc<RwLock<Outbox>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            outbox: Arc::new(RwLock::new(Outbox::new())),
        }
    }

    /// Zero-valued defaults at registration.
    pub async fn create_player(&self, player_id: Uuid) {
        self.records
            .write()
            .await
            .entry(player_id)
            .or_insert_with(PlayerRecord::default);
    }

    /// Runs a mutation atomically against one player's record. Write paths
    /// on unknown players are errors.
    pub async fn with_player<T>(
        &self,
        player_id: Uuid,
        f: impl FnOnce(&mut PlayerRecord) -> T,
    ) -> GameResult<T> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&player_id)
            .ok_or_else(|| GameError::not_found(format!("unknown player {player_id}")))?;
        Ok(f(record))
    }

    /// Read paths fall back to zero-valued defaults for absent players.
    pub async fn read_player<T>(
        &self,
        player_id: Uuid,
        f: impl FnOnce(&PlayerRecord) -> T,
    ) -> T {
        let records = self.records.read().await;
        match records.get(&player_id) {
            Some(record) => f(record),
            None => f(&PlayerRecord::default()),
        }
    }

    pub async fn append_event(&self, player_id: Uuid, at: DateTime<Utc>, kind: OutboxKind) {
        self.outbox.write().await.append(player_id, at, kind);
    }

    pub async fn pending_events(&self, cursor: u64) -> Vec<crate::outbox::OutboxEvent> {
        self.outbox.read().await.since(cursor).to_vec()
    }

    pub async fn prune_events(&self, cursor: u64) {
        self.outbox.write().await.prune_through(cursor);
    }

    /// Assembles ranking rows from the registry roster and stored records.
    pub async fn leaderboard_rows(&self, roster: &[(Uuid, String, bool)]) -> Vec<PlayerRow> {
        let records = self.records.read().await;
        roster
            .iter()
            .map(|(id, username, banned)| {
                let record = records.get(id);
                PlayerRow {
                    player_id: *id,
                    username: username.clone(),
                    banned: *banned,
                    snapshots: record.map(|r| r.snapshots.clone()).unwrap_or_default(),
                    total_points: record.map(|r| r.progress.total_points).unwrap_or(0),
                    unique_rarities: record.map(|r| r.unique_rarity_count()).unwrap_or(0),
                    completion_percent: record
                        .map(|r| r.progress.completion_percent)
                        .unwrap_or(0.0),
                }
            })
            .collect()
    }

    pub async fn player_ids(&self) -> Vec<Uuid> {
        self.records.read().await.keys().copied().collect()
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, SystemClock};

    #[tokio::test]
    async fn writes_to_unknown_players_fail_but_reads_default() {
        let store = ProgressStore::new();
        let ghost = Uuid::new_v4();

        let err = store
            .with_player(ghost, |r| r.progress.total_points += 1)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));

        let streak = store.read_player(ghost, |r| r.streak.current_streak).await;
        assert_eq!(streak, 0);
    }

    #[tokio::test]
    async fn find_records_are_unique_per_rarity() {
        let store = ProgressStore::new();
        let player = Uuid::new_v4();
        store.create_player(player).await;
        let now = SystemClock.now();

        let first = store
            .with_player(player, |r| r.record_find("Rare", now))
            .await
            .unwrap();
        let second = store
            .with_player(player, |r| r.record_find("Rare", now))
            .await
            .unwrap();

        assert!(first);
        assert!(!second);

        let (count, unique) = store
            .read_player(player, |r| {
                (r.rarity_finds["Rare"].find_count, r.unique_rarity_count())
            })
            .await;
        assert_eq!(count, 2);
        assert_eq!(unique, 1);
    }

    #[tokio::test]
    async fn skin_grants_are_idempotent() {
        let store = ProgressStore::new();
        let player = Uuid::new_v4();
        store.create_player(player).await;

        let granted = store
            .with_player(player, |r| {
                let a = r.grant_skin("dark_blue", UnlockMethod::Streak);
                let b = r.grant_skin("dark_blue", UnlockMethod::Purchase);
                (a, b)
            })
            .await
            .unwrap();

        assert_eq!(granted, (true, false));
        let method = store
            .read_player(player, |r| r.skins["dark_blue"])
            .await;
        assert_eq!(method, UnlockMethod::Streak);
    }

    #[tokio::test]
    async fn snapshot_upsert_overwrites_same_day() {
        let store = ProgressStore::new();
        let player = Uuid::new_v4();
        store.create_player(player).await;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        for points in [10u64, 25] {
            store
                .with_player(player, |r| {
                    r.snapshots.insert(
                        date,
                        Snapshot {
                            total_points: points,
                            ..Default::default()
                        },
                    )
                })
                .await
                .unwrap();
        }

        let (rows, points) = store
            .read_player(player, |r| {
                (r.snapshots.len(), r.snapshots[&date].total_points)
            })
            .await;
        assert_eq!(rows, 1);
        assert_eq!(points, 25);
    }
}
