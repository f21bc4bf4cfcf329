use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    achievements::{AchievementEngine, AchievementStats, Metric, TierUnlock},
    catalog,
    challenges::{ChallengeEngine, ChallengeEvent, CompletedChallenge},
    clock::Clock,
    completion::{self, Completion},
    config::Config,
    errors::{GameError, GameResult},
    events::{EventBroadcaster, GameEvent},
    leaderboard::{self, LeaderboardEntry, Period, Snapshot},
    outbox::OutboxKind,
    players::{Player, PlayerRegistry},
    rarity::{self, RarityTable},
    roll::{self, RollMode},
    store::ProgressStore,
    streaks::StreakRecord,
    UnlockMethod,
};

/// Shared application state: engines, store, registry and the single
/// clock every date-sensitive component reads from.
#[derive(Clone)]
pub struct AppState {
    pub store: ProgressStore,
    pub registry: PlayerRegistry,
    pub table: Arc<RarityTable>,
    pub achievements: Arc<AchievementEngine>,
    pub challenges: Arc<ChallengeEngine>,
    pub events: EventBroadcaster,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClickOutcome {
    pub rarity: String,
    pub points_earned: u64,
    pub mode: RollMode,
    pub first_find: bool,
    pub total_points: u64,
    pub unlocked: Vec<TierUnlock>,
    pub completed_challenges: Vec<CompletedChallenge>,
    pub completion: Completion,
}

#[derive(Clone, Debug, Serialize)]
pub struct PurchaseOutcome {
    pub item_id: String,
    pub cost: u64,
    pub total_points: u64,
    pub unlocked: Vec<TierUnlock>,
    pub completed_challenges: Vec<CompletedChallenge>,
    pub completion: Completion,
}

#[derive(Clone, Debug, Serialize)]
pub struct StreakOutcome {
    pub new_streak: u32,
    pub longest_streak: u32,
    pub total_claims: u64,
    pub points_awarded: u64,
    pub milestone_skin: Option<String>,
    pub unlocked: Vec<TierUnlock>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChallengeView {
    pub id: String,
    pub name: String,
    pub target: u64,
    pub progress: u64,
    pub completed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct DailyChallengesView {
    pub date: NaiveDate,
    pub challenges: Vec<ChallengeView>,
    pub all_completed: bool,
    pub reward_claimed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChallengeDaySummary {
    pub date: NaiveDate,
    pub completed: usize,
    pub assigned: usize,
    pub reward_claimed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChallengeRewardOutcome {
    pub skin_id: String,
    pub newly_granted: bool,
    pub completion: Completion,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProgressView {
    pub total_points: u64,
    pub total_clicks: u64,
    pub manual_clicks: u64,
    pub total_purchases: u64,
    pub owns_golden_mode: bool,
    pub unique_rarities: u32,
    pub completion: Completion,
    pub streak: StreakRecord,
}

impl AppState {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: ProgressStore::new(),
            registry: PlayerRegistry::new(),
            table: Arc::new(RarityTable::standard()),
            achievements: Arc::new(AchievementEngine::standard()),
            challenges: Arc::new(ChallengeEngine::standard()),
            events: EventBroadcaster::new(),
            clock,
            config,
        }
    }

    pub async fn register_player(&self, username: Option<String>) -> GameResult<Player> {
        let player = self.registry.register(username, self.clock.now()).await?;
        self.store.create_player(player.id).await;
        Ok(player)
    }

    async fn require_player(&self, player_id: Uuid) -> GameResult<Player> {
        self.registry
            .get(player_id)
            .await
            .ok_or_else(|| GameError::not_found(format!("unknown player {player_id}")))
    }

    /// One click: roll, score, discover, then feed achievements, the day's
    /// challenges and the completion percentage. The whole update runs in
    /// one store transaction for this player.
    pub async fn record_click(&self, player_id: Uuid, manual: bool) -> GameResult<ClickOutcome> {
        self.require_player(player_id).await?;

        let now = self.clock.now();
        let today = self.clock.today();
        let table = Arc::clone(&self.table);
        let achievements = Arc::clone(&self.achievements);
        let challenges = Arc::clone(&self.challenges);

        let outcome = self
            .store
            .with_player(player_id, |record| {
                record.progress.total_clicks += 1;
                if manual {
                    record.progress.manual_clicks += 1;
                }

                let mode = record.progress.modifiers.mode(manual);
                let discovered = record.discovered();
                let hit = roll::roll(&mut rand::rng(), &table, mode, &discovered);
                record
                    .progress
                    .modifiers
                    .consume(mode, hit.name == rarity::GLITCHED);

                let points_earned = hit.points * record.progress.modifiers.point_multiplier();
                record.progress.total_points += points_earned;
                let first_find = record.record_find(hit.name, now);

                let mut unlocked = Vec::new();
                unlocked.extend(achievements.update(
                    &mut record.achievements,
                    Metric::Clicks,
                    record.progress.total_clicks,
                ));
                unlocked.extend(achievements.update(
                    &mut record.achievements,
                    Metric::RarityRank,
                    hit.rank as u64,
                ));

                let mut completed = Vec::new();
                {
                    let day_records = record.challenges_for(today);
                    if manual {
                        completed.extend(challenges.record_progress(
                            today,
                            day_records,
                            ChallengeEvent::ManualClick,
                            now,
                        ));
                    }
                    if points_earned > 0 {
                        completed.extend(challenges.record_progress(
                            today,
                            day_records,
                            ChallengeEvent::Points(points_earned),
                            now,
                        ));
                    }
                    completed.extend(challenges.record_progress(
                        today,
                        day_records,
                        ChallengeEvent::RarityFound { rank: hit.rank },
                        now,
                    ));

                    if !completed.is_empty() && challenges.all_completed(today, day_records) {
                        record.progress.daily_completions += 1;
                        unlocked.extend(achievements.update(
                            &mut record.achievements,
                            Metric::DailyCompletions,
                            record.progress.daily_completions,
                        ));
                    }
                }

                let completion = completion::calculate(record.owned_counts());
                record.progress.completion_percent = completion.total_percent;
                unlocked.extend(achievements.update(
                    &mut record.achievements,
                    Metric::Completion,
                    completion.total_percent as u64,
                ));

                ClickOutcome {
                    rarity: hit.name.to_string(),
                    points_earned,
                    mode,
                    first_find,
                    total_points: record.progress.total_points,
                    unlocked,
                    completed_challenges: completed,
                    completion,
                }
            })
            .await?;

        self.store
            .append_event(
                player_id,
                now,
                OutboxKind::RarityFound {
                    rarity: outcome.rarity.clone(),
                    points_earned: outcome.points_earned,
                    first_find: outcome.first_find,
                },
            )
            .await;
        self.publish_progression(player_id, today, &outcome.unlocked, &outcome.completed_challenges)
            .await;
        self.events.broadcast(GameEvent::RarityFound {
            player_id,
            rarity: outcome.rarity.clone(),
            points_earned: outcome.points_earned,
            first_find: outcome.first_find,
        });
        self.events.broadcast(GameEvent::CompletionChanged {
            player_id,
            total_percent: outcome.completion.total_percent,
        });

        Ok(outcome)
    }

    /// Buys a shop item with points and applies its modifier effect.
    pub async fn purchase_item(&self, player_id: Uuid, item_id: &str) -> GameResult<PurchaseOutcome> {
        self.require_player(player_id).await?;
        let item = catalog::shop_item(item_id)
            .ok_or_else(|| GameError::validation(format!("unknown shop item {item_id}")))?;

        let now = self.clock.now();
        let today = self.clock.today();
        let achievements = Arc::clone(&self.achievements);
        let challenges = Arc::clone(&self.challenges);

        let outcome = self
            .store
            .with_player(player_id, |record| -> GameResult<PurchaseOutcome> {
                if record.progress.total_points < item.base_cost {
                    return Err(GameError::validation(format!(
                        "not enough points for {}: have {}, need {}",
                        item.id, record.progress.total_points, item.base_cost
                    )));
                }
                record.progress.total_points -= item.base_cost;
                record.progress.total_purchases += 1;
                record.shop_items.insert(item.id.to_string());

                let is_golden_mode = item.id == "golden_mode";
                match item.id {
                    "golden_click" => record.progress.modifiers.golden_click_ready = true,
                    "luck_boost" => record.progress.modifiers.luck_boost_active = true,
                    "double_points" => record.progress.modifiers.double_points_active = true,
                    "golden_mode" => {
                        record.progress.modifiers.golden_mode_active = true;
                        record.progress.owns_golden_mode = true;
                    }
                    _ => {}
                }

                let mut unlocked = achievements.update(
                    &mut record.achievements,
                    Metric::Purchases,
                    record.progress.total_purchases,
                );
                if is_golden_mode {
                    unlocked.extend(achievements.update(&mut record.achievements, Metric::GoldenMode, 1));
                }

                let day_records = record.challenges_for(today);
                let completed = challenges.record_progress(
                    today,
                    day_records,
                    ChallengeEvent::Purchase {
                        golden_mode: is_golden_mode,
                    },
                    now,
                );
                if !completed.is_empty() && challenges.all_completed(today, day_records) {
                    record.progress.daily_completions += 1;
                    unlocked.extend(achievements.update(
                        &mut record.achievements,
                        Metric::DailyCompletions,
                        record.progress.daily_completions,
                    ));
                }

                let completion = completion::calculate(record.owned_counts());
                record.progress.completion_percent = completion.total_percent;
                unlocked.extend(achievements.update(
                    &mut record.achievements,
                    Metric::Completion,
                    completion.total_percent as u64,
                ));

                Ok(PurchaseOutcome {
                    item_id: item.id.to_string(),
                    cost: item.base_cost,
                    total_points: record.progress.total_points,
                    unlocked,
                    completed_challenges: completed,
                    completion,
                })
            })
            .await??;

        self.store
            .append_event(
                player_id,
                now,
                OutboxKind::ItemPurchased {
                    item_id: outcome.item_id.clone(),
                    cost: outcome.cost,
                },
            )
            .await;
        self.publish_progression(player_id, today, &outcome.unlocked, &outcome.completed_challenges)
            .await;

        Ok(outcome)
    }

    /// Records a background purchase; backgrounds only feed completion and
    /// their own achievement family.
    pub async fn purchase_background(&self, player_id: Uuid, name: &str) -> GameResult<Completion> {
        self.require_player(player_id).await?;
        if name.trim().is_empty() {
            return Err(GameError::validation("background name is required"));
        }

        let achievements = Arc::clone(&self.achievements);
        let (completion, unlocked) = self
            .store
            .with_player(player_id, |record| {
                record.backgrounds.insert(name.trim().to_string());
                let unlocked = achievements.update(
                    &mut record.achievements,
                    Metric::Backgrounds,
                    record.backgrounds.len() as u64,
                );
                let completion = completion::calculate(record.owned_counts());
                record.progress.completion_percent = completion.total_percent;
                (completion, unlocked)
            })
            .await?;

        self.publish_progression(player_id, self.clock.today(), &unlocked, &[])
            .await;
        Ok(completion)
    }

    /// Claims today's streak: base points plus a milestone skin when the
    /// new streak lands exactly on a configured milestone day.
    pub async fn claim_streak(&self, player_id: Uuid) -> GameResult<StreakOutcome> {
        self.require_player(player_id).await?;

        let now = self.clock.now();
        let today = self.clock.today();
        let achievements = Arc::clone(&self.achievements);

        let outcome = self
            .store
            .with_player(player_id, |record| -> GameResult<StreakOutcome> {
                let claim = record.streak.claim(today)?;
                record.progress.total_points += claim.points_awarded;

                let mut unlocked = achievements.update(
                    &mut record.achievements,
                    Metric::Streak,
                    claim.new_streak as u64,
                );

                let mut granted_skin = None;
                if let Some(skin_id) = claim.milestone_skin {
                    if record.grant_skin(skin_id, UnlockMethod::Streak) {
                        granted_skin = Some(skin_id.to_string());
                        unlocked.extend(achievements.update(
                            &mut record.achievements,
                            Metric::Skins,
                            record.skins.len() as u64,
                        ));
                    }
                    let completion = completion::calculate(record.owned_counts());
                    record.progress.completion_percent = completion.total_percent;
                }

                Ok(StreakOutcome {
                    new_streak: claim.new_streak,
                    longest_streak: claim.longest_streak,
                    total_claims: claim.total_claims,
                    points_awarded: claim.points_awarded,
                    milestone_skin: granted_skin,
                    unlocked,
                })
            })
            .await??;

        self.store
            .append_event(
                player_id,
                now,
                OutboxKind::StreakClaimed {
                    new_streak: outcome.new_streak,
                    points_awarded: outcome.points_awarded,
                },
            )
            .await;
        if let Some(skin_id) = &outcome.milestone_skin {
            self.store
                .append_event(
                    player_id,
                    now,
                    OutboxKind::MilestoneUnlocked {
                        day: outcome.new_streak,
                        skin_id: skin_id.clone(),
                    },
                )
                .await;
        }
        self.publish_progression(player_id, today, &outcome.unlocked, &[]).await;
        self.events.broadcast(GameEvent::StreakClaimed {
            player_id,
            new_streak: outcome.new_streak,
        });

        Ok(outcome)
    }

    /// Streak as seen on read paths: decay applies before reporting.
    pub async fn streak_status(&self, player_id: Uuid) -> StreakRecord {
        let today = self.clock.today();
        self.store
            .with_player(player_id, |record| {
                record.streak.check_and_decay(today);
                record.streak.clone()
            })
            .await
            .unwrap_or_default()
    }

    pub async fn todays_challenges(&self, player_id: Uuid) -> DailyChallengesView {
        let today = self.clock.today();
        let challenges = Arc::clone(&self.challenges);

        let (records, claimed) = self
            .store
            .read_player(player_id, |record| {
                (
                    record.challenges.get(&today).cloned().unwrap_or_default(),
                    record.challenge_rewards_claimed.contains(&today),
                )
            })
            .await;

        let views: Vec<ChallengeView> = challenges
            .select_daily(today)
            .into_iter()
            .map(|def| {
                let progress = records.get(def.id).cloned().unwrap_or_default();
                ChallengeView {
                    id: def.id.to_string(),
                    name: def.name.to_string(),
                    target: def.target,
                    progress: progress.progress,
                    completed: progress.completed,
                }
            })
            .collect();

        DailyChallengesView {
            date: today,
            all_completed: challenges.all_completed(today, &records),
            reward_claimed: claimed,
            challenges: views,
        }
    }

    /// Per-day summary of past challenge assignments, newest first.
    pub async fn challenge_history(&self, player_id: Uuid) -> Vec<ChallengeDaySummary> {
        let challenges = Arc::clone(&self.challenges);
        let mut history = self
            .store
            .read_player(player_id, |record| {
                record
                    .challenges
                    .iter()
                    .map(|(date, day)| ChallengeDaySummary {
                        date: *date,
                        completed: day.values().filter(|p| p.completed).count(),
                        assigned: challenges.select_daily(*date).len(),
                        reward_claimed: record.challenge_rewards_claimed.contains(date),
                    })
                    .collect::<Vec<_>>()
            })
            .await;
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }

    /// Buys a cosmetic skin outright. Skins already unlocked through streaks
    /// or challenge rewards cannot be bought again.
    pub async fn purchase_skin(&self, player_id: Uuid, skin_id: &str) -> GameResult<Completion> {
        self.require_player(player_id).await?;
        if !catalog::LIGHT_SKINS.contains(&skin_id) && !catalog::DARK_SKINS.contains(&skin_id) {
            return Err(GameError::validation(format!("unknown skin {skin_id}")));
        }

        let achievements = Arc::clone(&self.achievements);
        let (completion, unlocked) = self
            .store
            .with_player(player_id, |record| -> GameResult<(Completion, Vec<TierUnlock>)> {
                if !record.grant_skin(skin_id, UnlockMethod::Purchase) {
                    return Err(GameError::conflict(format!("skin {skin_id} already owned")));
                }
                let unlocked = achievements.update(
                    &mut record.achievements,
                    Metric::Skins,
                    record.skins.len() as u64,
                );
                let completion = completion::calculate(record.owned_counts());
                record.progress.completion_percent = completion.total_percent;
                Ok((completion, unlocked))
            })
            .await??;

        self.publish_progression(player_id, self.clock.today(), &unlocked, &[])
            .await;
        Ok(completion)
    }

    /// Claims the daily reward once all three challenges are done. A second
    /// claim on the same date is a conflict and grants nothing.
    pub async fn claim_challenge_reward(&self, player_id: Uuid) -> GameResult<ChallengeRewardOutcome> {
        self.require_player(player_id).await?;

        let now = self.clock.now();
        let today = self.clock.today();
        let achievements = Arc::clone(&self.achievements);
        let challenges = Arc::clone(&self.challenges);

        let outcome = self
            .store
            .with_player(player_id, |record| -> GameResult<ChallengeRewardOutcome> {
                let already = record.challenge_rewards_claimed.contains(&today);
                let day_records = record.challenges_for(today);
                let skin_id = challenges.claim_reward(today, day_records, already)?;

                record.challenge_rewards_claimed.insert(today);
                let newly_granted = record.grant_skin(skin_id, UnlockMethod::Challenge);
                if newly_granted {
                    achievements.update(
                        &mut record.achievements,
                        Metric::Skins,
                        record.skins.len() as u64,
                    );
                }

                let completion = completion::calculate(record.owned_counts());
                record.progress.completion_percent = completion.total_percent;

                Ok(ChallengeRewardOutcome {
                    skin_id: skin_id.to_string(),
                    newly_granted,
                    completion,
                })
            })
            .await??;

        self.store
            .append_event(
                player_id,
                now,
                OutboxKind::ChallengeRewardClaimed {
                    date: today,
                    skin_id: outcome.skin_id.clone(),
                },
            )
            .await;

        Ok(outcome)
    }

    /// Writes (or overwrites) today's leaderboard snapshot for one player.
    pub async fn snapshot_player(&self, player_id: Uuid) -> GameResult<Snapshot> {
        let now = self.clock.now();
        let today = self.clock.today();

        let snapshot = self
            .store
            .with_player(player_id, |record| {
                let completion = completion::calculate(record.owned_counts());
                record.progress.completion_percent = completion.total_percent;
                let snapshot = Snapshot {
                    total_points: record.progress.total_points,
                    total_clicks: record.progress.total_clicks,
                    unique_rarities: record.unique_rarity_count(),
                    completion_percent: completion.total_percent,
                };
                record.snapshots.insert(today, snapshot);
                snapshot
            })
            .await?;

        self.store
            .append_event(player_id, now, OutboxKind::SnapshotWritten { date: today })
            .await;
        self.events
            .broadcast(GameEvent::SnapshotTaken { player_id, date: today });

        Ok(snapshot)
    }

    /// Background sweep: refresh every known player's daily snapshot.
    pub async fn snapshot_all(&self) -> usize {
        let ids = self.store.player_ids().await;
        let mut written = 0;
        for id in ids {
            if self.snapshot_player(id).await.is_ok() {
                written += 1;
            }
        }
        written
    }

    pub async fn leaderboard_top(&self, period: Period, limit: usize) -> Vec<LeaderboardEntry> {
        let roster = self.registry.roster().await;
        let rows = self.store.leaderboard_rows(&roster).await;
        leaderboard::top(&rows, period, self.clock.today(), limit)
    }

    pub async fn leaderboard_rank(&self, player_id: Uuid, period: Period) -> Option<u32> {
        let roster = self.registry.roster().await;
        let rows = self.store.leaderboard_rows(&roster).await;
        leaderboard::rank_of(&rows, period, self.clock.today(), player_id)
    }

    pub async fn leaderboard_around(
        &self,
        player_id: Uuid,
        period: Period,
        range: usize,
    ) -> Vec<LeaderboardEntry> {
        let roster = self.registry.roster().await;
        let rows = self.store.leaderboard_rows(&roster).await;
        leaderboard::around(&rows, period, self.clock.today(), player_id, range)
    }

    /// Full progress summary. Streak decay is persisted here the same way
    /// `streak_status` persists it, so both read paths leave the stored
    /// streak identical.
    pub async fn progress_view(&self, player_id: Uuid) -> ProgressView {
        let today = self.clock.today();
        self.store
            .with_player(player_id, |record| {
                record.streak.check_and_decay(today);
                ProgressView {
                    total_points: record.progress.total_points,
                    total_clicks: record.progress.total_clicks,
                    manual_clicks: record.progress.manual_clicks,
                    total_purchases: record.progress.total_purchases,
                    owns_golden_mode: record.progress.owns_golden_mode,
                    unique_rarities: record.unique_rarity_count(),
                    completion: completion::calculate(record.owned_counts()),
                    streak: record.streak.clone(),
                }
            })
            .await
            .unwrap_or_else(|_| ProgressView {
                total_points: 0,
                total_clicks: 0,
                manual_clicks: 0,
                total_purchases: 0,
                owns_golden_mode: false,
                unique_rarities: 0,
                completion: completion::calculate(Default::default()),
                streak: StreakRecord::default(),
            })
    }

    pub async fn achievement_stats(&self, player_id: Uuid) -> AchievementStats {
        let achievements = Arc::clone(&self.achievements);
        self.store
            .read_player(player_id, |record| achievements.stats(&record.achievements))
            .await
    }

    pub async fn unacknowledged_achievements(&self, player_id: Uuid) -> Vec<TierUnlock> {
        let achievements = Arc::clone(&self.achievements);
        self.store
            .read_player(player_id, |record| achievements.unacknowledged(&record.achievements))
            .await
    }

    pub async fn acknowledge_achievement(&self, player_id: Uuid, id: &str) -> GameResult<()> {
        let achievements = Arc::clone(&self.achievements);
        let found = self
            .store
            .with_player(player_id, |record| {
                achievements.acknowledge(&mut record.achievements, id)
            })
            .await?;
        if found {
            Ok(())
        } else {
            Err(GameError::not_found(format!("no achievement record {id}")))
        }
    }

    pub async fn acknowledge_all_achievements(&self, player_id: Uuid) -> GameResult<()> {
        let achievements = Arc::clone(&self.achievements);
        self.store
            .with_player(player_id, |record| {
                achievements.acknowledge_all(&mut record.achievements)
            })
            .await
    }

    async fn publish_progression(
        &self,
        player_id: Uuid,
        date: NaiveDate,
        unlocked: &[TierUnlock],
        completed: &[CompletedChallenge],
    ) {
        let now = self.clock.now();
        for unlock in unlocked {
            self.store
                .append_event(
                    player_id,
                    now,
                    OutboxKind::AchievementUnlocked {
                        achievement_id: unlock.achievement_id.to_string(),
                        new_tier: unlock.new_tier,
                    },
                )
                .await;
            self.events.broadcast(GameEvent::AchievementUnlocked {
                player_id,
                achievement_id: unlock.achievement_id.to_string(),
                new_tier: unlock.new_tier,
            });
        }
        for challenge in completed {
            self.store
                .append_event(
                    player_id,
                    now,
                    OutboxKind::ChallengeCompleted {
                        challenge_id: challenge.id.to_string(),
                        date,
                    },
                )
                .await;
            self.events.broadcast(GameEvent::ChallengeCompleted {
                player_id,
                challenge_id: challenge.id.to_string(),
                date,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::ChallengeProgress;
    use crate::clock::FixedClock;
    use crate::config::{GameConfig, ServerConfig};

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec![],
            },
            game: GameConfig {
                clicks_per_second: 20,
                leaderboard_top_n: 50,
                snapshot_interval_secs: 300,
            },
        }
    }

    fn state_on(y: i32, m: u32, d: u32) -> AppState {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        AppState::new(test_config(), Arc::new(FixedClock::on_date(date)))
    }

    #[tokio::test]
    async fn click_pipeline_updates_every_engine() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(Some("seeker_one".into())).await.unwrap();

        let outcome = state.record_click(player.id, true).await.unwrap();

        assert!(outcome.first_find);
        assert!(outcome.points_earned > 0);
        assert_eq!(outcome.total_points, outcome.points_earned);
        assert!(outcome.completion.total_percent > 0.0);
        // The single-click achievement tier crosses on the very first click.
        assert!(outcome
            .unlocked
            .iter()
            .any(|u| u.achievement_id == "first_click"));

        let view = state.progress_view(player.id).await;
        assert_eq!(view.total_clicks, 1);
        assert_eq!(view.manual_clicks, 1);
        assert_eq!(view.unique_rarities, 1);

        let second = state.record_click(player.id, false).await.unwrap();
        let view = state.progress_view(player.id).await;
        assert_eq!(view.total_clicks, 2);
        assert_eq!(view.manual_clicks, 1);
        assert_eq!(view.total_points, outcome.points_earned + second.points_earned);
    }

    #[tokio::test]
    async fn clicks_for_unknown_players_are_rejected() {
        let state = state_on(2025, 6, 9);
        let err = state.record_click(Uuid::new_v4(), true).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[tokio::test]
    async fn purchases_spend_points_and_apply_modifiers() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();

        let err = state.purchase_item(player.id, "golden_mode").await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        state
            .store
            .with_player(player.id, |r| r.progress.total_points = 2_500)
            .await
            .unwrap();

        let outcome = state.purchase_item(player.id, "golden_mode").await.unwrap();
        assert_eq!(outcome.cost, 2_000);
        assert_eq!(outcome.total_points, 500);

        let view = state.progress_view(player.id).await;
        assert!(view.owns_golden_mode);
        assert_eq!(view.total_purchases, 1);

        let modifiers = state
            .store
            .read_player(player.id, |r| r.progress.modifiers)
            .await;
        assert!(modifiers.golden_mode_active);

        let err = state.purchase_item(player.id, "mystery_box").await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[tokio::test]
    async fn streak_claims_once_per_day() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(Some("daily_visitor".into())).await.unwrap();

        let outcome = state.claim_streak(player.id).await.unwrap();
        assert_eq!(outcome.new_streak, 1);
        assert_eq!(outcome.points_awarded, catalog::STREAK_BASE_REWARD);
        assert!(outcome.milestone_skin.is_none());

        let err = state.claim_streak(player.id).await.unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        let status = state.streak_status(player.id).await;
        assert_eq!(status.current_streak, 1);
        assert_eq!(status.total_claims, 1);

        let view = state.progress_view(player.id).await;
        assert_eq!(view.total_points, catalog::STREAK_BASE_REWARD);
    }

    #[tokio::test]
    async fn progress_view_persists_streak_decay() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();

        // Last claim two days back: the running streak is forfeit on read.
        state
            .store
            .with_player(player.id, |record| {
                record.streak.current_streak = 5;
                record.streak.longest_streak = 5;
                record.streak.last_claim_date = NaiveDate::from_ymd_opt(2025, 6, 7);
                record.streak.total_claims = 5;
            })
            .await
            .unwrap();

        let view = state.progress_view(player.id).await;
        assert_eq!(view.streak.current_streak, 0);
        assert_eq!(view.streak.longest_streak, 5);

        let stored = state
            .store
            .read_player(player.id, |record| record.streak.current_streak)
            .await;
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn challenge_reward_requires_full_completion() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();

        let err = state.claim_challenge_reward(player.id).await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        let view = state.todays_challenges(player.id).await;
        assert_eq!(view.challenges.len(), crate::challenges::DAILY_CHALLENGE_COUNT);
        assert!(!view.all_completed);
        assert!(!view.reward_claimed);
    }

    #[tokio::test]
    async fn challenge_reward_grants_one_skin_per_date() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();
        let today = state.clock.today();

        // Force-complete today's assignment directly in the store.
        let challenges = Arc::clone(&state.challenges);
        state
            .store
            .with_player(player.id, |record| {
                let day = record.challenges.entry(today).or_default();
                for def in challenges.select_daily(today) {
                    day.insert(
                        def.id.to_string(),
                        ChallengeProgress {
                            progress: def.target,
                            completed: true,
                            completed_at: None,
                        },
                    );
                }
            })
            .await
            .unwrap();

        let outcome = state.claim_challenge_reward(player.id).await.unwrap();
        assert!(outcome.newly_granted);
        assert!(outcome.completion.total_percent > 0.0);

        let err = state.claim_challenge_reward(player.id).await.unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        let view = state.todays_challenges(player.id).await;
        assert!(view.all_completed);
        assert!(view.reward_claimed);
    }

    #[tokio::test]
    async fn skins_can_be_bought_once() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();

        let completion = state.purchase_skin(player.id, "dark_pink").await.unwrap();
        assert!(completion.total_percent > 0.0);

        let err = state.purchase_skin(player.id, "dark_pink").await.unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        let err = state.purchase_skin(player.id, "neon_green").await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[tokio::test]
    async fn challenge_history_lists_touched_days() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();

        assert!(state.challenge_history(player.id).await.is_empty());

        state.record_click(player.id, true).await.unwrap();
        let history = state.challenge_history(player.id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, state.clock.today());
        assert_eq!(history[0].assigned, crate::challenges::DAILY_CHALLENGE_COUNT);
        assert!(!history[0].reward_claimed);
    }

    #[tokio::test]
    async fn snapshots_feed_the_leaderboard() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(Some("top_seeker".into())).await.unwrap();

        state.record_click(player.id, true).await.unwrap();
        let snapshot = state.snapshot_player(player.id).await.unwrap();
        assert_eq!(snapshot.total_clicks, 1);
        assert_eq!(snapshot.unique_rarities, 1);

        assert_eq!(
            state.leaderboard_rank(player.id, Period::AllTime).await,
            Some(1)
        );
        let top = state.leaderboard_top(Period::AllTime, 10).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].username, "top_seeker");

        assert_eq!(state.snapshot_all().await, 1);
    }

    #[tokio::test]
    async fn acknowledgement_clears_the_pending_list() {
        let state = state_on(2025, 6, 9);
        let player = state.register_player(None).await.unwrap();

        state.record_click(player.id, true).await.unwrap();
        let pending = state.unacknowledged_achievements(player.id).await;
        assert!(!pending.is_empty());

        let id = pending[0].achievement_id;
        state.acknowledge_achievement(player.id, id).await.unwrap();
        let pending_after = state.unacknowledged_achievements(player.id).await;
        assert!(pending_after.iter().all(|u| u.achievement_id != id));

        let err = state
            .acknowledge_achievement(player.id, "no_such_thing")
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }
}
