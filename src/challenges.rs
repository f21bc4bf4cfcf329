use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::LIGHT_SKINS;
use crate::errors::{GameError, GameResult};

/// Number of challenges assigned per calendar day.
pub const DAILY_CHALLENGE_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ChallengeKind {
    Points,
    RarityTier { min_rank: usize },
    RarityTierCount { min_rank: usize },
    ManualClicks,
    Purchases,
    GoldenMode,
}

#[derive(Clone, Debug)]
pub struct ChallengeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub target: u64,
    pub kind: ChallengeKind,
}

/// Typed event stream fed into progress matching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChallengeEvent {
    ManualClick,
    Points(u64),
    RarityFound { rank: usize },
    Purchase { golden_mode: bool },
}

/// Per-(player, date, challenge) progress. Once completed it is terminal
/// for that date; progress stores the raw accumulated value, overshoot
/// past the target included.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ChallengeProgress {
    pub progress: u64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompletedChallenge {
    pub id: &'static str,
    pub name: &'static str,
    pub target: u64,
}

pub struct ChallengeEngine {
    pool: Vec<ChallengeDef>,
}

/// Hash-to-float construction shared by daily selection and the reward
/// draw. Deterministic by contract: same seed, same value, on every run
/// and every host.
fn seeded_unit(seed: i64) -> f64 {
    let x = (seed as f64).sin() * 10_000.0;
    x - x.floor()
}

/// Numeric seed from the digits of the ISO date (e.g. 2025-03-14 -> 20250314).
fn date_seed(date: NaiveDate) -> i64 {
    date.format("%Y%m%d")
        .to_string()
        .parse()
        .expect("ISO date digits form a number")
}

impl ChallengeEngine {
    pub fn new(pool: Vec<ChallengeDef>) -> Self {
        Self { pool }
    }

    pub fn standard() -> Self {
        Self::new(crate::catalog::daily_challenge_pool())
    }

    pub fn def(&self, id: &str) -> Option<&ChallengeDef> {
        self.pool.iter().find(|c| c.id == id)
    }

    /// Deterministic global selection: same date, same three challenges,
    /// for every player and every call. Draws without replacement from the
    /// pool using the seeded construction above.
    pub fn select_daily(&self, date: NaiveDate) -> Vec<&ChallengeDef> {
        let seed = date_seed(date);
        let mut available: Vec<usize> = (0..self.pool.len()).collect();
        let mut selected = Vec::with_capacity(DAILY_CHALLENGE_COUNT);

        for i in 0..DAILY_CHALLENGE_COUNT {
            if available.is_empty() {
                break;
            }
            let draw = seeded_unit(seed + (i as i64) * 1000);
            let index = ((draw * available.len() as f64) as usize).min(available.len() - 1);
            selected.push(&self.pool[available.remove(index)]);
        }

        selected
    }

    /// Amount an event contributes to a challenge, None when incompatible.
    fn match_amount(def: &ChallengeDef, event: ChallengeEvent) -> Option<u64> {
        match (def.kind, event) {
            (ChallengeKind::Points, ChallengeEvent::Points(n)) => Some(n),
            (ChallengeKind::ManualClicks, ChallengeEvent::ManualClick) => Some(1),
            (ChallengeKind::Purchases, ChallengeEvent::Purchase { .. }) => Some(1),
            (ChallengeKind::GoldenMode, ChallengeEvent::Purchase { golden_mode: true }) => Some(1),
            (
                ChallengeKind::RarityTier { min_rank } | ChallengeKind::RarityTierCount { min_rank },
                ChallengeEvent::RarityFound { rank },
            ) => (rank >= min_rank).then_some(1),
            _ => None,
        }
    }

    /// Applies one event to the day's assignment. Completed challenges are
    /// immutable; newly completed ones are reported exactly once.
    pub fn record_progress(
        &self,
        date: NaiveDate,
        records: &mut HashMap<String, ChallengeProgress>,
        event: ChallengeEvent,
        now: DateTime<Utc>,
    ) -> Vec<CompletedChallenge> {
        let mut completed = Vec::new();

        for def in self.select_daily(date) {
            let Some(amount) = Self::match_amount(def, event) else {
                continue;
            };

            let record = records.entry(def.id.to_string()).or_default();
            if record.completed {
                continue;
            }

            record.progress += amount;
            if record.progress >= def.target {
                record.completed = true;
                record.completed_at = Some(now);
                completed.push(CompletedChallenge {
                    id: def.id,
                    name: def.name,
                    target: def.target,
                });
            }
        }

        completed
    }

    pub fn all_completed(&self, date: NaiveDate, records: &HashMap<String, ChallengeProgress>) -> bool {
        let assigned = self.select_daily(date);
        assigned.len() == DAILY_CHALLENGE_COUNT
            && assigned
                .iter()
                .all(|def| records.get(def.id).is_some_and(|r| r.completed))
    }

    /// Reward for finishing all three: one light skin per date per player.
    /// The skin is drawn from the date seed so a replayed claim would grant
    /// the same thing. Double claims are conflicts, not re-grants.
    pub fn claim_reward(
        &self,
        date: NaiveDate,
        records: &HashMap<String, ChallengeProgress>,
        already_claimed: bool,
    ) -> GameResult<&'static str> {
        if !self.all_completed(date, records) {
            return Err(GameError::validation("not all challenges completed"));
        }
        if already_claimed {
            return Err(GameError::conflict("daily reward already claimed"));
        }

        let draw = seeded_unit(date_seed(date) + 7_777);
        let index = ((draw * LIGHT_SKINS.len() as f64) as usize).min(LIGHT_SKINS.len() - 1);
        Ok(LIGHT_SKINS[index])
    }
}
