use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{milestone_for_day, STREAK_BASE_REWARD};
use crate::errors::{GameError, GameResult};

/// Daily-claim continuity for one player. `longest_streak` is the maximum
/// `current_streak` has ever reached and never decreases.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_claim_date: Option<NaiveDate>,
    pub total_claims: u64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StreakClaim {
    pub new_streak: u32,
    pub longest_streak: u32,
    pub points_awarded: u64,
    pub milestone_skin: Option<&'static str>,
    pub total_claims: u64,
}

impl StreakRecord {
    /// One claim per calendar day. Yesterday's claim continues the streak,
    /// anything older (or a first claim) restarts it at 1. A same-day claim
    /// is a conflict and mutates nothing.
    pub fn claim(&mut self, today: NaiveDate) -> GameResult<StreakClaim> {
        if self.last_claim_date == Some(today) {
            return Err(GameError::conflict("already claimed today"));
        }

        let yesterday = today.pred_opt().unwrap_or(today);
        self.current_streak = if self.last_claim_date == Some(yesterday) {
            self.current_streak + 1
        } else {
            1
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_claim_date = Some(today);
        self.total_claims += 1;

        Ok(StreakClaim {
            new_streak: self.current_streak,
            longest_streak: self.longest_streak,
            points_awarded: STREAK_BASE_REWARD,
            milestone_skin: milestone_for_day(self.current_streak).map(|m| m.skin_id),
            total_claims: self.total_claims,
        })
    }

    /// Read-path decay: a missed day forfeits the running streak without
    /// touching `longest_streak` or `total_claims`. Returns true if it fired.
    pub fn check_and_decay(&mut self, today: NaiveDate) -> bool {
        let yesterday = today.pred_opt().unwrap_or(today);
        let missed = self
            .last_claim_date
            .is_some_and(|last| last < yesterday);

        if missed && self.current_streak > 0 {
            self.current_streak = 0;
            return true;
        }
        false
    }

    /// The next few milestones still ahead of the current streak.
    pub fn upcoming_milestones(&self) -> Vec<u32> {
        crate::catalog::STREAK_MILESTONES
            .iter()
            .filter(|m| m.day > self.current_streak)
            .take(3)
            .map(|m| m.day)
            .collect()
    }
}
