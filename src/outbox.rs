use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Replayable progression facts appended by the orchestrator and drained
/// by the external persistence flusher. Each record is idempotent to
/// replay: it states what happened, never a relative mutation to re-run.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum OutboxKind {
    RarityFound {
        rarity: String,
        points_earned: u64,
        first_find: bool,
    },
    AchievementUnlocked {
        achievement_id: String,
        new_tier: usize,
    },
    ChallengeCompleted {
        challenge_id: String,
        date: NaiveDate,
    },
    ChallengeRewardClaimed {
        date: NaiveDate,
        skin_id: String,
    },
    StreakClaimed {
        new_streak: u32,
        points_awarded: u64,
    },
    MilestoneUnlocked {
        day: u32,
        skin_id: String,
    },
    ItemPurchased {
        item_id: String,
        cost: u64,
    },
    SnapshotWritten {
        date: NaiveDate,
    },
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OutboxEvent {
    pub seq: u64,
    pub player_id: Uuid,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: OutboxKind,
}

/// Append-only event log. The sequence number doubles as the replay
/// cursor for the flusher.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<OutboxEvent>,
    next_seq: u64,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, player_id: Uuid, at: DateTime<Utc>, kind: OutboxKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(OutboxEvent {
            seq,
            player_id,
            at,
            kind,
        });
        seq
    }

    /// Events at or after the cursor, oldest first.
    pub fn since(&self, cursor: u64) -> &[OutboxEvent] {
        let start = self.events.partition_point(|e| e.seq < cursor);
        &self.events[start..]
    }

    /// Removes everything the flusher has acknowledged.
    pub fn prune_through(&mut self, cursor: u64) {
        self.events.retain(|e| e.seq > cursor);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
