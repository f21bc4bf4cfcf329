use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{channel, Receiver, Sender};
use uuid::Uuid;

// Live fan-out for the SSE stream; the durable record is the outbox.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    RarityFound {
        player_id: Uuid,
        rarity: String,
        points_earned: u64,
        first_find: bool,
    },
    AchievementUnlocked {
        player_id: Uuid,
        achievement_id: String,
        new_tier: usize,
    },
    ChallengeCompleted {
        player_id: Uuid,
        challenge_id: String,
        date: NaiveDate,
    },
    StreakClaimed {
        player_id: Uuid,
        new_streak: u32,
    },
    CompletionChanged {
        player_id: Uuid,
        total_percent: f64,
    },
    SnapshotTaken {
        player_id: Uuid,
        date: NaiveDate,
    },
}

#[derive(Clone)]
pub struct EventBroadcaster {
    sender: Sender<GameEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = channel(10000);
        Self { sender }
    }

    pub fn broadcast(&self, event: GameEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Receiver<GameEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
