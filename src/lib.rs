use serde::{Deserialize, Serialize};

pub mod achievements;
pub mod api;
pub mod catalog;
pub mod challenges;
pub mod clock;
pub mod completion;
pub mod config;
pub mod errors;
pub mod events;
pub mod leaderboard;
pub mod outbox;
pub mod players;
pub mod rarity;
pub mod rate_limiter;
pub mod roll;
pub mod state;
pub mod store;
pub mod streaks;

/// How a cosmetic ended up in a player's inventory. First unlock wins;
/// later grants of the same skin never overwrite it.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum UnlockMethod {
    Purchase,
    Streak,
    Challenge,
}
