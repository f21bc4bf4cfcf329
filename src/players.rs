use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::{RESERVED_USERNAMES, USERNAME_MAX_LEN, USERNAME_MIN_LEN};
use crate::errors::{GameError, GameResult};

/// Identity handed to the engines: a stable id plus the ban flag that
/// excludes a player from leaderboard result sets. Token issuance lives
/// with the external identity collaborator, not here.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: Uuid,
    pub username: String,
    pub is_banned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PlayerRegistry {
    players: Arc<RwLock<HashMap<Uuid, Player>>>,
}

pub fn validate_username(username: &str) -> GameResult<String> {
    let trimmed = username.trim();

    if trimmed.len() < USERNAME_MIN_LEN {
        return Err(GameError::validation(format!(
            "username must be at least {USERNAME_MIN_LEN} characters"
        )));
    }
    if trimmed.len() > USERNAME_MAX_LEN {
        return Err(GameError::validation(format!(
            "username must be at most {USERNAME_MAX_LEN} characters"
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(GameError::validation(
            "username can only contain letters, numbers, and underscores",
        ));
    }
    if RESERVED_USERNAMES.contains(&trimmed.to_lowercase().as_str()) {
        return Err(GameError::validation("this username is reserved"));
    }

    Ok(trimmed.to_string())
}

fn generated_username() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("player_{}", &suffix[..8])
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a player, validating the requested username or generating
    /// one. Usernames are unique case-insensitively.
    pub async fn register(&self, username: Option<String>, now: DateTime<Utc>) -> GameResult<Player> {
        let mut players = self.players.write().await;

        let name = match username {
            Some(requested) => {
                let name = validate_username(&requested)?;
                if Self::taken(&players, &name) {
                    return Err(GameError::conflict("username is already taken"));
                }
                name
            }
            None => {
                let mut name = generated_username();
                while Self::taken(&players, &name) {
                    name = generated_username();
                }
                name
            }
        };

        let player = Player {
            id: Uuid::new_v4(),
            username: name,
            is_banned: false,
            created_at: now,
        };
        players.insert(player.id, player.clone());
        Ok(player)
    }

    fn taken(players: &HashMap<Uuid, Player>, name: &str) -> bool {
        let lower = name.to_lowercase();
        players.values().any(|p| p.username.to_lowercase() == lower)
    }

    pub async fn get(&self, id: Uuid) -> Option<Player> {
        self.players.read().await.get(&id).cloned()
    }

    pub async fn set_banned(&self, id: Uuid, banned: bool) -> bool {
        match self.players.write().await.get_mut(&id) {
            Some(player) => {
                player.is_banned = banned;
                true
            }
            None => false,
        }
    }

    /// (id, username, banned) triples for leaderboard assembly.
    pub async fn roster(&self) -> Vec<(Uuid, String, bool)> {
        self.players
            .read()
            .await
            .values()
            .map(|p| (p.id, p.username.clone(), p.is_banned))
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.players.read().await.len()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
