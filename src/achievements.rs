use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metric families an achievement can track. Every update call names one
/// family plus the player's new cumulative value for it.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum Metric {
    Clicks,
    Purchases,
    GoldenMode,
    RarityRank,
    Completion,
    Streak,
    Backgrounds,
    Skins,
    DailyCompletions,
}

/// One tiered achievement: thresholds are strictly increasing.
#[derive(Clone, Debug)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub metric: Metric,
    pub tiers: Vec<u64>,
}

impl AchievementDef {
    pub fn new(id: &'static str, name: &'static str, metric: Metric, tiers: Vec<u64>) -> Self {
        Self {
            id,
            name,
            metric,
            tiers,
        }
    }

    pub fn max_tier(&self) -> usize {
        self.tiers.len()
    }
}

/// Per-player unlock state. `current_tier` only ever moves up.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct AchievementRecord {
    pub current_tier: usize,
    pub progress: u64,
    pub acknowledged: bool,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TierUnlock {
    pub achievement_id: &'static str,
    pub name: &'static str,
    pub new_tier: usize,
    pub max_tier: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct AchievementStats {
    pub total_achievements: usize,
    pub maxed_achievements: usize,
    pub total_tiers: usize,
    pub earned_tiers: usize,
}

/// Catalog-backed tier progression, indexed by metric for update calls and
/// by id for acknowledgement.
pub struct AchievementEngine {
    by_metric: HashMap<Metric, Vec<AchievementDef>>,
    by_id: HashMap<&'static str, AchievementDef>,
}

impl AchievementEngine {
    pub fn new(defs: Vec<AchievementDef>) -> Self {
        let mut by_metric: HashMap<Metric, Vec<AchievementDef>> = HashMap::new();
        let mut by_id = HashMap::new();
        for def in defs {
            by_id.insert(def.id, def.clone());
            by_metric.entry(def.metric).or_default().push(def);
        }
        Self { by_metric, by_id }
    }

    pub fn standard() -> Self {
        Self::new(crate::catalog::achievement_defs())
    }

    pub fn def(&self, id: &str) -> Option<&AchievementDef> {
        self.by_id.get(id)
    }

    pub fn defs(&self) -> impl Iterator<Item = &AchievementDef> {
        self.by_id.values()
    }

    /// Advances every achievement of the metric family against `new_value`.
    /// Each crossed threshold is reported; tiers never move backwards, so a
    /// lower or repeated value is a no-op.
    pub fn update(
        &self,
        records: &mut HashMap<String, AchievementRecord>,
        metric: Metric,
        new_value: u64,
    ) -> Vec<TierUnlock> {
        let mut unlocked = Vec::new();

        let Some(defs) = self.by_metric.get(&metric) else {
            return unlocked;
        };

        for def in defs {
            let record = records.entry(def.id.to_string()).or_insert_with(|| {
                AchievementRecord {
                    acknowledged: true,
                    ..Default::default()
                }
            });

            record.progress = record.progress.max(new_value);

            let mut crossed = false;
            while record.current_tier < def.tiers.len()
                && new_value >= def.tiers[record.current_tier]
            {
                record.current_tier += 1;
                crossed = true;
                unlocked.push(TierUnlock {
                    achievement_id: def.id,
                    name: def.name,
                    new_tier: record.current_tier,
                    max_tier: def.max_tier(),
                });
            }

            if crossed {
                record.acknowledged = false;
            }
        }

        unlocked
    }

    pub fn acknowledge(&self, records: &mut HashMap<String, AchievementRecord>, id: &str) -> bool {
        match records.get_mut(id) {
            Some(record) => {
                record.acknowledged = true;
                true
            }
            None => false,
        }
    }

    pub fn acknowledge_all(&self, records: &mut HashMap<String, AchievementRecord>) {
        for record in records.values_mut() {
            record.acknowledged = true;
        }
    }

    /// Unlocks the player has not yet seen, retained until acknowledged.
    pub fn unacknowledged(&self, records: &HashMap<String, AchievementRecord>) -> Vec<TierUnlock> {
        let mut pending: Vec<TierUnlock> = records
            .iter()
            .filter(|(_, r)| !r.acknowledged && r.current_tier > 0)
            .filter_map(|(id, r)| {
                self.by_id.get(id.as_str()).map(|def| TierUnlock {
                    achievement_id: def.id,
                    name: def.name,
                    new_tier: r.current_tier,
                    max_tier: def.max_tier(),
                })
            })
            .collect();
        pending.sort_by_key(|u| u.achievement_id);
        pending
    }

    pub fn stats(&self, records: &HashMap<String, AchievementRecord>) -> AchievementStats {
        let total_tiers = self.by_id.values().map(|d| d.max_tier()).sum();
        let earned_tiers = records.values().map(|r| r.current_tier).sum();
        let maxed = self
            .by_id
            .values()
            .filter(|d| {
                records
                    .get(d.id)
                    .is_some_and(|r| r.current_tier >= d.max_tier())
            })
            .count();

        AchievementStats {
            total_achievements: self.by_id.len(),
            maxed_achievements: maxed,
            total_tiers,
            earned_tiers,
        }
    }
}
