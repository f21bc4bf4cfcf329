use serde::{Deserialize, Serialize};

/// One weighted outcome tier of a roll. `rank` is the position in the table
/// and orders rarities by point value (points never decrease with rank).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RarityDef {
    pub name: &'static str,
    pub weight: f64,
    pub points: u64,
    pub rank: usize,
}

/// Immutable weighted rarity catalog, loaded once at startup.
#[derive(Clone, Debug)]
pub struct RarityTable {
    entries: Vec<RarityDef>,
}

pub const GLITCHED: &str = "Glitched";

/// Point floor for Golden Click / Golden Mode rolls.
pub const GOLDEN_FLOOR: &str = "Epic";

impl RarityTable {
    pub fn standard() -> Self {
        let table = Self {
            entries: crate::catalog::rarities(),
        };
        debug_assert!(table.is_well_formed());
        table
    }

    /// Points non-decreasing in table order, ranks contiguous, names unique.
    fn is_well_formed(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].points <= w[1].points)
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(i, r)| r.rank == i && r.weight > 0.0)
    }

    pub fn entries(&self) -> &[RarityDef] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RarityDef> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn points_of(&self, name: &str) -> u64 {
        self.get(name).map(|r| r.points).unwrap_or(0)
    }

    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|r| r.rank)
    }

    /// The deterministic fallback entry: lowest-ranked rarity.
    pub fn lowest(&self) -> &RarityDef {
        &self.entries[0]
    }

    pub fn glitched(&self) -> &RarityDef {
        self.get(GLITCHED).expect("catalog contains Glitched")
    }

    /// Point value of the Golden Click / Golden Mode floor.
    pub fn golden_floor_points(&self) -> u64 {
        self.points_of(GOLDEN_FLOOR)
    }

    /// Names of the two lowest-point tiers, protected from Luck Boost.
    pub fn protected_low_tiers(&self) -> [&'static str; 2] {
        [self.entries[0].name, self.entries[1].name]
    }
}
