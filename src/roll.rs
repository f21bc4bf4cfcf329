use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rarity::{RarityDef, RarityTable};

/// Per-roll probability of the secret tier once every other rarity has been
/// discovered. Fires before any mode logic and short-circuits the roll.
pub const SECRET_TIER_CHANCE: f64 = 0.000_005;

/// Roll modes in priority order when several modifiers are active at once.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum RollMode {
    GoldenClick,
    GoldenMode,
    LuckBoost,
    Normal,
}

/// Active modifier flags for one player. The roll itself stays pure; the
/// caller resolves the mode, applies the point multiplier and consumes the
/// one-shot Golden Click afterwards.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ModifierState {
    pub golden_click_ready: bool,
    pub golden_mode_active: bool,
    pub luck_boost_active: bool,
    pub double_points_active: bool,
}

impl ModifierState {
    /// Golden Click outranks Golden Mode outranks Luck Boost. Golden Click
    /// only triggers on manual clicks.
    pub fn mode(&self, manual: bool) -> RollMode {
        if manual && self.golden_click_ready {
            RollMode::GoldenClick
        } else if self.golden_mode_active {
            RollMode::GoldenMode
        } else if self.luck_boost_active {
            RollMode::LuckBoost
        } else {
            RollMode::Normal
        }
    }

    /// Spends the one-shot Golden Click. When the secret gate fired the
    /// modifier never shaped the draw, so it is kept for the next click.
    pub fn consume(&mut self, mode: RollMode, secret_find: bool) {
        if mode == RollMode::GoldenClick && !secret_find {
            self.golden_click_ready = false;
        }
    }

    pub fn point_multiplier(&self) -> u64 {
        if self.double_points_active {
            2
        } else {
            1
        }
    }
}

/// True once the player has found every non-secret rarity at least once.
pub fn secret_tier_unlocked(table: &RarityTable, discovered: &HashSet<String>) -> bool {
    let glitched = table.glitched().name;
    table
        .entries()
        .iter()
        .filter(|r| r.name != glitched)
        .all(|r| discovered.contains(r.name))
}

/// One weighted draw. Pure in (table, mode, rng, discovered set): no side
/// effects, always returns a valid entry from the table.
pub fn roll<'a, R: Rng + ?Sized>(
    rng: &mut R,
    table: &'a RarityTable,
    mode: RollMode,
    discovered: &HashSet<String>,
) -> &'a RarityDef {
    if secret_tier_unlocked(table, discovered) && rng.random::<f64>() < SECRET_TIER_CHANCE {
        return table.glitched();
    }

    let eligible = eligible_set(table, mode);
    weighted_pick(rng, &eligible).unwrap_or_else(|| table.lowest())
}

/// Builds the (entry, effective weight) subset for a mode. The secret tier
/// is excluded from every subset.
fn eligible_set(table: &RarityTable, mode: RollMode) -> Vec<(&RarityDef, f64)> {
    let glitched = table.glitched().name;
    let floor = table.golden_floor_points();
    let [low_a, low_b] = table.protected_low_tiers();

    table
        .entries()
        .iter()
        .filter(|r| r.name != glitched)
        .filter_map(|r| match mode {
            RollMode::GoldenClick | RollMode::GoldenMode => {
                (r.points >= floor).then_some((r, r.weight))
            }
            RollMode::LuckBoost => {
                if r.name == low_a || r.name == low_b {
                    Some((r, r.weight))
                } else {
                    Some((r, r.weight * 2.0))
                }
            }
            RollMode::Normal => Some((r, r.weight)),
        })
        .collect()
}

/// Cumulative-weight walk in table order. Returns None only when the subset
/// is empty or a floating-point edge leaves the draw past the last bucket.
fn weighted_pick<'a, R: Rng + ?Sized>(
    rng: &mut R,
    eligible: &[(&'a RarityDef, f64)],
) -> Option<&'a RarityDef> {
    let total: f64 = eligible.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return None;
    }

    let draw = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (def, weight) in eligible {
        cumulative += weight;
        if draw <= cumulative {
            return Some(def);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};
    use std::collections::HashMap;

    /// Rng that always yields the lowest draw, so the first eligible bucket
    /// (and the secret gate, when unlocked) is hit deterministically.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
    }

    fn all_discovered(table: &RarityTable) -> HashSet<String> {
        table
            .entries()
            .iter()
            .filter(|r| r.name != table.glitched().name)
            .map(|r| r.name.to_string())
            .collect()
    }

    fn frequencies(table: &RarityTable, mode: RollMode, seed: u64, n: usize) -> HashMap<&str, f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let discovered = HashSet::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..n {
            let hit = roll(&mut rng, table, mode, &discovered);
            *counts.entry(hit.name).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(name, c)| (name, c as f64 / n as f64))
            .collect()
    }

    #[test]
    fn normal_mode_converges_to_weight_ratio() {
        let table = RarityTable::standard();
        let freq = frequencies(&table, RollMode::Normal, 42, 200_000);

        let total: f64 = table
            .entries()
            .iter()
            .filter(|r| r.name != "Glitched")
            .map(|r| r.weight)
            .sum();

        for name in ["Average", "Common", "Uncommon", "Slightly Rare", "Rare"] {
            let expected = table.get(name).unwrap().weight / total;
            let observed = freq.get(name).copied().unwrap_or(0.0);
            assert!(
                (observed - expected).abs() < expected * 0.1 + 0.001,
                "{name}: expected {expected:.4}, observed {observed:.4}"
            );
        }
    }

    #[test]
    fn normal_mode_never_yields_secret_tier() {
        let table = RarityTable::standard();
        let freq = frequencies(&table, RollMode::Normal, 7, 100_000);
        assert!(!freq.contains_key("Glitched"));
    }

    #[test]
    fn golden_modes_respect_point_floor() {
        let table = RarityTable::standard();
        let floor = table.golden_floor_points();
        let discovered = HashSet::new();

        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..2_000 {
                let click = roll(&mut rng, &table, RollMode::GoldenClick, &discovered);
                assert!(click.points >= floor, "{} below floor", click.name);
                let mode = roll(&mut rng, &table, RollMode::GoldenMode, &discovered);
                assert!(mode.points >= floor, "{} below floor", mode.name);
                assert_ne!(click.name, "Glitched");
                assert_ne!(mode.name, "Glitched");
            }
        }
    }

    #[test]
    fn luck_boost_lifts_boosted_tiers_and_protects_the_two_lowest() {
        let table = RarityTable::standard();
        let normal = frequencies(&table, RollMode::Normal, 11, 300_000);
        let boosted = frequencies(&table, RollMode::LuckBoost, 12, 300_000);

        // Every boosted tier gains frequency relative to Normal mode.
        for name in ["Uncommon", "Slightly Rare", "Rare"] {
            let before = normal.get(name).copied().unwrap_or(0.0);
            let after = boosted.get(name).copied().unwrap_or(0.0);
            assert!(after > before, "{name}: {after:.4} <= {before:.4}");
        }

        // The protected pair keeps its internal ordering (Average ~2x Common).
        let ratio_normal = normal["Average"] / normal["Common"];
        let ratio_boosted = boosted["Average"] / boosted["Common"];
        assert!((ratio_normal - ratio_boosted).abs() < 0.25);
    }

    #[test]
    fn secret_gate_requires_full_discovery() {
        let table = RarityTable::standard();

        // Gate closed: lowest draw lands on the first eligible bucket.
        let hit = roll(&mut ZeroRng, &table, RollMode::Normal, &HashSet::new());
        assert_eq!(hit.name, "Average");

        // Gate open: the same draw fires the secret check first.
        let hit = roll(&mut ZeroRng, &table, RollMode::Normal, &all_discovered(&table));
        assert_eq!(hit.name, "Glitched");
    }

    #[test]
    fn secret_gate_ignores_mode_restrictions() {
        let table = RarityTable::standard();
        let hit = roll(
            &mut ZeroRng,
            &table,
            RollMode::GoldenMode,
            &all_discovered(&table),
        );
        assert_eq!(hit.name, "Glitched");
    }

    #[test]
    fn modifier_priority_and_consumption() {
        let mut state = ModifierState {
            golden_click_ready: true,
            golden_mode_active: true,
            luck_boost_active: true,
            double_points_active: true,
        };

        assert_eq!(state.mode(true), RollMode::GoldenClick);
        assert_eq!(state.mode(false), RollMode::GoldenMode);
        assert_eq!(state.point_multiplier(), 2);

        state.consume(RollMode::GoldenClick, false);
        assert!(!state.golden_click_ready);
        assert_eq!(state.mode(true), RollMode::GoldenMode);

        state.golden_mode_active = false;
        assert_eq!(state.mode(true), RollMode::LuckBoost);
        state.luck_boost_active = false;
        assert_eq!(state.mode(true), RollMode::Normal);
    }

    #[test]
    fn secret_find_keeps_golden_click_for_the_next_roll() {
        let mut state = ModifierState {
            golden_click_ready: true,
            ..Default::default()
        };

        state.consume(RollMode::GoldenClick, true);
        assert!(state.golden_click_ready);
        assert_eq!(state.mode(true), RollMode::GoldenClick);

        state.consume(RollMode::GoldenClick, false);
        assert!(!state.golden_click_ready);
    }

    #[test]
    fn empty_total_falls_back_to_lowest() {
        let table = RarityTable::standard();
        assert!(weighted_pick(&mut ZeroRng, &[]).is_none());
        // The public entry point never propagates that None.
        let hit = roll(&mut ZeroRng, &table, RollMode::Normal, &HashSet::new());
        assert!(table.get(hit.name).is_some());
    }
}
