//! Static game data: the weighted rarity catalog, shop items, button skins,
//! streak milestones, achievement definitions and the daily challenge pool.
//! Loaded once at startup and never mutated.

use crate::achievements::{AchievementDef, Metric};
use crate::challenges::{ChallengeDef, ChallengeKind};
use crate::rarity::RarityDef;

pub fn rarities() -> Vec<RarityDef> {
    const RAW: [(&str, f64, u64); 36] = [
        ("Average", 40.003, 0),
        ("Common", 20.0, 0),
        ("Uncommon", 17.6, 0),
        ("Slightly Rare", 10.0, 1),
        ("Rare", 5.0, 2),
        ("More Rare", 3.0, 2),
        ("Very Rare", 2.0, 3),
        ("Super Rare", 1.0, 5),
        ("Ultra Rare", 0.5, 8),
        ("Epic", 0.4, 10),
        ("More Epic", 0.2, 15),
        ("Very Epic", 0.15, 20),
        ("Super Epic", 0.12, 25),
        ("Ultra Epic", 0.1, 30),
        ("Legendary", 0.08, 40),
        ("Legendary +", 0.07, 50),
        ("Super Legendary", 0.06, 75),
        ("Ultra Legendary", 0.05, 90),
        ("Mythical", 0.045, 100),
        ("Ultra Mythical", 0.04, 150),
        ("Chroma", 0.03, 200),
        ("Super Chroma", 0.025, 250),
        ("Ultra Chroma", 0.022, 350),
        ("Magical", 0.02, 500),
        ("Super Magical", 0.018, 750),
        ("Ultra Magical", 0.016, 900),
        ("Extreme", 0.015, 1000),
        ("Ultra Extreme", 0.012, 1200),
        ("Ethereal", 0.01, 1500),
        ("Ultra Ethereal", 0.008, 1800),
        ("Stellar", 0.006, 2000),
        ("Ultra Stellar", 0.005, 2500),
        ("Extraordinary", 0.003, 3000),
        ("Ultra Extraordinary", 0.002, 4000),
        ("Unknown", 0.001, 5000),
        ("Glitched", 0.0005, 10000),
    ];

    RAW.iter()
        .enumerate()
        .map(|(rank, &(name, weight, points))| RarityDef {
            name,
            weight,
            points,
            rank,
        })
        .collect()
}

/// Table ranks where the named challenge tiers begin.
pub const RARE_PLUS: usize = 4;
pub const EPIC_PLUS: usize = 9;
pub const LEGENDARY_PLUS: usize = 14;
pub const CHROMA_PLUS: usize = 20;

#[derive(Clone, Copy, Debug)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub base_cost: u64,
}

pub const SHOP_ITEMS: [ShopItem; 6] = [
    ShopItem { id: "auto_clicker", name: "Auto Clicker", base_cost: 100 },
    ShopItem { id: "double_points", name: "Double Points", base_cost: 200 },
    ShopItem { id: "golden_click", name: "Golden Click", base_cost: 400 },
    ShopItem { id: "luck_boost", name: "Luck Boost", base_cost: 500 },
    ShopItem { id: "time_freeze", name: "Time Freeze", base_cost: 250 },
    ShopItem { id: "golden_mode", name: "Golden Mode", base_cost: 2000 },
];

pub fn shop_item(id: &str) -> Option<&'static ShopItem> {
    SHOP_ITEMS.iter().find(|item| item.id == id)
}

/// Light skins are challenge rewards, dark skins come from streak milestones
/// or purchase.
pub const LIGHT_SKINS: [&str; 8] = [
    "light_red", "light_blue", "light_green", "light_yellow",
    "light_purple", "light_orange", "light_pink", "light_cyan",
];

pub const DARK_SKINS: [&str; 8] = [
    "dark_red", "dark_blue", "dark_green", "dark_yellow",
    "dark_purple", "dark_orange", "dark_pink", "dark_cyan",
];

#[derive(Clone, Copy, Debug)]
pub struct StreakMilestone {
    pub day: u32,
    pub skin_id: &'static str,
}

pub const STREAK_MILESTONES: [StreakMilestone; 5] = [
    StreakMilestone { day: 7, skin_id: "dark_blue" },
    StreakMilestone { day: 14, skin_id: "dark_red" },
    StreakMilestone { day: 30, skin_id: "dark_green" },
    StreakMilestone { day: 60, skin_id: "dark_purple" },
    StreakMilestone { day: 100, skin_id: "dark_orange" },
];

pub fn milestone_for_day(day: u32) -> Option<&'static StreakMilestone> {
    STREAK_MILESTONES.iter().find(|m| m.day == day)
}

pub const STREAK_BASE_REWARD: u64 = 100;

/// Username rules enforced at registration.
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

pub const RESERVED_USERNAMES: [&str; 25] = [
    "admin", "administrator", "system", "moderator", "mod", "staff",
    "support", "help", "info", "null", "undefined", "player", "user",
    "test", "demo", "guest", "anonymous", "root", "server", "bot",
    "beyond", "rare", "beyondrare", "glitched", "unknown",
];

/// Completion category weights, summing to 100.
pub struct CompletionWeights {
    pub rarities: f64,
    pub backgrounds: f64,
    pub shop_items: f64,
    pub skins: f64,
}

pub const COMPLETION_WEIGHTS: CompletionWeights = CompletionWeights {
    rarities: 50.0,
    backgrounds: 35.0,
    shop_items: 5.0,
    skins: 10.0,
};

/// Configured denominators per completion category. Backgrounds fold the
/// permanent and seasonal sets together, skins fold light and dark.
pub struct CompletionTotals {
    pub rarities: u32,
    pub backgrounds: u32,
    pub shop_items: u32,
    pub skins: u32,
}

pub const COMPLETION_TOTALS: CompletionTotals = CompletionTotals {
    rarities: 36,
    backgrounds: 39,
    shop_items: 6,
    skins: 16,
};

pub fn daily_challenge_pool() -> Vec<ChallengeDef> {
    vec![
        ChallengeDef {
            id: "earn_2000_points",
            name: "Earn 2000 Points",
            target: 2000,
            kind: ChallengeKind::Points,
        },
        ChallengeDef {
            id: "get_chroma_plus",
            name: "Get anything Chroma+",
            target: 1,
            kind: ChallengeKind::RarityTier { min_rank: CHROMA_PLUS },
        },
        ChallengeDef {
            id: "get_25_rare_plus",
            name: "Get 25 Rare+ Finds",
            target: 25,
            kind: ChallengeKind::RarityTierCount { min_rank: RARE_PLUS },
        },
        ChallengeDef {
            id: "get_15_epic_plus",
            name: "Get 15 Epic+ Finds",
            target: 15,
            kind: ChallengeKind::RarityTierCount { min_rank: EPIC_PLUS },
        },
        ChallengeDef {
            id: "get_8_legendary_plus",
            name: "Get 8 Legendary+ Finds",
            target: 8,
            kind: ChallengeKind::RarityTierCount { min_rank: LEGENDARY_PLUS },
        },
        ChallengeDef {
            id: "manual_clicks_250",
            name: "250 Manual Clicks",
            target: 250,
            kind: ChallengeKind::ManualClicks,
        },
        ChallengeDef {
            id: "purchase_10_items",
            name: "Purchase 10 Items",
            target: 10,
            kind: ChallengeKind::Purchases,
        },
        ChallengeDef {
            id: "purchase_golden_mode",
            name: "Purchase Golden Mode",
            target: 1,
            kind: ChallengeKind::GoldenMode,
        },
    ]
}

/// Tiered achievement definitions. Rarity-family achievements use table
/// ranks as thresholds against the highest rank a player has found.
pub fn achievement_defs() -> Vec<AchievementDef> {
    vec![
        // Click milestones
        AchievementDef::new("first_click", "First Click", Metric::Clicks, vec![1]),
        AchievementDef::new("clicks_100", "Clicker", Metric::Clicks, vec![100]),
        AchievementDef::new("clicks_1000", "Dedicated Clicker", Metric::Clicks, vec![1000]),
        AchievementDef::new("clicks_10000", "Click Master", Metric::Clicks, vec![10000]),
        AchievementDef::new("clicks_100000", "Click Legend", Metric::Clicks, vec![100000]),
        // Purchases
        AchievementDef::new("first_purchase", "First Purchase", Metric::Purchases, vec![1]),
        AchievementDef::new("purchases_10", "Shopper", Metric::Purchases, vec![10]),
        AchievementDef::new("purchases_50", "Big Spender", Metric::Purchases, vec![50]),
        AchievementDef::new("golden_mode", "Golden Gamer", Metric::GoldenMode, vec![1]),
        // Rarity hunting, thresholds are table ranks
        AchievementDef::new("get_rare", "Rare Hunter", Metric::RarityRank, vec![4, 7, 8]),
        AchievementDef::new("get_epic", "Epic Discovery", Metric::RarityRank, vec![9, 12, 13]),
        AchievementDef::new("get_legendary", "Legendary Hunter", Metric::RarityRank, vec![14, 15, 17]),
        AchievementDef::new("get_mythical", "Myth Seeker", Metric::RarityRank, vec![18, 19]),
        AchievementDef::new("get_chroma", "Rainbow Chaser", Metric::RarityRank, vec![20, 21, 22]),
        AchievementDef::new("get_magical", "Magic Finder", Metric::RarityRank, vec![23, 24, 25]),
        AchievementDef::new("get_ethereal", "Beyond Reality", Metric::RarityRank, vec![28, 29]),
        AchievementDef::new("get_stellar", "Star Gazer", Metric::RarityRank, vec![30, 31]),
        AchievementDef::new("get_extraordinary", "Extraordinary Find", Metric::RarityRank, vec![32, 33]),
        AchievementDef::new("get_unknown", "The Unknown", Metric::RarityRank, vec![34]),
        AchievementDef::new("get_glitched", "System Error", Metric::RarityRank, vec![35]),
        // Completion percent
        AchievementDef::new("complete_10", "Just Beginning", Metric::Completion, vec![10]),
        AchievementDef::new("complete_25", "Quarter Way", Metric::Completion, vec![25]),
        AchievementDef::new("complete_50", "Halfway There", Metric::Completion, vec![50]),
        AchievementDef::new("complete_75", "Almost Done", Metric::Completion, vec![75]),
        AchievementDef::new("complete_100", "Completionist", Metric::Completion, vec![100]),
        // Streaks
        AchievementDef::new("streak_3", "Getting Started", Metric::Streak, vec![3]),
        AchievementDef::new("streak_7", "Week Warrior", Metric::Streak, vec![7]),
        AchievementDef::new("streak_14", "Fortnight Fighter", Metric::Streak, vec![14]),
        AchievementDef::new("streak_30", "Monthly Master", Metric::Streak, vec![30]),
        AchievementDef::new("streak_100", "Century Streak", Metric::Streak, vec![100]),
        // Backgrounds and skins
        AchievementDef::new("first_bg", "Interior Designer", Metric::Backgrounds, vec![1]),
        AchievementDef::new("bg_10", "Decorator", Metric::Backgrounds, vec![10]),
        AchievementDef::new("first_skin", "Stylist", Metric::Skins, vec![1]),
        AchievementDef::new("skins_5", "Fashionista", Metric::Skins, vec![5]),
        // Daily challenge sweeps
        AchievementDef::new("daily_complete_1", "Daily Doer", Metric::DailyCompletions, vec![1]),
        AchievementDef::new("daily_complete_7", "Weekly Warrior", Metric::DailyCompletions, vec![7]),
        AchievementDef::new("daily_complete_30", "Monthly Champion", Metric::DailyCompletions, vec![30]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_weights_sum_to_one_hundred() {
        let w = &COMPLETION_WEIGHTS;
        assert_eq!(w.rarities + w.backgrounds + w.shop_items + w.skins, 100.0);
    }

    #[test]
    fn achievement_tiers_strictly_increase() {
        for def in achievement_defs() {
            for pair in def.tiers.windows(2) {
                assert!(pair[0] < pair[1], "{}", def.id);
            }
            assert!(!def.tiers.is_empty(), "{}", def.id);
        }
    }

    #[test]
    fn rarity_achievement_thresholds_are_valid_ranks() {
        let table = rarities();
        for def in achievement_defs() {
            if def.metric == Metric::RarityRank {
                for &tier in &def.tiers {
                    assert!((tier as usize) < table.len(), "{}", def.id);
                }
            }
        }
    }

    #[test]
    fn milestone_lookup_hits_configured_days() {
        assert_eq!(milestone_for_day(7).unwrap().skin_id, "dark_blue");
        assert_eq!(milestone_for_day(100).unwrap().skin_id, "dark_orange");
        assert!(milestone_for_day(8).is_none());
    }

    #[test]
    fn challenge_pool_ids_are_unique() {
        let pool = daily_challenge_pool();
        for (i, a) in pool.iter().enumerate() {
            for b in &pool[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
