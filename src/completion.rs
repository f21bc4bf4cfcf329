use serde::Serialize;

use crate::catalog::{COMPLETION_TOTALS, COMPLETION_WEIGHTS};

/// Ownership counts feeding the completion percentage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OwnedCounts {
    pub rarities: u32,
    pub backgrounds: u32,
    pub shop_items: u32,
    pub skins: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct CategoryBreakdown {
    pub owned: u32,
    pub total: u32,
    /// Whole-number display percent for this category alone.
    pub percent: u32,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Completion {
    /// Weighted aggregate in [0, 100], rounded to two decimals.
    pub total_percent: f64,
    pub rarities: CategoryBreakdown,
    pub backgrounds: CategoryBreakdown,
    pub shop_items: CategoryBreakdown,
    pub skins: CategoryBreakdown,
}

fn category(owned: u32, total: u32) -> CategoryBreakdown {
    let ratio = (owned as f64 / total as f64).min(1.0);
    CategoryBreakdown {
        owned,
        total,
        percent: (ratio * 100.0).round() as u32,
    }
}

/// Weighted ownership aggregation across the four configured categories.
/// Each ratio is capped at 1 before weighting, so counts past the
/// configured totals cannot push the aggregate above 100.
pub fn calculate(counts: OwnedCounts) -> Completion {
    let weights = &COMPLETION_WEIGHTS;
    let totals = &COMPLETION_TOTALS;

    let weighted = |owned: u32, total: u32, weight: f64| {
        (owned as f64 / total as f64).min(1.0) * weight
    };

    let raw = weighted(counts.rarities, totals.rarities, weights.rarities)
        + weighted(counts.backgrounds, totals.backgrounds, weights.backgrounds)
        + weighted(counts.shop_items, totals.shop_items, weights.shop_items)
        + weighted(counts.skins, totals.skins, weights.skins);

    Completion {
        total_percent: (raw.clamp(0.0, 100.0) * 100.0).round() / 100.0,
        rarities: category(counts.rarities, totals.rarities),
        backgrounds: category(counts.backgrounds, totals.backgrounds),
        shop_items: category(counts.shop_items, totals.shop_items),
        skins: category(counts.skins, totals.skins),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_progress_is_zero_percent() {
        let completion = calculate(OwnedCounts::default());
        assert_eq!(completion.total_percent, 0.0);
        assert_eq!(completion.rarities.percent, 0);
    }

    #[test]
    fn owning_everything_is_exactly_one_hundred() {
        let completion = calculate(OwnedCounts {
            rarities: 36,
            backgrounds: 39,
            shop_items: 6,
            skins: 16,
        });
        assert_eq!(completion.total_percent, 100.00);
        assert_eq!(completion.skins.percent, 100);
    }

    #[test]
    fn counts_beyond_totals_are_clamped() {
        let completion = calculate(OwnedCounts {
            rarities: 400,
            backgrounds: 400,
            shop_items: 400,
            skins: 400,
        });
        assert_eq!(completion.total_percent, 100.00);
        assert_eq!(completion.shop_items.percent, 100);
    }

    #[test]
    fn rarities_alone_cap_at_their_weight() {
        let completion = calculate(OwnedCounts {
            rarities: 36,
            ..Default::default()
        });
        assert_eq!(completion.total_percent, 50.0);
    }

    proptest! {
        #[test]
        fn completion_is_monotone_in_owned_counts(
            rarities in 0u32..50,
            backgrounds in 0u32..50,
            shop_items in 0u32..10,
            skins in 0u32..20,
        ) {
            let base = calculate(OwnedCounts { rarities, backgrounds, shop_items, skins });
            let more = calculate(OwnedCounts {
                rarities: rarities + 1,
                backgrounds,
                shop_items,
                skins: skins + 1,
            });
            prop_assert!(more.total_percent >= base.total_percent);
            prop_assert!(base.total_percent >= 0.0 && base.total_percent <= 100.0);
        }
    }
}
