//! Derived currency maps computed from resolved ones

use crate::types::{CurrencyMap, PricingTable, DEFAULT_KEY};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeSet;

/// Withdrawal-cap tiers as (minimum percentage, multiplier), highest first
const WITHDRAWAL_TIERS: [(i64, i64); 5] = [(200, 3), (150, 6), (120, 8), (100, 10), (25, 12)];

/// Multiplier below the lowest tier
const BASE_WITHDRAWAL_MULTIPLIER: i64 = 12;

/// Round to 4 decimal places, half away from zero
pub fn round4(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// `"*"`, the supported currencies and any extra key present in `maps`
fn keys_of<'a>(currencies: &'a [String], maps: &[&'a CurrencyMap]) -> BTreeSet<&'a str> {
    let mut keys: BTreeSet<&str> = currencies.iter().map(String::as_str).collect();
    keys.insert(DEFAULT_KEY);
    for map in maps {
        keys.extend(map.keys());
    }
    keys
}

/// Free-spin multiplier per currency.
///
/// `multiplier = round4(maximum_bets_count / (minimum_amount[C] / cost[C]))`.
/// Any non-positive input for a currency yields `1` for that currency.
pub fn compute_multiplier_map(
    minimum_amount: &CurrencyMap,
    cost: &CurrencyMap,
    maximum_bets_count: Decimal,
    currencies: &[String],
) -> CurrencyMap {
    keys_of(currencies, &[cost])
        .into_iter()
        .map(|currency| {
            let min = minimum_amount.get_or_default(currency).unwrap_or_default();
            let unit_cost = cost.get_or_default(currency).unwrap_or_default();
            (currency, multiplier_for(min, unit_cost, maximum_bets_count))
        })
        .collect()
}

fn multiplier_for(min: Decimal, cost: Decimal, maximum_bets_count: Decimal) -> Decimal {
    if cost <= Decimal::ZERO || min <= Decimal::ZERO || maximum_bets_count <= Decimal::ZERO {
        return Decimal::ONE;
    }
    min.checked_div(cost)
        .and_then(|free_spin_value| maximum_bets_count.checked_div(free_spin_value))
        .map(round4)
        .unwrap_or(Decimal::ONE)
}

/// "Up To" multiplier per currency: `round4(fs_per_euro * cost[C] / unit[C])`.
///
/// Units come from the first currency-unit table; a missing unit counts as `1`.
pub fn compute_up_to_multiplier_map(
    cost: &CurrencyMap,
    fs_per_euro: Decimal,
    currency_units: Option<&PricingTable>,
    currencies: &[String],
) -> CurrencyMap {
    keys_of(currencies, &[cost])
        .into_iter()
        .map(|currency| {
            let unit_cost = cost.get_or_default(currency).unwrap_or_default();
            let unit = currency_units
                .and_then(|t| t.values.get(currency))
                .filter(|u| *u > Decimal::ZERO)
                .unwrap_or(Decimal::ONE);

            let multiplier = if unit_cost <= Decimal::ZERO {
                Decimal::ONE
            } else {
                fs_per_euro
                    .checked_mul(unit_cost)
                    .and_then(|v| v.checked_div(unit))
                    .map(round4)
                    .unwrap_or(Decimal::ONE)
            };
            (currency, multiplier)
        })
        .collect()
}

/// Withdrawal-cap multiplier for a bonus percentage.
///
/// Tiers are checked from the highest threshold down; each lower bound is inclusive.
pub fn compute_withdrawal_tier_multiplier(percentage: Decimal) -> Decimal {
    WITHDRAWAL_TIERS
        .iter()
        .find(|(threshold, _)| percentage >= Decimal::from(*threshold))
        .map(|(_, multiplier)| Decimal::from(*multiplier))
        .unwrap_or_else(|| Decimal::from(BASE_WITHDRAWAL_MULTIPLIER))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn currencies() -> Vec<String> {
        vec!["EUR".to_string(), "USD".to_string(), "GBP".to_string()]
    }

    #[test]
    fn test_round4_half_away_from_zero() {
        assert_eq!(round4(dec("1.23455")), dec("1.2346"));
        assert_eq!(round4(dec("-1.23455")), dec("-1.2346"));
        assert_eq!(round4(dec("1.23454")), dec("1.2345"));
    }

    #[test]
    fn test_multiplier_map() {
        let min = CurrencyMap::uniform(dec("50"), &currencies());
        let cost: CurrencyMap = [
            ("*", dec("0.12")),
            ("EUR", dec("0.12")),
            ("USD", dec("0.13")),
            ("GBP", dec("0.12")),
        ]
        .into_iter()
        .collect();

        let map = compute_multiplier_map(&min, &cost, dec("600"), &currencies());
        assert_eq!(map.get("EUR"), Some(dec("1.44")));
        assert_eq!(map.get("*"), Some(dec("1.44")));
        assert_eq!(map.get("USD"), Some(dec("1.56")));
    }

    #[test]
    fn test_zero_cost_yields_one() {
        let min = CurrencyMap::uniform(dec("50"), &currencies());
        let mut cost = CurrencyMap::uniform(dec("0.12"), &currencies());
        cost.insert("USD", Decimal::ZERO);

        let map = compute_multiplier_map(&min, &cost, dec("600"), &currencies());
        assert_eq!(map.get("USD"), Some(Decimal::ONE));
        assert_eq!(map.get("EUR"), Some(dec("1.44")));
    }

    #[test]
    fn test_missing_minimum_yields_one() {
        let cost = CurrencyMap::uniform(dec("0.12"), &currencies());
        let map = compute_multiplier_map(&CurrencyMap::new(), &cost, dec("600"), &currencies());
        assert!(map.iter().all(|(_, v)| v == Decimal::ONE));
    }

    #[test]
    fn test_up_to_multiplier() {
        let cost = CurrencyMap::uniform(dec("0.2"), &currencies());
        let units = PricingTable::new(
            "u",
            "Units",
            [("EUR", dec("1")), ("USD", dec("2"))].into_iter().collect(),
        );

        let map = compute_up_to_multiplier_map(&cost, dec("10"), Some(&units), &currencies());
        assert_eq!(map.get("EUR"), Some(dec("2")));
        assert_eq!(map.get("USD"), Some(dec("1")));
        assert_eq!(map.get("GBP"), Some(dec("2")));
    }

    #[test]
    fn test_withdrawal_tiers() {
        assert_eq!(compute_withdrawal_tier_multiplier(dec("250")), dec("3"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("200")), dec("3"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("199")), dec("6"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("150")), dec("6"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("120")), dec("8"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("100")), dec("10"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("25")), dec("12"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("24")), dec("12"));
        assert_eq!(compute_withdrawal_tier_multiplier(dec("0")), dec("12"));
    }
}
