//! Reference value matching against pricing tables

use crate::types::{CurrencyMap, PricingTable};
use rust_decimal::Decimal;

/// Tolerance used when none is configured (0.001)
pub fn default_tolerance() -> Decimal {
    Decimal::new(1, 3)
}

/// Find the first table whose EUR anchor lies within `tolerance` of `base_value`.
///
/// List order is the only tie-break. Tables without an EUR entry never match.
pub fn resolve(
    base_value: Decimal,
    tables: &[PricingTable],
    tolerance: Decimal,
) -> Option<&PricingTable> {
    tables.iter().find(|table| {
        table
            .base_value()
            .map_or(false, |anchor| (anchor - base_value).abs() < tolerance)
    })
}

/// [`resolve`] with the default tolerance
pub fn resolve_default(base_value: Decimal, tables: &[PricingTable]) -> Option<&PricingTable> {
    resolve(base_value, tables, default_tolerance())
}

/// Fallback map: `base_value` for `"*"` and every currency
pub fn uniform_map(base_value: Decimal, currencies: &[String]) -> CurrencyMap {
    CurrencyMap::uniform(base_value, currencies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn table(id: &str, eur: &str) -> PricingTable {
        PricingTable::new(
            id,
            format!("Table {}", id),
            [("EUR", dec(eur)), ("USD", dec(eur) + Decimal::ONE)]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_exact_match() {
        let tables = vec![table("1", "0.10"), table("2", "0.12")];
        let hit = resolve_default(dec("0.12"), &tables).unwrap();
        assert_eq!(hit.id, "2");
    }

    #[test]
    fn test_within_tolerance() {
        let tables = vec![table("1", "0.12")];
        assert!(resolve_default(dec("0.1205"), &tables).is_some());
        assert!(resolve_default(dec("0.122"), &tables).is_none());
    }

    #[test]
    fn test_tolerance_is_strict() {
        let tables = vec![table("1", "1")];
        assert!(resolve(dec("1.001"), &tables, dec("0.001")).is_none());
    }

    #[test]
    fn test_first_listed_wins() {
        let tables = vec![table("a", "0.20"), table("b", "0.20")];
        assert_eq!(resolve_default(dec("0.20"), &tables).unwrap().id, "a");
    }

    #[test]
    fn test_missing_eur_never_matches() {
        let broken = PricingTable::new("x", "No EUR", [("USD", dec("0.2"))].into_iter().collect());
        let tables = vec![broken, table("ok", "0.2")];
        assert_eq!(resolve_default(dec("0.2"), &tables).unwrap().id, "ok");
    }

    #[test]
    fn test_empty_tables() {
        assert!(resolve_default(dec("5"), &[]).is_none());
    }

    #[test]
    fn test_uniform_map() {
        let currencies = vec!["EUR".to_string(), "USD".to_string()];
        let map = uniform_map(dec("50"), &currencies);
        assert_eq!(map.len(), 3);
        assert!(map.iter().all(|(_, v)| v == dec("50")));
    }
}
