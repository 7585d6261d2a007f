//! Property-based tests for resolution and assembly invariants
//!
//! - Tolerance matching: a table is found at its own anchor and missed
//!   two tolerances away
//! - Fallback totality: every supported currency and `"*"` is present
//! - Multiplier fallback: zero cost never divides
//! - Idempotent reassembly: stored records reassemble byte-identically
//! - Suppressed schedule: no dates, no `schedule` key

use bonus_engine::{
    assemble, assemble_record, build_map, build_maps, compute_multiplier_map,
    compute_withdrawal_tier_multiplier, resolve, validate, BonusDraft, BonusRecord, CurrencyMap,
    EngineConfig, FieldKind, PricingContext, PricingTable, TableField,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for non-negative reference values with up to 4 decimals
fn value_strategy() -> impl Strategy<Value = Decimal> {
    (0u64..10_000_000u64).prop_map(|units| Decimal::new(units as i64, 4))
}

/// Strategy for positive reference values
fn positive_strategy() -> impl Strategy<Value = Decimal> {
    (1u64..10_000_000u64).prop_map(|units| Decimal::new(units as i64, 4))
}

fn config() -> EngineConfig {
    EngineConfig::default()
}

fn table(id: &str, eur: Decimal) -> PricingTable {
    PricingTable::new(
        id,
        format!("Table {}", id),
        [("EUR", eur), ("USD", eur + Decimal::ONE)].into_iter().collect(),
    )
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

proptest! {
    #[test]
    fn prop_resolve_finds_own_anchor(value in value_strategy()) {
        let config = config();
        let tables = vec![table("t", value)];

        prop_assert!(resolve(value, &tables, config.tolerance).is_some());
        let far = value + config.tolerance * Decimal::TWO;
        prop_assert!(resolve(far, &tables, config.tolerance).is_none());
    }

    #[test]
    fn prop_fallback_is_total(value in value_strategy()) {
        let config = config();
        for field in FieldKind::ALL {
            let map = build_map(value, field, &[], &config);
            prop_assert!(map.is_resolved(&config.supported_currencies));
            prop_assert!(map.iter().all(|(_, v)| v == value));
        }
    }

    #[test]
    fn prop_matched_map_default_equals_eur(value in value_strategy()) {
        let config = config();
        let map = build_map(value, FieldKind::Cost, &[table("t", value)], &config);
        prop_assert_eq!(map.get("*"), map.get("EUR"));
        prop_assert!(map.is_resolved(&config.supported_currencies));
    }

    #[test]
    fn prop_zero_cost_yields_one(min in positive_strategy(), bets in positive_strategy()) {
        let config = config();
        let currencies = &config.supported_currencies;
        let minimum = CurrencyMap::uniform(min, currencies);
        let cost = CurrencyMap::uniform(Decimal::ZERO, currencies);

        let map = compute_multiplier_map(&minimum, &cost, bets, currencies);
        prop_assert!(map.iter().all(|(_, v)| v == Decimal::ONE));
    }

    #[test]
    fn prop_withdrawal_tier_is_monotonic(low in 0u32..400, step in 0u32..400) {
        let lower = compute_withdrawal_tier_multiplier(Decimal::from(low));
        let higher = compute_withdrawal_tier_multiplier(Decimal::from(low + step));
        prop_assert!(higher <= lower);
    }

    #[test]
    fn prop_reassembly_is_idempotent(
        cost in positive_strategy(),
        bets in 1u32..1000,
        minimum in positive_strategy(),
        with_schedule in any::<bool>(),
    ) {
        let config = config();
        let context = PricingContext::new("PRAGMATIC")
            .with_tables(TableField::Cost, vec![table("c", cost)]);

        let mut draft = BonusDraft::new("FS_PROP", "PRAGMATIC");
        draft.cost_eur = Some(cost);
        draft.maximum_bets_count = Some(Decimal::from(bets));
        draft.minimum_amount_eur = Some(minimum);
        if with_schedule {
            draft.schedule_from = Some("2026-01-04T22:00".to_string());
            draft.schedule_to = Some("2026-01-11T22:00".to_string());
        }

        let maps = build_maps(&draft, &context, &config);
        let record = bonus_engine::to_record(&draft, &maps);
        let stored = serde_json::to_string(&record).unwrap();
        let reloaded = BonusRecord::from_json(&stored).unwrap();

        let first = assemble_record(&record).to_json_pretty().unwrap();
        let second = assemble_record(&reloaded).to_json_pretty().unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(validate(&first).is_empty());
        prop_assert_eq!(first.contains("\"schedule\""), with_schedule);
    }
}

#[test]
fn test_document_without_dates_has_no_schedule_key() {
    let draft = BonusDraft::new("FS_1", "PRAGMATIC");
    let doc = assemble(&draft, &Default::default());
    let json = doc.to_json_pretty().unwrap();

    assert!(!json.contains("schedule"));
    assert!(!json.contains("null"));
}

#[test]
fn test_validator_reports_position() {
    let errors = validate(r#"{"a":}"#);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line(), Some(1));
    assert_eq!(errors[0].column(), Some(6));
}

#[test]
fn test_free_spin_scenario() {
    let config = config();
    let cost_table = PricingTable::new(
        "cost-012",
        "0.12",
        [("EUR", dec("0.12")), ("USD", dec("0.13"))].into_iter().collect(),
    );
    let context = PricingContext::new("PRAGMATIC").with_tables(TableField::Cost, vec![cost_table]);

    let draft = BonusDraft {
        minimum_amount_eur: Some(dec("50")),
        cost_eur: Some(dec("0.12")),
        maximum_bets_count: Some(dec("600")),
        ..BonusDraft::new("FS_600", "PRAGMATIC")
    };
    let maps = build_maps(&draft, &context, &config);

    let cost = maps.cost.as_ref().unwrap();
    assert_eq!(cost.get("*"), Some(dec("0.12")));
    assert_eq!(cost.get("EUR"), Some(dec("0.12")));
    assert_eq!(cost.get("USD"), Some(dec("0.13")));
    assert_eq!(cost.get("GBP"), Some(dec("0.12")));

    let minimum = maps.minimum_amount.as_ref().unwrap();
    assert!(minimum.is_resolved(&config.supported_currencies));
    assert!(minimum.iter().all(|(_, v)| v == dec("50")));

    let multiplier = maps.multiplier.as_ref().unwrap();
    assert_eq!(multiplier.get("EUR"), Some(dec("1.44")));
    assert_eq!(multiplier.get("*"), Some(dec("1.44")));

    let json = assemble(&draft, &maps).to_json_pretty().unwrap();
    assert!(json.contains("\"USD\": 0.13"));
    assert!(json.contains("\"EUR\": 1.44"));
    assert!(validate(&json).is_empty());
}

#[test]
fn test_rehydrated_draft_reassembles_identically() {
    let config = config();
    let cost_table = table("c", dec("0.2"));
    let context = PricingContext::new("PRAGMATIC").with_tables(TableField::Cost, vec![cost_table]);

    let mut draft = BonusDraft::new("FS_REHYDRATE", "PRAGMATIC");
    draft.cost_eur = Some(dec("0.2"));
    draft.maximum_bets_count = Some(dec("100"));
    draft.maximum_withdraw_eur = Some(dec("50"));
    draft.name.insert("en".to_string(), "Spins".to_string());
    draft.schedule_from = Some("2026-01-04T22:00".to_string());
    draft.schedule_to = Some("2026-01-11T22:00".to_string());

    let first = assemble(&draft, &build_maps(&draft, &context, &config));

    let record = bonus_engine::to_record(&draft, &build_maps(&draft, &context, &config));
    let rehydrated = BonusDraft::from_record(&record);
    let again = assemble(&rehydrated, &build_maps(&rehydrated, &context, &config));

    assert_eq!(
        first.to_json_pretty().unwrap(),
        again.to_json_pretty().unwrap()
    );
}
