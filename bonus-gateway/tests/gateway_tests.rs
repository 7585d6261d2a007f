//! Integration tests for pricing refresh ordering and the bonus service

use async_trait::async_trait;
use bonus_engine::{
    BonusDraft, ConfigType, EngineConfig, PricingTable, ProportionsType, TableField, TriggerType,
};
use bonus_gateway::{
    load_pricing_context, BonusService, DocumentStore, Error, InMemoryDocumentStore,
    InMemoryPricingStore, MemorySink, PricingSession, PricingTableStore, Result,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn table(id: &str, pairs: &[(&str, &str)]) -> PricingTable {
    PricingTable::new(
        id,
        id,
        pairs.iter().map(|(c, v)| (*c, dec(v))).collect(),
    )
}

fn pricing_store() -> InMemoryPricingStore {
    let store = InMemoryPricingStore::new();
    store.insert(
        "PRAGMATIC",
        TableField::Cost,
        vec![table("p-012", &[("EUR", "0.12"), ("USD", "0.13")])],
    );
    store.insert(
        "NETENT",
        TableField::Cost,
        vec![table("n-012", &[("EUR", "0.12"), ("USD", "0.14")])],
    );
    store.insert(
        "DEFAULT",
        TableField::MaximumWithdraw,
        vec![table("w-100", &[("EUR", "100"), ("USD", "110")])],
    );
    store.insert(
        "DEFAULT",
        TableField::CasinoProportions,
        vec![table("cp-100", &[("EUR", "100"), ("USD", "80")])],
    );
    store
}

/// Delays each provider's fetch and fails for unknown ones
struct DelayedStore {
    inner: InMemoryPricingStore,
    delays: HashMap<String, Duration>,
}

#[async_trait]
impl PricingTableStore for DelayedStore {
    async fn tables(&self, provider: &str, field: TableField) -> Result<Vec<PricingTable>> {
        if field == TableField::Cost {
            match self.delays.get(provider) {
                Some(delay) => tokio::time::sleep(*delay).await,
                None => return Err(Error::Store(format!("{} unreachable", provider))),
            }
        }
        self.inner.tables(provider, field).await
    }
}

fn delayed(delays: &[(&str, u64)]) -> Arc<DelayedStore> {
    Arc::new(DelayedStore {
        inner: pricing_store(),
        delays: delays
            .iter()
            .map(|(p, ms)| (p.to_string(), Duration::from_millis(*ms)))
            .collect(),
    })
}

fn config() -> Arc<EngineConfig> {
    Arc::new(EngineConfig {
        supported_currencies: vec!["EUR".to_string(), "USD".to_string(), "GBP".to_string()],
        ..EngineConfig::default()
    })
}

fn free_spins(id: &str) -> BonusDraft {
    let mut draft = BonusDraft::new(id, "PRAGMATIC");
    draft.minimum_amount_eur = Some(dec("50"));
    draft.cost_eur = Some(dec("0.12"));
    draft.maximum_bets_count = Some(dec("600"));
    draft.maximum_withdraw_eur = Some(dec("100"));
    draft.name.insert("en".to_string(), "600 Free Spins".to_string());
    draft.game = Some("vs20olympgate".to_string());
    draft
}

async fn service() -> (BonusService, Arc<InMemoryDocumentStore>) {
    let session = Arc::new(PricingSession::new(Arc::new(pricing_store()), config()));
    session.refresh("PRAGMATIC").await.unwrap();
    let documents = Arc::new(InMemoryDocumentStore::new());
    (BonusService::new(session, documents.clone()), documents)
}

#[tokio::test]
async fn test_cost_from_provider_rest_from_default() {
    let config = config();
    let context = load_pricing_context(&pricing_store(), "PRAGMATIC", &config)
        .await
        .unwrap();

    assert_eq!(context.tables(TableField::Cost)[0].id, "p-012");
    assert_eq!(context.tables(TableField::MaximumWithdraw)[0].id, "w-100");
    assert!(context.tables(TableField::MinimumAmount).is_empty());
}

#[tokio::test]
async fn test_nothing_loaded_is_unavailable() {
    let session = PricingSession::new(Arc::new(pricing_store()), config());
    assert!(matches!(session.current(), Err(Error::PricingUnavailable(_))));
}

#[tokio::test(start_paused = true)]
async fn test_later_refresh_wins_when_it_finishes_first() {
    let session = PricingSession::new(delayed(&[("PRAGMATIC", 100), ("NETENT", 10)]), config());

    let (older, newer) = tokio::join!(session.refresh("PRAGMATIC"), session.refresh("NETENT"));

    assert!(matches!(older, Err(Error::Superseded { generation: 1, latest: 2 })));
    assert_eq!(newer.unwrap().provider, "NETENT");
    assert_eq!(session.current().unwrap().provider, "NETENT");
}

#[tokio::test(start_paused = true)]
async fn test_later_refresh_wins_when_it_finishes_last() {
    let session = PricingSession::new(delayed(&[("PRAGMATIC", 10), ("NETENT", 100)]), config());

    let (older, newer) = tokio::join!(session.refresh("PRAGMATIC"), session.refresh("NETENT"));

    assert!(matches!(older, Err(Error::Superseded { .. })));
    assert!(newer.is_ok());
    assert_eq!(session.current().unwrap().provider, "NETENT");
    assert_eq!(session.generation(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_refresh_keeps_previous_tables() {
    let session = PricingSession::new(delayed(&[("PRAGMATIC", 10)]), config());
    session.refresh("PRAGMATIC").await.unwrap();

    let err = session.refresh("UNKNOWN").await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));
    assert_eq!(session.current().unwrap().provider, "PRAGMATIC");
    assert!(matches!(
        session.current_for("UNKNOWN"),
        Err(Error::PricingUnavailable(_))
    ));
}

#[tokio::test]
async fn test_save_resolves_and_stores() {
    let (service, documents) = service().await;
    let outcome = service.save(&free_spins("FS_600")).await.unwrap();

    assert_eq!(outcome.id, "FS_600");
    assert!(outcome.warnings.is_empty());

    let config = outcome.document.config.as_ref().unwrap();
    assert_eq!(config.cost.as_ref().unwrap().get("USD"), Some(dec("0.13")));
    assert_eq!(config.multiplier.as_ref().unwrap().get("EUR"), Some(dec("1.44")));
    assert_eq!(config.maximum_withdraw.as_ref().unwrap()["USD"].cap, dec("110"));

    let stored = documents.get("FS_600").await.unwrap();
    assert_eq!(stored.cost.unwrap().get("USD"), Some(dec("0.13")));
}

#[tokio::test]
async fn test_regenerate_matches_saved_document() {
    let (service, _) = service().await;
    let saved = service.save(&free_spins("FS_600")).await.unwrap();

    let first = service.regenerate("FS_600").await.unwrap();
    let second = service.regenerate("FS_600").await.unwrap();
    assert_eq!(
        first.to_json_pretty().unwrap(),
        second.to_json_pretty().unwrap()
    );
    assert_eq!(
        first.to_json_pretty().unwrap(),
        saved.document.to_json_pretty().unwrap()
    );
}

#[tokio::test]
async fn test_miss_is_reported_not_fatal() {
    let (service, _) = service().await;
    let mut draft = free_spins("FS_ODD");
    draft.cost_eur = Some(dec("0.35"));

    let outcome = service.save(&draft).await.unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    let cost = outcome.document.config.unwrap().cost.unwrap();
    assert!(cost.iter().all(|(_, v)| v == dec("0.35")));
}

#[tokio::test]
async fn test_duplicate_save_surfaces_field_errors() {
    let (service, _) = service().await;
    service.save(&free_spins("FS_600")).await.unwrap();

    let err = service.save(&free_spins("FS_600")).await.unwrap_err();
    assert_eq!(err.to_string(), "body.id: bonus FS_600 already exists");
}

#[tokio::test]
async fn test_other_provider_needs_its_own_tables() {
    let (service, _) = service().await;
    let draft = BonusDraft {
        cost_eur: Some(dec("0.12")),
        ..BonusDraft::new("FS_NETENT", "NETENT")
    };
    assert!(matches!(
        service.save(&draft).await,
        Err(Error::PricingUnavailable(_))
    ));

    service.pricing().refresh("NETENT").await.unwrap();
    let outcome = service.save(&draft).await.unwrap();
    let cost = outcome.document.config.unwrap().cost.unwrap();
    assert_eq!(cost.get("USD"), Some(dec("0.14")));
}

#[tokio::test]
async fn test_rehydrate_update_and_export() {
    let (service, _) = service().await;
    service.save(&free_spins("FS_600")).await.unwrap();

    let mut draft = service.rehydrate("FS_600").await.unwrap();
    assert_eq!(draft.cost_eur, Some(dec("0.12")));
    assert_eq!(draft.maximum_bets_count, Some(dec("600")));

    draft.trigger_type = TriggerType::Manual;
    draft.maximum_bets_count = Some(dec("300"));
    let updated = service.update("FS_600", &draft).await.unwrap();
    assert_eq!(updated.trigger.kind, TriggerType::Manual);
    assert_eq!(
        updated.config.as_ref().unwrap().multiplier.as_ref().unwrap().get("EUR"),
        Some(dec("0.72"))
    );

    let sink = MemorySink::new();
    let exported = service.export("FS_600", &sink).await.unwrap();
    assert_eq!(sink.exports(), vec![exported.clone()]);
    assert!(exported.contains("\"type\": \"manual\""));

    service.delete("FS_600").await.unwrap();
    assert!(matches!(
        service.regenerate("FS_600").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_cash_bonus_gets_tier_caps() {
    let (service, _) = service().await;
    let draft = BonusDraft {
        config_type: ConfigType::Cash,
        percentage: Some(dec("200")),
        wagering_multiplier: Some(dec("35")),
        maximum_amount_eur: Some(dec("300")),
        ..BonusDraft::new("DEPOSIT_25_200_22.12.25", "PRAGMATIC")
    };

    let outcome = service.save(&draft).await.unwrap();
    let config = outcome.document.config.unwrap();
    assert_eq!(config.maximum_withdraw.unwrap()["*"].cap, dec("3"));
    assert!(config.cost.is_none());
    assert_eq!(config.maximum_amount.unwrap().get("GBP"), Some(dec("300")));
}

#[tokio::test]
async fn test_cashback_has_fixed_caps_and_proportions() {
    let (service, documents) = service().await;
    let draft = BonusDraft {
        config_type: ConfigType::Cashback,
        trigger_type: TriggerType::Manual,
        percentage: Some(dec("100")),
        wagering_multiplier: Some(dec("15")),
        maximum_amount_eur: Some(dec("500")),
        maximum_withdraw_eur: Some(dec("100")),
        proportions_type: ProportionsType::Casino,
        casino_proportion: Some(dec("100")),
        live_casino_proportion: Some(dec("25")),
        ..BonusDraft::new("CASHBACK_100_22.12.25", "PRAGMATIC")
    };

    let outcome = service.save(&draft).await.unwrap();
    assert!(outcome.warnings.is_empty());
    let config = outcome.document.config.unwrap();
    let caps = config.maximum_withdraw.unwrap();
    assert!(caps.values().all(|c| c.cap == dec("5")));

    let proportions = config.extra.unwrap().proportions.unwrap();
    assert_eq!(proportions.slot_games, Some(dec("100")));
    assert_eq!(proportions.live_casino, None);

    let stored = documents.get("CASHBACK_100_22.12.25").await.unwrap();
    assert_eq!(stored.casino_proportions.unwrap().get("USD"), Some(dec("80")));

    let rehydrated = service.rehydrate("CASHBACK_100_22.12.25").await.unwrap();
    assert_eq!(rehydrated.proportions_type, ProportionsType::Casino);
    assert_eq!(rehydrated.casino_proportion, Some(dec("100")));
    assert_eq!(rehydrated.live_casino_proportion, None);
}
