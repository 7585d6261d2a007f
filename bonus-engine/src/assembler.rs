//! Document assembly
//!
//! Every document is assembled from a [`BonusRecord`]. A fresh draft is first
//! flattened with its resolved maps, so saving and regenerating share one
//! code path and reassembly never touches the pricing tables.

use crate::builder::ResolvedMaps;
use crate::document::{
    wrap_caps, BonusConfig, BonusDocument, ConfigExtra, Proportions, Schedule, Trigger,
    DOCUMENT_TYPE,
};
use crate::draft::{BonusDraft, ConfigType, LocalizedText, TriggerType};
use crate::record::{to_record, BonusRecord, DEFAULT_SCHEDULE_TYPE};
use crate::types::CurrencyMap;
use tracing::debug;

/// Assemble a document from a draft and its resolved maps
pub fn assemble(draft: &BonusDraft, maps: &ResolvedMaps) -> BonusDocument {
    assemble_record(&to_record(draft, maps))
}

/// Assemble a document from a stored record, using its maps as-is
pub fn assemble_record(record: &BonusRecord) -> BonusDocument {
    debug!("Assembling {} ({})", record.id, record.config_type.as_str());

    BonusDocument {
        id: record.id.clone(),
        schedule: schedule_section(record),
        trigger: trigger_section(record),
        config: Some(config_section(record)),
        kind: DOCUMENT_TYPE.to_string(),
    }
}

fn schedule_section(record: &BonusRecord) -> Option<Schedule> {
    let from = present(&record.schedule_from)?;
    let to = present(&record.schedule_to)?;

    Some(Schedule {
        kind: present(&record.schedule_type)
            .unwrap_or(DEFAULT_SCHEDULE_TYPE)
            .to_string(),
        from: from.to_string(),
        to: to.to_string(),
        timezone: present(&record.timezone).map(str::to_string),
    })
}

fn trigger_section(record: &BonusRecord) -> Trigger {
    let ids = if record.trigger_type == TriggerType::Open {
        record.trigger_ids.clone()
    } else {
        Vec::new()
    };

    Trigger {
        name: text(&record.trigger_name),
        description: text(&record.trigger_description),
        minimum_amount: positive_map(&record.minimum_amount),
        iterations: record.trigger_iterations.filter(|n| *n > 0),
        kind: record.trigger_type,
        duration: record.trigger_duration.clone(),
        ids,
        restricted_countries: record.restricted_countries.clone(),
        allowed_countries: record.allowed_countries.clone(),
        segments: record.segments.clone(),
    }
}

fn config_section(record: &BonusRecord) -> BonusConfig {
    let mut config = BonusConfig {
        cost: None,
        multiplier: None,
        maximum_bets: None,
        minimum_stake_to_wager: None,
        maximum_stake_to_wager: None,
        provider: record.provider.clone(),
        brand: record.brand.clone(),
        kind: record.config_type,
        category: record.category,
        percentage: None,
        wagering_multiplier: None,
        maximum_amount: None,
        maximum_withdraw: positive_map(&record.maximum_withdraw).as_ref().map(wrap_caps),
        maximum_cashback: None,
        include_amount_on_target_wager_calculation: None,
        cap_calculation_amount_to_maximum_bonus: None,
        compensate_overspending: None,
        withdraw_active: record.withdraw_active,
        extra: None,
        expiry: None,
    };

    match record.config_type {
        ConfigType::FreeBet => {
            config.cost = record.cost.clone();
            config.multiplier = record.multiplier.clone();
            config.maximum_bets = record.maximum_bets.clone();
            config.extra = record
                .game
                .clone()
                .filter(|_| record.category.carries_game())
                .map(|game| ConfigExtra {
                    game: Some(game),
                    proportions: None,
                });
            config.expiry = Some(record.expiry.clone());
        }
        ConfigType::Cash => {
            config.percentage = record.percentage;
            config.wagering_multiplier = record.wagering_multiplier;
            config.maximum_amount = positive_map(&record.maximum_amount);
            config.minimum_stake_to_wager = positive_map(&record.minimum_stake_to_wager);
            config.maximum_stake_to_wager = positive_map(&record.maximum_stake_to_wager);
            config.include_amount_on_target_wager_calculation =
                Some(record.include_amount_on_target_wager);
            config.cap_calculation_amount_to_maximum_bonus = Some(record.cap_calculation_to_maximum);
            config.compensate_overspending = Some(record.compensate_overspending);
        }
        ConfigType::Cashback => {
            config.percentage = record.percentage;
            config.wagering_multiplier = record.wagering_multiplier;
            config.maximum_amount = positive_map(&record.maximum_amount);
            config.minimum_stake_to_wager = positive_map(&record.minimum_stake_to_wager);
            config.maximum_stake_to_wager = positive_map(&record.maximum_stake_to_wager);
            config.maximum_cashback = positive_map(&record.maximum_cashback);
            config.include_amount_on_target_wager_calculation =
                Some(record.include_amount_on_target_wager);
            config.cap_calculation_amount_to_maximum_bonus = Some(record.cap_calculation_to_maximum);
            config.compensate_overspending = Some(record.compensate_overspending);
            config.extra = proportions(record).map(|proportions| ConfigExtra {
                game: None,
                proportions: Some(proportions),
            });
            config.expiry = Some(record.expiry.clone());
        }
    }

    config
}

/// EUR contribution of each game family the record selects
fn proportions(record: &BonusRecord) -> Option<Proportions> {
    let base = |map: &Option<CurrencyMap>| map.as_ref().and_then(CurrencyMap::base_value);
    let kind = record.proportions_type;

    let proportions = Proportions {
        slot_games: base(&record.casino_proportions).filter(|_| kind.includes_casino()),
        live_casino: base(&record.live_casino_proportions).filter(|_| kind.includes_live_casino()),
    };
    Some(proportions).filter(|p| !p.is_empty())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn text(value: &Option<LocalizedText>) -> Option<LocalizedText> {
    value.clone().filter(|t| !t.is_empty())
}

/// Drop maps with nothing positive in them
fn positive_map(map: &Option<CurrencyMap>) -> Option<CurrencyMap> {
    map.clone().filter(|m| !m.is_empty() && !m.all_zero())
}
