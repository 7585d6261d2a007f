//! Flattened storage record
//!
//! The persistence layer keeps bonuses as flat rows with currency maps that
//! are already resolved. Regenerating a document from a record never goes
//! back to the pricing tables.

use crate::builder::ResolvedMaps;
use crate::draft::{
    BonusDraft, Category, ConfigType, LocalizedText, ProportionsType, TriggerType, DEFAULT_DURATION,
    DEFAULT_EXPIRY,
};
use crate::types::{number, CurrencyMap};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Operator datetime-local input format
const INPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Stored schedule timestamp format (`21-11-2025 10:00`)
const STORED_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Schedule kind stored when none is given
pub const DEFAULT_SCHEDULE_TYPE: &str = "period";

/// Flattened bonus as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusRecord {
    /// Bonus identifier
    pub id: String,

    // Schedule
    /// Schedule kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<String>,
    /// Start, in stored format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_from: Option<String>,
    /// End, in stored format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_to: Option<String>,
    /// Schedule timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    // Trigger
    /// Display name by locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_name: Option<LocalizedText>,
    /// Description by locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_description: Option<LocalizedText>,
    /// Trigger kind
    #[serde(default)]
    pub trigger_type: TriggerType,
    /// Trigger claim window
    #[serde(default = "default_duration")]
    pub trigger_duration: String,
    /// Claim count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_iterations: Option<u32>,
    /// Bonuses that open this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trigger_ids: Vec<String>,
    /// Qualifying deposit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_amount: Option<CurrencyMap>,
    /// Excluded countries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restricted_countries: Vec<String>,
    /// Allowed countries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_countries: Vec<String>,
    /// Targeted player segments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,

    // Config
    /// Payout kind
    #[serde(default)]
    pub config_type: ConfigType,
    /// Game category
    #[serde(default)]
    pub category: Category,
    /// Game provider
    #[serde(default)]
    pub provider: String,
    /// Operator brand
    #[serde(default)]
    pub brand: String,
    /// Cost per free spin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CurrencyMap>,
    /// Derived free-spin multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<CurrencyMap>,
    /// Number of free spins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_bets: Option<CurrencyMap>,
    /// Bonus or cashback percentage
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub percentage: Option<Decimal>,
    /// Wagering requirement
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub wagering_multiplier: Option<Decimal>,
    /// Smallest counted bet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_stake_to_wager: Option<CurrencyMap>,
    /// Largest counted bet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_stake_to_wager: Option<CurrencyMap>,
    /// Largest bonus paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_amount: Option<CurrencyMap>,
    /// Flat caps; nested `{cap: n}` entries are unwrapped on read
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_caps"
    )]
    pub maximum_withdraw: Option<CurrencyMap>,
    /// Largest cashback paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_cashback: Option<CurrencyMap>,
    /// Game families counted for cashback wagering
    #[serde(default)]
    pub proportions_type: ProportionsType,
    /// Slot-game wagering contribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub casino_proportions: Option<CurrencyMap>,
    /// Live-casino wagering contribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_casino_proportions: Option<CurrencyMap>,
    /// Free-spin game
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
    /// Payout expiry
    #[serde(default = "default_expiry")]
    pub expiry: String,

    // Flags
    /// Count the deposit in the wagering target
    #[serde(default = "enabled")]
    pub include_amount_on_target_wager: bool,
    /// Cap the calculation base at the maximum bonus
    #[serde(default)]
    pub cap_calculation_to_maximum: bool,
    /// Refund stakes above the wagering maximum
    #[serde(default = "enabled")]
    pub compensate_overspending: bool,
    /// Withdrawals allowed while the bonus runs
    #[serde(default)]
    pub withdraw_active: bool,

    // Up To free spins
    /// Whether the free spins scale with the deposit
    #[serde(default)]
    pub up_to: bool,
    /// Free spins per deposited euro
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub up_to_fs_per_euro: Option<Decimal>,

    /// Operator notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

fn default_expiry() -> String {
    DEFAULT_EXPIRY.to_string()
}

fn enabled() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCap {
    Flat(Decimal),
    Nested { cap: Decimal },
}

fn deserialize_caps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<CurrencyMap>, D::Error> {
    let stored = Option::<BTreeMap<String, StoredCap>>::deserialize(deserializer)?;
    Ok(stored.map(|caps| {
        caps.into_iter()
            .map(|(currency, cap)| match cap {
                StoredCap::Flat(v) | StoredCap::Nested { cap: v } => (currency, v),
            })
            .collect()
    }))
}

/// Convert datetime-local input (`2026-01-04T22:00`) to the stored format
/// (`04-01-2026 22:00`). Anything else is kept as entered.
pub fn format_schedule_timestamp(input: &str) -> String {
    let input = input.trim();
    NaiveDateTime::parse_from_str(input, INPUT_TIMESTAMP_FORMAT)
        .map(|ts| ts.format(STORED_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|_| input.to_string())
}

/// Fill the `"*"` locale from `en`, else from the first translation
pub fn with_default_locale(mut text: LocalizedText) -> LocalizedText {
    if text.is_empty() || text.contains_key("*") {
        return text;
    }
    let fallback = text
        .get("en")
        .or_else(|| text.values().next())
        .cloned()
        .unwrap_or_default();
    text.insert("*".to_string(), fallback);
    text
}

fn non_empty(list: &[String]) -> Vec<String> {
    list.iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl BonusRecord {
    /// Flatten a draft and its resolved maps for persistence
    pub fn from_draft(draft: &BonusDraft, maps: &ResolvedMaps) -> Self {
        let schedule = draft.schedule_bounds();
        let name = with_default_locale(draft.name.clone());
        let description = with_default_locale(draft.description.clone());
        let up_to_fs_per_euro = draft.up_to_fs_per_euro.filter(|v| *v > Decimal::ZERO);

        Self {
            id: draft.id.trim().to_string(),
            schedule_type: schedule.map(|_| DEFAULT_SCHEDULE_TYPE.to_string()),
            schedule_from: schedule.map(|(from, _)| format_schedule_timestamp(from)),
            schedule_to: schedule.map(|(_, to)| format_schedule_timestamp(to)),
            timezone: schedule.and_then(|_| non_blank(&draft.schedule_timezone)),
            trigger_name: Some(name).filter(|n| !n.is_empty()),
            trigger_description: Some(description).filter(|d| !d.is_empty()),
            trigger_type: draft.trigger_type,
            trigger_duration: Some(draft.duration.trim())
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_DURATION)
                .to_string(),
            trigger_iterations: draft.iterations.filter(|n| *n > 0),
            trigger_ids: non_empty(&draft.chained_bonus_ids),
            minimum_amount: maps.minimum_amount.clone(),
            restricted_countries: non_empty(&draft.restricted_countries),
            allowed_countries: non_empty(&draft.allowed_countries),
            segments: non_empty(&draft.segments),
            config_type: draft.config_type,
            category: draft.category,
            provider: draft.provider.clone(),
            brand: draft.brand.clone(),
            cost: maps.cost.clone(),
            multiplier: maps.multiplier.clone(),
            maximum_bets: maps.maximum_bets.clone(),
            percentage: draft.percentage,
            wagering_multiplier: draft.wagering_multiplier,
            minimum_stake_to_wager: maps.minimum_stake_to_wager.clone(),
            maximum_stake_to_wager: maps.maximum_stake_to_wager.clone(),
            maximum_amount: maps.maximum_amount.clone(),
            maximum_withdraw: maps.maximum_withdraw.clone(),
            maximum_cashback: maps.maximum_cashback.clone(),
            proportions_type: draft.proportions_type,
            casino_proportions: maps.casino_proportions.clone(),
            live_casino_proportions: maps.live_casino_proportions.clone(),
            game: non_blank(&draft.game),
            expiry: Some(draft.expiry.trim())
                .filter(|e| !e.is_empty())
                .unwrap_or(DEFAULT_EXPIRY)
                .to_string(),
            include_amount_on_target_wager: draft.include_amount_on_target_wager,
            cap_calculation_to_maximum: draft.cap_calculation_to_maximum,
            compensate_overspending: draft.compensate_overspending,
            withdraw_active: draft.withdraw_active,
            up_to: up_to_fs_per_euro.is_some(),
            up_to_fs_per_euro,
            notes: non_blank(&draft.notes),
        }
    }

    /// Parse a stored record
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Flatten a draft and its resolved maps for persistence
pub fn to_record(draft: &BonusDraft, maps: &ResolvedMaps) -> BonusRecord {
    BonusRecord::from_draft(draft, maps)
}

impl BonusDraft {
    /// Rebuild an editable draft from a stored record.
    ///
    /// Reference values come from each map's `"*"` entry; the derived
    /// multiplier is not carried over since it is recomputed on save.
    pub fn from_record(record: &BonusRecord) -> Self {
        let base = |map: &Option<CurrencyMap>| map.as_ref().and_then(CurrencyMap::default_value);

        Self {
            id: record.id.clone(),
            provider: record.provider.clone(),
            brand: record.brand.clone(),
            schedule_from: record.schedule_from.clone(),
            schedule_to: record.schedule_to.clone(),
            schedule_timezone: record.timezone.clone(),
            trigger_type: record.trigger_type,
            duration: record.trigger_duration.clone(),
            name: record.trigger_name.clone().unwrap_or_default(),
            description: record.trigger_description.clone().unwrap_or_default(),
            minimum_amount_eur: base(&record.minimum_amount),
            iterations: record.trigger_iterations,
            restricted_countries: record.restricted_countries.clone(),
            allowed_countries: record.allowed_countries.clone(),
            segments: record.segments.clone(),
            chained_bonus_ids: record.trigger_ids.clone(),
            config_type: record.config_type,
            category: record.category,
            cost_eur: base(&record.cost),
            maximum_bets_count: base(&record.maximum_bets),
            maximum_withdraw_eur: base(&record.maximum_withdraw),
            maximum_amount_eur: base(&record.maximum_amount),
            minimum_stake_to_wager_eur: base(&record.minimum_stake_to_wager),
            maximum_stake_to_wager_eur: base(&record.maximum_stake_to_wager),
            maximum_cashback_eur: base(&record.maximum_cashback),
            proportions_type: record.proportions_type,
            casino_proportion: base(&record.casino_proportions),
            live_casino_proportion: base(&record.live_casino_proportions),
            percentage: record.percentage,
            wagering_multiplier: record.wagering_multiplier,
            up_to_fs_per_euro: record.up_to_fs_per_euro.filter(|_| record.up_to),
            game: record.game.clone(),
            expiry: record.expiry.clone(),
            include_amount_on_target_wager: record.include_amount_on_target_wager,
            cap_calculation_to_maximum: record.cap_calculation_to_maximum,
            compensate_overspending: record.compensate_overspending,
            withdraw_active: record.withdraw_active,
            notes: record.notes.clone(),
        }
    }
}
