//! Bonus template document consumed by the bonus-processing engine
//!
//! Field declaration order is the canonical output order; optional keys are
//! skipped entirely rather than written as `null`.

use crate::draft::{Category, ConfigType, LocalizedText, TriggerType};
use crate::types::{number, CurrencyMap};
use crate::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Discriminator carried by every document
pub const DOCUMENT_TYPE: &str = "bonus_template";

/// Assembled bonus template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusDocument {
    /// Bonus identifier
    pub id: String,

    /// Active period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,

    /// What starts the bonus
    pub trigger: Trigger,

    /// What the bonus pays out
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<BonusConfig>,

    /// Always `bonus_template`
    #[serde(rename = "type")]
    pub kind: String,
}

impl BonusDocument {
    /// Pretty JSON with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a serialized document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Time box of a promotion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Schedule kind, `period` unless stored otherwise
    #[serde(rename = "type")]
    pub kind: String,

    /// Start
    pub from: String,

    /// End
    pub to: String,

    /// Timezone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Trigger section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    /// Display name by locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LocalizedText>,

    /// Description by locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,

    /// Qualifying deposit per currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_amount: Option<CurrencyMap>,

    /// How many times the bonus can be claimed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,

    /// Trigger kind
    #[serde(rename = "type")]
    pub kind: TriggerType,

    /// How long the trigger stays claimable, e.g. `7d`
    pub duration: String,

    /// Bonuses that open this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,

    /// Countries excluded from the bonus
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restricted_countries: Vec<String>,

    /// Countries the bonus is limited to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_countries: Vec<String>,

    /// Player segments targeted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<String>,
}

/// Single-key withdrawal cap object; the consumer rejects bare numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawCap {
    /// Cap value
    #[serde(serialize_with = "number::serialize")]
    pub cap: Decimal,
}

/// Withdrawal caps by currency
pub type WithdrawCaps = BTreeMap<String, WithdrawCap>;

/// Wrap every value of a flat map as `{cap: n}`
pub fn wrap_caps(map: &CurrencyMap) -> WithdrawCaps {
    map.iter()
        .map(|(currency, cap)| (currency.to_string(), WithdrawCap { cap }))
        .collect()
}

/// Wagering contribution per game family, in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Proportions {
    /// Slot games
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub slot_games: Option<Decimal>,

    /// Live casino games
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub live_casino: Option<Decimal>,
}

impl Proportions {
    /// Whether neither family is set
    pub fn is_empty(&self) -> bool {
        self.slot_games.is_none() && self.live_casino.is_none()
    }
}

/// Config extras
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigExtra {
    /// Game the free spins are played on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,

    /// Cashback wagering contributions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proportions: Option<Proportions>,
}

/// Config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusConfig {
    /// Cost per free spin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CurrencyMap>,

    /// Free-spin value multiplier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<CurrencyMap>,

    /// Number of free spins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_bets: Option<CurrencyMap>,

    /// Smallest bet counted toward wagering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_stake_to_wager: Option<CurrencyMap>,

    /// Largest bet counted toward wagering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_stake_to_wager: Option<CurrencyMap>,

    /// Game provider
    pub provider: String,

    /// Operator brand
    pub brand: String,

    /// Payout kind
    #[serde(rename = "type")]
    pub kind: ConfigType,

    /// Game category
    pub category: Category,

    /// Bonus or cashback percentage
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub percentage: Option<Decimal>,

    /// Times the bonus must be wagered
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "number::serialize_opt"
    )]
    pub wagering_multiplier: Option<Decimal>,

    /// Largest bonus paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_amount: Option<CurrencyMap>,

    /// Withdrawal caps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_withdraw: Option<WithdrawCaps>,

    /// Largest cashback paid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_cashback: Option<CurrencyMap>,

    /// Count the deposit in the wagering target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_amount_on_target_wager_calculation: Option<bool>,

    /// Cap the calculation base at the maximum bonus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_calculation_amount_to_maximum_bonus: Option<bool>,

    /// Refund stakes above the wagering maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensate_overspending: Option<bool>,

    /// Whether winnings can be withdrawn while the bonus runs
    pub withdraw_active: bool,

    /// Game and proportion extras
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<ConfigExtra>,

    /// How long the payout stays usable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}
