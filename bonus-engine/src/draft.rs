//! Operator input for a bonus under construction

use crate::types::TableField;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Trigger duration used when the operator leaves it blank
pub const DEFAULT_DURATION: &str = "7d";

/// Free-bet expiry used when the operator leaves it blank
pub const DEFAULT_EXPIRY: &str = "7d";

/// Localized text keyed by locale, with `"*"` as the fallback
pub type LocalizedText = BTreeMap<String, String>;

/// What starts the bonus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Player deposit
    #[default]
    Deposit,
    /// Awarded by an external system
    External,
    /// Opened by completing other bonuses
    Open,
    /// Granted by an operator
    Manual,
}

impl TriggerType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Deposit => "deposit",
            TriggerType::External => "external",
            TriggerType::Open => "open",
            TriggerType::Manual => "manual",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the bonus pays out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    /// Percentage cash bonus with wagering
    Cash,
    /// Free spins / free bets
    #[default]
    FreeBet,
    /// Percentage of losses returned
    Cashback,
}

impl ConfigType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Cash => "cash",
            ConfigType::FreeBet => "free_bet",
            ConfigType::Cashback => "cashback",
        }
    }
}

/// Product area the bonus applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Casino games
    #[default]
    Games,
    /// Live casino
    LiveCasino,
    /// Sportsbook
    SportsBook,
}

impl Category {
    /// Casino categories carry a game reference in `config.extra`
    pub fn carries_game(&self) -> bool {
        matches!(self, Category::Games | Category::LiveCasino)
    }
}

/// Which game families a cashback's wagering counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProportionsType {
    /// Slot games only
    #[default]
    Casino,
    /// Live casino only
    LiveCasino,
    /// Slots and live casino
    Both,
}

impl ProportionsType {
    /// Whether slot games contribute
    pub fn includes_casino(&self) -> bool {
        matches!(self, ProportionsType::Casino | ProportionsType::Both)
    }

    /// Whether live casino games contribute
    pub fn includes_live_casino(&self) -> bool {
        matches!(self, ProportionsType::LiveCasino | ProportionsType::Both)
    }
}

/// In-progress operator input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusDraft {
    /// Bonus identifier
    pub id: String,
    /// Provider (cost tables are provider-specific)
    pub provider: String,
    /// Brand
    pub brand: String,

    /// Schedule start, operator format
    pub schedule_from: Option<String>,
    /// Schedule end, operator format
    pub schedule_to: Option<String>,
    /// Schedule timezone
    pub schedule_timezone: Option<String>,

    /// Trigger kind
    pub trigger_type: TriggerType,
    /// Trigger duration such as `7d`
    pub duration: String,
    /// Localized trigger name
    pub name: LocalizedText,
    /// Localized trigger description
    pub description: LocalizedText,
    /// Minimum deposit in EUR
    pub minimum_amount_eur: Option<Decimal>,
    /// How many times the bonus can be claimed
    pub iterations: Option<u32>,
    /// Countries excluded from the offer
    pub restricted_countries: Vec<String>,
    /// Countries the offer is limited to
    pub allowed_countries: Vec<String>,
    /// Player segments
    pub segments: Vec<String>,
    /// Bonuses that open this one
    pub chained_bonus_ids: Vec<String>,

    /// Payout kind
    pub config_type: ConfigType,
    /// Product area
    pub category: Category,
    /// Cost per free spin in EUR
    pub cost_eur: Option<Decimal>,
    /// Number of free spins
    pub maximum_bets_count: Option<Decimal>,
    /// Withdrawal cap in EUR
    pub maximum_withdraw_eur: Option<Decimal>,
    /// Maximum bonus in EUR
    pub maximum_amount_eur: Option<Decimal>,
    /// Minimum stake to wager in EUR
    pub minimum_stake_to_wager_eur: Option<Decimal>,
    /// Maximum stake to wager in EUR
    pub maximum_stake_to_wager_eur: Option<Decimal>,
    /// Maximum cashback in EUR
    pub maximum_cashback_eur: Option<Decimal>,
    /// Game families counted for cashback wagering
    pub proportions_type: ProportionsType,
    /// Slot-game wagering contribution, in percent
    pub casino_proportion: Option<Decimal>,
    /// Live-casino wagering contribution, in percent
    pub live_casino_proportion: Option<Decimal>,
    /// Bonus percentage (200 for 200%)
    pub percentage: Option<Decimal>,
    /// Wagering requirement multiplier
    pub wagering_multiplier: Option<Decimal>,
    /// "Up To" free spins per EUR deposited
    pub up_to_fs_per_euro: Option<Decimal>,
    /// Game for casino free spins
    pub game: Option<String>,
    /// Free-bet expiry such as `7d`
    pub expiry: String,

    /// Include deposit amount in the wagering target
    pub include_amount_on_target_wager: bool,
    /// Cap the calculation amount at the maximum bonus
    pub cap_calculation_to_maximum: bool,
    /// Compensate overspending
    pub compensate_overspending: bool,
    /// Whether winnings are withdrawable right away
    pub withdraw_active: bool,

    /// Operator notes, stored but never assembled
    pub notes: Option<String>,
}

impl Default for BonusDraft {
    fn default() -> Self {
        Self {
            id: String::new(),
            provider: String::new(),
            brand: String::new(),
            schedule_from: None,
            schedule_to: None,
            schedule_timezone: None,
            trigger_type: TriggerType::default(),
            duration: DEFAULT_DURATION.to_string(),
            name: LocalizedText::new(),
            description: LocalizedText::new(),
            minimum_amount_eur: None,
            iterations: None,
            restricted_countries: Vec::new(),
            allowed_countries: Vec::new(),
            segments: Vec::new(),
            chained_bonus_ids: Vec::new(),
            config_type: ConfigType::default(),
            category: Category::default(),
            cost_eur: None,
            maximum_bets_count: None,
            maximum_withdraw_eur: None,
            maximum_amount_eur: None,
            minimum_stake_to_wager_eur: None,
            maximum_stake_to_wager_eur: None,
            maximum_cashback_eur: None,
            proportions_type: ProportionsType::default(),
            casino_proportion: None,
            live_casino_proportion: None,
            percentage: None,
            wagering_multiplier: None,
            up_to_fs_per_euro: None,
            game: None,
            expiry: DEFAULT_EXPIRY.to_string(),
            include_amount_on_target_wager: true,
            cap_calculation_to_maximum: false,
            compensate_overspending: true,
            withdraw_active: false,
            notes: None,
        }
    }
}

impl BonusDraft {
    /// New draft for a provider; the brand follows the provider
    pub fn new(id: impl Into<String>, provider: impl Into<String>) -> Self {
        let provider = provider.into();
        Self {
            id: id.into(),
            brand: provider.clone(),
            provider,
            ..Self::default()
        }
    }

    /// Schedule bounds, only when both are filled in
    pub fn schedule_bounds(&self) -> Option<(&str, &str)> {
        let from = self.schedule_from.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let to = self.schedule_to.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((from, to))
    }

    /// Add comma-separated country codes to the restricted list
    pub fn add_restricted_countries(&mut self, input: &str) {
        push_unique(&mut self.restricted_countries, input, true);
    }

    /// Add comma-separated country codes to the allowed list
    pub fn add_allowed_countries(&mut self, input: &str) {
        push_unique(&mut self.allowed_countries, input, true);
    }

    /// Add comma-separated segment ids
    pub fn add_segments(&mut self, input: &str) {
        push_unique(&mut self.segments, input, false);
    }

    /// Current value of a reference field
    pub fn reference(&self, field: FieldKind) -> Option<Decimal> {
        field.get(self)
    }

    /// Overwrite a reference field
    pub fn set_reference(&mut self, field: FieldKind, value: Option<Decimal>) {
        field.set(self, value);
    }
}

fn push_unique(list: &mut Vec<String>, input: &str, uppercase: bool) {
    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let item = if uppercase {
            item.to_uppercase()
        } else {
            item.to_string()
        };
        if !list.contains(&item) {
            list.push(item);
        }
    }
}

/// Reference-value fields of a draft that expand into currency maps.
///
/// Each variant knows where its value lives on [`BonusDraft`] and which
/// pricing-table field backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Trigger minimum deposit
    MinimumAmount,
    /// Cost per free spin
    Cost,
    /// Maximum bets
    MaximumBets,
    /// Withdrawal cap
    MaximumWithdraw,
    /// Maximum bonus amount
    MaximumAmount,
    /// Minimum stake to wager
    MinimumStakeToWager,
    /// Maximum stake to wager
    MaximumStakeToWager,
    /// Maximum cashback
    MaximumCashback,
    /// Slot-game wagering contribution
    CasinoProportions,
    /// Live-casino wagering contribution
    LiveCasinoProportions,
}

impl FieldKind {
    /// Every reference field
    pub const ALL: [FieldKind; 10] = [
        FieldKind::MinimumAmount,
        FieldKind::Cost,
        FieldKind::MaximumBets,
        FieldKind::MaximumWithdraw,
        FieldKind::MaximumAmount,
        FieldKind::MinimumStakeToWager,
        FieldKind::MaximumStakeToWager,
        FieldKind::MaximumCashback,
        FieldKind::CasinoProportions,
        FieldKind::LiveCasinoProportions,
    ];

    /// Pricing-table field backing this field, if any
    pub fn table_field(&self) -> Option<TableField> {
        match self {
            FieldKind::MinimumAmount => Some(TableField::MinimumAmount),
            FieldKind::Cost => Some(TableField::Cost),
            FieldKind::MaximumBets => Some(TableField::MaximumBets),
            FieldKind::MaximumWithdraw => Some(TableField::MaximumWithdraw),
            FieldKind::MaximumAmount => Some(TableField::MaximumAmount),
            FieldKind::MinimumStakeToWager => Some(TableField::MinimumStakeToWager),
            FieldKind::MaximumStakeToWager => Some(TableField::MaximumStakeToWager),
            FieldKind::MaximumCashback => None,
            FieldKind::CasinoProportions => Some(TableField::CasinoProportions),
            FieldKind::LiveCasinoProportions => Some(TableField::LiveCasinoProportions),
        }
    }

    /// Read the reference value from a draft
    pub fn get(&self, draft: &BonusDraft) -> Option<Decimal> {
        match self {
            FieldKind::MinimumAmount => draft.minimum_amount_eur,
            FieldKind::Cost => draft.cost_eur,
            FieldKind::MaximumBets => draft.maximum_bets_count,
            FieldKind::MaximumWithdraw => draft.maximum_withdraw_eur,
            FieldKind::MaximumAmount => draft.maximum_amount_eur,
            FieldKind::MinimumStakeToWager => draft.minimum_stake_to_wager_eur,
            FieldKind::MaximumStakeToWager => draft.maximum_stake_to_wager_eur,
            FieldKind::MaximumCashback => draft.maximum_cashback_eur,
            FieldKind::CasinoProportions => draft.casino_proportion,
            FieldKind::LiveCasinoProportions => draft.live_casino_proportion,
        }
    }

    /// Write the reference value on a draft
    pub fn set(&self, draft: &mut BonusDraft, value: Option<Decimal>) {
        let slot = match self {
            FieldKind::MinimumAmount => &mut draft.minimum_amount_eur,
            FieldKind::Cost => &mut draft.cost_eur,
            FieldKind::MaximumBets => &mut draft.maximum_bets_count,
            FieldKind::MaximumWithdraw => &mut draft.maximum_withdraw_eur,
            FieldKind::MaximumAmount => &mut draft.maximum_amount_eur,
            FieldKind::MinimumStakeToWager => &mut draft.minimum_stake_to_wager_eur,
            FieldKind::MaximumStakeToWager => &mut draft.maximum_stake_to_wager_eur,
            FieldKind::MaximumCashback => &mut draft.maximum_cashback_eur,
            FieldKind::CasinoProportions => &mut draft.casino_proportion,
            FieldKind::LiveCasinoProportions => &mut draft.live_casino_proportion,
        };
        *slot = value;
    }

    /// Positive reference value, if the operator entered one
    pub fn positive(&self, draft: &BonusDraft) -> Option<Decimal> {
        self.get(draft).filter(|v| *v > Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_accessors_round_trip() {
        let mut draft = BonusDraft::new("FS_1", "PRAGMATIC");
        for (idx, field) in FieldKind::ALL.iter().enumerate() {
            field.set(&mut draft, Some(Decimal::from(idx as i64 + 1)));
        }
        for (idx, field) in FieldKind::ALL.iter().enumerate() {
            assert_eq!(field.get(&draft), Some(Decimal::from(idx as i64 + 1)));
        }
        assert_eq!(draft.cost_eur, Some(Decimal::from(2)));
    }

    #[test]
    fn test_schedule_needs_both_bounds() {
        let mut draft = BonusDraft::new("X", "P");
        draft.schedule_from = Some("2025-11-21T10:00".to_string());
        assert!(draft.schedule_bounds().is_none());

        draft.schedule_to = Some("  ".to_string());
        assert!(draft.schedule_bounds().is_none());

        draft.schedule_to = Some("2025-11-28T22:59".to_string());
        assert_eq!(
            draft.schedule_bounds(),
            Some(("2025-11-21T10:00", "2025-11-28T22:59"))
        );
    }

    #[test]
    fn test_country_input_parsing() {
        let mut draft = BonusDraft::new("X", "P");
        draft.add_restricted_countries("br, au,,nz");
        draft.add_restricted_countries("AU");
        assert_eq!(draft.restricted_countries, vec!["BR", "AU", "NZ"]);

        draft.add_segments("vip, Vip");
        assert_eq!(draft.segments, vec!["vip", "Vip"]);
    }

    #[test]
    fn test_positive_filters_zero() {
        let mut draft = BonusDraft::new("X", "P");
        draft.maximum_bets_count = Some(Decimal::ZERO);
        assert_eq!(FieldKind::MaximumBets.positive(&draft), None);
    }
}
