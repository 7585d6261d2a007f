//! Currency map construction for bonus fields

use crate::calculator::{
    compute_multiplier_map, compute_up_to_multiplier_map, compute_withdrawal_tier_multiplier,
    round4,
};
use crate::config::{EngineConfig, MapMode};
use crate::draft::{BonusDraft, ConfigType, FieldKind};
use crate::resolver::{resolve, uniform_map};
use crate::types::{CurrencyMap, PricingContext, PricingTable, TableField, DEFAULT_KEY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Withdrawal cap multiplier applied to every cashback bonus
pub const CASHBACK_WITHDRAW_CAP: u32 = 5;

/// Where a built map's values came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapSource {
    /// Copied from the table anchored at the reference value
    Matched {
        /// Matched table id
        table_id: String,
    },
    /// Reference value scaled by a multiplier table
    Scaled {
        /// Multiplier table id
        table_id: String,
    },
    /// Reference value copied to every currency
    Fallback,
}

/// A built map plus how it was produced
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    /// Resolved map
    pub map: CurrencyMap,
    /// Provenance
    pub source: MapSource,
}

/// Non-blocking notice that a field fell back to a uniform map despite having tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionWarning {
    /// Field that missed
    pub field: FieldKind,
    /// Reference value looked up, as entered
    pub base_value: String,
    /// How many tables were searched
    pub tables_searched: usize,
}

/// Builds resolved currency maps according to the configured per-field modes
#[derive(Debug)]
pub struct MapBuilder<'a> {
    config: &'a EngineConfig,
}

impl<'a> MapBuilder<'a> {
    /// Create new builder
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Expand `base_value` into a map covering `"*"` and every supported currency
    pub fn build(&self, base_value: Decimal, field: FieldKind, tables: &[PricingTable]) -> BuildOutcome {
        let built = match self.config.field_modes.mode(field) {
            MapMode::Match => self.matched(base_value, tables),
            MapMode::Scale => self.scaled(base_value, tables),
        };

        built.unwrap_or_else(|| {
            if !tables.is_empty() {
                warn!(
                    "No {:?} table matched EUR = {}, using uniform values",
                    field, base_value
                );
            }
            BuildOutcome {
                map: uniform_map(base_value, &self.config.supported_currencies),
                source: MapSource::Fallback,
            }
        })
    }

    fn matched(&self, base_value: Decimal, tables: &[PricingTable]) -> Option<BuildOutcome> {
        let table = resolve(base_value, tables, self.config.tolerance)?;
        let anchor = table.base_value()?;
        debug!("Matched table {} for EUR = {}", table.id, base_value);

        let mut map = CurrencyMap::new();
        for (currency, value) in table.values.iter().filter(|(c, _)| *c != DEFAULT_KEY) {
            map.insert(currency, value);
        }
        map.insert(DEFAULT_KEY, anchor);
        for currency in &self.config.supported_currencies {
            map.insert_missing(currency, base_value);
        }

        Some(BuildOutcome {
            map,
            source: MapSource::Matched {
                table_id: table.id.clone(),
            },
        })
    }

    fn scaled(&self, base_value: Decimal, tables: &[PricingTable]) -> Option<BuildOutcome> {
        let table = tables.iter().find(|t| !t.values.is_empty())?;

        let mut map = CurrencyMap::new();
        for currency in &self.config.supported_currencies {
            let factor = table.values.get(currency).unwrap_or(Decimal::ONE);
            let scaled = base_value
                .checked_mul(factor)
                .map(round4)
                .unwrap_or(base_value);
            map.insert(currency.as_str(), scaled);
        }
        map.insert(DEFAULT_KEY, base_value);
        debug!("Applied multiplier table {} to EUR = {}", table.id, base_value);

        Some(BuildOutcome {
            map,
            source: MapSource::Scaled {
                table_id: table.id.clone(),
            },
        })
    }
}

/// Expand a reference value into a resolved map for `field`
pub fn build_map(
    base_value: Decimal,
    field: FieldKind,
    tables: &[PricingTable],
    config: &EngineConfig,
) -> CurrencyMap {
    MapBuilder::new(config).build(base_value, field, tables).map
}

/// Every map a draft needs, resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMaps {
    /// Trigger minimum deposit
    pub minimum_amount: Option<CurrencyMap>,
    /// Cost per free spin
    pub cost: Option<CurrencyMap>,
    /// Derived free-spin multiplier
    pub multiplier: Option<CurrencyMap>,
    /// Maximum bets
    pub maximum_bets: Option<CurrencyMap>,
    /// Withdrawal caps
    pub maximum_withdraw: Option<CurrencyMap>,
    /// Maximum bonus amount
    pub maximum_amount: Option<CurrencyMap>,
    /// Minimum stake to wager
    pub minimum_stake_to_wager: Option<CurrencyMap>,
    /// Maximum stake to wager
    pub maximum_stake_to_wager: Option<CurrencyMap>,
    /// Maximum cashback
    pub maximum_cashback: Option<CurrencyMap>,
    /// Slot-game wagering contribution
    pub casino_proportions: Option<CurrencyMap>,
    /// Live-casino wagering contribution
    pub live_casino_proportions: Option<CurrencyMap>,
    /// Fields that fell back despite having tables
    pub warnings: Vec<ResolutionWarning>,
}

impl ResolvedMaps {
    /// Slot for a reference field's map
    pub fn get(&self, field: FieldKind) -> Option<&CurrencyMap> {
        match field {
            FieldKind::MinimumAmount => self.minimum_amount.as_ref(),
            FieldKind::Cost => self.cost.as_ref(),
            FieldKind::MaximumBets => self.maximum_bets.as_ref(),
            FieldKind::MaximumWithdraw => self.maximum_withdraw.as_ref(),
            FieldKind::MaximumAmount => self.maximum_amount.as_ref(),
            FieldKind::MinimumStakeToWager => self.minimum_stake_to_wager.as_ref(),
            FieldKind::MaximumStakeToWager => self.maximum_stake_to_wager.as_ref(),
            FieldKind::MaximumCashback => self.maximum_cashback.as_ref(),
            FieldKind::CasinoProportions => self.casino_proportions.as_ref(),
            FieldKind::LiveCasinoProportions => self.live_casino_proportions.as_ref(),
        }
    }

    fn slot(&mut self, field: FieldKind) -> &mut Option<CurrencyMap> {
        match field {
            FieldKind::MinimumAmount => &mut self.minimum_amount,
            FieldKind::Cost => &mut self.cost,
            FieldKind::MaximumBets => &mut self.maximum_bets,
            FieldKind::MaximumWithdraw => &mut self.maximum_withdraw,
            FieldKind::MaximumAmount => &mut self.maximum_amount,
            FieldKind::MinimumStakeToWager => &mut self.minimum_stake_to_wager,
            FieldKind::MaximumStakeToWager => &mut self.maximum_stake_to_wager,
            FieldKind::MaximumCashback => &mut self.maximum_cashback,
            FieldKind::CasinoProportions => &mut self.casino_proportions,
            FieldKind::LiveCasinoProportions => &mut self.live_casino_proportions,
        }
    }
}

/// Fields each payout kind draws reference values for
fn fields_for(config_type: ConfigType) -> &'static [FieldKind] {
    match config_type {
        ConfigType::FreeBet => &[
            FieldKind::MinimumAmount,
            FieldKind::Cost,
            FieldKind::MaximumBets,
            FieldKind::MaximumWithdraw,
        ],
        ConfigType::Cash => &[
            FieldKind::MinimumAmount,
            FieldKind::MaximumAmount,
            FieldKind::MinimumStakeToWager,
            FieldKind::MaximumStakeToWager,
            FieldKind::MaximumWithdraw,
        ],
        ConfigType::Cashback => &[
            FieldKind::MinimumAmount,
            FieldKind::MaximumAmount,
            FieldKind::MinimumStakeToWager,
            FieldKind::MaximumStakeToWager,
            FieldKind::MaximumCashback,
            FieldKind::CasinoProportions,
            FieldKind::LiveCasinoProportions,
        ],
    }
}

/// Resolve every map the draft needs against a loaded pricing context
pub fn build_maps(draft: &BonusDraft, context: &PricingContext, config: &EngineConfig) -> ResolvedMaps {
    let builder = MapBuilder::new(config);
    let currencies = &config.supported_currencies;
    let mut maps = ResolvedMaps::default();

    for field in fields_for(draft.config_type) {
        let Some(base_value) = field.positive(draft) else {
            continue;
        };
        if !proportion_applies(*field, draft) {
            continue;
        }
        let tables = field
            .table_field()
            .map(|tf| context.tables(tf))
            .unwrap_or(&[]);

        let outcome = builder.build(base_value, *field, tables);
        if outcome.source == MapSource::Fallback && !tables.is_empty() {
            maps.warnings.push(ResolutionWarning {
                field: *field,
                base_value: base_value.to_string(),
                tables_searched: tables.len(),
            });
        }
        *maps.slot(*field) = Some(outcome.map);
    }

    if draft.config_type == ConfigType::FreeBet {
        if let Some(cost) = &maps.cost {
            let multiplier = match draft.up_to_fs_per_euro.filter(|v| *v > Decimal::ZERO) {
                Some(fs_per_euro) => compute_up_to_multiplier_map(
                    cost,
                    fs_per_euro,
                    context.tables(TableField::CurrencyUnit).first(),
                    currencies,
                ),
                None => compute_multiplier_map(
                    maps.minimum_amount.as_ref().unwrap_or(&CurrencyMap::new()),
                    cost,
                    draft.maximum_bets_count.unwrap_or_default(),
                    currencies,
                ),
            };
            maps.multiplier = Some(multiplier);
        }
    }

    if draft.config_type == ConfigType::Cash && maps.maximum_withdraw.is_none() {
        if let Some(percentage) = draft.percentage {
            let tier = compute_withdrawal_tier_multiplier(percentage);
            maps.maximum_withdraw = Some(uniform_map(tier, currencies));
        }
    }

    if draft.config_type == ConfigType::Cashback {
        maps.maximum_withdraw = Some(uniform_map(
            Decimal::from(CASHBACK_WITHDRAW_CAP),
            currencies,
        ));
    }

    maps
}

/// Proportion fields only resolve for the game families the draft selects
fn proportion_applies(field: FieldKind, draft: &BonusDraft) -> bool {
    match field {
        FieldKind::CasinoProportions => draft.proportions_type.includes_casino(),
        FieldKind::LiveCasinoProportions => draft.proportions_type.includes_live_casino(),
        _ => true,
    }
}
