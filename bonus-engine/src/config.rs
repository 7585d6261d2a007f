//! Configuration for the bonus engine

use crate::draft::FieldKind;
use crate::types::BASE_CURRENCY;
use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currencies the platform pays out in
pub const DEFAULT_CURRENCIES: [&str; 21] = [
    "EUR", "USD", "CAD", "AUD", "BRL", "NOK", "NZD", "CLP", "MXN", "GBP", "PLN", "PEN", "ZAR",
    "CHF", "NGN", "JPY", "AZN", "TRY", "KZT", "RUB", "UZS",
];

/// How a field's pricing tables turn a reference value into a currency map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    /// Find the table anchored at the reference value and copy its values
    Match,
    /// Multiply the reference value by the first table's per-currency factors
    Scale,
}

/// Per-field map modes, fixed at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldModes {
    /// Trigger minimum deposit
    pub minimum_amount: MapMode,
    /// Cost per free spin
    pub cost: MapMode,
    /// Maximum bets
    pub maximum_bets: MapMode,
    /// Withdrawal caps
    pub maximum_withdraw: MapMode,
    /// Maximum bonus amount
    pub maximum_amount: MapMode,
    /// Minimum stake to wager
    pub minimum_stake_to_wager: MapMode,
    /// Maximum stake to wager
    pub maximum_stake_to_wager: MapMode,
    /// Slot-game wagering contribution
    pub casino_proportions: MapMode,
    /// Live-casino wagering contribution
    pub live_casino_proportions: MapMode,
}

impl Default for FieldModes {
    fn default() -> Self {
        Self {
            minimum_amount: MapMode::Scale,
            cost: MapMode::Match,
            maximum_bets: MapMode::Match,
            maximum_withdraw: MapMode::Match,
            maximum_amount: MapMode::Match,
            minimum_stake_to_wager: MapMode::Match,
            maximum_stake_to_wager: MapMode::Match,
            casino_proportions: MapMode::Match,
            live_casino_proportions: MapMode::Match,
        }
    }
}

impl FieldModes {
    /// Mode for a field. Fields without pricing tables always match.
    pub fn mode(&self, field: FieldKind) -> MapMode {
        match field {
            FieldKind::MinimumAmount => self.minimum_amount,
            FieldKind::Cost => self.cost,
            FieldKind::MaximumBets => self.maximum_bets,
            FieldKind::MaximumWithdraw => self.maximum_withdraw,
            FieldKind::MaximumAmount => self.maximum_amount,
            FieldKind::MinimumStakeToWager => self.minimum_stake_to_wager,
            FieldKind::MaximumStakeToWager => self.maximum_stake_to_wager,
            FieldKind::CasinoProportions => self.casino_proportions,
            FieldKind::LiveCasinoProportions => self.live_casino_proportions,
            FieldKind::MaximumCashback => MapMode::Match,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Currencies every resolved map must cover
    pub supported_currencies: Vec<String>,

    /// Absolute difference allowed when matching a table's EUR anchor
    pub tolerance: Decimal,

    /// Provider supplying every table except cost
    pub default_provider: String,

    /// Copy vs scale per field
    pub field_modes: FieldModes,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            supported_currencies: DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect(),
            tolerance: Decimal::new(1, 3), // 0.001
            default_provider: "DEFAULT".to_string(),
            field_modes: FieldModes::default(),
        }
    }
}

impl EngineConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = EngineConfig::default();

        if let Ok(list) = std::env::var("BONUS_SUPPORTED_CURRENCIES") {
            config.supported_currencies = list
                .split(',')
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect();
        }

        if let Ok(tolerance) = std::env::var("BONUS_TOLERANCE") {
            config.tolerance = tolerance
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid BONUS_TOLERANCE: {}", e)))?;
        }

        if let Ok(provider) = std::env::var("BONUS_DEFAULT_PROVIDER") {
            config.default_provider = provider.to_uppercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.supported_currencies.is_empty() {
            return Err(Error::Config("supported_currencies is empty".to_string()));
        }
        if !self.supported_currencies.iter().any(|c| c == BASE_CURRENCY) {
            return Err(Error::Config(format!(
                "supported_currencies must include {}",
                BASE_CURRENCY
            )));
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(Error::Config(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
