//! Core types for bonus template assembly

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Reference currency operators enter values in
pub const BASE_CURRENCY: &str = "EUR";

/// Reserved currency-map key holding the fallback value
pub const DEFAULT_KEY: &str = "*";

/// Decimal that serializes as a plain JSON number.
///
/// Whole values print as integers (`50`), everything else as the shortest
/// float (`0.12`), so documents stay readable for operators diffing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Number(pub Decimal);

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0.normalize();
        if value.fract().is_zero() {
            if let Some(whole) = value.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        // Parsing the decimal text rounds correctly, so stored values read
        // back to the same float.
        let float = value
            .to_string()
            .parse::<f64>()
            .ok()
            .or_else(|| value.to_f64())
            .unwrap_or_default();
        serializer.serialize_f64(float)
    }
}

/// `serialize_with` helpers for decimal fields
pub mod number {
    use super::Number;
    use rust_decimal::Decimal;
    use serde::{Serialize, Serializer};

    /// Serialize a decimal as a JSON number
    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        Number(*value).serialize(serializer)
    }

    /// Serialize an optional decimal as a JSON number
    pub fn serialize_opt<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&Number(*v)),
            None => serializer.serialize_none(),
        }
    }
}

/// Mapping from currency code to a non-negative value.
///
/// Keys are kept sorted, which places `"*"` ahead of every ISO code and
/// makes serialization deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyMap(BTreeMap<String, Decimal>);

impl CurrencyMap {
    /// Create empty map
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Same value for `"*"` and every listed currency
    pub fn uniform(value: Decimal, currencies: &[String]) -> Self {
        let mut map = Self::new();
        map.insert(DEFAULT_KEY, value);
        for currency in currencies {
            map.insert(currency.as_str(), value);
        }
        map
    }

    /// Insert or replace a value
    pub fn insert(&mut self, currency: impl Into<String>, value: Decimal) {
        self.0.insert(currency.into(), value);
    }

    /// Insert only when the currency has no entry yet
    pub fn insert_missing(&mut self, currency: &str, value: Decimal) {
        self.0.entry(currency.to_string()).or_insert(value);
    }

    /// Exact lookup
    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.0.get(currency).copied()
    }

    /// Lookup falling back to the `"*"` entry
    pub fn get_or_default(&self, currency: &str) -> Option<Decimal> {
        self.get(currency).or_else(|| self.default_value())
    }

    /// The `"*"` entry
    pub fn default_value(&self) -> Option<Decimal> {
        self.get(DEFAULT_KEY)
    }

    /// The base-currency entry
    pub fn base_value(&self) -> Option<Decimal> {
        self.get(BASE_CURRENCY)
    }

    /// Whether the currency has an entry
    pub fn contains(&self, currency: &str) -> bool {
        self.0.contains_key(currency)
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Currency codes in key order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no entry is positive
    pub fn all_zero(&self) -> bool {
        self.0.values().all(|v| v.is_zero() || v.is_sign_negative())
    }

    /// Holds `"*"` and every listed currency
    pub fn is_resolved(&self, currencies: &[String]) -> bool {
        self.contains(DEFAULT_KEY) && currencies.iter().all(|c| self.contains(c))
    }
}

impl FromIterator<(String, Decimal)> for CurrencyMap {
    fn from_iter<I: IntoIterator<Item = (String, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, Decimal)> for CurrencyMap {
    fn from_iter<I: IntoIterator<Item = (&'a str, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl Serialize for CurrencyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (currency, value) in &self.0 {
            map.serialize_entry(currency, &Number(*value))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CurrencyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, Decimal>::deserialize(deserializer).map(CurrencyMap)
    }
}

/// Pricing-table field names known to the table store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableField {
    /// Cost per free spin
    Cost,
    /// Deposit minimums (per-currency multipliers)
    MinimumAmount,
    /// Maximum bonus amount
    MaximumAmount,
    /// Maximum bets
    MaximumBets,
    /// Withdrawal caps
    MaximumWithdraw,
    /// Minimum stake counted towards wagering
    MinimumStakeToWager,
    /// Maximum stake counted towards wagering
    MaximumStakeToWager,
    /// Currency unit sizes
    CurrencyUnit,
    /// Cashback wagering contribution of slot games
    CasinoProportions,
    /// Cashback wagering contribution of live casino games
    LiveCasinoProportions,
}

impl TableField {
    /// Every table field
    pub const ALL: [TableField; 10] = [
        TableField::Cost,
        TableField::MinimumAmount,
        TableField::MaximumAmount,
        TableField::MaximumBets,
        TableField::MaximumWithdraw,
        TableField::MinimumStakeToWager,
        TableField::MaximumStakeToWager,
        TableField::CurrencyUnit,
        TableField::CasinoProportions,
        TableField::LiveCasinoProportions,
    ];

    /// Storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            TableField::Cost => "cost",
            TableField::MinimumAmount => "minimum_amount",
            TableField::MaximumAmount => "maximum_amount",
            TableField::MaximumBets => "maximum_bets",
            TableField::MaximumWithdraw => "maximum_withdraw",
            TableField::MinimumStakeToWager => "minimum_stake_to_wager",
            TableField::MaximumStakeToWager => "maximum_stake_to_wager",
            TableField::CurrencyUnit => "currency_unit",
            TableField::CasinoProportions => "casino_proportions",
            TableField::LiveCasinoProportions => "live_casino_proportions",
        }
    }
}

impl fmt::Display for TableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableId {
    Text(String),
    Int(i64),
}

fn deserialize_table_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match TableId::deserialize(deserializer)? {
        TableId::Text(id) => id,
        TableId::Int(id) => id.to_string(),
    })
}

/// Named, provider-scoped set of per-currency values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    /// Unique within provider + field
    #[serde(deserialize_with = "deserialize_table_id")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Per-currency values; anchored by the EUR entry
    #[serde(default)]
    pub values: CurrencyMap,
}

impl PricingTable {
    /// Create new table
    pub fn new(id: impl Into<String>, name: impl Into<String>, values: CurrencyMap) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            values,
        }
    }

    /// Base-currency anchor
    pub fn base_value(&self) -> Option<Decimal> {
        self.values.base_value()
    }

    /// Decode stored table rows, dropping any row that does not decode
    pub fn parse_rows(rows: &serde_json::Value) -> Vec<PricingTable> {
        let Some(items) = rows.as_array() else {
            debug!("Pricing rows are not a list, treating as empty");
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| match PricingTable::deserialize(row) {
                Ok(table) => Some(table),
                Err(e) => {
                    debug!("Skipping malformed pricing row {}: {}", idx, e);
                    None
                }
            })
            .collect()
    }
}

/// Pricing tables loaded for one provider, passed explicitly into resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingContext {
    /// Provider whose cost tables were loaded
    pub provider: String,

    tables: BTreeMap<TableField, Vec<PricingTable>>,
}

impl PricingContext {
    /// Empty context for a provider
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Builder-style table registration
    pub fn with_tables(mut self, field: TableField, tables: Vec<PricingTable>) -> Self {
        self.set_tables(field, tables);
        self
    }

    /// Replace the tables of one field
    pub fn set_tables(&mut self, field: TableField, tables: Vec<PricingTable>) {
        self.tables.insert(field, tables);
    }

    /// Tables for a field, in list order
    pub fn tables(&self, field: TableField) -> &[PricingTable] {
        self.tables.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of tables across fields
    pub fn table_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }
}
