//! In-memory store implementations

use crate::error::{Error, Result};
use crate::store::{DocumentStore, FieldError, PricingTableStore};
use async_trait::async_trait;
use bonus_engine::{BonusRecord, PricingTable, TableField};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Pricing tables held in memory, keyed by provider and field
#[derive(Debug, Default)]
pub struct InMemoryPricingStore {
    tables: DashMap<(String, TableField), Vec<PricingTable>>,
}

impl InMemoryPricingStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tables for a provider and field
    pub fn insert(&self, provider: &str, field: TableField, tables: Vec<PricingTable>) {
        self.tables.insert((provider.to_string(), field), tables);
    }

    /// Replace the tables from raw rows, skipping rows that do not decode
    pub fn insert_rows(&self, provider: &str, field: TableField, rows: &Value) -> usize {
        let tables = PricingTable::parse_rows(rows);
        let count = tables.len();
        self.insert(provider, field, tables);
        count
    }
}

#[async_trait]
impl PricingTableStore for InMemoryPricingStore {
    async fn tables(&self, provider: &str, field: TableField) -> Result<Vec<PricingTable>> {
        Ok(self
            .tables
            .get(&(provider.to_string(), field))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }
}

/// Bonus records held in memory as JSON
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    records: DashMap<String, Value>,
}

impl InMemoryDocumentStore {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn check_record(record: &BonusRecord) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if record.id.trim().is_empty() {
        errors.push(FieldError::new(["body", "id"], "field required"));
    }
    if record.provider.trim().is_empty() {
        errors.push(FieldError::new(["body", "provider"], "field required"));
    }
    errors
}

/// RFC 7386 merge: objects merge key by key, `null` removes a key
fn merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    target.remove(&key);
                } else {
                    merge(target.entry(key).or_insert(Value::Null), value);
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn create(&self, record: &BonusRecord) -> Result<String> {
        let errors = check_record(record);
        if !errors.is_empty() {
            return Err(Error::Rejected(errors));
        }

        let value = serde_json::to_value(record)?;
        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(Error::Rejected(vec![FieldError::new(
                ["body", "id"],
                format!("bonus {} already exists", record.id),
            )])),
            Entry::Vacant(slot) => {
                slot.insert(value);
                info!("Stored bonus {}", record.id);
                Ok(record.id.clone())
            }
        }
    }

    async fn patch(&self, id: &str, partial: Value) -> Result<()> {
        if !partial.is_object() {
            return Err(Error::Rejected(vec![FieldError::new(
                ["body"],
                "patch must be an object",
            )]));
        }
        if let Some(new_id) = partial.get("id").and_then(Value::as_str) {
            if new_id != id {
                return Err(Error::Rejected(vec![FieldError::new(
                    ["body", "id"],
                    "id cannot be changed",
                )]));
            }
        }

        let mut entry = self
            .records
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("bonus {}", id)))?;

        let mut merged = entry.value().clone();
        merge(&mut merged, partial);

        let record: BonusRecord = serde_json::from_value(merged.clone()).map_err(|e| {
            warn!("Rejected patch for {}: {}", id, e);
            Error::Rejected(vec![FieldError::new(["body"], e.to_string())])
        })?;
        let errors = check_record(&record);
        if !errors.is_empty() {
            return Err(Error::Rejected(errors));
        }

        *entry.value_mut() = merged;
        debug!("Patched bonus {}", id);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<BonusRecord> {
        let value = self
            .records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::NotFound(format!("bonus {}", id)))?;
        Ok(serde_json::from_value(value)?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records
            .remove(id)
            .map(|_| debug!("Deleted bonus {}", id))
            .ok_or_else(|| Error::NotFound(format!("bonus {}", id)))
    }
}
