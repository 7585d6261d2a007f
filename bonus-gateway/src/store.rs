//! Collaborator interfaces for pricing tables and bonus records

use crate::error::Result;
use async_trait::async_trait;
use bonus_engine::{BonusRecord, PricingTable, TableField};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Read access to operator-maintained pricing tables
#[async_trait]
pub trait PricingTableStore: Send + Sync {
    /// Tables for one provider and field, in store order
    async fn tables(&self, provider: &str, field: TableField) -> Result<Vec<PricingTable>>;
}

/// Persistence for flattened bonus records
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new record and return its id
    async fn create(&self, record: &BonusRecord) -> Result<String>;

    /// Merge a partial record into an existing one
    async fn patch(&self, id: &str, partial: serde_json::Value) -> Result<()>;

    /// Fetch a record
    async fn get(&self, id: &str) -> Result<BonusRecord>;

    /// Remove a record
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Field-level rejection reported by a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path to the offending field, e.g. `["body", "id"]`
    #[serde(rename = "loc")]
    pub location: Vec<String>,
    /// What is wrong with it
    #[serde(rename = "msg")]
    pub message: String,
}

impl FieldError {
    /// Create new field error
    pub fn new<I, S>(location: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: location.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location.join("."), self.message)
    }
}
