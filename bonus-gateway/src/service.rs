//! Bonus service: resolution, assembly and persistence wired together

use crate::error::{Error, Result};
use crate::export::{export_document, ExportSink};
use crate::pricing::PricingSession;
use crate::store::DocumentStore;
use bonus_engine::{
    assemble_record, build_maps, to_record, validate_document, BonusDocument, BonusDraft,
    BonusRecord, ResolutionWarning,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful save
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Id assigned by the store
    pub id: String,
    /// Document as assembled
    pub document: BonusDocument,
    /// Fields that fell back to uniform values despite having tables
    pub warnings: Vec<ResolutionWarning>,
}

/// Front door used by UI-layer callers
pub struct BonusService {
    pricing: Arc<PricingSession>,
    documents: Arc<dyn DocumentStore>,
}

impl BonusService {
    /// Create new service
    pub fn new(pricing: Arc<PricingSession>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { pricing, documents }
    }

    /// Pricing session backing resolution
    pub fn pricing(&self) -> &PricingSession {
        &self.pricing
    }

    /// Resolve and flatten a draft against the loaded pricing context
    pub fn prepare(&self, draft: &BonusDraft) -> Result<(BonusRecord, Vec<ResolutionWarning>)> {
        let context = self.pricing.current_for(&draft.provider)?;
        let mut maps = build_maps(draft, &context, self.pricing.config());
        let warnings = std::mem::take(&mut maps.warnings);
        for warning in &warnings {
            warn!(
                "{:?} = {} matched none of {} tables",
                warning.field, warning.base_value, warning.tables_searched
            );
        }
        Ok((to_record(draft, &maps), warnings))
    }

    /// Assemble a draft without saving it
    pub fn preview(&self, draft: &BonusDraft) -> Result<BonusDocument> {
        let (record, _) = self.prepare(draft)?;
        Ok(assemble_record(&record))
    }

    /// Resolve, assemble, check and store a new bonus
    pub async fn save(&self, draft: &BonusDraft) -> Result<SaveOutcome> {
        let (record, warnings) = self.prepare(draft)?;
        let document = checked_document(&record)?;

        let id = self.documents.create(&record).await.map_err(|e| {
            warn!("Save of {} rejected: {}", record.id, e);
            e
        })?;
        info!("Saved bonus {}", id);

        Ok(SaveOutcome {
            id,
            document,
            warnings,
        })
    }

    /// Re-resolve a draft and overwrite the stored record
    pub async fn update(&self, id: &str, draft: &BonusDraft) -> Result<BonusDocument> {
        let (record, _) = self.prepare(draft)?;
        let document = checked_document(&record)?;

        // Keys the new record omits are cleared explicitly
        let previous = serde_json::to_value(self.documents.get(id).await?)?;
        let mut patch = serde_json::to_value(&record)?;
        if let (Some(previous), Some(patch)) = (previous.as_object(), patch.as_object_mut()) {
            for key in previous.keys() {
                if !patch.contains_key(key) {
                    patch.insert(key.clone(), serde_json::Value::Null);
                }
            }
        }

        self.documents.patch(id, patch).await?;
        info!("Updated bonus {}", id);
        Ok(document)
    }

    /// Reassemble a stored bonus from its resolved maps
    pub async fn regenerate(&self, id: &str) -> Result<BonusDocument> {
        let record = self.documents.get(id).await?;
        Ok(assemble_record(&record))
    }

    /// Editable draft for a stored bonus
    pub async fn rehydrate(&self, id: &str) -> Result<BonusDraft> {
        let record = self.documents.get(id).await?;
        Ok(BonusDraft::from_record(&record))
    }

    /// Regenerate a stored bonus and hand it to the export sink
    pub async fn export(&self, id: &str, sink: &dyn ExportSink) -> Result<String> {
        let serialized = self.regenerate(id).await?.to_json_pretty()?;
        export_document(&serialized, sink).await?;
        Ok(serialized)
    }

    /// Remove a stored bonus
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.documents.delete(id).await
    }
}

fn checked_document(record: &BonusRecord) -> Result<BonusDocument> {
    let document = assemble_record(record);
    let errors = validate_document(&document.to_json_pretty()?);
    if !errors.is_empty() {
        return Err(Error::ExportBlocked(errors));
    }
    Ok(document)
}
