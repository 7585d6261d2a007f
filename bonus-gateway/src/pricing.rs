//! Pricing context loading
//!
//! [`PricingSession`] keeps the last context that loaded successfully. When
//! refreshes overlap only the most recently started one may install its
//! result; earlier ones are discarded when they complete.

use crate::error::{Error, Result};
use crate::store::PricingTableStore;
use bonus_engine::{EngineConfig, PricingContext, TableField};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Load every table field for `provider`.
///
/// Cost tables are provider-specific; every other field is read from the
/// configured default provider.
pub async fn load_pricing_context(
    store: &dyn PricingTableStore,
    provider: &str,
    config: &EngineConfig,
) -> Result<PricingContext> {
    let mut context = PricingContext::new(provider);

    for field in TableField::ALL {
        let source = if field == TableField::Cost {
            provider
        } else {
            config.default_provider.as_str()
        };
        let tables = store.tables(source, field).await?;
        debug!("Loaded {} {} tables from {}", tables.len(), field, source);
        context.set_tables(field, tables);
    }

    info!(
        "Pricing context loaded for {}: {} tables",
        provider,
        context.table_count()
    );
    Ok(context)
}

/// Last-write-wins holder of the current pricing context
pub struct PricingSession {
    store: Arc<dyn PricingTableStore>,
    config: Arc<EngineConfig>,
    generation: AtomicU64,
    current: RwLock<Option<Arc<PricingContext>>>,
}

impl PricingSession {
    /// Create new session with nothing loaded
    pub fn new(store: Arc<dyn PricingTableStore>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            config,
            generation: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    /// Fetch tables for `provider` and install them unless a newer refresh started meanwhile
    pub async fn refresh(&self, provider: &str) -> Result<Arc<PricingContext>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let loaded = load_pricing_context(self.store.as_ref(), provider, &self.config).await;

        let mut current = self.current.write();
        let latest = self.generation.load(Ordering::SeqCst);
        if latest != generation {
            debug!(
                "Discarding pricing fetch {} for {}, {} is newer",
                generation, provider, latest
            );
            return Err(Error::Superseded { generation, latest });
        }

        match loaded {
            Ok(context) => {
                let context = Arc::new(context);
                *current = Some(context.clone());
                Ok(context)
            }
            Err(e) => {
                warn!("Pricing fetch for {} failed, keeping previous tables: {}", provider, e);
                Err(e)
            }
        }
    }

    /// Last successfully loaded context
    pub fn current(&self) -> Result<Arc<PricingContext>> {
        self.current
            .read()
            .clone()
            .ok_or_else(|| Error::PricingUnavailable("no pricing tables loaded yet".to_string()))
    }

    /// Loaded context, only if it belongs to `provider`
    pub fn current_for(&self, provider: &str) -> Result<Arc<PricingContext>> {
        let context = self.current()?;
        if context.provider != provider {
            return Err(Error::PricingUnavailable(format!(
                "loaded tables belong to {}, not {}",
                context.provider, provider
            )));
        }
        Ok(context)
    }

    /// Number of refreshes started so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Engine configuration the session loads with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
