//! Bonus gateway
//!
//! Async seams around the bonus engine: pricing-table and document stores,
//! last-write-wins pricing refresh, export gating, and the service tying
//! them together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod export;
pub mod memory;
pub mod pricing;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use export::{export_document, ExportSink, MemorySink};
pub use memory::{InMemoryDocumentStore, InMemoryPricingStore};
pub use pricing::{load_pricing_context, PricingSession};
pub use service::{BonusService, SaveOutcome};
pub use store::{DocumentStore, FieldError, PricingTableStore};
