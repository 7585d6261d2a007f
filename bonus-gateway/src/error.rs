//! Error types for the bonus gateway

use crate::store::FieldError;
use bonus_engine::ValidationError;
use thiserror::Error;

/// Gateway error
#[derive(Debug, Error)]
pub enum Error {
    /// Engine error
    #[error("Engine error: {0}")]
    Engine(#[from] bonus_engine::Error),

    /// Store could not be reached or failed internally
    #[error("Store error: {0}")]
    Store(String),

    /// Record or provider not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store refused the write; one entry per offending field
    #[error("{}", render_field_errors(.0))]
    Rejected(Vec<FieldError>),

    /// No pricing context has been loaded for the provider yet
    #[error("Pricing tables not available: {0}")]
    PricingUnavailable(String),

    /// A newer pricing refresh started before this one finished
    #[error("Pricing fetch {generation} superseded by {latest}")]
    Superseded {
        /// Generation of the discarded fetch
        generation: u64,
        /// Generation that started after it
        latest: u64,
    },

    /// Document has outstanding validation errors
    #[error("Document is not exportable: {}", render_validation_errors(.0))]
    ExportBlocked(Vec<ValidationError>),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

fn render_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
