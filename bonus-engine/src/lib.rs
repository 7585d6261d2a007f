//! Bonus template engine
//!
//! Expands operator-entered EUR reference values into per-currency maps using
//! provider pricing tables, derives computed fields, and assembles the
//! `bonus_template` document consumed by the bonus-processing engine.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assembler;
pub mod bonus_id;
pub mod builder;
pub mod calculator;
pub mod config;
pub mod document;
pub mod draft;
pub mod error;
pub mod record;
pub mod resolver;
pub mod types;
pub mod validator;

pub use assembler::{assemble, assemble_record};
pub use bonus_id::{generate_bonus_id, parse_bonus_id, BonusSpec, ParsedBonusId};
pub use builder::{
    build_map, build_maps, BuildOutcome, MapBuilder, MapSource, ResolutionWarning, ResolvedMaps,
    CASHBACK_WITHDRAW_CAP,
};
pub use calculator::{compute_multiplier_map, compute_up_to_multiplier_map, compute_withdrawal_tier_multiplier, round4};
pub use config::{EngineConfig, FieldModes, MapMode};
pub use document::{
    BonusConfig, BonusDocument, ConfigExtra, Proportions, Schedule, Trigger, WithdrawCap,
};
pub use draft::{BonusDraft, Category, ConfigType, FieldKind, ProportionsType, TriggerType};
pub use error::{Error, Result};
pub use record::{to_record, BonusRecord};
pub use resolver::{resolve, resolve_default};
pub use types::*;
pub use validator::{is_exportable, validate, validate_document, Position, ValidationError};
