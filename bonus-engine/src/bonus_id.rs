//! Standardized bonus identifiers
//!
//! Identifiers encode the bonus kind, its headline parameters and the
//! creation date, e.g. `DEPOSIT_25_100_22.12.25` or `FSDROP_50_22.12.25`.

use crate::draft::ConfigType;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format used in identifiers
const ID_DATE_FORMAT: &str = "%d.%m.%y";

/// Bonus kind and the parameters its identifier carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BonusSpec {
    /// Percentage bonus on a deposit
    Deposit {
        /// Qualifying deposit in EUR
        minimum_amount: Decimal,
        /// Bonus percentage
        percentage: Decimal,
    },
    /// Percentage bonus on a reload deposit
    Reload {
        /// Qualifying deposit in EUR
        minimum_amount: Decimal,
        /// Bonus percentage
        percentage: Decimal,
    },
    /// No-deposit free spins
    #[serde(rename = "FSDROP")]
    FsDrop {
        /// Number of spins
        spin_count: u32,
    },
    /// Free spins unlocked by wagering
    Wager {
        /// Amount to wager in EUR
        wager_amount: Decimal,
        /// Number of spins
        spin_count: u32,
    },
    /// One stage of a multi-stage bonus
    Seq {
        /// Stage, starting at 1
        stage_number: u32,
        /// Qualifying deposit in EUR
        minimum_amount: Decimal,
        /// Bonus percentage
        percentage: Decimal,
    },
    /// Bonus linked to another one
    Combo {
        /// Identifier of the linked bonus
        linked_bonus_id: String,
    },
    /// Percentage of losses returned
    Cashback {
        /// Share of losses returned
        percentage: Decimal,
    },
}

impl BonusSpec {
    /// Identifier prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            BonusSpec::Deposit { .. } => "DEPOSIT",
            BonusSpec::Reload { .. } => "RELOAD",
            BonusSpec::FsDrop { .. } => "FSDROP",
            BonusSpec::Wager { .. } => "WAGER",
            BonusSpec::Seq { .. } => "SEQ",
            BonusSpec::Combo { .. } => "COMBO",
            BonusSpec::Cashback { .. } => "CASHBACK",
        }
    }

    /// Payout kind a bonus of this kind is configured with
    pub fn config_type(&self) -> ConfigType {
        match self {
            BonusSpec::FsDrop { .. } | BonusSpec::Wager { .. } => ConfigType::FreeBet,
            BonusSpec::Cashback { .. } => ConfigType::Cashback,
            _ => ConfigType::Cash,
        }
    }

    fn params(&self) -> Vec<String> {
        match self {
            BonusSpec::Deposit {
                minimum_amount,
                percentage,
            }
            | BonusSpec::Reload {
                minimum_amount,
                percentage,
            } => vec![plain(minimum_amount), plain(percentage)],
            BonusSpec::FsDrop { spin_count } => vec![spin_count.to_string()],
            BonusSpec::Wager {
                wager_amount,
                spin_count,
            } => vec![plain(wager_amount), spin_count.to_string()],
            BonusSpec::Seq {
                stage_number,
                minimum_amount,
                percentage,
            } => vec![
                stage_number.to_string(),
                plain(minimum_amount),
                plain(percentage),
            ],
            BonusSpec::Combo { linked_bonus_id } => vec![linked_bonus_id.clone()],
            BonusSpec::Cashback { percentage } => vec![plain(percentage)],
        }
    }
}

fn plain(value: &Decimal) -> String {
    value.normalize().to_string()
}

/// A decoded identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBonusId {
    /// Kind and parameters
    pub spec: BonusSpec,
    /// Creation date
    pub date: NaiveDate,
}

impl fmt::Display for ParsedBonusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&generate_bonus_id(&self.spec, self.date))
    }
}

impl FromStr for ParsedBonusId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_bonus_id(s)
    }
}

/// Build the identifier for a bonus created on `date`
pub fn generate_bonus_id(spec: &BonusSpec, date: NaiveDate) -> String {
    let mut parts = vec![spec.prefix().to_string()];
    parts.extend(spec.params());
    parts.push(date.format(ID_DATE_FORMAT).to_string());
    parts.join("_")
}

/// Decode an identifier produced by [`generate_bonus_id`]
pub fn parse_bonus_id(id: &str) -> Result<ParsedBonusId> {
    let parts: Vec<&str> = id.trim().split('_').collect();
    let invalid = |reason: &str| Error::InvalidBonusId(format!("{}: {}", id, reason));

    let (prefix, rest) = parts.split_first().ok_or_else(|| invalid("empty"))?;
    let (date, params) = rest.split_last().ok_or_else(|| invalid("missing date"))?;
    let date = NaiveDate::parse_from_str(date, ID_DATE_FORMAT)
        .map_err(|_| invalid("date is not DD.MM.YY"))?;

    let expect = |count: usize| {
        if params.len() == count {
            Ok(())
        } else {
            Err(invalid(&format!("expected {} parameters, found {}", count, params.len())))
        }
    };
    let decimal = |raw: &str| Decimal::from_str(raw).map_err(|_| invalid("bad number"));
    let count = |raw: &str| raw.parse::<u32>().map_err(|_| invalid("bad count"));

    let spec = match *prefix {
        "DEPOSIT" | "RELOAD" => {
            expect(2)?;
            let minimum_amount = decimal(params[0])?;
            let percentage = decimal(params[1])?;
            if *prefix == "DEPOSIT" {
                BonusSpec::Deposit {
                    minimum_amount,
                    percentage,
                }
            } else {
                BonusSpec::Reload {
                    minimum_amount,
                    percentage,
                }
            }
        }
        "FSDROP" => {
            expect(1)?;
            BonusSpec::FsDrop {
                spin_count: count(params[0])?,
            }
        }
        "WAGER" => {
            expect(2)?;
            BonusSpec::Wager {
                wager_amount: decimal(params[0])?,
                spin_count: count(params[1])?,
            }
        }
        "SEQ" => {
            expect(3)?;
            BonusSpec::Seq {
                stage_number: count(params[0])?,
                minimum_amount: decimal(params[1])?,
                percentage: decimal(params[2])?,
            }
        }
        "COMBO" => {
            if params.is_empty() {
                return Err(invalid("missing linked bonus"));
            }
            BonusSpec::Combo {
                linked_bonus_id: params.join("_"),
            }
        }
        "CASHBACK" => {
            expect(1)?;
            BonusSpec::Cashback {
                percentage: decimal(params[0])?,
            }
        }
        other => return Err(invalid(&format!("unknown bonus type {}", other))),
    };

    Ok(ParsedBonusId { spec, date })
}
