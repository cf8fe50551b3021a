//! Domain primitives: BankId, BankCode, GuaranteeType, Regime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

/// Database identifier of a bank in the rate-tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BankId(pub i64);

impl BankId {
    pub fn new(id: i64) -> Self {
        BankId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bank code understood by the minimal-rate service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BankCode(pub String);

impl BankCode {
    pub fn new(code: String) -> Self {
        BankCode(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BankCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagParseError {
    #[error("unknown guarantee type: {0}")]
    GuaranteeType(String),
    #[error("unknown regime: {0}")]
    Regime(String),
}

/// What a guarantee secures. One deal may carry several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeType {
    /// Bid security for taking part in a tender.
    Participation,
    /// Performance of the contract.
    Execution,
    /// Return of an advance payment.
    AdvanceReturn,
    /// Warranty obligations.
    Warranty,
}

impl GuaranteeType {
    pub const ALL: [GuaranteeType; 4] = [
        GuaranteeType::Participation,
        GuaranteeType::Execution,
        GuaranteeType::AdvanceReturn,
        GuaranteeType::Warranty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GuaranteeType::Participation => "participation",
            GuaranteeType::Execution => "execution",
            GuaranteeType::AdvanceReturn => "advance_return",
            GuaranteeType::Warranty => "warranty",
        }
    }
}

impl std::fmt::Display for GuaranteeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GuaranteeType {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        GuaranteeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TagParseError::GuaranteeType(s.to_string()))
    }
}

/// Set of guarantee types carried by a deal, kept ordered for stable output.
pub type GuaranteeTypes = BTreeSet<GuaranteeType>;

/// Parse a comma-separated guarantee type list, as stored in the offers table.
pub fn parse_guarantee_types(s: &str) -> Result<GuaranteeTypes, TagParseError> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(GuaranteeType::from_str)
        .collect()
}

/// Inverse of [`parse_guarantee_types`].
pub fn join_guarantee_types(types: &GuaranteeTypes) -> String {
    types
        .iter()
        .map(GuaranteeType::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Procurement law the guarantee is issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "44-fz")]
    Fz44,
    #[serde(rename = "223-fz")]
    Fz223,
    #[serde(rename = "185-fz")]
    Fz185,
    #[serde(rename = "commercial")]
    Commercial,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Fz44 => "44-fz",
            Regime::Fz223 => "223-fz",
            Regime::Fz185 => "185-fz",
            Regime::Commercial => "commercial",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Regime {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "44-fz" => Ok(Regime::Fz44),
            "223-fz" => Ok(Regime::Fz223),
            "185-fz" => Ok(Regime::Fz185),
            "commercial" => Ok(Regime::Commercial),
            other => Err(TagParseError::Regime(other.to_string())),
        }
    }
}
