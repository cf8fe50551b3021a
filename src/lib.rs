pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::Config;
pub use datasource::{FloorQuery, HttpRateLookup, LookupError, MinimalRateLookup, MockRateLookup};
pub use db::{init_db, Repository};
pub use domain::{
    BankCode, BankId, ChangedField, CommissionSnapshot, Decimal, GuaranteeType, Offer, RateFloor,
    RateTier, Regime,
};
pub use engine::{
    CommissionError, CommissionRecalculator, RateTierResolver, RewardAggregator, Rewards,
};
pub use error::AppError;
