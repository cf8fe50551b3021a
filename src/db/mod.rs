//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and migrations
//! - SQLite pragma configuration
//! - Repository layer for offers and rate tiers
//! - CSV import of rate tiers

pub mod import;
pub mod migrations;
pub mod repo;

pub use import::{import_tiers_csv, parse_tiers_csv, TierImportError};
pub use migrations::init_db;
pub use repo::Repository;
