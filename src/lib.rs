//! tally - terminal tracker for recurring bills and the ledger that settles them
//!
//! This library provides the core functionality for the tally CLI. It
//! tracks recurring expenses, incomes, and budget obligations, and
//! reconciles them against a ledger of executed monetary movements that
//! maintains running account balances.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, ledger entries, recurring items)
//! - `storage`: JSON file storage layer with atomic multi-file units
//! - `services`: Business logic layer (ledger, status transitions, CRUD)
//! - `display`: Terminal output formatting
//! - `cli`: Command handlers
//!
//! The defining design decision: an item's pending/paid status is never
//! stored. It is derived at every query from the ledger entries that
//! back-reference the item, so status can never drift from the ledger,
//! and account balances move only through ledger entry application and
//! reversal.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally::config::TallyPaths;
//! use tally::storage::Storage;
//!
//! let paths = TallyPaths::new()?;
//! let storage = Storage::new(&paths);
//! storage.load_all()?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{TallyError, TallyResult};
