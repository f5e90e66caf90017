//! Business logic services
//!
//! Services coordinate between the storage layer and the models,
//! implementing the application's core operations.

mod account;
mod insights;
mod ledger;
mod recurring;
mod status;

pub use account::AccountService;
pub use insights::{InsightsService, Snapshot, SummaryGenerator, TextGenerator};
pub use ledger::{LedgerService, NewEntry};
pub use recurring::{ItemFilter, ItemUpdate, RecurringService};
pub use status::StatusService;
