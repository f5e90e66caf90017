//! Display formatting for terminal output
//!
//! Provides utilities for formatting data models for terminal display.

pub mod account;
pub mod entry;
pub mod item;

pub use account::{format_account_details, format_account_list};
pub use entry::format_entry_list;
pub use item::format_item_list;
