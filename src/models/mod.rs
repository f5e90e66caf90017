//! Core data models
//!
//! Accounts, ledger entries, recurring items, and the supporting value
//! types (money, typed IDs, settlement periods).

pub mod account;
pub mod entry;
pub mod ids;
pub mod money;
pub mod period;
pub mod recurring;

pub use account::{Account, AccountType};
pub use entry::{EntryKind, ItemRef, LedgerEntry};
pub use ids::{AccountId, BudgetItemId, EntryId, ExpenseId, IncomeId};
pub use money::Money;
pub use period::Period;
pub use recurring::{BudgetItem, Expense, Frequency, Income, ItemStatus, RecurringItem};
