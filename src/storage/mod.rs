//! Storage layer for persisting data to JSON files
//!
//! All repositories keep their working set in memory and flush to disk
//! through atomic file writes. Multi-repository operations run through
//! [`Storage::transaction`], which commits every file on success and
//! rolls the in-memory state back on failure.

mod accounts;
mod entries;
mod file_io;
mod items;

pub use accounts::AccountRepository;
pub use entries::EntryRepository;
pub use items::{BudgetItemRepository, ExpenseRepository, IncomeRepository};

use std::sync::Mutex;

use tracing::warn;

use crate::config::TallyPaths;
use crate::error::TallyError;

/// Central storage coordinating all repositories
pub struct Storage {
    pub accounts: AccountRepository,
    pub entries: EntryRepository,
    pub expenses: ExpenseRepository,
    pub incomes: IncomeRepository,
    pub budget_items: BudgetItemRepository,
    // Serializes atomic units so concurrent callers cannot interleave.
    unit: Mutex<()>,
}

impl Storage {
    /// Create storage rooted at the given paths
    pub fn new(paths: &TallyPaths) -> Self {
        Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            entries: EntryRepository::new(paths.entries_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            incomes: IncomeRepository::new(paths.incomes_file()),
            budget_items: BudgetItemRepository::new(paths.budget_items_file()),
            unit: Mutex::new(()),
        }
    }

    /// Load all repositories from disk
    pub fn load_all(&self) -> Result<(), TallyError> {
        self.accounts.load()?;
        self.entries.load()?;
        self.expenses.load()?;
        self.incomes.load()?;
        self.budget_items.load()?;
        Ok(())
    }

    /// Save all repositories to disk
    pub fn save_all(&self) -> Result<(), TallyError> {
        self.accounts.save()?;
        self.entries.save()?;
        self.expenses.save()?;
        self.incomes.save()?;
        self.budget_items.save()?;
        Ok(())
    }

    /// Run a closure as an all-or-nothing unit.
    ///
    /// The in-memory state of every repository is snapshotted before the
    /// closure runs. On success all files are persisted; on failure every
    /// repository is restored to its snapshot and the error propagates, so
    /// partial mutations never become visible.
    pub fn transaction<T, F>(&self, f: F) -> Result<T, TallyError>
    where
        F: FnOnce(&Self) -> Result<T, TallyError>,
    {
        let _guard = self
            .unit
            .lock()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire unit lock: {}", e)))?;

        let accounts = self.accounts.snapshot()?;
        let entries = self.entries.snapshot()?;
        let expenses = self.expenses.snapshot()?;
        let incomes = self.incomes.snapshot()?;
        let budget_items = self.budget_items.snapshot()?;

        match f(self) {
            Ok(value) => {
                self.save_all()?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "rolling back storage unit");
                self.accounts.restore(accounts)?;
                self.entries.restore(entries)?;
                self.expenses.restore(expenses)?;
                self.incomes.restore(incomes)?;
                self.budget_items.restore(budget_items)?;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountType, Money};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let storage = Storage::new(&paths);
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_transaction_commits_on_success() {
        let (_temp_dir, storage) = create_test_storage();

        let id = storage
            .transaction(|s| {
                let account = Account::new("Checking", AccountType::Checking);
                let id = account.id;
                s.accounts.upsert(account)?;
                Ok(id)
            })
            .unwrap();

        assert!(storage.accounts.get(id).unwrap().is_some());
    }

    #[test]
    fn test_transaction_rolls_back_on_failure() {
        let (_temp_dir, storage) = create_test_storage();

        let before = Account::with_starting_balance(
            "Checking",
            AccountType::Checking,
            Money::from_cents(10_000),
        );
        let id = before.id;
        storage.accounts.upsert(before).unwrap();

        let result: Result<(), TallyError> = storage.transaction(|s| {
            let mut account = s.accounts.get(id)?.unwrap();
            account.adjust_balance(Money::from_cents(-5_000));
            s.accounts.upsert(account)?;
            s.accounts.upsert(Account::new("Extra", AccountType::Cash))?;
            Err(TallyError::Validation("boom".into()))
        });

        assert!(result.is_err());
        assert_eq!(storage.accounts.count().unwrap(), 1);
        assert_eq!(
            storage.accounts.get(id).unwrap().unwrap().balance.cents(),
            10_000
        );
    }

    #[test]
    fn test_transaction_persists_to_disk() {
        let (temp_dir, storage) = create_test_storage();

        storage
            .transaction(|s| {
                s.accounts.upsert(Account::new("Saved", AccountType::Savings))
            })
            .unwrap();

        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        let reloaded = Storage::new(&paths);
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.accounts.count().unwrap(), 1);
    }
}
