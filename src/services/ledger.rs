//! Ledger service
//!
//! Applies and reverses monetary movements. Every apply/reverse mutates
//! the touched account balances in the same unit as the entry write, so
//! the balance invariant (balance == starting balance + sum of signed
//! entry effects) cannot be broken by a partial failure.
//!
//! `apply` and `reverse` assume the caller already opened an atomic
//! unit; `record` and `delete_entry` are the public entry points that
//! open one themselves.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{TallyError, TallyResult};
use crate::models::{
    AccountId, EntryId, EntryKind, ItemRef, LedgerEntry, Money, Period, RecurringItem,
};
use crate::storage::Storage;

/// Service for ledger entry management
pub struct LedgerService<'a> {
    storage: &'a Storage,
}

/// Input for recording a new ledger entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub account_id: AccountId,
    pub recipient_id: Option<AccountId>,
    pub amount: Money,
    pub kind: EntryKind,
    /// Execution time; defaults to now
    pub executed_at: Option<DateTime<Utc>>,
    /// Back-reference to the recurring item that generated the entry
    pub item: Option<ItemRef>,
    pub description: Option<String>,
}

impl<'a> LedgerService<'a> {
    /// Create a new ledger service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Apply a movement: persist the entry and adjust balances.
    ///
    /// Runs inside the caller's atomic unit; does not persist to disk
    /// itself.
    pub fn apply(&self, input: NewEntry) -> TallyResult<LedgerEntry> {
        let mut entry = LedgerEntry::new(input.account_id, input.kind, input.amount);
        entry.recipient_id = input.recipient_id;
        if let Some(executed_at) = input.executed_at {
            entry.executed_at = executed_at;
        }
        entry.item = input.item;
        if let Some(description) = input.description {
            entry.description = description;
        }

        entry
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.adjust_account(entry.account_id, &entry, false)?;
        if let Some(recipient_id) = entry.recipient_id {
            self.adjust_account(recipient_id, &entry, false)?;
        }

        self.storage.entries.upsert(entry.clone())?;
        debug!(entry = %entry.id, kind = %entry.kind, "ledger entry applied");

        Ok(entry)
    }

    /// Reverse a movement: undo its balance effect and delete the entry.
    ///
    /// Runs inside the caller's atomic unit; does not persist to disk
    /// itself. Returns the entry as it was before deletion.
    pub fn reverse(&self, id: EntryId) -> TallyResult<LedgerEntry> {
        let entry = self
            .storage
            .entries
            .get(id)?
            .ok_or_else(|| TallyError::entry_not_found(id.to_string()))?;

        self.adjust_account(entry.account_id, &entry, true)?;
        if let Some(recipient_id) = entry.recipient_id {
            self.adjust_account(recipient_id, &entry, true)?;
        }

        self.storage.entries.delete(id)?;
        debug!(entry = %entry.id, kind = %entry.kind, "ledger entry reversed");

        Ok(entry)
    }

    /// Record a movement as its own atomic unit
    pub fn record(&self, input: NewEntry) -> TallyResult<LedgerEntry> {
        self.storage.transaction(|_| self.apply(input))
    }

    /// Delete an arbitrary ledger entry as its own atomic unit.
    ///
    /// Undoes the balance effect, destroys the entry, and if the entry
    /// back-referenced a recurring item, resets that item's
    /// last-executed timestamp to the newest remaining entry for it.
    /// Deleting an absent entry is a not-found error, not a silent
    /// success.
    pub fn delete_entry(&self, id: EntryId) -> TallyResult<LedgerEntry> {
        self.storage.transaction(|_| {
            let entry = self.reverse(id)?;
            if let Some(item) = entry.item {
                self.refresh_item_timestamp(&item)?;
            }
            Ok(entry)
        })
    }

    /// Get an entry by ID
    pub fn get(&self, id: EntryId) -> TallyResult<Option<LedgerEntry>> {
        self.storage.entries.get(id)
    }

    /// List all entries, newest first
    pub fn list(&self) -> TallyResult<Vec<LedgerEntry>> {
        self.storage.entries.get_all()
    }

    /// List entries touching an account, newest first
    pub fn list_for_account(&self, account_id: AccountId) -> TallyResult<Vec<LedgerEntry>> {
        self.storage.entries.get_by_account(account_id)
    }

    /// Locate the entry that settles an item for the given period.
    ///
    /// The back-reference is authoritative. Only when no entry in the
    /// period carries the item's back-reference does the lookup fall
    /// back to matching account, amount and kind, newest first; the
    /// fallback never picks an entry linked to a different item.
    pub fn find_current_entry(
        &self,
        item: &dyn RecurringItem,
        period: &Period,
    ) -> TallyResult<Option<LedgerEntry>> {
        let item_ref = item.item_ref();
        if let Some(entry) = self.storage.entries.latest_for_item_in(&item_ref, period)? {
            return Ok(Some(entry));
        }

        let candidates = self.storage.entries.match_attributes(
            item.account_id(),
            item.amount(),
            item.entry_kind(),
            period,
        )?;
        Ok(candidates
            .into_iter()
            .find(|e| e.item.is_none() || e.item == Some(item_ref)))
    }

    /// Reset an item's last-executed timestamp to the newest remaining
    /// entry back-referencing it, or clear it if none remains.
    pub fn refresh_item_timestamp(&self, item: &ItemRef) -> TallyResult<()> {
        let executed_at = self
            .storage
            .entries
            .latest_for_item(item)?
            .map(|e| e.executed_at);

        match item {
            ItemRef::Expense(id) => {
                if let Some(mut expense) = self.storage.expenses.get(*id)? {
                    expense.set_last_executed_at(executed_at);
                    self.storage.expenses.upsert(expense)?;
                }
            }
            ItemRef::Income(id) => {
                if let Some(mut income) = self.storage.incomes.get(*id)? {
                    income.set_last_executed_at(executed_at);
                    self.storage.incomes.upsert(income)?;
                }
            }
            ItemRef::Budget(id) => {
                if let Some(mut budget_item) = self.storage.budget_items.get(*id)? {
                    budget_item.set_last_executed_at(executed_at);
                    self.storage.budget_items.upsert(budget_item)?;
                }
            }
        }
        Ok(())
    }

    /// Apply (or undo) an entry's signed effect on one account
    fn adjust_account(
        &self,
        account_id: AccountId,
        entry: &LedgerEntry,
        undo: bool,
    ) -> TallyResult<()> {
        let mut account = self
            .storage
            .accounts
            .get(account_id)?
            .ok_or_else(|| TallyError::account_not_found(account_id.to_string()))?;

        if account.archived && !undo {
            return Err(TallyError::Validation(format!(
                "Account '{}' is archived",
                account.name
            )));
        }

        let effect = entry.signed_effect_on(account_id);
        account.adjust_balance(if undo { -effect } else { effect });
        self.storage.accounts.upsert(account)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::{Account, AccountType, Expense, Frequency};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let storage = Storage::new(&paths);
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed_account(storage: &Storage, name: &str, cents: i64) -> AccountId {
        let account = Account::with_starting_balance(
            name,
            AccountType::Checking,
            Money::from_cents(cents),
        );
        let id = account.id;
        storage.accounts.upsert(account).unwrap();
        id
    }

    fn outflow(account_id: AccountId, cents: i64) -> NewEntry {
        NewEntry {
            account_id,
            recipient_id: None,
            amount: Money::from_cents(cents),
            kind: EntryKind::Outflow,
            executed_at: None,
            item: None,
            description: None,
        }
    }

    fn balance(storage: &Storage, id: AccountId) -> i64 {
        storage.accounts.get(id).unwrap().unwrap().balance.cents()
    }

    #[test]
    fn test_record_outflow_decreases_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let ledger = LedgerService::new(&storage);
        ledger.record(outflow(account, 10_000)).unwrap();

        assert_eq!(balance(&storage, account), 90_000);
        assert_eq!(storage.entries.count().unwrap(), 1);
    }

    #[test]
    fn test_record_inflow_increases_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let ledger = LedgerService::new(&storage);
        ledger
            .record(NewEntry {
                kind: EntryKind::Inflow,
                ..outflow(account, 25_000)
            })
            .unwrap();

        assert_eq!(balance(&storage, account), 125_000);
    }

    #[test]
    fn test_transfer_apply_then_reverse_restores_both_balances() {
        let (_temp_dir, storage) = create_test_storage();
        let from = seed_account(&storage, "A", 100_000);
        let to = seed_account(&storage, "B", 50_000);

        let ledger = LedgerService::new(&storage);
        let entry = ledger
            .record(NewEntry {
                account_id: from,
                recipient_id: Some(to),
                amount: Money::from_cents(10_000),
                kind: EntryKind::Transfer,
                executed_at: None,
                item: None,
                description: None,
            })
            .unwrap();

        assert_eq!(balance(&storage, from), 90_000);
        assert_eq!(balance(&storage, to), 60_000);

        storage.transaction(|_| ledger.reverse(entry.id)).unwrap();

        assert_eq!(balance(&storage, from), 100_000);
        assert_eq!(balance(&storage, to), 50_000);
        assert_eq!(storage.entries.count().unwrap(), 0);
    }

    #[test]
    fn test_record_rejects_nonpositive_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let ledger = LedgerService::new(&storage);
        let err = ledger.record(outflow(account, 0)).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(balance(&storage, account), 100_000);
        assert_eq!(storage.entries.count().unwrap(), 0);
    }

    #[test]
    fn test_record_unknown_account_rolls_back() {
        let (_temp_dir, storage) = create_test_storage();

        let ledger = LedgerService::new(&storage);
        let err = ledger.record(outflow(AccountId::new(), 1_000)).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(storage.entries.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_entry_twice_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let ledger = LedgerService::new(&storage);
        let entry = ledger.record(outflow(account, 5_000)).unwrap();

        ledger.delete_entry(entry.id).unwrap();
        assert_eq!(balance(&storage, account), 100_000);

        let err = ledger.delete_entry(entry.id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_entry_refreshes_item_timestamp() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let expense = Expense::new("Rent", Money::from_cents(5_000), Frequency::Monthly, account);
        let item_ref = expense.item_ref();
        let expense_id = expense.id;
        storage.expenses.upsert(expense).unwrap();

        let ledger = LedgerService::new(&storage);
        let older_at = Utc::now() - chrono::Duration::days(40);
        let older = ledger
            .record(NewEntry {
                executed_at: Some(older_at),
                item: Some(item_ref),
                ..outflow(account, 5_000)
            })
            .unwrap();
        let newer = ledger
            .record(NewEntry {
                item: Some(item_ref),
                ..outflow(account, 5_000)
            })
            .unwrap();

        let mut stored = storage.expenses.get(expense_id).unwrap().unwrap();
        stored.set_last_executed_at(Some(newer.executed_at));
        storage.expenses.upsert(stored).unwrap();

        // Deleting the newest entry falls back to the older one
        ledger.delete_entry(newer.id).unwrap();
        let refreshed = storage.expenses.get(expense_id).unwrap().unwrap();
        assert_eq!(refreshed.last_expensed_at, Some(older.executed_at));

        // Deleting the last entry clears the timestamp
        ledger.delete_entry(older.id).unwrap();
        let cleared = storage.expenses.get(expense_id).unwrap().unwrap();
        assert_eq!(cleared.last_expensed_at, None);
    }

    #[test]
    fn linked_entry_wins_over_attribute_match() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let expense = Expense::new("Rent", Money::from_cents(5_000), Frequency::Monthly, account);
        let ledger = LedgerService::new(&storage);

        // An unlinked entry with identical attributes, executed later
        ledger.record(outflow(account, 5_000)).unwrap();
        // The linked entry, executed earlier in the same period
        let linked = ledger
            .record(NewEntry {
                executed_at: Some(Utc::now() - chrono::Duration::hours(2)),
                item: Some(expense.item_ref()),
                ..outflow(account, 5_000)
            })
            .unwrap();

        let period = Period::current_month();
        let found = ledger
            .find_current_entry(&expense, &period)
            .unwrap()
            .unwrap();
        assert_eq!(found.id, linked.id);
    }

    #[test]
    fn test_attribute_fallback_skips_foreign_links() {
        let (_temp_dir, storage) = create_test_storage();
        let account = seed_account(&storage, "Checking", 100_000);

        let expense = Expense::new("Rent", Money::from_cents(5_000), Frequency::Monthly, account);
        let other = Expense::new("Gym", Money::from_cents(5_000), Frequency::Monthly, account);
        let ledger = LedgerService::new(&storage);

        // Entry linked to a different item must not satisfy the fallback
        ledger
            .record(NewEntry {
                item: Some(other.item_ref()),
                ..outflow(account, 5_000)
            })
            .unwrap();

        let period = Period::current_month();
        assert!(ledger
            .find_current_entry(&expense, &period)
            .unwrap()
            .is_none());

        // An unlinked match is picked up
        let unlinked = ledger.record(outflow(account, 5_000)).unwrap();
        let found = ledger
            .find_current_entry(&expense, &period)
            .unwrap()
            .unwrap();
        assert_eq!(found.id, unlinked.id);
    }
}
