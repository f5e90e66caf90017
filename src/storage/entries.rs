//! Ledger entry repository for JSON storage
//!
//! Manages loading and saving ledger entries to entries.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TallyError;
use crate::models::{AccountId, EntryId, EntryKind, ItemRef, LedgerEntry, Money, Period};

use super::file_io::{read_json, write_json_atomic};

/// Serializable entry data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EntryData {
    entries: Vec<LedgerEntry>,
}

/// Repository for ledger entry persistence
pub struct EntryRepository {
    path: PathBuf,
    data: RwLock<HashMap<EntryId, LedgerEntry>>,
}

impl EntryRepository {
    /// Create a new entry repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load entries from disk
    pub fn load(&self) -> Result<(), TallyError> {
        let file_data: EntryData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for entry in file_data.entries {
            data.insert(entry.id, entry);
        }

        Ok(())
    }

    /// Save entries to disk
    pub fn save(&self) -> Result<(), TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let file_data = EntryData {
            entries: data.values().cloned().collect(),
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get an entry by ID
    pub fn get(&self, id: EntryId) -> Result<Option<LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all entries, newest execution first
    pub fn get_all(&self) -> Result<Vec<LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut entries: Vec<_> = data.values().cloned().collect();
        entries.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        Ok(entries)
    }

    /// Get entries touching an account (source or transfer recipient), newest first
    pub fn get_by_account(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut entries: Vec<_> = data
            .values()
            .filter(|e| e.account_id == account_id || e.recipient_id == Some(account_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        Ok(entries)
    }

    /// Newest entry back-referencing the given item, if any
    pub fn latest_for_item(&self, item: &ItemRef) -> Result<Option<LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|e| e.item.as_ref() == Some(item))
            .max_by_key(|e| e.executed_at)
            .cloned())
    }

    /// Newest entry back-referencing the given item within a period
    pub fn latest_for_item_in(
        &self,
        item: &ItemRef,
        period: &Period,
    ) -> Result<Option<LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|e| e.item.as_ref() == Some(item) && period.contains(e.executed_at))
            .max_by_key(|e| e.executed_at)
            .cloned())
    }

    /// Entries in a period matching account, amount and kind, newest first.
    /// Used as a fallback when an item carries no back-referenced entry.
    pub fn match_attributes(
        &self,
        account_id: AccountId,
        amount: Money,
        kind: EntryKind,
        period: &Period,
    ) -> Result<Vec<LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut entries: Vec<_> = data
            .values()
            .filter(|e| {
                e.account_id == account_id
                    && e.amount == amount
                    && e.kind == kind
                    && period.contains(e.executed_at)
            })
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        Ok(entries)
    }

    /// Insert or update an entry
    pub fn upsert(&self, entry: LedgerEntry) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(entry.id, entry);
        Ok(())
    }

    /// Delete an entry, returning whether it existed
    pub fn delete(&self, id: EntryId) -> Result<bool, TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id).is_some())
    }

    /// Count entries
    pub fn count(&self) -> Result<usize, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }

    /// Clone the in-memory state for atomic-unit rollback
    pub(crate) fn snapshot(&self) -> Result<HashMap<EntryId, LedgerEntry>, TallyError> {
        let data = self
            .data
            .read()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.clone())
    }

    /// Replace the in-memory state with a previously taken snapshot
    pub(crate) fn restore(
        &self,
        snapshot: HashMap<EntryId, LedgerEntry>,
    ) -> Result<(), TallyError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TallyError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = snapshot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExpenseId;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, EntryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.json");
        let repo = EntryRepository::new(path);
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn outflow(account: AccountId, cents: i64) -> LedgerEntry {
        LedgerEntry::new(account, EntryKind::Outflow, Money::from_cents(cents))
    }

    #[test]
    fn test_latest_for_item_picks_newest() {
        let (_temp_dir, repo) = create_test_repo();
        let account = AccountId::new();
        let item = ItemRef::Expense(ExpenseId::new());

        let mut older = outflow(account, 1_000);
        older.executed_at = Utc::now() - Duration::days(3);
        older.item = Some(item);
        let mut newer = outflow(account, 1_000);
        newer.item = Some(item);
        let newer_id = newer.id;

        repo.upsert(older).unwrap();
        repo.upsert(newer).unwrap();

        let found = repo.latest_for_item(&item).unwrap().unwrap();
        assert_eq!(found.id, newer_id);
    }

    #[test]
    fn test_latest_for_item_in_respects_period() {
        let (_temp_dir, repo) = create_test_repo();
        let account = AccountId::new();
        let item = ItemRef::Expense(ExpenseId::new());

        let mut stale = outflow(account, 2_000);
        stale.executed_at = Utc::now() - Duration::days(60);
        stale.item = Some(item.clone());
        repo.upsert(stale).unwrap();

        let period = Period::current_month();
        assert!(repo.latest_for_item_in(&item, &period).unwrap().is_none());
        assert!(repo.latest_for_item(&item).unwrap().is_some());
    }

    #[test]
    fn test_match_attributes_filters_and_sorts() {
        let (_temp_dir, repo) = create_test_repo();
        let account = AccountId::new();
        let period = Period::current_month();

        let mut first = outflow(account, 5_000);
        first.executed_at = Utc::now() - Duration::hours(5);
        let mut second = outflow(account, 5_000);
        second.executed_at = Utc::now() - Duration::hours(1);
        let second_id = second.id;
        let wrong_amount = outflow(account, 4_999);
        let wrong_account = outflow(AccountId::new(), 5_000);

        repo.upsert(first).unwrap();
        repo.upsert(second).unwrap();
        repo.upsert(wrong_amount).unwrap();
        repo.upsert(wrong_account).unwrap();

        let matches = repo
            .match_attributes(account, Money::from_cents(5_000), EntryKind::Outflow, &period)
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, second_id);
    }

    #[test]
    fn test_delete_reports_existence() {
        let (_temp_dir, repo) = create_test_repo();
        let entry = outflow(AccountId::new(), 100);
        let id = entry.id;
        repo.upsert(entry).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }
}
