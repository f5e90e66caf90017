//! Account service
//!
//! Business logic for account management. Balances are never set
//! directly here; they move only through the ledger.

use crate::error::{TallyError, TallyResult};
use crate::models::{Account, AccountId, AccountType, Money};
use crate::storage::Storage;

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

impl<'a> AccountService<'a> {
    /// Create a new account service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    pub fn create(
        &self,
        name: &str,
        account_type: AccountType,
        starting_balance: Money,
    ) -> TallyResult<Account> {
        let account = Account::with_starting_balance(name, account_type, starting_balance);
        account
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage.transaction(|s| {
            // Uniqueness is checked under the unit lock so two racing
            // creates cannot both pass it.
            if s.accounts.name_exists(&account.name, None)? {
                return Err(TallyError::Duplicate {
                    entity_type: "Account",
                    identifier: account.name.clone(),
                });
            }
            s.accounts.upsert(account.clone())?;
            Ok(())
        })?;

        Ok(account)
    }

    /// Get an account by ID
    pub fn get(&self, id: AccountId) -> TallyResult<Option<Account>> {
        self.storage.accounts.get(id)
    }

    /// Find an account by ID string or name
    pub fn find(&self, identifier: &str) -> TallyResult<Option<Account>> {
        if let Ok(id) = identifier.parse::<AccountId>() {
            if let Some(account) = self.storage.accounts.get(id)? {
                return Ok(Some(account));
            }
        }
        // Listings print the short id form, so accept it back
        if let Some(account) = self
            .storage
            .accounts
            .get_all()?
            .into_iter()
            .find(|a| a.id.to_string() == identifier)
        {
            return Ok(Some(account));
        }
        self.storage.accounts.get_by_name(identifier)
    }

    /// Find an account or fail with not-found
    pub fn require(&self, identifier: &str) -> TallyResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| TallyError::account_not_found(identifier))
    }

    /// List all accounts, sorted by name
    pub fn list(&self) -> TallyResult<Vec<Account>> {
        self.storage.accounts.get_all()
    }

    /// Rename an account or update its notes
    pub fn update(
        &self,
        id: AccountId,
        name: Option<String>,
        notes: Option<String>,
    ) -> TallyResult<Account> {
        let mut account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;

        if let Some(name) = name {
            if self.storage.accounts.name_exists(&name, Some(id))? {
                return Err(TallyError::Duplicate {
                    entity_type: "Account",
                    identifier: name,
                });
            }
            account.name = name;
        }
        if let Some(notes) = notes {
            account.notes = notes;
        }

        account
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;
        account.updated_at = chrono::Utc::now();

        self.storage.transaction(|s| {
            s.accounts.upsert(account.clone())?;
            Ok(())
        })?;

        Ok(account)
    }

    /// Archive an account
    pub fn archive(&self, id: AccountId) -> TallyResult<Account> {
        self.set_archived(id, true)
    }

    /// Unarchive an account
    pub fn unarchive(&self, id: AccountId) -> TallyResult<Account> {
        self.set_archived(id, false)
    }

    fn set_archived(&self, id: AccountId, archived: bool) -> TallyResult<Account> {
        let mut account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;

        if archived {
            account.archive();
        } else {
            account.unarchive();
        }

        self.storage.transaction(|s| {
            s.accounts.upsert(account.clone())?;
            Ok(())
        })?;

        Ok(account)
    }

    /// Check the balance invariant for one account: starting balance
    /// plus the signed sum of all entries must equal the stored balance.
    pub fn verify_balance(&self, id: AccountId) -> TallyResult<bool> {
        let account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| TallyError::account_not_found(id.to_string()))?;

        let signed_sum: Money = self
            .storage
            .entries
            .get_by_account(id)?
            .iter()
            .map(|e| e.signed_effect_on(id))
            .sum();

        Ok(account.starting_balance + signed_sum == account.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::EntryKind;
    use crate::services::ledger::{LedgerService, NewEntry};
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
    fn test_create_rejects_duplicate_name() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        service
            .create("Checking", AccountType::Checking, Money::zero())
            .unwrap();
        let err = service
            .create("checking", AccountType::Cash, Money::zero())
            .unwrap_err();
        assert!(matches!(err, TallyError::Duplicate { .. }));
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        let account = service
            .create("Savings", AccountType::Savings, Money::from_cents(1_000))
            .unwrap();

        assert!(service.find("Savings").unwrap().is_some());
        // The short display form printed by listings and the full UUID
        // must both resolve
        assert!(service.find(&account.id.to_string()).unwrap().is_some());
        assert!(service
            .find(&account.id.as_uuid().to_string())
            .unwrap()
            .is_some());
        assert!(service.find("missing").unwrap().is_none());
        assert!(service.require("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_concurrent_create_rejects_duplicate_name() {
        let (_temp_dir, storage) = create_test_storage();
        let barrier = std::sync::Barrier::new(2);

        let created: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        AccountService::new(&storage)
                            .create("Checking", AccountType::Checking, Money::zero())
                            .is_ok()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(created.iter().filter(|ok| **ok).count(), 1);
        assert_eq!(storage.accounts.count().unwrap(), 1);
    }

    #[test]
    fn test_verify_balance() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service
            .create("Checking", AccountType::Checking, Money::from_cents(100_000))
            .unwrap();

        let ledger = LedgerService::new(&storage);
        ledger
            .record(NewEntry {
                account_id: account.id,
                recipient_id: None,
                amount: Money::from_cents(12_345),
                kind: EntryKind::Outflow,
                executed_at: None,
                item: None,
                description: None,
            })
            .unwrap();

        assert!(service.verify_balance(account.id).unwrap());

        // Tamper with the balance outside the ledger
        let mut broken = storage.accounts.get(account.id).unwrap().unwrap();
        broken.adjust_balance(Money::from_cents(1));
        storage.accounts.upsert(broken).unwrap();
        assert!(!service.verify_balance(account.id).unwrap());
    }
}
