//! Insights service
//!
//! Builds a read-only snapshot of committed data and hands it to a text
//! generator. The generator is a trait seam so an external service can
//! be swapped in; the bundled implementation produces a plain offline
//! summary. Nothing here writes core state or runs inside an atomic
//! unit.

use serde::Serialize;

use crate::error::TallyResult;
use crate::models::ItemStatus;
use crate::services::recurring::{ItemFilter, RecurringService};
use crate::storage::Storage;

/// Seam for free-text generation over a financial snapshot
pub trait TextGenerator {
    /// Produce advisory text for the given snapshot, serialized as JSON
    fn generate(&self, snapshot_json: &str) -> TallyResult<String>;
}

/// Read-only view handed to the text generator
#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub accounts: Vec<AccountView>,
    pub expenses: Vec<ItemView>,
    pub incomes: Vec<ItemView>,
    pub budget_items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub name: String,
    pub balance_cents: i64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub name: String,
    pub amount_cents: i64,
    pub frequency: String,
    pub status: ItemStatus,
}

/// Service assembling snapshots and invoking a generator
pub struct InsightsService<'a> {
    storage: &'a Storage,
}

impl<'a> InsightsService<'a> {
    /// Create a new insights service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Build a snapshot of all committed data
    pub fn snapshot(&self) -> TallyResult<Snapshot> {
        let recurring = RecurringService::new(self.storage);
        let filter = ItemFilter::new();

        let accounts = self
            .storage
            .accounts
            .get_all()?
            .into_iter()
            .filter(|a| !a.archived)
            .map(|a| AccountView {
                name: a.name,
                balance_cents: a.balance.cents(),
                currency: a.currency,
            })
            .collect();

        let expenses = recurring
            .list_expenses(&filter)?
            .into_iter()
            .map(|(e, status)| ItemView {
                name: e.name,
                amount_cents: e.amount.cents(),
                frequency: e.frequency.to_string(),
                status,
            })
            .collect();

        let incomes = recurring
            .list_incomes(&filter)?
            .into_iter()
            .map(|(i, status)| ItemView {
                name: i.name,
                amount_cents: i.amount.cents(),
                frequency: i.frequency.to_string(),
                status,
            })
            .collect();

        let budget_items = recurring
            .list_budget_items(&filter)?
            .into_iter()
            .map(|(b, status)| ItemView {
                name: b.name,
                amount_cents: b.amount.cents(),
                frequency: b.frequency.to_string(),
                status,
            })
            .collect();

        Ok(Snapshot {
            accounts,
            expenses,
            incomes,
            budget_items,
        })
    }

    /// Generate insight text from the current snapshot
    pub fn generate(&self, generator: &dyn TextGenerator) -> TallyResult<String> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_string(&snapshot)?;
        generator.generate(&json)
    }
}

/// Offline generator producing a deterministic monthly summary
pub struct SummaryGenerator;

impl TextGenerator for SummaryGenerator {
    fn generate(&self, snapshot_json: &str) -> TallyResult<String> {
        let snapshot: serde_json::Value = serde_json::from_str(snapshot_json)?;

        let count = |key: &str, status: &str| -> usize {
            snapshot[key]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter(|i| i["status"] == status)
                        .count()
                })
                .unwrap_or(0)
        };

        let total_balance: i64 = snapshot["accounts"]
            .as_array()
            .map(|accounts| {
                accounts
                    .iter()
                    .filter_map(|a| a["balance_cents"].as_i64())
                    .sum()
            })
            .unwrap_or(0);

        let pending =
            count("expenses", "pending") + count("incomes", "pending") + count("budget_items", "pending");
        let paid =
            count("expenses", "paid") + count("incomes", "paid") + count("budget_items", "paid");

        Ok(format!(
            "Total balance across accounts: {}.{:02}. This month {} item(s) are settled and {} still pending.",
            total_balance / 100,
            (total_balance % 100).abs(),
            paid,
            pending
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TallyPaths;
    use crate::models::{Account, AccountType, Frequency, Money};
    use crate::services::status::StatusService;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_and_offline_summary() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let storage = Storage::new(&paths);
        storage.load_all().unwrap();

        let account = Account::with_starting_balance(
            "Checking",
            AccountType::Checking,
            Money::from_cents(100_000),
        );
        let account_id = account.id;
        storage.accounts.upsert(account).unwrap();

        let recurring = RecurringService::new(&storage);
        let rent = recurring
            .create_expense("Rent", Money::from_cents(50_000), Frequency::Monthly, account_id)
            .unwrap();
        recurring
            .create_expense("Gym", Money::from_cents(4_000), Frequency::Monthly, account_id)
            .unwrap();
        StatusService::new(&storage).mark_expense_paid(rent.id).unwrap();

        let insights = InsightsService::new(&storage);
        let snapshot = insights.snapshot().unwrap();
        assert_eq!(snapshot.accounts.len(), 1);
        assert_eq!(snapshot.expenses.len(), 2);

        let text = insights.generate(&SummaryGenerator).unwrap();
        assert!(text.contains("1 item(s) are settled"));
        assert!(text.contains("1 still pending"));
    }
}
