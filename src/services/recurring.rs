//! Recurring item service
//!
//! CRUD and listing for the three recurring variants. Status is always
//! derived at read time through the status service; this service never
//! stores one.

use chrono::{DateTime, Utc};

use crate::error::{TallyError, TallyResult};
use crate::models::{
    AccountId, BudgetItem, BudgetItemId, Expense, ExpenseId, Frequency, Income, IncomeId,
    ItemStatus, Money, RecurringItem,
};
use crate::services::status::StatusService;
use crate::storage::Storage;

/// Service for recurring item management
pub struct RecurringService<'a> {
    storage: &'a Storage,
}

/// Options for filtering recurring items
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Filter by owning account
    pub account_id: Option<AccountId>,
    /// Filter by frequency
    pub frequency: Option<Frequency>,
    /// Filter by category
    pub category: Option<String>,
    /// Filter by derived status
    pub status: Option<ItemStatus>,
}

impl ItemFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by owning account
    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Filter by frequency
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Filter by category
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Filter by derived status
    pub fn status(mut self, status: ItemStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn matches(&self, item: &dyn RecurringItem, category: Option<&str>) -> bool {
        if let Some(account_id) = self.account_id {
            if item.account_id() != account_id {
                return false;
            }
        }
        if let Some(want) = self.category.as_deref() {
            if category.map(|c| !c.eq_ignore_ascii_case(want)).unwrap_or(true) {
                return false;
            }
        }
        true
    }
}

/// Input for creating or updating a recurring item
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub frequency: Option<Frequency>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl<'a> RecurringService<'a> {
    /// Create a new recurring item service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    fn require_account(&self, account_id: AccountId) -> TallyResult<()> {
        self.storage
            .accounts
            .get(account_id)?
            .ok_or_else(|| TallyError::account_not_found(account_id.to_string()))?;
        Ok(())
    }

    // Expenses

    /// Create a new expense
    pub fn create_expense(
        &self,
        name: &str,
        amount: Money,
        frequency: Frequency,
        account_id: AccountId,
    ) -> TallyResult<Expense> {
        self.require_account(account_id)?;

        let expense = Expense::new(name, amount, frequency, account_id);
        expense
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage
            .transaction(|s| s.expenses.upsert(expense.clone()))?;
        Ok(expense)
    }

    /// Find an expense by ID string or name
    pub fn find_expense(&self, identifier: &str) -> TallyResult<Option<Expense>> {
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            if let Some(expense) = self.storage.expenses.get(id)? {
                return Ok(Some(expense));
            }
        }
        // Listings print the short id form, so accept it back
        if let Some(expense) = self
            .storage
            .expenses
            .get_all()?
            .into_iter()
            .find(|e| e.id.to_string() == identifier)
        {
            return Ok(Some(expense));
        }
        self.storage.expenses.get_by_name(identifier)
    }

    /// Update an expense
    pub fn update_expense(&self, id: ExpenseId, update: ItemUpdate) -> TallyResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| TallyError::expense_not_found(id.to_string()))?;

        apply_update(
            &mut expense.name,
            &mut expense.amount,
            &mut expense.frequency,
            &mut expense.category,
            &mut expense.notes,
            update,
        );
        expense
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;
        expense.updated_at = Utc::now();

        self.storage
            .transaction(|s| s.expenses.upsert(expense.clone()))?;
        Ok(expense)
    }

    /// Delete an expense, detaching any entries that back-reference it.
    /// Historical entries and balances are left untouched.
    pub fn delete_expense(&self, id: ExpenseId) -> TallyResult<()> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| TallyError::expense_not_found(id.to_string()))?;

        self.storage.transaction(|s| {
            detach_entries(s, &expense)?;
            s.expenses.delete(id)?;
            Ok(())
        })
    }

    /// List expenses with derived status, optionally filtered
    pub fn list_expenses(&self, filter: &ItemFilter) -> TallyResult<Vec<(Expense, ItemStatus)>> {
        let status_service = StatusService::new(self.storage);
        let mut out = Vec::new();
        for expense in self.storage.expenses.get_all()? {
            if !filter.matches(&expense, expense.category.as_deref()) {
                continue;
            }
            if let Some(frequency) = filter.frequency {
                if expense.frequency != frequency {
                    continue;
                }
            }
            let status = status_service.status_of(&expense)?;
            if filter.status.map(|s| s != status).unwrap_or(false) {
                continue;
            }
            out.push((expense, status));
        }
        Ok(out)
    }

    // Incomes

    /// Create a new income
    pub fn create_income(
        &self,
        name: &str,
        amount: Money,
        frequency: Frequency,
        account_id: AccountId,
    ) -> TallyResult<Income> {
        self.require_account(account_id)?;

        let income = Income::new(name, amount, frequency, account_id);
        income
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage
            .transaction(|s| s.incomes.upsert(income.clone()))?;
        Ok(income)
    }

    /// Find an income by ID string or name
    pub fn find_income(&self, identifier: &str) -> TallyResult<Option<Income>> {
        if let Ok(id) = identifier.parse::<IncomeId>() {
            if let Some(income) = self.storage.incomes.get(id)? {
                return Ok(Some(income));
            }
        }
        if let Some(income) = self
            .storage
            .incomes
            .get_all()?
            .into_iter()
            .find(|i| i.id.to_string() == identifier)
        {
            return Ok(Some(income));
        }
        self.storage.incomes.get_by_name(identifier)
    }

    /// Update an income. `received_at` reschedules the last-received
    /// timestamp; when it lands in the current month and no entry backs
    /// it, the next mark-received replays it instead of stamping now.
    pub fn update_income(
        &self,
        id: IncomeId,
        update: ItemUpdate,
        received_at: Option<DateTime<Utc>>,
    ) -> TallyResult<Income> {
        let mut income = self
            .storage
            .incomes
            .get(id)?
            .ok_or_else(|| TallyError::income_not_found(id.to_string()))?;

        apply_update(
            &mut income.name,
            &mut income.amount,
            &mut income.frequency,
            &mut income.category,
            &mut income.notes,
            update,
        );
        if let Some(received_at) = received_at {
            income.last_received_at = Some(received_at);
        }
        income
            .validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;
        income.updated_at = Utc::now();

        self.storage
            .transaction(|s| s.incomes.upsert(income.clone()))?;
        Ok(income)
    }

    /// Delete an income, detaching any entries that back-reference it
    pub fn delete_income(&self, id: IncomeId) -> TallyResult<()> {
        let income = self
            .storage
            .incomes
            .get(id)?
            .ok_or_else(|| TallyError::income_not_found(id.to_string()))?;

        self.storage.transaction(|s| {
            detach_entries(s, &income)?;
            s.incomes.delete(id)?;
            Ok(())
        })
    }

    /// List incomes with derived status, optionally filtered
    pub fn list_incomes(&self, filter: &ItemFilter) -> TallyResult<Vec<(Income, ItemStatus)>> {
        let status_service = StatusService::new(self.storage);
        let mut out = Vec::new();
        for income in self.storage.incomes.get_all()? {
            if !filter.matches(&income, income.category.as_deref()) {
                continue;
            }
            if let Some(frequency) = filter.frequency {
                if income.frequency != frequency {
                    continue;
                }
            }
            let status = status_service.status_of(&income)?;
            if filter.status.map(|s| s != status).unwrap_or(false) {
                continue;
            }
            out.push((income, status));
        }
        Ok(out)
    }

    // Budget items

    /// Create a new budget obligation
    pub fn create_budget_item(
        &self,
        name: &str,
        amount: Money,
        frequency: Frequency,
        account_id: AccountId,
    ) -> TallyResult<BudgetItem> {
        self.require_account(account_id)?;

        let item = BudgetItem::new(name, amount, frequency, account_id);
        item.validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;

        self.storage
            .transaction(|s| s.budget_items.upsert(item.clone()))?;
        Ok(item)
    }

    /// Find a budget item by ID string or name
    pub fn find_budget_item(&self, identifier: &str) -> TallyResult<Option<BudgetItem>> {
        if let Ok(id) = identifier.parse::<BudgetItemId>() {
            if let Some(item) = self.storage.budget_items.get(id)? {
                return Ok(Some(item));
            }
        }
        if let Some(item) = self
            .storage
            .budget_items
            .get_all()?
            .into_iter()
            .find(|i| i.id.to_string() == identifier)
        {
            return Ok(Some(item));
        }
        self.storage.budget_items.get_by_name(identifier)
    }

    /// Update a budget item
    pub fn update_budget_item(&self, id: BudgetItemId, update: ItemUpdate) -> TallyResult<BudgetItem> {
        let mut item = self
            .storage
            .budget_items
            .get(id)?
            .ok_or_else(|| TallyError::budget_item_not_found(id.to_string()))?;

        apply_update(
            &mut item.name,
            &mut item.amount,
            &mut item.frequency,
            &mut item.category,
            &mut item.notes,
            update,
        );
        item.validate()
            .map_err(|e| TallyError::Validation(e.to_string()))?;
        item.updated_at = Utc::now();

        self.storage
            .transaction(|s| s.budget_items.upsert(item.clone()))?;
        Ok(item)
    }

    /// Delete a budget item, detaching any entries that back-reference it
    pub fn delete_budget_item(&self, id: BudgetItemId) -> TallyResult<()> {
        let item = self
            .storage
            .budget_items
            .get(id)?
            .ok_or_else(|| TallyError::budget_item_not_found(id.to_string()))?;

        self.storage.transaction(|s| {
            detach_entries(s, &item)?;
            s.budget_items.delete(id)?;
            Ok(())
        })
    }

    /// List budget items with derived status, optionally filtered
    pub fn list_budget_items(
        &self,
        filter: &ItemFilter,
    ) -> TallyResult<Vec<(BudgetItem, ItemStatus)>> {
        let status_service = StatusService::new(self.storage);
        let mut out = Vec::new();
        for item in self.storage.budget_items.get_all()? {
            if !filter.matches(&item, item.category.as_deref()) {
                continue;
            }
            if let Some(frequency) = filter.frequency {
                if item.frequency != frequency {
                    continue;
                }
            }
            let status = status_service.status_of(&item)?;
            if filter.status.map(|s| s != status).unwrap_or(false) {
                continue;
            }
            out.push((item, status));
        }
        Ok(out)
    }
}

fn apply_update(
    name: &mut String,
    amount: &mut Money,
    frequency: &mut Frequency,
    category: &mut Option<String>,
    notes: &mut String,
    update: ItemUpdate,
) {
    if let Some(new_name) = update.name {
        *name = new_name;
    }
    if let Some(new_amount) = update.amount {
        *amount = new_amount;
    }
    if let Some(new_frequency) = update.frequency {
        *frequency = new_frequency;
    }
    if let Some(new_category) = update.category {
        *category = if new_category.is_empty() {
            None
        } else {
            Some(new_category)
        };
    }
    if let Some(new_notes) = update.notes {
        *notes = new_notes;
    }
}

/// Clear the back-reference on every entry generated by the item, so
/// the deleted item leaves no dangling links behind
fn detach_entries(storage: &Storage, item: &dyn RecurringItem) -> TallyResult<()> {
    let item_ref = item.item_ref();
    for mut entry in storage.entries.get_all()? {
        if entry.item == Some(item_ref) {
            entry.item = None;
            storage.entries.upsert(entry)?;
        }
    }
    Ok(())
}
