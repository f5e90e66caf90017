//! Recurring item models
//!
//! Three item variants share the "recurring item" capability: expenses
//! and budget obligations settle as outflows, incomes as inflows. Their
//! pending/paid status is never stored; it is derived from the ledger
//! entries that back-reference them. The only status-adjacent state an
//! item carries is its last-executed timestamp, maintained by the
//! status engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entry::{EntryKind, ItemRef};
use super::ids::{AccountId, BudgetItemId, ExpenseId, IncomeId};
use super::money::Money;
use super::period::Period;

/// How often a recurring item comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    BiWeekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Parse a frequency from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "weekly" => Some(Self::Weekly),
            "biweekly" | "bi-weekly" | "bi_weekly" => Some(Self::BiWeekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" | "annual" | "annually" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "Weekly"),
            Self::BiWeekly => write!(f, "Bi-weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Quarterly => write!(f, "Quarterly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

/// Derived settlement status for the current period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// No current-period ledger entry references the item
    Pending,
    /// A current-period ledger entry references the item
    Paid,
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Paid => write!(f, "Paid"),
        }
    }
}

/// The shared capability of the three recurring variants.
///
/// The status engine is written against this trait only; it never
/// matches on the concrete variant.
pub trait RecurringItem {
    /// Display name
    fn name(&self) -> &str;

    /// Unsigned amount due each period
    fn amount(&self) -> Money;

    /// Owning account
    fn account_id(&self) -> AccountId;

    /// Ledger entry kind a settlement produces
    fn entry_kind(&self) -> EntryKind;

    /// Typed back-reference for entries generated by this item
    fn item_ref(&self) -> ItemRef;

    /// The variant-specific last-executed timestamp
    fn last_executed_at(&self) -> Option<DateTime<Utc>>;

    /// Set the variant-specific last-executed timestamp
    fn set_last_executed_at(&mut self, at: Option<DateTime<Utc>>);

    /// A prior timestamp to replay as the new entry's `executed_at`
    /// instead of the current time. Only incomes carry one: a
    /// `last_received_at` inside the given period that no entry backs
    /// anymore (left behind by a direct edit).
    fn replay_timestamp(&self, _period: &Period) -> Option<DateTime<Utc>> {
        None
    }
}

/// A recurring expense (settles as an outflow)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub name: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub account_id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// When this expense was last settled; maintained by the status engine
    pub last_expensed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        account_id: AccountId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            name: name.into(),
            amount,
            frequency,
            account_id,
            category: None,
            notes: String::new(),
            last_expensed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item(&self.name, self.amount)
    }
}

impl RecurringItem for Expense {
    fn name(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn account_id(&self) -> AccountId {
        self.account_id
    }

    fn entry_kind(&self) -> EntryKind {
        EntryKind::Outflow
    }

    fn item_ref(&self) -> ItemRef {
        ItemRef::Expense(self.id)
    }

    fn last_executed_at(&self) -> Option<DateTime<Utc>> {
        self.last_expensed_at
    }

    fn set_last_executed_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_expensed_at = at;
        self.updated_at = Utc::now();
    }
}

/// A recurring income (settles as an inflow)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    pub name: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub account_id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// When this income was last received; maintained by the status engine
    pub last_received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Income {
    /// Create a new income
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        account_id: AccountId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IncomeId::new(),
            name: name.into(),
            amount,
            frequency,
            account_id,
            category: None,
            notes: String::new(),
            last_received_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the income
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item(&self.name, self.amount)
    }
}

impl RecurringItem for Income {
    fn name(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn account_id(&self) -> AccountId {
        self.account_id
    }

    fn entry_kind(&self) -> EntryKind {
        EntryKind::Inflow
    }

    fn item_ref(&self) -> ItemRef {
        ItemRef::Income(self.id)
    }

    fn last_executed_at(&self) -> Option<DateTime<Utc>> {
        self.last_received_at
    }

    fn set_last_executed_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_received_at = at;
        self.updated_at = Utc::now();
    }

    fn replay_timestamp(&self, period: &Period) -> Option<DateTime<Utc>> {
        self.last_received_at.filter(|at| period.contains(*at))
    }
}

/// A recurring budget obligation (settles as an outflow)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: BudgetItemId,
    pub name: String,
    pub amount: Money,
    pub frequency: Frequency,
    pub account_id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// When this obligation was last paid; maintained by the status engine
    pub last_paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetItem {
    /// Create a new budget item
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        account_id: AccountId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetItemId::new(),
            name: name.into(),
            amount,
            frequency,
            account_id,
            category: None,
            notes: String::new(),
            last_paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the budget item
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        validate_item(&self.name, self.amount)
    }
}

impl RecurringItem for BudgetItem {
    fn name(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> Money {
        self.amount
    }

    fn account_id(&self) -> AccountId {
        self.account_id
    }

    fn entry_kind(&self) -> EntryKind {
        EntryKind::Outflow
    }

    fn item_ref(&self) -> ItemRef {
        ItemRef::Budget(self.id)
    }

    fn last_executed_at(&self) -> Option<DateTime<Utc>> {
        self.last_paid_at
    }

    fn set_last_executed_at(&mut self, at: Option<DateTime<Utc>>) {
        self.last_paid_at = at;
        self.updated_at = Utc::now();
    }
}

fn validate_item(name: &str, amount: Money) -> Result<(), ItemValidationError> {
    if name.trim().is_empty() {
        return Err(ItemValidationError::EmptyName);
    }
    if !amount.is_positive() {
        return Err(ItemValidationError::NonPositiveAmount);
    }
    Ok(())
}

/// Validation errors for recurring items
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    NonPositiveAmount,
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Item name cannot be empty"),
            Self::NonPositiveAmount => write!(f, "Item amount must be positive"),
        }
    }
}

impl std::error::Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_entry_kinds_per_variant() {
        let account = AccountId::new();
        let expense = Expense::new("Rent", Money::from_cents(120_000), Frequency::Monthly, account);
        let income = Income::new("Salary", Money::from_cents(500_000), Frequency::Monthly, account);
        let budget = BudgetItem::new("Gym", Money::from_cents(4_000), Frequency::Monthly, account);

        assert_eq!(expense.entry_kind(), EntryKind::Outflow);
        assert_eq!(income.entry_kind(), EntryKind::Inflow);
        assert_eq!(budget.entry_kind(), EntryKind::Outflow);
    }

    #[test]
    fn test_last_executed_accessor_maps_to_variant_field() {
        let account = AccountId::new();
        let mut expense =
            Expense::new("Rent", Money::from_cents(120_000), Frequency::Monthly, account);

        let ts = Utc::now();
        expense.set_last_executed_at(Some(ts));
        assert_eq!(expense.last_expensed_at, Some(ts));
        assert_eq!(expense.last_executed_at(), Some(ts));

        expense.set_last_executed_at(None);
        assert_eq!(expense.last_expensed_at, None);
    }

    #[test]
    fn test_income_replay_only_inside_period() {
        let account = AccountId::new();
        let mut income =
            Income::new("Salary", Money::from_cents(500_000), Frequency::Monthly, account);
        let period = Period::current_month();

        // No timestamp: nothing to replay
        assert_eq!(income.replay_timestamp(&period), None);

        // In-period timestamp is replayed
        let inside = period.start() + Duration::hours(1);
        income.last_received_at = Some(inside);
        assert_eq!(income.replay_timestamp(&period), Some(inside));

        // Out-of-period timestamp is not
        let outside = period.start() - Duration::days(3);
        income.last_received_at = Some(outside);
        assert_eq!(income.replay_timestamp(&period), None);
    }

    #[test]
    fn test_expenses_never_replay() {
        let account = AccountId::new();
        let mut expense =
            Expense::new("Rent", Money::from_cents(120_000), Frequency::Monthly, account);
        let period = Period::current_month();
        expense.last_expensed_at = Some(period.start() + Duration::hours(1));
        assert_eq!(expense.replay_timestamp(&period), None);
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(Frequency::parse("monthly"), Some(Frequency::Monthly));
        assert_eq!(Frequency::parse("bi-weekly"), Some(Frequency::BiWeekly));
        assert_eq!(Frequency::parse("ANNUAL"), Some(Frequency::Yearly));
        assert_eq!(Frequency::parse("fortnightly"), None);
    }

    #[test]
    fn test_validation() {
        let account = AccountId::new();
        let mut expense = Expense::new("", Money::from_cents(100), Frequency::Monthly, account);
        assert_eq!(expense.validate(), Err(ItemValidationError::EmptyName));

        expense.name = "Rent".into();
        expense.amount = Money::zero();
        assert_eq!(
            expense.validate(),
            Err(ItemValidationError::NonPositiveAmount)
        );

        expense.amount = Money::from_cents(100);
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let account = AccountId::new();
        let income = Income::new("Salary", Money::from_cents(500_000), Frequency::BiWeekly, account);
        let json = serde_json::to_string(&income).unwrap();
        let back: Income = serde_json::from_str(&json).unwrap();
        assert_eq!(income.id, back.id);
        assert_eq!(income.frequency, back.frequency);
        assert_eq!(back.last_received_at, None);
    }
}
