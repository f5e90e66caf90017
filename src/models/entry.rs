//! Ledger entry model
//!
//! A ledger entry is one executed monetary movement: an inflow into an
//! account, an outflow from one, or a transfer between two. Entries may
//! carry a back-reference to the recurring item that generated them;
//! that link is what the pending/paid status derivation reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, BudgetItemId, EntryId, ExpenseId, IncomeId};
use super::money::Money;
use crate::error::TallyError;

/// Kind of monetary movement
///
/// Serialized as a plain string so that an unknown tag in stored data
/// surfaces as corruption (`UnsupportedKind`) instead of a silent
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryKind {
    /// Money entering the source account
    Inflow,
    /// Money leaving the source account
    Outflow,
    /// Money moving from the source account to the recipient account
    Transfer,
}

impl EntryKind {
    /// Parse a kind tag from stored data
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedKind` for tags this build does not recognize.
    pub fn parse(s: &str) -> Result<Self, TallyError> {
        match s {
            "inflow" => Ok(Self::Inflow),
            "outflow" => Ok(Self::Outflow),
            "transfer" => Ok(Self::Transfer),
            other => Err(TallyError::UnsupportedKind(other.to_string())),
        }
    }

    /// The stored string tag for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<String> for EntryKind {
    type Error = TallyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed back-reference from a ledger entry to the recurring item that
/// generated it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ItemRef {
    Expense(ExpenseId),
    Income(IncomeId),
    Budget(BudgetItemId),
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense(id) => write!(f, "{}", id),
            Self::Income(id) => write!(f, "{}", id),
            Self::Budget(id) => write!(f, "{}", id),
        }
    }
}

/// One recorded monetary movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier
    pub id: EntryId,

    /// Source account the movement belongs to
    pub account_id: AccountId,

    /// Recipient account, present only for transfers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<AccountId>,

    /// Unsigned magnitude of the movement; the sign comes from the kind
    pub amount: Money,

    /// Kind of movement
    pub kind: EntryKind,

    /// When the movement was executed
    pub executed_at: DateTime<Utc>,

    /// Back-reference to the recurring item that generated this entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a new entry executed now
    pub fn new(account_id: AccountId, kind: EntryKind, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            account_id,
            recipient_id: None,
            amount,
            kind,
            executed_at: now,
            item: None,
            description: String::new(),
            created_at: now,
        }
    }

    /// The signed contribution of this entry to the given account's
    /// balance, or zero if the entry does not reference the account.
    ///
    /// Outflow: source loses `amount`. Inflow: source gains `amount`.
    /// Transfer: source loses, recipient gains.
    pub fn signed_effect_on(&self, account_id: AccountId) -> Money {
        match self.kind {
            EntryKind::Inflow if self.account_id == account_id => self.amount,
            EntryKind::Outflow if self.account_id == account_id => -self.amount,
            EntryKind::Transfer => {
                if self.account_id == account_id {
                    -self.amount
                } else if self.recipient_id == Some(account_id) {
                    self.amount
                } else {
                    Money::zero()
                }
            }
            _ => Money::zero(),
        }
    }

    /// Validate the entry
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if !self.amount.is_positive() {
            return Err(EntryValidationError::NonPositiveAmount);
        }
        match self.kind {
            EntryKind::Transfer => {
                let recipient =
                    self.recipient_id.ok_or(EntryValidationError::MissingRecipient)?;
                if recipient == self.account_id {
                    return Err(EntryValidationError::SelfTransfer);
                }
            }
            EntryKind::Inflow | EntryKind::Outflow => {
                if self.recipient_id.is_some() {
                    return Err(EntryValidationError::UnexpectedRecipient);
                }
            }
        }
        Ok(())
    }
}

/// Validation errors for ledger entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    NonPositiveAmount,
    MissingRecipient,
    UnexpectedRecipient,
    SelfTransfer,
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Entry amount must be positive"),
            Self::MissingRecipient => write!(f, "Transfer entries require a recipient account"),
            Self::UnexpectedRecipient => {
                write!(f, "Only transfer entries may carry a recipient account")
            }
            Self::SelfTransfer => write!(f, "Cannot transfer an account to itself"),
        }
    }
}

impl std::error::Error for EntryValidationError {}
