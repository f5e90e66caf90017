//! Status transition engine
//!
//! Drives the pending/paid state machine for recurring items. Status is
//! never stored: an item is Paid exactly when a ledger entry
//! back-referencing it was executed inside the current calendar month,
//! recomputed on every query so month boundaries take effect
//! immediately.
//!
//! Each transition runs as one atomic unit covering the ledger entry,
//! the balance deltas and the item's last-executed timestamp. The item
//! is read under the unit lock, so no transition can overwrite another
//! transition's committed write. A failure anywhere rolls the whole
//! unit back and surfaces as a transition error wrapping the cause.

use chrono::Utc;
use tracing::info;

use crate::error::{TallyError, TallyResult};
use crate::models::{
    BudgetItem, BudgetItemId, Expense, ExpenseId, Income, IncomeId, ItemStatus, Period,
    RecurringItem,
};
use crate::services::ledger::{LedgerService, NewEntry};
use crate::storage::Storage;

/// Service for pending/paid transitions
pub struct StatusService<'a> {
    storage: &'a Storage,
}

/// Outcome of a settle or unsettle attempt
enum Transition {
    /// State changed; the caller must persist the item
    Applied(ItemStatus),
    /// Idempotent no-op; the item must not be written back
    NoOp(ItemStatus),
}

/// Macro to generate the per-variant transition methods
macro_rules! define_transition {
    ($fn_name:ident, $doc:literal, $op:path, $ty:ty, $id:ty, $repo:ident,
     $not_found:ident, $committed:literal) => {
        #[doc = $doc]
        pub fn $fn_name(&self, id: $id) -> TallyResult<($ty, ItemStatus)> {
            // An unknown id is a plain not-found, not a failed transition
            self.storage
                .$repo
                .get(id)?
                .ok_or_else(|| TallyError::$not_found(id.to_string()))?;

            let (item, status, changed) = self
                .storage
                .transaction(|s| {
                    // Re-read under the unit lock; a copy taken outside it
                    // could clobber a transition committed in between.
                    let mut item = s
                        .$repo
                        .get(id)?
                        .ok_or_else(|| TallyError::$not_found(id.to_string()))?;
                    match $op(s, &mut item)? {
                        Transition::Applied(status) => {
                            s.$repo.upsert(item.clone())?;
                            Ok((item, status, true))
                        }
                        Transition::NoOp(status) => Ok((item, status, false)),
                    }
                })
                .map_err(TallyError::transition)?;
            if changed {
                info!(item = %item.name, %status, $committed);
            }
            Ok((item, status))
        }
    };
}

impl<'a> StatusService<'a> {
    /// Create a new status service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Derive an item's status for the current month.
    ///
    /// Paid iff an entry back-referencing the item was executed inside
    /// the current month. An item with no entries at all is Pending.
    pub fn status_of(&self, item: &dyn RecurringItem) -> TallyResult<ItemStatus> {
        let period = Period::current_month();
        let settled = self
            .storage
            .entries
            .latest_for_item_in(&item.item_ref(), &period)?
            .is_some();
        Ok(if settled {
            ItemStatus::Paid
        } else {
            ItemStatus::Pending
        })
    }

    define_transition!(
        mark_expense_paid,
        "Mark an expense paid for the current month",
        settle,
        Expense,
        ExpenseId,
        expenses,
        expense_not_found,
        "expense transition committed"
    );

    define_transition!(
        mark_expense_pending,
        "Mark an expense pending again, reversing its current entry",
        unsettle,
        Expense,
        ExpenseId,
        expenses,
        expense_not_found,
        "expense transition committed"
    );

    define_transition!(
        mark_income_received,
        "Mark an income received for the current month",
        settle,
        Income,
        IncomeId,
        incomes,
        income_not_found,
        "income transition committed"
    );

    define_transition!(
        mark_income_pending,
        "Mark an income pending again, reversing its current entry",
        unsettle,
        Income,
        IncomeId,
        incomes,
        income_not_found,
        "income transition committed"
    );

    define_transition!(
        mark_budget_paid,
        "Mark a budget obligation paid for the current month",
        settle,
        BudgetItem,
        BudgetItemId,
        budget_items,
        budget_item_not_found,
        "budget transition committed"
    );

    define_transition!(
        mark_budget_pending,
        "Mark a budget obligation pending again, reversing its current entry",
        unsettle,
        BudgetItem,
        BudgetItemId,
        budget_items,
        budget_item_not_found,
        "budget transition committed"
    );
}

/// Pending → Paid. Idempotent: if the item is already settled for the
/// period, nothing changes and Paid is returned.
///
/// The precondition is the derived status itself: only an entry
/// back-referencing the item counts as already settled. An unlinked
/// entry that happens to match the item's attributes does not, or the
/// transition would report Paid while every status query still derives
/// Pending.
fn settle(storage: &Storage, item: &mut dyn RecurringItem) -> TallyResult<Transition> {
    let period = Period::current_month();

    if storage
        .entries
        .latest_for_item_in(&item.item_ref(), &period)?
        .is_some()
    {
        return Ok(Transition::NoOp(ItemStatus::Paid));
    }

    // Incomes may carry an in-period timestamp left behind by an edit;
    // replay it instead of stamping the current time.
    let executed_at = item
        .replay_timestamp(&period)
        .unwrap_or_else(Utc::now);

    let ledger = LedgerService::new(storage);
    let entry = ledger.apply(NewEntry {
        account_id: item.account_id(),
        recipient_id: None,
        amount: item.amount(),
        kind: item.entry_kind(),
        executed_at: Some(executed_at),
        item: Some(item.item_ref()),
        description: Some(item.name().to_string()),
    })?;

    item.set_last_executed_at(Some(entry.executed_at));
    Ok(Transition::Applied(ItemStatus::Paid))
}

/// Paid → Pending. Idempotent: if no current-period entry exists,
/// nothing changes and Pending is returned.
///
/// The entry is located by back-reference first; the attribute-match
/// fallback only fires when the item has no linked entry in the period.
/// After the reversal the item's last-executed timestamp is recomputed
/// from the newest remaining linked entry, so prior-month history is
/// kept rather than cleared.
fn unsettle(storage: &Storage, item: &mut dyn RecurringItem) -> TallyResult<Transition> {
    let period = Period::current_month();
    let ledger = LedgerService::new(storage);

    let Some(entry) = ledger.find_current_entry(item, &period)? else {
        return Ok(Transition::NoOp(ItemStatus::Pending));
    };

    ledger.reverse(entry.id)?;

    let remaining = storage.entries.latest_for_item(&item.item_ref())?;
    item.set_last_executed_at(remaining.map(|e| e.executed_at));
    Ok(Transition::Applied(ItemStatus::Pending))
}
