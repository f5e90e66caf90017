//! Expense CLI commands

use clap::Subcommand;

use crate::display::item::format_item_list;
use crate::error::{TallyError, TallyResult};
use crate::models::{Frequency, ItemStatus, Money};
use crate::services::{AccountService, ItemFilter, ItemUpdate, RecurringService, StatusService};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a new recurring expense
    Add {
        /// Expense name
        name: String,
        /// Amount due each period (e.g., "120.00")
        amount: String,
        /// Owning account name or ID
        #[arg(short, long)]
        account: String,
        /// Frequency (weekly, bi-weekly, monthly, quarterly, yearly)
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
    },
    /// List expenses with their current status
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Show only pending expenses
        #[arg(long)]
        pending: bool,
        /// Show only paid expenses
        #[arg(long)]
        paid: bool,
    },
    /// Edit an expense
    Edit {
        /// Expense name or ID
        expense: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New amount
        #[arg(long)]
        amount: Option<String>,
        /// New frequency
        #[arg(long)]
        frequency: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete an expense (ledger history is kept)
    Delete {
        /// Expense name or ID
        expense: String,
    },
    /// Mark an expense paid for the current month
    Paid {
        /// Expense name or ID
        expense: String,
    },
    /// Mark an expense pending again, reversing its ledger entry
    Pending {
        /// Expense name or ID
        expense: String,
    },
}

/// Handle an expense command
pub fn handle_expense_command(storage: &Storage, cmd: ExpenseCommands) -> TallyResult<()> {
    let service = RecurringService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            name,
            amount,
            account,
            frequency,
        } => {
            let account = AccountService::new(storage).require(&account)?;
            let amount = parse_amount(&amount)?;
            let frequency = parse_frequency(&frequency)?;

            let expense = service.create_expense(&name, amount, frequency, account.id)?;
            println!("Added expense: {} ({} {})", expense.name, expense.amount, expense.frequency);
            println!("  Account: {}", account.name);
            println!("  ID: {}", expense.id);
        }

        ExpenseCommands::List {
            account,
            category,
            pending,
            paid,
        } => {
            let filter = build_filter(storage, account, category, pending, paid)?;
            let items = service.list_expenses(&filter)?;
            print!("{}", format_item_list(&items));
        }

        ExpenseCommands::Edit {
            expense,
            name,
            amount,
            frequency,
            category,
        } => {
            let found = service
                .find_expense(&expense)?
                .ok_or_else(|| TallyError::expense_not_found(&expense))?;

            let update = ItemUpdate {
                name,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                frequency: frequency.as_deref().map(parse_frequency).transpose()?,
                category,
                notes: None,
            };
            let updated = service.update_expense(found.id, update)?;
            println!("Updated expense: {}", updated.name);
        }

        ExpenseCommands::Delete { expense } => {
            let found = service
                .find_expense(&expense)?
                .ok_or_else(|| TallyError::expense_not_found(&expense))?;
            service.delete_expense(found.id)?;
            println!("Deleted expense: {}", found.name);
        }

        ExpenseCommands::Paid { expense } => {
            let found = service
                .find_expense(&expense)?
                .ok_or_else(|| TallyError::expense_not_found(&expense))?;
            let (updated, status) = StatusService::new(storage).mark_expense_paid(found.id)?;
            println!("{}: {}", updated.name, status);
        }

        ExpenseCommands::Pending { expense } => {
            let found = service
                .find_expense(&expense)?
                .ok_or_else(|| TallyError::expense_not_found(&expense))?;
            let (updated, status) = StatusService::new(storage).mark_expense_pending(found.id)?;
            println!("{}: {}", updated.name, status);
        }
    }

    Ok(())
}

pub(crate) fn parse_amount(s: &str) -> TallyResult<Money> {
    Money::parse(s).map_err(|e| {
        TallyError::Validation(format!(
            "Invalid amount: '{}'. Use format like '120.00'. Error: {}",
            s, e
        ))
    })
}

pub(crate) fn parse_frequency(s: &str) -> TallyResult<Frequency> {
    Frequency::parse(s).ok_or_else(|| {
        TallyError::Validation(format!(
            "Invalid frequency: '{}'. Valid: weekly, bi-weekly, monthly, quarterly, yearly",
            s
        ))
    })
}

pub(crate) fn build_filter(
    storage: &Storage,
    account: Option<String>,
    category: Option<String>,
    pending: bool,
    paid: bool,
) -> TallyResult<ItemFilter> {
    let mut filter = ItemFilter::new();
    if let Some(account) = account {
        let account = AccountService::new(storage).require(&account)?;
        filter = filter.account(account.id);
    }
    if let Some(category) = category {
        filter = filter.category(category);
    }
    if pending {
        filter = filter.status(ItemStatus::Pending);
    } else if paid {
        filter = filter.status(ItemStatus::Paid);
    }
    Ok(filter)
}
