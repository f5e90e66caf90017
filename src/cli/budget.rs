//! Budget obligation CLI commands

use clap::Subcommand;

use crate::display::item::format_item_list;
use crate::error::{TallyError, TallyResult};
use crate::services::{AccountService, ItemUpdate, RecurringService, StatusService};
use crate::storage::Storage;

use super::expense::{build_filter, parse_amount, parse_frequency};

/// Budget obligation subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Add a new budget obligation
    Add {
        /// Obligation name
        name: String,
        /// Amount budgeted each period (e.g., "300.00")
        amount: String,
        /// Paying account name or ID
        #[arg(short, long)]
        account: String,
        /// Frequency (weekly, bi-weekly, monthly, quarterly, yearly)
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
    },
    /// List budget obligations with their current status
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Show only pending obligations
        #[arg(long)]
        pending: bool,
        /// Show only paid obligations
        #[arg(long)]
        paid: bool,
    },
    /// Edit a budget obligation
    Edit {
        /// Obligation name or ID
        item: String,
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
    /// Delete a budget obligation (ledger history is kept)
    Delete {
        /// Obligation name or ID
        item: String,
    },
    /// Mark an obligation paid for the current month
    Paid {
        /// Obligation name or ID
        item: String,
    },
    /// Mark an obligation pending again, reversing its ledger entry
    Pending {
        /// Obligation name or ID
        item: String,
    },
}

/// Handle a budget command
pub fn handle_budget_command(storage: &Storage, cmd: BudgetCommands) -> TallyResult<()> {
    let service = RecurringService::new(storage);

    match cmd {
        BudgetCommands::Add {
            name,
            amount,
            account,
            frequency,
        } => {
            let account = AccountService::new(storage).require(&account)?;
            let amount = parse_amount(&amount)?;
            let frequency = parse_frequency(&frequency)?;

            let item = service.create_budget_item(&name, amount, frequency, account.id)?;
            println!("Added budget item: {} ({} {})", item.name, item.amount, item.frequency);
            println!("  Account: {}", account.name);
            println!("  ID: {}", item.id);
        }

        BudgetCommands::List {
            account,
            category,
            pending,
            paid,
        } => {
            let filter = build_filter(storage, account, category, pending, paid)?;
            let items = service.list_budget_items(&filter)?;
            print!("{}", format_item_list(&items));
        }

        BudgetCommands::Edit {
            item,
            name,
            amount,
            frequency,
            category,
        } => {
            let found = service
                .find_budget_item(&item)?
                .ok_or_else(|| TallyError::budget_item_not_found(&item))?;

            let update = ItemUpdate {
                name,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                frequency: frequency.as_deref().map(parse_frequency).transpose()?,
                category,
                notes: None,
            };
            let updated = service.update_budget_item(found.id, update)?;
            println!("Updated budget item: {}", updated.name);
        }

        BudgetCommands::Delete { item } => {
            let found = service
                .find_budget_item(&item)?
                .ok_or_else(|| TallyError::budget_item_not_found(&item))?;
            service.delete_budget_item(found.id)?;
            println!("Deleted budget item: {}", found.name);
        }

        BudgetCommands::Paid { item } => {
            let found = service
                .find_budget_item(&item)?
                .ok_or_else(|| TallyError::budget_item_not_found(&item))?;
            let (updated, status) = StatusService::new(storage).mark_budget_paid(found.id)?;
            println!("{}: {}", updated.name, status);
        }

        BudgetCommands::Pending { item } => {
            let found = service
                .find_budget_item(&item)?
                .ok_or_else(|| TallyError::budget_item_not_found(&item))?;
            let (updated, status) = StatusService::new(storage).mark_budget_pending(found.id)?;
            println!("{}: {}", updated.name, status);
        }
    }

    Ok(())
}
