//! Income CLI commands

use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;

use crate::display::item::format_item_list;
use crate::error::{TallyError, TallyResult};
use crate::services::{AccountService, ItemUpdate, RecurringService, StatusService};
use crate::storage::Storage;

use super::expense::{build_filter, parse_amount, parse_frequency};

/// Income subcommands
#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Add a new recurring income
    Add {
        /// Income name
        name: String,
        /// Amount received each period (e.g., "3000.00")
        amount: String,
        /// Receiving account name or ID
        #[arg(short, long)]
        account: String,
        /// Frequency (weekly, bi-weekly, monthly, quarterly, yearly)
        #[arg(short, long, default_value = "monthly")]
        frequency: String,
    },
    /// List incomes with their current status
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Show only pending incomes
        #[arg(long)]
        pending: bool,
        /// Show only received incomes
        #[arg(long)]
        paid: bool,
    },
    /// Edit an income
    Edit {
        /// Income name or ID
        income: String,
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
        /// Reschedule the last-received date (YYYY-MM-DD); replayed by
        /// the next `received` if it falls in the current month
        #[arg(long)]
        received_at: Option<String>,
    },
    /// Delete an income (ledger history is kept)
    Delete {
        /// Income name or ID
        income: String,
    },
    /// Mark an income received for the current month
    Received {
        /// Income name or ID
        income: String,
    },
    /// Mark an income pending again, reversing its ledger entry
    Pending {
        /// Income name or ID
        income: String,
    },
}

/// Handle an income command
pub fn handle_income_command(storage: &Storage, cmd: IncomeCommands) -> TallyResult<()> {
    let service = RecurringService::new(storage);

    match cmd {
        IncomeCommands::Add {
            name,
            amount,
            account,
            frequency,
        } => {
            let account = AccountService::new(storage).require(&account)?;
            let amount = parse_amount(&amount)?;
            let frequency = parse_frequency(&frequency)?;

            let income = service.create_income(&name, amount, frequency, account.id)?;
            println!("Added income: {} ({} {})", income.name, income.amount, income.frequency);
            println!("  Account: {}", account.name);
            println!("  ID: {}", income.id);
        }

        IncomeCommands::List {
            account,
            category,
            pending,
            paid,
        } => {
            let filter = build_filter(storage, account, category, pending, paid)?;
            let items = service.list_incomes(&filter)?;
            print!("{}", format_item_list(&items));
        }

        IncomeCommands::Edit {
            income,
            name,
            amount,
            frequency,
            category,
            received_at,
        } => {
            let found = service
                .find_income(&income)?
                .ok_or_else(|| TallyError::income_not_found(&income))?;

            let update = ItemUpdate {
                name,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                frequency: frequency.as_deref().map(parse_frequency).transpose()?,
                category,
                notes: None,
            };
            let received_at = received_at.as_deref().map(parse_date).transpose()?;
            let updated = service.update_income(found.id, update, received_at)?;
            println!("Updated income: {}", updated.name);
        }

        IncomeCommands::Delete { income } => {
            let found = service
                .find_income(&income)?
                .ok_or_else(|| TallyError::income_not_found(&income))?;
            service.delete_income(found.id)?;
            println!("Deleted income: {}", found.name);
        }

        IncomeCommands::Received { income } => {
            let found = service
                .find_income(&income)?
                .ok_or_else(|| TallyError::income_not_found(&income))?;
            let (updated, status) = StatusService::new(storage).mark_income_received(found.id)?;
            println!("{}: {}", updated.name, status);
        }

        IncomeCommands::Pending { income } => {
            let found = service
                .find_income(&income)?
                .ok_or_else(|| TallyError::income_not_found(&income))?;
            let (updated, status) = StatusService::new(storage).mark_income_pending(found.id)?;
            println!("{}: {}", updated.name, status);
        }
    }

    Ok(())
}

fn parse_date(s: &str) -> TallyResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| TallyError::Validation(format!("Invalid date '{}': {}", s, e)))?;
    let naive = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| TallyError::Validation(format!("Invalid date '{}'", s)))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}
