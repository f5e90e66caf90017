//! Ledger entry CLI commands
//!
//! Direct ledger access: recording one-off movements and deleting
//! entries. Deleting an entry rolls back its balance effect and, if it
//! settled a recurring item, refreshes that item's history.

use clap::Subcommand;

use crate::display::entry::format_entry_list;
use crate::error::{TallyError, TallyResult};
use crate::models::{EntryId, EntryKind};
use crate::services::{AccountService, LedgerService, NewEntry};
use crate::storage::Storage;

use super::expense::parse_amount;

/// Ledger entry subcommands
#[derive(Subcommand)]
pub enum EntryCommands {
    /// Record money entering an account
    Inflow {
        /// Receiving account name or ID
        account: String,
        /// Amount (e.g., "50.00")
        amount: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Record money leaving an account
    Outflow {
        /// Source account name or ID
        account: String,
        /// Amount (e.g., "50.00")
        amount: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Move money between two accounts
    Transfer {
        /// Source account name or ID
        from: String,
        /// Recipient account name or ID
        to: String,
        /// Amount (e.g., "50.00")
        amount: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// List ledger entries, newest first
    List {
        /// Filter by account name or ID
        #[arg(short, long)]
        account: Option<String>,
        /// Maximum number of entries to show
        #[arg(short, long, default_value = "25")]
        limit: usize,
    },
    /// Delete a ledger entry, rolling back its balance effect
    Delete {
        /// Entry ID
        entry: String,
    },
}

/// Handle a ledger entry command
pub fn handle_entry_command(storage: &Storage, cmd: EntryCommands) -> TallyResult<()> {
    let accounts = AccountService::new(storage);
    let ledger = LedgerService::new(storage);

    match cmd {
        EntryCommands::Inflow {
            account,
            amount,
            description,
        } => {
            let account = accounts.require(&account)?;
            let entry = ledger.record(NewEntry {
                account_id: account.id,
                recipient_id: None,
                amount: parse_amount(&amount)?,
                kind: EntryKind::Inflow,
                executed_at: None,
                item: None,
                description: Some(description),
            })?;
            println!("Recorded inflow of {} into {}.", entry.amount, account.name);
        }

        EntryCommands::Outflow {
            account,
            amount,
            description,
        } => {
            let account = accounts.require(&account)?;
            let entry = ledger.record(NewEntry {
                account_id: account.id,
                recipient_id: None,
                amount: parse_amount(&amount)?,
                kind: EntryKind::Outflow,
                executed_at: None,
                item: None,
                description: Some(description),
            })?;
            println!("Recorded outflow of {} from {}.", entry.amount, account.name);
        }

        EntryCommands::Transfer {
            from,
            to,
            amount,
            description,
        } => {
            let from = accounts.require(&from)?;
            let to = accounts.require(&to)?;
            let entry = ledger.record(NewEntry {
                account_id: from.id,
                recipient_id: Some(to.id),
                amount: parse_amount(&amount)?,
                kind: EntryKind::Transfer,
                executed_at: None,
                item: None,
                description: Some(description),
            })?;
            println!(
                "Transferred {} from {} to {}.",
                entry.amount, from.name, to.name
            );
        }

        EntryCommands::List { account, limit } => {
            let mut entries = match account {
                Some(account) => {
                    let account = accounts.require(&account)?;
                    ledger.list_for_account(account.id)?
                }
                None => ledger.list()?,
            };
            entries.truncate(limit);

            let all_accounts = accounts.list()?;
            print!("{}", format_entry_list(&entries, &all_accounts));
        }

        EntryCommands::Delete { entry } => {
            let id = resolve_entry_id(storage, &entry)?;
            let deleted = ledger.delete_entry(id)?;
            println!(
                "Deleted {} entry of {} and rolled back its balance effect.",
                deleted.kind, deleted.amount
            );
        }
    }

    Ok(())
}

/// Resolve a full UUID or the short displayed form (e.g. "ent-1a2b3c4d")
fn resolve_entry_id(storage: &Storage, identifier: &str) -> TallyResult<EntryId> {
    if let Ok(id) = identifier.parse::<EntryId>() {
        if storage.entries.get(id)?.is_some() {
            return Ok(id);
        }
    }
    storage
        .entries
        .get_all()?
        .into_iter()
        .find(|e| e.id.to_string() == identifier)
        .map(|e| e.id)
        .ok_or_else(|| TallyError::entry_not_found(identifier))
}
