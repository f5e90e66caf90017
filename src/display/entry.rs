//! Ledger entry display formatting

use std::collections::HashMap;

use crate::models::{Account, AccountId, EntryKind, LedgerEntry};

/// Format ledger entries as a table, resolving account names
pub fn format_entry_list(entries: &[LedgerEntry], accounts: &[Account]) -> String {
    if entries.is_empty() {
        return "No ledger entries found.".to_string();
    }

    let names: HashMap<AccountId, &str> =
        accounts.iter().map(|a| (a.id, a.name.as_str())).collect();
    let resolve = |id: AccountId| names.get(&id).copied().unwrap_or("(unknown)");

    let mut output = String::new();
    output.push_str(&format!(
        "{:<10}  {:<10}  {:>12}  {:<24}  {}\n",
        "Date", "Kind", "Amount", "Account", "Description",
    ));
    output.push_str(&format!(
        "{:-<10}  {:-<10}  {:->12}  {:-<24}  {:-<20}\n",
        "", "", "", "", "",
    ));

    for entry in entries {
        let account = match entry.kind {
            EntryKind::Transfer => {
                let recipient = entry
                    .recipient_id
                    .map(resolve)
                    .unwrap_or("(unknown)");
                format!("{} -> {}", resolve(entry.account_id), recipient)
            }
            _ => resolve(entry.account_id).to_string(),
        };

        output.push_str(&format!(
            "{:<10}  {:<10}  {:>12}  {:<24}  {}\n",
            entry.executed_at.format("%Y-%m-%d"),
            entry.kind.to_string(),
            entry.amount.to_string(),
            account,
            entry.description,
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Money};

    #[test]
    fn test_format_entry_list_resolves_names() {
        let from = Account::new("Checking", AccountType::Checking);
        let to = Account::new("Savings", AccountType::Savings);

        let mut transfer =
            LedgerEntry::new(from.id, EntryKind::Transfer, Money::from_cents(10_000));
        transfer.recipient_id = Some(to.id);

        let output = format_entry_list(&[transfer], &[from, to]);
        assert!(output.contains("Checking -> Savings"));
        assert!(output.contains("transfer"));
    }

    #[test]
    fn test_format_empty_list() {
        assert!(format_entry_list(&[], &[]).contains("No ledger entries found"));
    }
}
