//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use crate::models::{Account, Money};

/// Format a list of accounts with balances as a table
pub fn format_account_list(accounts: &[Account]) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = accounts
        .iter()
        .map(|a| a.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let type_width = accounts
        .iter()
        .map(|a| a.account_type.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>12}  {}\n",
        "Name",
        "Type",
        "Balance",
        "Status",
        name_width = name_width,
        type_width = type_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<type_width$}  {:->12}  {:-<8}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
        type_width = type_width,
    ));

    for account in accounts {
        let status = if account.archived { "Archived" } else { "" };
        output.push_str(&format!(
            "{:<name_width$}  {:<type_width$}  {:>12}  {}\n",
            account.name,
            account.account_type,
            account.balance.to_string(),
            status,
            name_width = name_width,
            type_width = type_width,
        ));
    }

    let total: Money = accounts
        .iter()
        .filter(|a| !a.archived)
        .map(|a| a.balance)
        .sum();
    output.push_str(&format!(
        "{:-<name_width$}  {:-<type_width$}  {:->12}\n",
        "",
        "",
        "",
        name_width = name_width,
        type_width = type_width,
    ));
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>12}\n",
        "TOTAL",
        "",
        total.to_string(),
        name_width = name_width,
        type_width = type_width,
    ));

    output
}

/// Format a single account's details
pub fn format_account_details(account: &Account) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  Type:     {}\n", account.account_type));
    output.push_str(&format!("  ID:       {}\n", account.id));
    output.push_str(&format!("  Currency: {}\n", account.currency));
    output.push_str(&format!(
        "  Archived: {}\n",
        if account.archived { "Yes" } else { "No" }
    ));
    output.push('\n');
    output.push_str(&format!(
        "  Starting Balance: {}\n",
        account.starting_balance
    ));
    output.push_str(&format!("  Current Balance:  {}\n", account.balance));

    if !account.notes.is_empty() {
        output.push('\n');
        output.push_str(&format!("  Notes: {}\n", account.notes));
    }

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        account.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        account.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;

    #[test]
    fn test_format_account_list() {
        let accounts = vec![
            Account::with_starting_balance(
                "Checking",
                AccountType::Checking,
                Money::from_cents(100_000),
            ),
            Account::with_starting_balance(
                "Savings",
                AccountType::Savings,
                Money::from_cents(500_000),
            ),
        ];

        let output = format_account_list(&accounts);
        assert!(output.contains("Checking"));
        assert!(output.contains("Savings"));
        assert!(output.contains("TOTAL"));
    }

    #[test]
    fn test_format_empty_list() {
        let output = format_account_list(&[]);
        assert!(output.contains("No accounts found"));
    }

    #[test]
    fn test_format_account_details() {
        let account = Account::with_starting_balance(
            "My Account",
            AccountType::Checking,
            Money::from_cents(100_000),
        );
        let output = format_account_details(&account);

        assert!(output.contains("My Account"));
        assert!(output.contains("Checking"));
        assert!(output.contains("Current Balance"));
    }
}
