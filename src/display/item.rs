//! Recurring item display formatting
//!
//! One table shape serves all three variants: the caller passes rows
//! already paired with their derived status.

use crate::models::{ItemStatus, Money, RecurringItem};

/// Format recurring items with their derived status as a table
pub fn format_item_list<I: RecurringItem>(items: &[(I, ItemStatus)]) -> String {
    if items.is_empty() {
        return "No items found.".to_string();
    }

    let name_width = items
        .iter()
        .map(|(i, _)| i.name().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {:<8}  {}\n",
        "Name",
        "Amount",
        "Status",
        "Last Executed",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:-<8}  {:-<13}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for (item, status) in items {
        let last = item
            .last_executed_at()
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {:<8}  {}\n",
            item.name(),
            item.amount().to_string(),
            status.to_string(),
            last,
            name_width = name_width,
        ));
    }

    let pending_total: Money = items
        .iter()
        .filter(|(_, status)| *status == ItemStatus::Pending)
        .map(|(i, _)| i.amount())
        .sum();
    output.push_str(&format!(
        "\nStill pending this month: {}\n",
        pending_total
    ));

    output
}
