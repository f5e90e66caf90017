//! Insights CLI command

use crate::error::TallyResult;
use crate::services::{InsightsService, SummaryGenerator};
use crate::storage::Storage;

/// Print generated insight text for the current data
pub fn handle_insights_command(storage: &Storage) -> TallyResult<()> {
    let insights = InsightsService::new(storage);
    let text = insights.generate(&SummaryGenerator)?;
    println!("{}", text);
    Ok(())
}
