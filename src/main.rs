use anyhow::Result;
use clap::{Parser, Subcommand};

use tally::cli::{
    handle_account_command, handle_budget_command, handle_entry_command, handle_expense_command,
    handle_income_command, handle_insights_command,
};
use tally::config::{Settings, TallyPaths};
use tally::storage::Storage;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Terminal-based tracker for recurring bills, incomes, and the ledger that settles them",
    long_about = "tally tracks recurring expenses, incomes, and budget obligations, \
                  and reconciles them against a ledger of monetary movements that \
                  maintains your account balances. Pending/paid status is always \
                  derived from the ledger, never stored."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(tally::cli::AccountCommands),

    /// Recurring expense commands
    #[command(subcommand)]
    Expense(tally::cli::ExpenseCommands),

    /// Recurring income commands
    #[command(subcommand)]
    Income(tally::cli::IncomeCommands),

    /// Budget obligation commands
    #[command(subcommand)]
    Budget(tally::cli::BudgetCommands),

    /// Ledger entry commands
    #[command(subcommand, alias = "ledger")]
    Entry(tally::cli::EntryCommands),

    /// Generate a text summary of the current month
    Insights,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tally=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = TallyPaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;

    let storage = Storage::new(&paths);
    storage.load_all()?;

    match cli.command {
        Some(Commands::Account(cmd)) => {
            handle_account_command(&storage, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, cmd)?;
        }
        Some(Commands::Income(cmd)) => {
            handle_income_command(&storage, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, cmd)?;
        }
        Some(Commands::Entry(cmd)) => {
            handle_entry_command(&storage, cmd)?;
        }
        Some(Commands::Insights) => {
            handle_insights_command(&storage)?;
        }
        Some(Commands::Config) => {
            println!("tally configuration");
            println!("===================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            if let Some(account) = &settings.default_account {
                println!("  Default account: {}", account);
            }
        }
        None => {
            println!("tally - track recurring bills and the ledger that settles them");
            println!();
            println!("Run 'tally --help' for usage information.");
        }
    }

    Ok(())
}
