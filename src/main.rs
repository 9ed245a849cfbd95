use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use pocketledger::cli::{
    handle_category_command, handle_import_command, handle_report_command,
    handle_transaction_command, CategoryCommands, ImportArgs, ReportCommands, TransactionCommands,
};
use pocketledger::config::{PocketPaths, Settings};
use pocketledger::logging::init_tracing;
use pocketledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "pocket",
    version,
    about = "Track spending against per-category monthly budgets",
    long_about = "pocketledger records transactions, imports them from CSV with \
                  validation and duplicate checks, and reports spend against each \
                  category's monthly budget."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory with the default categories
    Init,

    /// Show current configuration and paths
    Config,

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Import transactions from a CSV file
    Import(ImportArgs),

    /// Budget and spending reports
    #[command(subcommand)]
    Report(ReportCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = PocketPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_filter);

    // Initialize storage
    let storage = Storage::new(paths.clone())?;

    let command = match cli.command {
        Some(Commands::Init) => {
            if storage.initialize()? {
                settings.save(&paths)?;
                println!("Initialized pocketledger at: {}", paths.base_dir().display());
                println!("Default categories have been created.");
                println!();
                println!("Run 'pocket category list' to see them.");
            } else {
                println!("pocketledger is already initialized at: {}", paths.base_dir().display());
            }
            return Ok(());
        }
        Some(Commands::Config) => {
            println!("pocketledger Configuration");
            println!("==========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!("Initialized:      {}", storage.is_initialized());
            println!();
            println!("Settings:");
            println!("  Currency symbol:       {}", settings.currency_symbol);
            println!("  Future days allowed:   {}", settings.validation.future_days);
            println!("  Max description:       {}", settings.validation.max_description_len);
            println!("  Duplicate amount tol.: {} cents", settings.duplicates.amount_epsilon_cents);
            println!("  Duplicate similarity:  {}", settings.duplicates.similarity_threshold);
            println!("  Log filter:            {}", settings.log_filter);
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("pocketledger - transactions and monthly budgets");
            println!();
            println!("Run 'pocket --help' for usage information.");
            println!("Run 'pocket init' to get started.");
            return Ok(());
        }
    };

    if !storage.is_initialized() {
        bail!("pocketledger is not initialized; run 'pocket init' first");
    }
    storage.load_all()?;

    let symbol = settings.currency_symbol.as_str();
    match command {
        Commands::Category(cmd) => handle_category_command(&storage, symbol, cmd)?,
        Commands::Txn(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Import(args) => handle_import_command(&storage, &settings, args)?,
        Commands::Report(cmd) => handle_report_command(&storage, symbol, cmd)?,
        Commands::Init | Commands::Config => {}
    }

    Ok(())
}
