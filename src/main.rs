use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use yaba::cli::{
    handle_budget_command, handle_expenditure_command, handle_report_command,
    handle_upload_command, resolve_owner, BudgetCommands, ExpenditureCommands, ReportArgs,
    UploadArgs,
};
use yaba::config::{Settings, YabaPaths};
use yaba::models::OwnerId;
use yaba::storage::Storage;

#[derive(Parser)]
#[command(
    name = "yaba",
    version,
    about = "Import transaction exports, classify them against a budget, and summarize spending",
    long_about = "yaba reads CSV exports from banks and card issuers, files each \
                  transaction under the matching category of your budget, and reports \
                  spending over time by day, week, month or year."
)]
struct Cli {
    /// Owner ID (defaults to the owner saved by 'yaba init')
    #[arg(long, global = true, env = "YABA_OWNER")]
    owner: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import one or more CSV files
    Upload(UploadArgs),

    /// Summarize spending over time
    Report(ReportArgs),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Expenditure commands
    #[command(subcommand, alias = "exp")]
    Expenditure(ExpenditureCommands),

    /// Create the data directory and a default owner
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    yaba::logging::init_tracing();
    let cli = Cli::parse();

    let paths = YabaPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("yaba - spending tracker");
            println!();
            println!("Run 'yaba --help' for usage information.");
            return Ok(());
        }
    };

    match command {
        Commands::Init => {
            paths.ensure_directories()?;
            let owner = *settings.default_owner.get_or_insert_with(OwnerId::new);
            settings.save(&paths)?;
            println!("Initialized yaba at: {}", paths.base_dir().display());
            println!("Default owner: {}", owner.as_uuid());
        }
        Commands::Config => {
            println!("yaba Configuration");
            println!("==================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Unknown columns: {:?}", settings.unknown_column_policy);
            println!("  Date formats:    {}", settings.date_formats.join(", "));
            println!("  List limit:      {}", settings.list_limit);
            match settings.default_owner {
                Some(owner) => println!("  Default owner:   {}", owner.as_uuid()),
                None => println!("  Default owner:   (not set)"),
            }
        }
        command => {
            let owner = resolve_owner(cli.owner.as_deref(), &settings)?;
            let storage = Storage::open(paths)?;

            match command {
                Commands::Upload(args) => {
                    let report = handle_upload_command(&storage, &settings, owner, args)?;
                    if !report.is_success() {
                        bail!("{} file(s) failed to upload", report.failures.len());
                    }
                }
                Commands::Report(args) => handle_report_command(&storage, owner, args)?,
                Commands::Budget(cmd) => handle_budget_command(&storage, owner, cmd)?,
                Commands::Expenditure(cmd) => {
                    handle_expenditure_command(&storage, &settings, owner, cmd)?
                }
                Commands::Init | Commands::Config => {}
            }
        }
    }

    Ok(())
}
