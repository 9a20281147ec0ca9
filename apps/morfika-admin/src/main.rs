//! # morfika-admin Entry Point
//!
//! Parses the command line and dispatches to [`morfika_admin::commands`].

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use morfika_admin::commands::{self, PrinterPatch, QuotationInput, ReportQuery};
use morfika_admin::config::AppConfig;
use morfika_admin::error::AppResult;
use morfika_admin::state::{PrinterCatalog, QuotationEditor};
use morfika_admin::{init_tracing, open_store, ui};
use morfika_core::{Money, PrinterConfig, ReportAggregator};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Database file (overrides MORFIKA_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage printer cost profiles
    #[command(subcommand)]
    Printers(PrinterCommand),

    /// Price, save and browse quotations
    #[command(subcommand)]
    Quote(QuoteCommand),

    /// Daily sales and profit report (defaults to month to date)
    Report {
        /// First day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Every saved quotation
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum PrinterCommand {
    /// List printers
    List,

    /// Add a printer
    Add {
        #[arg(long)]
        name: String,

        /// Rated consumption in watts
        #[arg(long)]
        watts: Decimal,

        /// Electricity price per kWh
        #[arg(long)]
        kwh_cost: Decimal,

        /// Machine cost per minute of printing
        #[arg(long)]
        minute_cost: Decimal,
    },

    /// Change fields of a printer
    Update {
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        watts: Option<Decimal>,

        #[arg(long)]
        kwh_cost: Option<Decimal>,

        #[arg(long)]
        minute_cost: Option<Decimal>,
    },

    /// Delete a printer; its pieces become unassigned
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum QuoteCommand {
    /// Price a quotation file without saving it
    Price { file: PathBuf },

    /// Save a quotation file
    Save {
        file: PathBuf,

        /// Replace the content of this saved quotation
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// List saved quotations, newest first
    List,

    /// Show a saved quotation with its costs
    Show { id: Uuid },

    /// Delete a saved quotation
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // Nothing to do without a subcommand.
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    let json = cli.json;
    match run(command, cli.db, json, cli.verbose).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Application failed");
            match ui::to_json(&e) {
                Ok(body) if json => println!("{}", body),
                _ => eprintln!("{}", e),
            }
            ExitCode::from(e.code.exit_code())
        }
    }
}

async fn run(command: Commands, db: Option<PathBuf>, json: bool, verbose: bool) -> AppResult<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = db {
        config.database_path = path;
    }
    if verbose {
        config.log_filter = "debug,sqlx=warn".to_string();
    }
    init_tracing(&config.log_filter);

    let store = open_store(&config).await?;
    let store = store.as_ref();
    let catalog = PrinterCatalog::new();
    let editor = QuotationEditor::new();

    match command {
        Commands::Printers(cmd) => match cmd {
            PrinterCommand::List => {
                let printers = commands::list_printers(store, &catalog).await?;
                if json {
                    println!("{}", ui::to_json(&printers)?);
                } else {
                    println!("{}", ui::printers_table(&printers));
                }
            }
            PrinterCommand::Add {
                name,
                watts,
                kwh_cost,
                minute_cost,
            } => {
                let printer = PrinterConfig::new(name, watts, Money::new(kwh_cost), Money::new(minute_cost));
                let created = commands::add_printer(store, &catalog, printer).await?;
                if json {
                    println!("{}", ui::to_json(&created)?);
                } else {
                    println!("Printer created: {}", created.id);
                }
            }
            PrinterCommand::Update {
                id,
                name,
                watts,
                kwh_cost,
                minute_cost,
            } => {
                let patch = PrinterPatch {
                    name,
                    power_draw_watts: watts,
                    energy_unit_cost: kwh_cost,
                    machine_minute_cost: minute_cost,
                };
                let updated = commands::update_printer(store, &catalog, id, patch).await?;
                if json {
                    println!("{}", ui::to_json(&updated)?);
                } else {
                    println!("{}", ui::printers_table(std::slice::from_ref(&updated)));
                }
            }
            PrinterCommand::Delete { id } => {
                commands::delete_printer(store, &catalog, id).await?;
                if json {
                    println!("{}", ui::to_json(&json!({ "deleted": id }))?);
                } else {
                    println!("Printer deleted: {}", id);
                }
            }
        },

        Commands::Quote(cmd) => match cmd {
            QuoteCommand::Price { file } => {
                let input = QuotationInput::from_file(&file)?;
                let view = commands::price_quotation_input(store, &catalog, &editor, input).await?;
                print_quotation(&view, json)?;
            }
            QuoteCommand::Save { file, id } => {
                let input = QuotationInput::from_file(&file)?;
                let saved = commands::save_quotation(store, &catalog, &editor, input, id).await?;
                if json {
                    println!("{}", ui::to_json(&json!({ "id": saved }))?);
                } else {
                    println!("Quotation saved: {}", saved);
                }
            }
            QuoteCommand::List => {
                let quotations = commands::list_quotations(store, &catalog).await?;
                if json {
                    println!("{}", ui::to_json(&quotations)?);
                } else {
                    println!("{}", ui::quotations_table(&quotations));
                }
            }
            QuoteCommand::Show { id } => {
                let view = commands::show_quotation(store, &catalog, id).await?;
                print_quotation(&view, json)?;
            }
            QuoteCommand::Delete { id } => {
                commands::delete_quotation(store, &catalog, id).await?;
                if json {
                    println!("{}", ui::to_json(&json!({ "deleted": id }))?);
                } else {
                    println!("Quotation deleted: {}", id);
                }
            }
        },

        Commands::Report { from, to, all } => {
            let query = ReportQuery { from, to, all };
            let report = commands::quotation_report(
                store,
                &catalog,
                &ReportAggregator::local(),
                query,
                Utc::now(),
            )
            .await?;
            if json {
                println!("{}", ui::to_json(&report)?);
            } else if report.is_empty() {
                println!("No quotations in this period.");
            } else {
                println!("{}", ui::report_table(&report));
            }
        }
    }

    Ok(())
}

fn print_quotation(view: &commands::QuotationView, json: bool) -> AppResult<()> {
    if json {
        println!("{}", ui::to_json(view)?);
        return Ok(());
    }

    let (pieces, totals) = ui::quotation_tables(view);
    println!("{}", pieces);
    println!("{}", totals);
    Ok(())
}
