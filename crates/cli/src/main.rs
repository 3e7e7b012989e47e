//! Ship Restrict CLI - rule management and cart checks.
//!
//! # Usage
//!
//! ```bash
//! # Seed the catalog
//! shiprestrict catalog add-term --id 10 --name Ammunition --kind category
//! shiprestrict catalog add-product --id 1 --name "Ammo Box" --term 10
//!
//! # Manage rules
//! shiprestrict rules add --name "No Ammo" --term 10 --state CA --state NY
//! shiprestrict rules list
//! shiprestrict rules delete <rule-id>
//!
//! # License
//! shiprestrict license save <key>
//! shiprestrict license status
//!
//! # Check a cart against an address
//! shiprestrict check --state CA --city "Los Angeles" --product 1
//! ```
//!
//! The whole installation lives in one JSON file, selected with `--data`
//! or the `SHIPRESTRICT_DATA` environment variable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use ship_restrict_core::{RuleLogic, TargetKind, TermId};
use ship_restrict_engine::store::JsonStore;

mod commands;

#[derive(Parser)]
#[command(name = "shiprestrict")]
#[command(author, version, about = "Ship Restrict management tools")]
struct Cli {
    /// Path to the JSON data file
    #[arg(
        long,
        env = "SHIPRESTRICT_DATA",
        default_value = "ship-restrict.json",
        global = true
    )]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage restriction rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Manage the license key
    License {
        #[command(subcommand)]
        action: LicenseAction,
    },
    /// Manage the shopper-facing message template
    Message {
        #[command(subcommand)]
        action: MessageAction,
    },
    /// Seed catalog fixtures
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Evaluate a cart against a shipping address
    Check {
        /// Two-letter US state code
        #[arg(long)]
        state: String,

        /// Destination city
        #[arg(long, default_value = "")]
        city: String,

        /// Destination ZIP code
        #[arg(long, default_value = "")]
        zip: String,

        /// Cart line as a product id, or `product:variation`
        #[arg(long = "product", required = true)]
        products: Vec<String>,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List rules with their resolved targets
    List,
    /// Add a rule
    Add {
        /// Rule name
        #[arg(long)]
        name: String,

        /// Target category or tag term id
        #[arg(long)]
        term: i64,

        /// Rule logic
        #[arg(long, value_enum, default_value_t = LogicArg::BlockFrom)]
        logic: LogicArg,

        /// State code, repeatable
        #[arg(long = "state")]
        states: Vec<String>,

        /// Comma-separated ZIP codes
        #[arg(long, default_value = "")]
        zips: String,
    },
    /// Delete a rule by id
    Delete {
        /// Rule id as shown by `rules list`
        id: String,
    },
}

#[derive(Subcommand)]
enum LicenseAction {
    /// Show the stored license state
    Status,
    /// Save a key and check it against the license server
    Save {
        /// License key; empty clears the stored key
        key: String,
    },
}

#[derive(Subcommand)]
enum MessageAction {
    /// Set the message template (`{product}` is replaced per item)
    Set {
        /// Template text; empty restores the default
        text: String,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Add or replace a taxonomy term
    AddTerm {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: String,

        #[arg(long, value_enum, default_value_t = KindArg::Category)]
        kind: KindArg,
    },
    /// Add or replace a product
    AddProduct {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        name: String,

        /// Attached term id, repeatable
        #[arg(long = "term")]
        terms: Vec<i64>,

        /// Variation id, repeatable
        #[arg(long = "variation")]
        variations: Vec<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogicArg {
    BlockFrom,
    AllowOnly,
}

impl From<LogicArg> for RuleLogic {
    fn from(value: LogicArg) -> Self {
        match value {
            LogicArg::BlockFrom => Self::BlockFrom,
            LogicArg::AllowOnly => Self::AllowOnly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Category,
    Tag,
}

impl From<KindArg> for TargetKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Category => Self::Category,
            KindArg::Tag => Self::Tag,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(JsonStore::open(&cli.data)?);

    match cli.command {
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(&store).await?,
            RulesAction::Add {
                name,
                term,
                logic,
                states,
                zips,
            } => {
                commands::rules::add(&store, &name, TermId::new(term), logic.into(), states, &zips)
                    .await?;
            }
            RulesAction::Delete { id } => commands::rules::delete(&store, &id)?,
        },
        Commands::License { action } => match action {
            LicenseAction::Status => commands::license::status(&store).await?,
            LicenseAction::Save { key } => commands::license::save(&store, &key).await?,
        },
        Commands::Message { action } => match action {
            MessageAction::Set { text } => commands::message::set(&store, &text)?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::AddTerm { id, name, kind } => {
                commands::catalog::add_term(&store, id, &name, kind.into())?;
            }
            CatalogAction::AddProduct {
                id,
                name,
                terms,
                variations,
            } => commands::catalog::add_product(&store, id, &name, &terms, &variations)?,
        },
        Commands::Check {
            state,
            city,
            zip,
            products,
        } => commands::check::run(&store, &state, &city, &zip, &products)?,
    }
    Ok(())
}
