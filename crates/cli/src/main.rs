//! Laptop Shop CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! shop-cli migrate
//!
//! # Create the first owner account (password from SHOP_ADMIN_PASSWORD)
//! shop-cli admin create -u owner -n "Shop Owner" -r owner
//!
//! # Load the catalog, deactivating products missing from the file
//! shop-cli seed catalog -f demos/catalog.yaml --replace
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `admin create` - Create staff accounts
//! - `seed catalog` - Upsert products from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Laptop Shop CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new staff account
    Create {
        /// Login name (3-32 characters: a-z, 0-9, `.`, `_`, `-`)
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`owner`, `admin`, `cashier`)
        #[arg(short, long, default_value = "cashier")]
        role: String,

        /// Password; read from `SHOP_ADMIN_PASSWORD` when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert products by slug from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        #[arg(short, long)]
        file: String,

        /// Deactivate active products that are not in the file
        #[arg(long)]
        replace: bool,
    },
}

#[tokio::main]
async fn main() {
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
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                name,
                role,
                password,
            } => {
                commands::admin::create_user(&username, &name, &role, password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, replace } => {
                commands::seed::catalog(&file, replace).await?;
            }
        },
    }
    Ok(())
}
