//! Taproom CLI - operator tools for the shop backend.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog, optionally filtered
//! taproom products list --type IPA --max-price 6000
//!
//! # Load the demo catalog into an empty backend
//! taproom products seed --file crates/cli/seed/products.yaml
//!
//! # Remove a product
//! taproom products delete 66aa00000000000000000001
//!
//! # Show a customer's order history
//! TAPROOM_PASSWORD='...' taproom orders --email ana@example.cl
//! ```
//!
//! The backend location comes from `TAPROOM_API_BASE_URL` and the customer
//! password from `TAPROOM_PASSWORD` (`.env` honored for both).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "taproom")]
#[command(author, version, about = "Taproom shop backend tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// List a customer's orders (password read from `TAPROOM_PASSWORD`)
    Orders {
        /// Customer email
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Free-text search on name and description
        #[arg(short, long)]
        search: Option<String>,

        /// Beer style (IPA, Stout, Lager, ...)
        #[arg(short = 't', long = "type")]
        beer_type: Option<String>,

        /// Maximum price in CLP
        #[arg(short, long)]
        max_price: Option<u32>,
    },
    /// Create products from a YAML file
    Seed {
        /// Path to the YAML file
        #[arg(short, long, default_value = "crates/cli/seed/products.yaml")]
        file: String,
    },
    /// Delete a product by id
    Delete {
        /// Product id
        id: String,
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
    let api = commands::api_client()?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List {
                search,
                beer_type,
                max_price,
            } => commands::products::list(&api, search, beer_type, max_price).await?,
            ProductAction::Seed { file } => commands::products::seed(&api, &file).await?,
            ProductAction::Delete { id } => commands::products::delete(&api, &id).await?,
        },
        Commands::Orders { email } => {
            let password = commands::orders::password_from_env()?;
            commands::orders::list(&api, &email, &password).await?;
        }
    }
    Ok(())
}
