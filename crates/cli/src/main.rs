//! Pasarku CLI - Operator tools over the Pasarku REST backend.
//!
//! # Usage
//!
//! ```bash
//! # Log in and print the backend token
//! pasarku login -e owner@pasarku.id -p secret
//!
//! # Search the catalog
//! pasarku products -q tomat
//!
//! # List the caller's orders, a merchant's received orders, or every order
//! pasarku orders -t "$TOKEN"
//! pasarku orders -t "$TOKEN" --merchant
//! pasarku orders -t "$TOKEN" --all
//!
//! # Confirm a transfer payment (owner only)
//! pasarku confirm-payment -t "$TOKEN" -o ORDER_ID
//! ```
//!
//! The backend URL comes from `PASARKU_API_URL`, as for the storefront.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pasarku")]
#[command(author, version, about = "Pasarku CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the backend token
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// List catalog products with prices
    Products {
        /// Search term (empty lists everything)
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// List orders
    Orders {
        /// Backend token from `login`
        #[arg(short, long, env = "PASARKU_TOKEN")]
        token: String,

        /// Orders received by the caller's merchant
        #[arg(long, conflicts_with = "all")]
        merchant: bool,

        /// Every order (owner only)
        #[arg(long)]
        all: bool,
    },
    /// Confirm a transfer payment, moving the order back to pending
    ConfirmPayment {
        /// Backend token of an owner account
        #[arg(short, long, env = "PASARKU_TOKEN")]
        token: String,

        /// Order to confirm
        #[arg(short, long)]
        order: String,
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
    let client = commands::client()?;

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&client, &email, &password).await?;
        }
        Commands::Products { query } => commands::catalog::list(&client, &query).await?,
        Commands::Orders {
            token,
            merchant,
            all,
        } => {
            let scope = if all {
                commands::orders::Scope::All
            } else if merchant {
                commands::orders::Scope::Merchant
            } else {
                commands::orders::Scope::Buyer
            };
            commands::orders::list(&client, &token.into(), scope).await?;
        }
        Commands::ConfirmPayment { token, order } => {
            commands::orders::confirm_payment(&client, &token.into(), &order).await?;
        }
    }
    Ok(())
}
