//! Parts Order CLI - Browse the parts catalog and prepare WhatsApp orders.
//!
//! # Usage
//!
//! ```bash
//! # Show the first page of the catalog
//! parts-order browse
//!
//! # Search and page through results
//! parts-order browse --search bosch --page 2 --per-page 5
//!
//! # Price an order and print the message and link
//! parts-order quote --item "Filter A=2" --item "Bulb H4=1"
//!
//! # Load the catalog and report row problems
//! parts-order check
//!
//! # Interactive ordering session
//! parts-order shell
//! ```
//!
//! Configuration comes from environment variables (or `.env`); see
//! `parts_order_cli::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parts_order_cli::{CatalogStore, OrderConfig};

mod commands;

#[derive(Parser)]
#[command(name = "parts-order")]
#[command(author, version, about = "Parts catalog and WhatsApp ordering")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the catalog
    Browse {
        /// Only show products whose name or origin contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Products per page (defaults to `PARTS_ORDER_ITEMS_PER_PAGE`)
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Price a list of items and print the order message and link
    Quote {
        /// Item as `NAME=QUANTITY`; repeat for more items
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
    },
    /// Load the catalog and report row problems
    Check,
    /// Start an interactive ordering session
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "parts_order_cli=info,parts_order_core=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = OrderConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    let store = CatalogStore::from_config(&config);

    match cli.command {
        Commands::Browse {
            search,
            page,
            per_page,
        } => {
            commands::browse::run(&config, &store, search.as_deref(), page, per_page).await?;
        }
        Commands::Quote { items } => commands::quote::run(&config, &store, &items).await?,
        Commands::Check => commands::check::run(&store).await?,
        Commands::Shell => commands::shell::run(&config, &store).await?,
    }
    Ok(())
}
