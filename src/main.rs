//! # Health Search CLI (`hsearch`)
//!
//! Searches the health document index from the terminal and serves the
//! JSON search API.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hsearch search "<query>"` | Ranked, highlighted results |
//! | `hsearch get <id>` | One document with its highlight |
//! | `hsearch serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Second page of results
//! hsearch search "diabetes" --page 2
//!
//! # Open the first result of the page with reconciled highlights
//! hsearch search "hypertension diet" --open 1
//!
//! # Fetch a document re-scored against a query
//! hsearch get who-042 --q "insulin"
//!
//! # Start the API on [server].bind
//! hsearch serve --config ./config/hsearch.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use health_search::client::{IndexClient, OpenSearchClient};
use health_search::{commands, config, logging, server};

/// Health Search CLI: full-text search over health guidance documents.
#[derive(Parser)]
#[command(
    name = "hsearch",
    about = "Health Search: ranked, highlighted full-text search over health documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/hsearch.toml`. Index, server, and search
    /// settings are read from this file.
    #[arg(long, global = true, default_value = "./config/hsearch.toml")]
    config: PathBuf,

    /// Run with built-in defaults instead of reading a config file.
    #[arg(long, global = true)]
    no_config: bool,

    /// Debug-level logging for this crate.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search indexed documents.
    ///
    /// Prints one page of results with highlighted titles and excerpts.
    Search {
        /// The search query string.
        query: String,

        /// Page number (1-based).
        #[arg(long)]
        page: Option<i64>,

        /// Results per page (minimum 5). Defaults to `[search].results_per_page`.
        #[arg(long)]
        limit: Option<i64>,

        /// Open the K-th result of the page (1-based) and print it with
        /// reconciled highlights.
        #[arg(long)]
        open: Option<usize>,
    },

    /// Retrieve a document by its id.
    Get {
        /// Document id as stored in the index.
        id: String,

        /// Re-score and highlight the document against this query.
        #[arg(long)]
        q: Option<String>,
    },

    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = if cli.no_config {
        let cfg = config::Config::default().with_env_overrides();
        cfg.validate()?;
        cfg
    } else {
        config::load_config(&cli.config)?
    };
    debug!(index = %cfg.index.name, host = %cfg.index.host, "configuration loaded");

    match cli.command {
        Commands::Search {
            query,
            page,
            limit,
            open,
        } => {
            let client: Arc<dyn IndexClient> = Arc::new(OpenSearchClient::new(&cfg.index)?);
            commands::run_search(client, &cfg, &query, page, limit, open).await?;
        }
        Commands::Get { id, q } => {
            let client: Arc<dyn IndexClient> = Arc::new(OpenSearchClient::new(&cfg.index)?);
            commands::run_get(client, &id, q.as_deref()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
