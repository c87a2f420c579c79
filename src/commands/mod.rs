//! CLI subcommands for the `artist-lens` binary.

pub mod health;
pub mod history;
pub mod search;
pub mod utils;

use crate::{EngineError, Result, SpotifyCatalog};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an artist's sound and temperament
    Search {
        /// Artist name to look up in the catalog
        artist: String,

        /// Number of persona insights to render (clamped to the 8-12 band)
        #[arg(long)]
        insights: Option<usize>,

        /// Print the raw analysis result as JSON
        #[arg(long)]
        json: bool,

        /// Do not record this query in the local history
        #[arg(long)]
        no_history: bool,
    },

    /// Show recent analysis queries, newest first
    History {
        /// Show at most this many entries
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete the local query history
    ClearHistory,

    /// Check whether the catalog is reachable
    Health,
}

impl Commands {
    /// Whether this command talks to the catalog (and therefore needs
    /// credentials).
    pub fn requires_catalog(&self) -> bool {
        matches!(self, Commands::Search { .. } | Commands::Health)
    }
}

/// Dispatch a parsed command. `catalog` may be `None` for commands that
/// only touch local state.
pub async fn execute_command(
    command: Commands,
    catalog: Option<&SpotifyCatalog>,
    verbose: bool,
) -> Result<()> {
    match command {
        Commands::Search {
            artist,
            insights,
            json,
            no_history,
        } => {
            let catalog = require_catalog(catalog)?;
            search::handle_search_command(catalog, &artist, insights, json, no_history, verbose)
                .await
        }
        Commands::History { limit } => history::handle_history_command(limit),
        Commands::ClearHistory => history::handle_clear_history_command(),
        Commands::Health => {
            let catalog = require_catalog(catalog)?;
            health::handle_health_command(catalog).await
        }
    }
}

fn require_catalog(catalog: Option<&SpotifyCatalog>) -> Result<&SpotifyCatalog> {
    catalog.ok_or_else(|| {
        EngineError::InvalidInput("catalog credentials are required for this command".to_string())
    })
}
