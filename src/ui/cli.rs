use crate::core::config::ConfigOverrides;
use crate::search::model::QueryType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// codesearch - Semantic code search from the terminal
#[derive(Parser, Debug)]
#[command(name = "codesearch")]
#[command(about = "Search a code collection in natural language and browse highlighted snippets", long_about = None)]
#[command(version)]
#[command(subcommand_required = false)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the search service
    #[arg(long, env = "CODESEARCH_API_URL", global = true)]
    pub base_url: Option<String>,

    /// Collection to search
    #[arg(short, long, env = "CODESEARCH_COLLECTION", global = true)]
    pub collection: Option<String>,

    /// Retrieval mode sent with each search (default: hybrid)
    #[arg(long, value_enum, global = true)]
    pub query_type: Option<QueryType>,

    /// Path to a JSON config file (default: ~/.codesearch/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for the config file and logs (default: ~/.codesearch)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive search screen (the default)
    Tui,
    /// Run one search and print the snippets
    Search {
        /// Search query
        #[arg(value_name = "QUERY", required = true)]
        query: Vec<String>,
        /// Print the raw results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage collections on the search service
    Collection {
        #[command(subcommand)]
        action: CollectionCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommand {
    /// Create an empty collection
    Create {
        /// Collection name (default: the configured collection)
        name: Option<String>,
    },
    /// Delete a collection
    Delete {
        /// Collection name (default: the configured collection)
        name: Option<String>,
    },
    /// Index a directory on the service host into a collection
    Init {
        /// Collection name (default: the configured collection)
        name: Option<String>,
        /// Directory to index, as seen by the search service
        #[arg(short, long)]
        path: String,
    },
}

impl Cli {
    /// Configuration values given on the command line or via the environment
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            collection_name: self.collection.clone(),
            query_type: self.query_type,
            config_path: self.config.clone(),
            base_dir: self.base_dir.clone(),
        }
    }
}
