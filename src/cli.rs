use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stashbrowse")]
#[command(about = "Browse a Stash GraphQL media catalog from the terminal", long_about = None)]
pub struct Cli {
    /// GraphQL endpoint URL (overrides settings and STASH_GRAPHQL_URL)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// API key for the catalog (overrides settings and STASH_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Items requested per page
    #[arg(long, value_name = "N")]
    pub per_page: Option<u32>,

    /// Custom config directory (default: ~/.config/stashbrowse)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging (prints log path, sets DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List scenes matching a filter, paging until exhausted
    Scenes {
        /// Free-text query
        #[arg(short, long)]
        query: Option<String>,

        /// Only scenes carrying all of these tag ids
        #[arg(long, value_name = "ID")]
        tag: Vec<String>,

        /// Only scenes from this studio id
        #[arg(long, value_name = "ID")]
        studio: Option<String>,

        /// Only scenes featuring this performer id
        #[arg(long, value_name = "ID")]
        performer: Option<String>,

        /// Maximum number of pages to fetch
        #[arg(long, default_value_t = 3)]
        pages: u32,
    },
    /// Search tags by name
    Tags {
        query: String,

        #[arg(long, default_value_t = 3)]
        pages: u32,
    },
    /// Search performers by name
    Performers {
        query: String,

        #[arg(long, default_value_t = 3)]
        pages: u32,
    },
    /// Search studios by name
    Studios {
        query: String,

        #[arg(long, default_value_t = 3)]
        pages: u32,
    },
    /// Show scenes related to a scene, by tag overlap
    Recommend {
        /// Scene id to recommend around
        scene_id: String,
    },
}
