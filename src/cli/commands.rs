//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::models::ChatRole;
use crate::models::SourceType;

#[derive(Parser)]
#[command(name = "finrag")]
#[command(about = "Financial RAG toolkit: ingest news, education and research, then retrieve grounded context")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the pgvector extension, tables and indexes
    Init {
        /// Also seed the financial education catalog
        #[arg(long)]
        seed: bool,
    },
    /// Show embedding/store availability and document counts
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ingestion commands
    #[command(subcommand)]
    Ingest(IngestCommands),
    /// Delete expired news and research documents
    Cleanup,
    /// Semantic search over stored documents
    Search {
        /// Natural language query
        query: String,
        #[command(flatten)]
        filter: QueryFilterArgs,
    },
    /// Build the prompt context (and citations) for a query
    Context {
        /// Natural language query
        query: String,
        #[command(flatten)]
        filter: QueryFilterArgs,
        /// Character budget for the context
        #[arg(long)]
        max_chars: Option<usize>,
        /// JSON file with the user's portfolio and watchlist
        #[arg(long)]
        user_context: Option<PathBuf>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the latest messages of a chat session
    History {
        /// Session identifier
        session: String,
        /// Maximum number of messages
        #[arg(short, long)]
        limit: Option<i64>,
    },
    /// Chat history commands
    #[command(subcommand)]
    Chat(ChatCommands),
    /// Show current configuration
    Config,
}

#[derive(clap::Args, Clone)]
pub struct QueryFilterArgs {
    /// Restrict to this symbol (global documents always match)
    #[arg(short, long)]
    pub symbol: Option<String>,
    /// Comma-separated source types (news,education,research)
    #[arg(short = 't', long, value_delimiter = ',')]
    pub types: Vec<SourceType>,
    /// Maximum number of results
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,
    /// Minimum similarity score
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Subcommand)]
pub enum IngestCommands {
    /// Seed the static financial education catalog (skipped if present)
    Education,
    /// Ingest news articles from a JSON array file
    News {
        /// Symbol the articles are about
        #[arg(short, long)]
        symbol: String,
        /// JSON file with news items (title, summary, source, url, ...)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Ingest research for symbols from `<dir>/<SYMBOL>.json` files
    Research {
        /// Symbols to ingest
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Directory holding one research JSON file per symbol
        #[arg(short, long, default_value = "research")]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// Append a message to a session
    Record {
        /// User identifier
        #[arg(short, long)]
        user: String,
        /// Session identifier
        #[arg(short, long)]
        session: String,
        /// Message role (user or assistant)
        #[arg(short, long, default_value = "user")]
        role: ChatRole,
        /// Message text
        content: String,
        /// JSON file with source citations for an assistant message
        #[arg(long)]
        sources: Option<PathBuf>,
    },
}
