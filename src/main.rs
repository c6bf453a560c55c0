use clap::Parser;
use finrag::cli::*;
use finrag::AppConfig;
use finrag::FinRag;
use finrag::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        finrag::logging::init_logging_with_level("debug")?;
    } else {
        finrag::logging::init_logging_with_config(Some(&config))?;
    }
    info!("Configuration loaded successfully");

    if matches!(cli.command, Commands::Config) {
        return handle_config_command(&config);
    }

    let rag = FinRag::from_config(&config).await;

    match cli.command {
        Commands::Init { seed } => handle_init_command(&rag, seed).await?,
        Commands::Status { json } => handle_status_command(&rag, json).await?,
        Commands::Ingest(ingest) => match ingest {
            IngestCommands::Education => handle_ingest_education(&rag).await?,
            IngestCommands::News { symbol, file } => {
                handle_ingest_news(&rag, &symbol, &file).await?;
            }
            IngestCommands::Research { symbols, dir } => {
                handle_ingest_research(&rag, symbols, &dir).await?;
            }
        },
        Commands::Cleanup => handle_cleanup_command(&rag).await?,
        Commands::Search { query, filter } => {
            handle_search_command(&rag, &config.rag, &query, &filter).await?;
        }
        Commands::Context {
            query,
            filter,
            max_chars,
            user_context,
            json,
        } => {
            handle_context_command(
                &rag,
                &config.rag,
                &query,
                &filter,
                max_chars,
                user_context.as_deref(),
                json,
            )
            .await?;
        }
        Commands::History { session, limit } => {
            let limit = limit.unwrap_or(config.rag.chat_history_limit);
            handle_history_command(&rag, &session, limit).await?;
        }
        Commands::Chat(ChatCommands::Record {
            user,
            session,
            role,
            content,
            sources,
        }) => {
            handle_chat_record_command(&rag, &user, &session, role, &content, sources.as_deref())
                .await?;
        }
        Commands::Config => handle_config_command(&config)?,
    }

    Ok(())
}
