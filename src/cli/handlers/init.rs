//! Schema initialization handler

use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::FinRag;
use crate::FinRagError;
use crate::Result;

/// Handle the init command
///
/// The schema is created when the store connects, so this verifies the
/// connection and optionally seeds the education catalog.
pub async fn handle_init_command(rag: &FinRag, seed: bool) -> Result<()> {
    print_info("🗄️  Initializing FinRAG vector store...");

    if !rag.store().refresh_availability().await {
        print_error("Vector store is unavailable");
        print_warning("Check database.url and that the pgvector extension is installed:");
        println!("  psql -c 'CREATE EXTENSION IF NOT EXISTS vector;'");
        return Err(FinRagError::StoreUnavailable);
    }
    print_success("Tables and indexes ready");

    if seed {
        print_info("📚 Seeding financial education catalog...");
        let outcome = rag.pipeline().ingest_financial_education().await;
        if let Some(reason) = outcome.reason() {
            print_warning(&format!("Education seed degraded: {reason}"));
        } else {
            print_success(&format!(
                "Seeded {} education documents",
                outcome.into_value()
            ));
        }
    }

    Ok(())
}
