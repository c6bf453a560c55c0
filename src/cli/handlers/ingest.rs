//! Ingestion handlers

use std::path::Path;

use super::read_json_file;
use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::ingestion::IngestReport;
use crate::ingestion::IngestTrigger;
use crate::ingestion::JsonDirResearchSource;
use crate::models::NewsItem;
use crate::FinRag;
use crate::Result;

fn print_report(report: &IngestReport, what: &str) {
    if report.degraded {
        print_warning(&format!("{what}: {} (degraded)", report.count));
        for problem in &report.problems {
            println!("  - {problem}");
        }
    } else {
        print_success(&format!("{what}: {}", report.count));
    }
}

pub async fn handle_ingest_education(rag: &FinRag) -> Result<()> {
    print_info("📚 Ingesting financial education catalog...");
    let report = rag
        .pipeline()
        .run_trigger(IngestTrigger::Education, &JsonDirResearchSource::new("."))
        .await;
    print_report(&report, "Education documents ingested");
    Ok(())
}

pub async fn handle_ingest_news(rag: &FinRag, symbol: &str, file: &Path) -> Result<()> {
    let items: Vec<NewsItem> = read_json_file(file)?;
    print_info(&format!(
        "📰 Ingesting {} news items for {}...",
        items.len(),
        symbol.to_uppercase()
    ));

    let outcome = rag.pipeline().ingest_news_articles(&items, symbol).await;
    if let Some(reason) = outcome.reason() {
        print_warning(&format!("News ingestion degraded: {reason}"));
    } else {
        print_success(&format!("News documents ingested: {}", outcome.into_value()));
    }
    Ok(())
}

pub async fn handle_ingest_research(rag: &FinRag, symbols: Vec<String>, dir: &Path) -> Result<()> {
    print_info(&format!(
        "🔬 Ingesting research for {} from {}...",
        symbols.join(", "),
        dir.display()
    ));

    let report = rag
        .pipeline()
        .run_trigger(
            IngestTrigger::Research { symbols },
            &JsonDirResearchSource::new(dir),
        )
        .await;
    print_report(&report, "Research documents ingested");
    Ok(())
}

pub async fn handle_cleanup_command(rag: &FinRag) -> Result<()> {
    print_info("🧹 Removing expired documents...");
    let report = rag
        .pipeline()
        .run_trigger(IngestTrigger::Cleanup, &JsonDirResearchSource::new("."))
        .await;
    print_report(&report, "Expired documents deleted");
    Ok(())
}
