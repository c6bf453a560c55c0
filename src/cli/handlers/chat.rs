//! Chat history handlers

use std::path::Path;

use super::read_json_file;
use crate::cli::output::print_chat_history;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::models::ChatRole;
use crate::models::NewChatMessage;
use crate::models::SourceCitation;
use crate::FinRag;
use crate::FinRagError;
use crate::Result;

pub async fn handle_history_command(rag: &FinRag, session_id: &str, limit: i64) -> Result<()> {
    let outcome = rag.store().get_chat_history(session_id, limit).await;
    if let Some(reason) = outcome.reason() {
        print_warning(&format!("History unavailable: {reason}"));
    }
    print_chat_history(session_id, outcome.value());
    Ok(())
}

pub async fn handle_chat_record_command(
    rag: &FinRag,
    user_id: &str,
    session_id: &str,
    role: ChatRole,
    content: &str,
    sources: Option<&Path>,
) -> Result<()> {
    if content.trim().is_empty() {
        return Err(FinRagError::InvalidInput(
            "message content cannot be empty".to_string(),
        ));
    }

    let message = match role {
        ChatRole::User => NewChatMessage::user(user_id, session_id, content),
        ChatRole::Assistant => {
            let citations: Vec<SourceCitation> = match sources {
                Some(path) => read_json_file(path)?,
                None => Vec::new(),
            };
            NewChatMessage::assistant(user_id, session_id, content, citations)
        }
    };

    let outcome = rag.store().store_chat_message(&message).await;
    match outcome.reason() {
        Some(reason) => print_warning(&format!("Message not stored: {reason}")),
        None => print_success(&format!("Recorded {} message in {session_id}", role.as_str())),
    }
    Ok(())
}
