//! Topic Dialog - terminal chat against the demo dialogs
//!
//! Reads one message per line from stdin and prints the replies. `/reset`
//! forgets the conversation, `/quit` exits.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use topic_dialog::config::{RuntimeConfig, DEFAULT_LOG_FILTER};
use topic_dialog::db::SqliteStore;
use topic_dialog::demo::DemoRootFactory;
use topic_dialog::runtime::{ConversationRuntime, RootOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout is the chat transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = RuntimeConfig::from_env();

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let store = SqliteStore::open(&config.db_path)?;
    let runtime = ConversationRuntime::new(store, DemoRootFactory);
    let conversation_id = config.conversation_id.as_str();

    tracing::info!(conversation_id, "Topic dialog ready");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/reset" => {
                if let Err(e) = runtime.reset(conversation_id).await {
                    tracing::error!(error = %e, "Failed to reset conversation");
                }
                continue;
            }
            _ => {}
        }

        match runtime.handle_turn(conversation_id, &line).await {
            Ok(report) => {
                for message in &report.messages {
                    writeln!(stdout, "{message}")?;
                }
                if let RootOutcome::Failed(reason) = &report.outcome {
                    tracing::warn!(conversation_id, %reason, "Root topic failed");
                }
                stdout.flush()?;
            }
            // A faulted turn leaves the stored conversation untouched
            Err(e) => tracing::error!(conversation_id, error = %e, "Turn failed"),
        }
    }

    Ok(())
}
