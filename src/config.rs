//! Process configuration, read from the environment once at startup

use std::path::PathBuf;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "topic_dialog=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// SQLite file holding conversation state
    pub db_path: PathBuf,
    /// Conversation the terminal session talks to
    pub conversation_id: String,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("TOPIC_DIALOG_DB_PATH").map_or_else(
            || {
                let home = lookup("HOME").unwrap_or_else(|| "/tmp".to_string());
                PathBuf::from(home).join(".topic-dialog").join("conversations.db")
            },
            PathBuf::from,
        );
        let conversation_id = lookup("TOPIC_DIALOG_CONVERSATION")
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| "local".to_string());

        Self {
            db_path,
            conversation_id,
        }
    }
}
