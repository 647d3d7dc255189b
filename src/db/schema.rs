//! Database schema

/// SQL schema for initialization
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    root_state TEXT,
    ambient TEXT NOT NULL DEFAULT '{}',
    turn_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_updated ON conversations(updated_at DESC);
"#;

/// Insert or replace one conversation's state. `created_at` is kept from the
/// first save.
pub const UPSERT_CONVERSATION: &str = r"
INSERT INTO conversations (id, root_state, ambient, turn_count, created_at, updated_at)
VALUES (?1, ?2, ?3, 1, ?4, ?4)
ON CONFLICT(id) DO UPDATE SET
    root_state = excluded.root_state,
    ambient = excluded.ambient,
    turn_count = conversations.turn_count + 1,
    updated_at = excluded.updated_at
";
