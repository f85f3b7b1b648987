//! SQL schema for the KnowledgeGlow SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS knowledge_items (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    content      TEXT NOT NULL,
    source_type  TEXT NOT NULL CHECK (source_type IN ('text', 'url', 'file')),
    source_url   TEXT,
    tags         TEXT,                -- JSON array, or NULL when absent
    summary      TEXT,
    ai_analysis  TEXT,
    created_at   TEXT NOT NULL,       -- RFC 3339 UTC, microseconds; server-assigned
    updated_at   TEXT NOT NULL,
    is_active    INTEGER NOT NULL DEFAULT 1 CHECK (is_active IN (0, 1))
);

-- Append-only. `knowledge_item_id` is not a foreign key: an entry may name
-- an item id that has no row. Entries go away only when their item row is
-- hard-deleted (see the trigger below).
CREATE TABLE IF NOT EXISTS processing_logs (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    knowledge_item_id  INTEGER NOT NULL,
    processing_type    TEXT NOT NULL,
    input_text         TEXT NOT NULL,
    output_text        TEXT NOT NULL,
    processing_time_ms INTEGER NOT NULL,
    status             TEXT NOT NULL DEFAULT 'success'
                       CHECK (status IN ('success', 'error')),
    error_message      TEXT,
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS items_active_created_idx
    ON knowledge_items(is_active, created_at);
CREATE INDEX IF NOT EXISTS logs_item_idx
    ON processing_logs(knowledge_item_id);

CREATE TRIGGER IF NOT EXISTS logs_follow_item_delete
    AFTER DELETE ON knowledge_items
BEGIN
    DELETE FROM processing_logs WHERE knowledge_item_id = OLD.id;
END;

PRAGMA user_version = 1;
";
