use crate::error::DbError;
use sqlx::SqlitePool;

// Email lookup is case-sensitive: SQLite TEXT compares byte-wise unless a
// collation says otherwise, and none does here.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        email         TEXT    NOT NULL UNIQUE,
        role          TEXT    NOT NULL,
        storage_used  INTEGER NOT NULL DEFAULT 0,
        created_at    TEXT    NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS snippets (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        source_url    TEXT,
        total_chunks  INTEGER NOT NULL DEFAULT 0,
        total_size    INTEGER NOT NULL,
        is_deleted    INTEGER NOT NULL DEFAULT 0,
        status        TEXT    NOT NULL,
        created_at    TEXT    NOT NULL,
        updated_at    TEXT    NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        snippet_id    INTEGER NOT NULL REFERENCES snippets(id) ON DELETE CASCADE,
        chunk_index   INTEGER NOT NULL,
        content       BLOB    NOT NULL,
        is_compressed INTEGER NOT NULL,
        content_hash  TEXT,
        created_at    TEXT    NOT NULL,
        UNIQUE (snippet_id, chunk_index)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_snippets_owner_created
        ON snippets (user_id, created_at DESC)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_snippets_owner_status
        ON snippets (user_id, status)
    "#,
];

pub(crate) async fn migrate(pool: &SqlitePool) -> Result<(), DbError> {
    for (i, statement) in MIGRATIONS.iter().enumerate() {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DbError::Migration(format!("statement {i}: {e}")))?;
    }
    Ok(())
}
