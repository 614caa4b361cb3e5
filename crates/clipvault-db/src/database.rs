use crate::error::DbError;
use crate::schema;
use chrono::{DateTime, SecondsFormat, Utc};
use clipvault_core::{
    Chunk, ProcessedChunk, Snippet, SnippetId, SnippetStatus, User, UserId, UserRole,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// Repository handle over the SQLite pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) and migrate the database at `url`.
    ///
    /// In-memory databases get a single-connection pool: each SQLite
    /// `:memory:` connection is its own database, so a wider pool would
    /// scatter tables across connections.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        schema::migrate(&pool).await?;
        tracing::debug!(url, max_connections, "metadata store ready");
        Ok(Self { pool })
    }

    // ---- users -----------------------------------------------------------

    pub async fn insert_user(&self, email: &str, role: UserRole) -> Result<User, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, role, storage_used, created_at) VALUES (?1, ?2, 0, ?3)",
        )
        .bind(email)
        .bind(role.as_str())
        .bind(encode_time(now))
        .execute(&self.pool)
        .await?;
        Ok(User {
            id: UserId(result.last_insert_rowid()),
            email: email.to_string(),
            role,
            storage_used: 0,
            created_at: now,
        })
    }

    /// Create a user with a fixed id if none exists. Used at startup to seed
    /// accounts referenced by the auth layer's token table.
    pub async fn ensure_user(
        &self,
        id: UserId,
        email: &str,
        role: UserRole,
    ) -> Result<(), DbError> {
        sqlx::query(
            "INSERT OR IGNORE INTO users (id, email, role, storage_used, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
        )
        .bind(id.0)
        .bind(email)
        .bind(role.as_str())
        .bind(encode_time(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| user_from_row(&r)).transpose()
    }

    // ---- snippets --------------------------------------------------------

    /// Insert the metadata row for a freshly accepted snippet: status
    /// `PROCESSING`, zero chunks, not deleted.
    pub async fn insert_snippet(
        &self,
        owner: UserId,
        source_url: Option<&str>,
        total_size: u64,
    ) -> Result<Snippet, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO snippets
                (user_id, source_url, total_chunks, total_size, is_deleted, status, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, 0, ?4, ?5, ?5)",
        )
        .bind(owner.0)
        .bind(source_url)
        .bind(total_size as i64)
        .bind(SnippetStatus::Processing.as_str())
        .bind(encode_time(now))
        .execute(&self.pool)
        .await?;

        Ok(Snippet {
            id: SnippetId(result.last_insert_rowid()),
            owner,
            source_url: source_url.map(String::from),
            total_chunks: 0,
            total_size,
            is_deleted: false,
            status: SnippetStatus::Processing,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn find_snippet_by_id_and_owner(
        &self,
        id: SnippetId,
        owner: UserId,
    ) -> Result<Option<Snippet>, DbError> {
        let row = sqlx::query("SELECT * FROM snippets WHERE id = ?1 AND user_id = ?2")
            .bind(id.0)
            .bind(owner.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| snippet_from_row(&r)).transpose()
    }

    /// Most recent non-deleted snippets for `owner`, newest first. The id
    /// tiebreak keeps rows created in the same millisecond stably ordered.
    pub async fn find_recent_non_deleted(
        &self,
        owner: UserId,
        limit: usize,
    ) -> Result<Vec<Snippet>, DbError> {
        let rows = sqlx::query(
            "SELECT * FROM snippets
             WHERE user_id = ?1 AND is_deleted = 0
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )
        .bind(owner.0)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(snippet_from_row).collect()
    }

    /// Fetch metadata for an explicit id set; output order is unspecified,
    /// callers re-pair by id.
    pub async fn find_snippets_by_ids(&self, ids: &[SnippetId]) -> Result<Vec<Snippet>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM snippets WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.0);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(snippet_from_row).collect()
    }

    pub async fn count_non_deleted(&self, owner: UserId) -> Result<u64, DbError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM snippets WHERE user_id = ?1 AND is_deleted = 0",
        )
        .bind(owner.0)
        .fetch_one(&self.pool)
        .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as u64)
    }

    pub async fn mark_completed(
        &self,
        id: SnippetId,
        total_chunks: u32,
    ) -> Result<(), DbError> {
        sqlx::query(
            "UPDATE snippets SET status = ?1, total_chunks = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(SnippetStatus::Completed.as_str())
        .bind(total_chunks as i64)
        .bind(encode_time(Utc::now()))
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: SnippetId) -> Result<(), DbError> {
        sqlx::query("UPDATE snippets SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(SnippetStatus::Failed.as_str())
            .bind(encode_time(Utc::now()))
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Soft delete: the row and its chunks are retained, user-visible
    /// operations stop seeing them.
    pub async fn mark_deleted(&self, id: SnippetId) -> Result<(), DbError> {
        sqlx::query("UPDATE snippets SET is_deleted = 1, updated_at = ?1 WHERE id = ?2")
            .bind(encode_time(Utc::now()))
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---- chunks ----------------------------------------------------------

    /// Persist one snippet's processed chunks in a single transaction.
    pub async fn insert_chunks_batch(
        &self,
        snippet_id: SnippetId,
        chunks: &[ProcessedChunk],
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        let now = encode_time(Utc::now());
        for chunk in chunks {
            sqlx::query(
                "INSERT INTO chunks (snippet_id, chunk_index, content, is_compressed, content_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(snippet_id.0)
            .bind(chunk.index as i64)
            .bind(chunk.content.as_slice())
            .bind(chunk.is_compressed)
            .bind(chunk.content_hash.as_deref())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn find_chunks_by_snippet(
        &self,
        snippet_id: SnippetId,
    ) -> Result<Vec<Chunk>, DbError> {
        let rows = sqlx::query(
            "SELECT * FROM chunks WHERE snippet_id = ?1 ORDER BY chunk_index ASC",
        )
        .bind(snippet_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(chunk_from_row).collect()
    }

    /// The only bulk chunk read: all chunks for the given snippets in one
    /// round-trip, ordered `(snippet_id ASC, chunk_index ASC)`.
    pub async fn find_chunks_for_snippets(
        &self,
        ids: &[SnippetId],
    ) -> Result<Vec<Chunk>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM chunks WHERE snippet_id IN ({placeholders})
             ORDER BY snippet_id ASC, chunk_index ASC"
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id.0);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(chunk_from_row).collect()
    }
}

fn encode_time(t: DateTime<Utc>) -> String {
    // Fixed-width RFC 3339 so lexicographic ORDER BY matches time order.
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(s: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::MalformedRow(format!("timestamp {s:?}: {e}")))
}

fn snippet_from_row(row: &SqliteRow) -> Result<Snippet, DbError> {
    let status: String = row.try_get("status")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Snippet {
        id: SnippetId(row.try_get("id")?),
        owner: UserId(row.try_get("user_id")?),
        source_url: row.try_get("source_url")?,
        total_chunks: row.try_get::<i64, _>("total_chunks")? as u32,
        total_size: row.try_get::<i64, _>("total_size")? as u64,
        is_deleted: row.try_get("is_deleted")?,
        status: status
            .parse::<SnippetStatus>()
            .map_err(|e| DbError::MalformedRow(e.to_string()))?,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
    })
}

fn chunk_from_row(row: &SqliteRow) -> Result<Chunk, DbError> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Chunk {
        id: row.try_get("id")?,
        snippet_id: SnippetId(row.try_get("snippet_id")?),
        chunk_index: row.try_get::<i64, _>("chunk_index")? as u32,
        content: row.try_get("content")?,
        is_compressed: row.try_get("is_compressed")?,
        content_hash: row.try_get("content_hash")?,
        created_at: decode_time(&created_at)?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User, DbError> {
    let role: String = row.try_get("role")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(User {
        id: UserId(row.try_get("id")?),
        email: row.try_get("email")?,
        role: UserRole::parse(&role),
        storage_used: row.try_get::<i64, _>("storage_used")? as u64,
        created_at: decode_time(&created_at)?,
    })
}
