//! SQLite implementation of [`ChatStore`].
//!
//! Uses [`sqlx`] with the `sqlite` feature.  The `chats` collection is created
//! automatically on startup via [`SqliteStore::connect`].
//!
//! # Migrations path
//!
//! `sqlx::migrate!("./migrations")` resolves the path **at compile time**
//! relative to `CARGO_MANIFEST_DIR` (the crate root), so the directory is
//! embedded into the binary.  The database file location is determined at
//! runtime by the `CHATS_DATABASE_URL` environment variable.
//!
//! # Queries
//!
//! The `sqlx::query` (runtime-verified) form is used so that no
//! `DATABASE_URL` environment variable is needed at compile time.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{parse_id, ChatRecord, ChatStore, MsgUpdate, NewChat, StoreError};

/// `(id, sender, recipient, msg, date)` as stored.
type ChatRow = (String, String, String, String, String);

/// SQLite-backed chat store.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://chats.db"`
    /// or `"sqlite::memory:"` for tests.  In-memory databases live and die with
    /// their connection, so the pool is pinned to a single connection that is
    /// never recycled.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Close every pooled connection.  Called once during graceful shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl ChatStore for SqliteStore {
    async fn create(&self, chat: NewChat) -> Result<ChatRecord, StoreError> {
        let record = ChatRecord {
            id: Uuid::new_v4(),
            from: chat.from,
            to: chat.to,
            msg: chat.msg,
            date: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO chats (id, sender, recipient, msg, date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(record.id.to_string())
        .bind(&record.from)
        .bind(&record.to)
        .bind(&record.msg)
        .bind(record.date.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(id = %record.id, "chat created");
        Ok(record)
    }

    async fn list_all(&self) -> Result<Vec<ChatRecord>, StoreError> {
        let rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT id, sender, recipient, msg, date FROM chats ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "chats listed");
        Ok(rows.into_iter().map(row_to_record).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<ChatRecord, StoreError> {
        let uuid = parse_id(id)?;
        let row: Option<ChatRow> = sqlx::query_as(
            "SELECT id, sender, recipient, msg, date FROM chats WHERE id = ?1",
        )
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_record)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))
    }

    async fn update_msg(&self, id: &str, update: MsgUpdate) -> Result<ChatRecord, StoreError> {
        let uuid = parse_id(id)?;

        let row: Option<ChatRow> = sqlx::query_as(
            "UPDATE chats SET msg = ?1 WHERE id = ?2 \
             RETURNING id, sender, recipient, msg, date",
        )
        .bind(&update.msg)
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let record = row
            .map(row_to_record)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        debug!(id = %record.id, "chat message updated");
        Ok(record)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let uuid = parse_id(id)?;
        let result = sqlx::query("DELETE FROM chats WHERE id = ?1")
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await?;

        debug!(id = %uuid, removed = result.rows_affected(), "chat delete");
        Ok(())
    }
}

fn row_to_record((id, from, to, msg, date): ChatRow) -> ChatRecord {
    ChatRecord {
        id: id.parse().unwrap_or_else(|e: uuid::Error| {
            warn!(raw = %id, error = %e, "failed to parse chat id; using nil");
            Uuid::nil()
        }),
        from,
        to,
        msg,
        date: date.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
            warn!(raw = %date, error = %e, "failed to parse chat date; using now");
            Utc::now()
        }),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
