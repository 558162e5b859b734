//! Record store abstraction.
//!
//! [`ChatStore`] defines the interface for persisting chat records.  The
//! default implementation is [`sqlite::SqliteStore`].  To swap to another
//! database, implement [`ChatStore`] for your new type and change the
//! concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures so no extra
//! `async-trait` crate is required.
//!
//! [`NewChat`] and [`MsgUpdate`] are the record schema: every field must be
//! present and a string, and values are stored verbatim (empty included).

pub mod sqlite;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// A single document in the `chats` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    /// Assigned by the store on creation; never changes.
    pub id: Uuid,
    /// Sender label.
    pub from: String,
    /// Recipient label.
    pub to: String,
    /// Message body, the only field an edit touches.
    pub msg: String,
    /// Creation instant.
    pub date: DateTime<Utc>,
}

/// Payload for [`ChatStore::create`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewChat {
    pub from: String,
    pub to: String,
    pub msg: String,
}

/// Payload for [`ChatStore::update_msg`].
#[derive(Debug, Clone, Deserialize)]
pub struct MsgUpdate {
    pub msg: String,
}

/// Failures surfaced by a [`ChatStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database could not be reached or rejected the query.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// No record carries the given id.
    #[error("chat not found: {0}")]
    NotFound(String),

    /// The id is not a UUID.
    #[error("malformed chat id: {0}")]
    MalformedId(String),
}

/// Parse a caller-supplied id, rejecting anything that is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::MalformedId(raw.to_owned()))
}

/// Trait for persisting chat records.
///
/// Implement this trait to swap SQLite for another database backend without
/// touching any handler code.
pub trait ChatStore: Send + Sync + 'static {
    /// Persist a new record, stamping a fresh id and `date = now`.
    fn create(&self, chat: NewChat) -> impl Future<Output = Result<ChatRecord, StoreError>> + Send;

    /// Every record in natural storage order, fully collected.
    fn list_all(&self) -> impl Future<Output = Result<Vec<ChatRecord>, StoreError>> + Send;

    /// Fetch one record.
    fn get_by_id(&self, id: &str) -> impl Future<Output = Result<ChatRecord, StoreError>> + Send;

    /// Overwrite `msg` on an existing record and return the updated record.
    ///
    /// `from`, `to`, `date` and `id` are left untouched.
    fn update_msg(
        &self,
        id: &str,
        update: MsgUpdate,
    ) -> impl Future<Output = Result<ChatRecord, StoreError>> + Send;

    /// Remove a record.  A well-formed id with no match is a no-op.
    fn delete_by_id(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
