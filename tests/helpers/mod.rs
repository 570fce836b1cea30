#![allow(dead_code)]

use async_trait::async_trait;
use hindsight::db;
use hindsight::generate::{AnswerGenerator, GenerateError};
use hindsight::items::store::{insert_item, NewItem};
use hindsight::items::types::ItemType;
use rusqlite::Connection;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Open a fresh in-memory database with schema applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// Insert a test item. Returns the item ID.
pub fn insert(
    conn: &Connection,
    user: &str,
    item_type: ItemType,
    ts: &str,
    title: &str,
    content: &str,
) -> String {
    insert_item(
        conn,
        NewItem {
            user_id: user.into(),
            item_type: Some(item_type),
            ts: Some(ts.into()),
            title: Some(title.into()),
            content: Some(content.into()),
            meta: None,
        },
    )
    .unwrap()
}

/// Insert a test item with metadata.
pub fn insert_with_meta(
    conn: &Connection,
    user: &str,
    item_type: ItemType,
    ts: &str,
    title: &str,
    content: &str,
    meta: serde_json::Value,
) -> String {
    insert_item(
        conn,
        NewItem {
            user_id: user.into(),
            item_type: Some(item_type),
            ts: Some(ts.into()),
            title: Some(title.into()),
            content: Some(content.into()),
            meta: Some(meta),
        },
    )
    .unwrap()
}

/// A scripted [`AnswerGenerator`] that counts its calls.
pub struct MockGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl MockGenerator {
    /// Always answers with the given text.
    pub fn answering(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fails as if the upstream call timed out.
    pub fn timing_out() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerGenerator for MockGenerator {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
    ) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GenerateError::Timeout(Duration::from_millis(12_000))),
        }
    }
}
