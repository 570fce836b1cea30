//! Item store access: the read seam the ask pipeline retrieves candidates
//! through, plus the write path used by import and the sync adapters.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

use crate::items::types::{ItemType, RetrievedItem};

/// Read access to a user's activity timeline.
///
/// Implementations must return items ordered by timestamp descending and must
/// never surface soft-deleted rows. The seam is async so blocking backends
/// can move their work off the executor.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn fetch_recent(
        &self,
        user_id: &str,
        types: &[ItemType],
        limit: usize,
    ) -> Result<Vec<RetrievedItem>>;
}

/// Fields accepted by [`insert_item`]. Timestamps default to now, meta to `{}`.
#[derive(Debug, Default, Clone)]
pub struct NewItem {
    pub user_id: String,
    pub item_type: Option<ItemType>,
    pub ts: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub meta: Option<serde_json::Value>,
}

/// SQLite-backed [`ItemStore`] over a shared connection.
pub struct SqliteItemStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteItemStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn fetch_recent(
        &self,
        user_id: &str,
        types: &[ItemType],
        limit: usize,
    ) -> Result<Vec<RetrievedItem>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let types = types.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            fetch_recent_items(&conn, &user_id, &types, limit)
        })
        .await
        .context("item fetch task failed")?
    }
}

/// Fetch a user's most recent items of the given types, newest first.
/// Soft-deleted rows are excluded in SQL, never post-hoc.
pub fn fetch_recent_items(
    conn: &Connection,
    user_id: &str,
    types: &[ItemType],
    limit: usize,
) -> Result<Vec<RetrievedItem>> {
    if types.is_empty() {
        return Ok(Vec::new());
    }

    // Build a parameterized IN clause: user_id is ?1, types follow, limit last
    let placeholders: Vec<String> = (2..2 + types.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, type, ts, title, content, meta \
         FROM items \
         WHERE user_id = ?1 AND type IN ({}) AND deleted = 0 \
         ORDER BY ts DESC \
         LIMIT ?{}",
        placeholders.join(", "),
        2 + types.len()
    );

    let mut stmt = conn.prepare(&sql).context("failed to prepare item fetch")?;

    let type_strs: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
    let mut params: Vec<&dyn rusqlite::types::ToSql> = vec![&user_id];
    for t in &type_strs {
        params.push(t);
    }
    let limit = limit as i64;
    params.push(&limit);

    let rows = stmt
        .query_map(params.as_slice(), |row| {
            let type_str: String = row.get(1)?;
            let meta_str: String = row.get(5)?;
            Ok((
                row.get::<_, String>(0)?,
                type_str,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
                meta_str,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut items = Vec::with_capacity(rows.len());
    for (id, type_str, ts, title, content, meta_str) in rows {
        let item_type: ItemType = type_str
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("corrupt item type in database")?;
        items.push(RetrievedItem {
            id,
            item_type,
            ts,
            title,
            content,
            meta: serde_json::from_str(&meta_str).unwrap_or(serde_json::Value::Null),
        });
    }
    Ok(items)
}

/// Insert a new item. Returns the generated UUID v7 id.
pub fn insert_item(conn: &Connection, item: NewItem) -> Result<String> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let ts = item.ts.unwrap_or_else(|| now.clone());
    let item_type = item.item_type.unwrap_or(ItemType::ScrawlText);
    let meta = item.meta.unwrap_or_else(|| serde_json::json!({}));

    conn.execute(
        "INSERT INTO items (id, user_id, type, ts, title, content, meta, deleted, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
        params![
            id,
            item.user_id,
            item_type.as_str(),
            ts,
            item.title,
            item.content,
            serde_json::to_string(&meta)?,
            now,
        ],
    )
    .context("failed to insert item")?;

    Ok(id)
}

/// Soft-delete an item. The row stays for audit; retrieval never sees it.
pub fn soft_delete_item(conn: &Connection, user_id: &str, item_id: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE items SET deleted = 1 WHERE id = ?1 AND user_id = ?2",
        params![item_id, user_id],
    )?;
    Ok(changed > 0)
}
