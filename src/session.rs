//! Ask session ledger: durable query/answer transcript.
//!
//! The transcript's ordering is part of its contract — the user turn is
//! recorded before the pipeline runs, the assistant turn after, so a session
//! always reads in conversation order.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::ask::context::AskSource;

/// A transcript turn author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Session listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: Option<String>,
    pub created_at: String,
}

/// One recorded turn.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub id: String,
    pub role: String,
    pub text: String,
    pub sources: Vec<AskSource>,
    pub created_at: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Reuse the caller's session if it exists and belongs to them, otherwise
/// create a fresh one. Returns the session id to record turns under.
pub fn get_or_create_session(
    conn: &Connection,
    user_id: &str,
    session_id: Option<&str>,
) -> Result<String> {
    if let Some(id) = session_id {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM ask_sessions WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| row.get(0),
            )
            .context("failed to look up session")?;
        if exists {
            return Ok(id.to_string());
        }
    }

    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO ask_sessions (id, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![id, user_id, now_rfc3339()],
    )
    .context("failed to create session")?;
    Ok(id)
}

/// Append one turn to a session's transcript. Returns the message id.
pub fn record_message(
    conn: &Connection,
    session_id: &str,
    role: Role,
    text: &str,
    sources: &[AskSource],
) -> Result<String> {
    let id = uuid::Uuid::now_v7().to_string();
    conn.execute(
        "INSERT INTO ask_messages (id, session_id, role, text, sources, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            session_id,
            role.as_str(),
            text,
            serde_json::to_string(sources)?,
            now_rfc3339(),
        ],
    )
    .context("failed to record message")?;
    Ok(id)
}

/// The user's 20 most recent sessions, newest first.
pub fn list_sessions(conn: &Connection, user_id: &str) -> Result<Vec<SessionSummary>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, created_at FROM ask_sessions \
         WHERE user_id = ?1 ORDER BY created_at DESC LIMIT 20",
    )?;
    let sessions = stmt
        .query_map(params![user_id], |row| {
            Ok(SessionSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(sessions)
}

/// Fetch one session and its transcript in conversation order. `None` if the
/// session doesn't exist or belongs to someone else.
pub fn session_messages(
    conn: &Connection,
    user_id: &str,
    session_id: &str,
) -> Result<Option<(SessionSummary, Vec<MessageRecord>)>> {
    let session = conn
        .query_row(
            "SELECT id, title, created_at FROM ask_sessions WHERE id = ?1 AND user_id = ?2",
            params![session_id, user_id],
            |row| {
                Ok(SessionSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    created_at: row.get(2)?,
                })
            },
        )
        .optional()
        .context("failed to look up session")?;

    let Some(session) = session else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, role, text, sources, created_at FROM ask_messages \
         WHERE session_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let messages = stmt
        .query_map(params![session_id], |row| {
            let sources_str: String = row.get(3)?;
            Ok(MessageRecord {
                id: row.get(0)?,
                role: row.get(1)?,
                text: row.get(2)?,
                sources: serde_json::from_str(&sources_str).unwrap_or_default(),
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some((session, messages)))
}
