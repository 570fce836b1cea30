//! Core item type definitions.
//!
//! Defines [`ItemType`] (the eight activity type tags), [`Channel`] (the five
//! channel families), [`Item`] (a full stored record), and [`RetrievedItem`]
//! (the narrowed read projection used by the ask pipeline).

use serde::{Deserialize, Serialize};

/// The eight activity type tags, two per connected channel at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    /// Voice-captured thought.
    #[serde(rename = "thought.voice")]
    ThoughtVoice,
    /// Typed text note.
    #[serde(rename = "scrawl.text")]
    ScrawlText,
    /// Email received in the inbox.
    #[serde(rename = "email.received")]
    EmailReceived,
    /// Email sent by the user.
    #[serde(rename = "email.sent")]
    EmailSent,
    /// Calendar event that already happened.
    #[serde(rename = "calendar.past")]
    CalendarPast,
    /// Calendar event still ahead.
    #[serde(rename = "calendar.upcoming")]
    CalendarUpcoming,
    /// A track the user listened to.
    #[serde(rename = "tunes.track")]
    TunesTrack,
    /// Listening context (playlist, album session).
    #[serde(rename = "tunes.context")]
    TunesContext,
}

impl ItemType {
    /// SQL-compatible string representation (dotted tag).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThoughtVoice => "thought.voice",
            Self::ScrawlText => "scrawl.text",
            Self::EmailReceived => "email.received",
            Self::EmailSent => "email.sent",
            Self::CalendarPast => "calendar.past",
            Self::CalendarUpcoming => "calendar.upcoming",
            Self::TunesTrack => "tunes.track",
            Self::TunesContext => "tunes.context",
        }
    }

    /// The channel family this type belongs to.
    pub fn channel(&self) -> Channel {
        match self {
            Self::ThoughtVoice => Channel::Thoughts,
            Self::ScrawlText => Channel::Scrawls,
            Self::EmailReceived | Self::EmailSent => Channel::Email,
            Self::CalendarPast | Self::CalendarUpcoming => Channel::Calendar,
            Self::TunesTrack | Self::TunesContext => Channel::Tunes,
        }
    }

    /// All eight type tags, in stable display order.
    pub fn all() -> [ItemType; 8] {
        [
            Self::ThoughtVoice,
            Self::ScrawlText,
            Self::EmailReceived,
            Self::EmailSent,
            Self::CalendarPast,
            Self::CalendarUpcoming,
            Self::TunesTrack,
            Self::TunesContext,
        ]
    }

    /// Human-readable label for prompt context (e.g. "email received").
    pub fn label(&self) -> String {
        self.as_str().replace(['.', '_'], " ")
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thought.voice" => Ok(Self::ThoughtVoice),
            "scrawl.text" => Ok(Self::ScrawlText),
            "email.received" => Ok(Self::EmailReceived),
            "email.sent" => Ok(Self::EmailSent),
            "calendar.past" => Ok(Self::CalendarPast),
            "calendar.upcoming" => Ok(Self::CalendarUpcoming),
            "tunes.track" => Ok(Self::TunesTrack),
            "tunes.context" => Ok(Self::TunesContext),
            _ => Err(format!("unknown item type: {s}")),
        }
    }
}

/// The five channel families an item can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Thoughts,
    Scrawls,
    Email,
    Calendar,
    Tunes,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thoughts => "thoughts",
            Self::Scrawls => "scrawls",
            Self::Email => "email",
            Self::Calendar => "calendar",
            Self::Tunes => "tunes",
        }
    }

    /// Concrete type tags that make up this family.
    pub fn types(&self) -> &'static [ItemType] {
        match self {
            Self::Thoughts => &[ItemType::ThoughtVoice],
            Self::Scrawls => &[ItemType::ScrawlText],
            Self::Email => &[ItemType::EmailReceived, ItemType::EmailSent],
            Self::Calendar => &[ItemType::CalendarPast, ItemType::CalendarUpcoming],
            Self::Tunes => &[ItemType::TunesTrack, ItemType::TunesContext],
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored activity item, matching the `items` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Activity type tag.
    #[serde(rename = "type")]
    pub item_type: ItemType,
    /// ISO 8601 timestamp of when the activity occurred (an event's start
    /// time, a track's played-at time) — not necessarily when it was stored.
    pub ts: String,
    /// Optional short label.
    pub title: Option<String>,
    /// Optional free-text body, length-capped by the producing sync adapter.
    pub content: Option<String>,
    /// Channel-specific metadata (sender for email, location for calendar,
    /// artist for music). Shape varies by type family.
    pub meta: serde_json::Value,
    /// Soft-delete flag. Deleted items are never retrieved.
    pub deleted: bool,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
}

/// Read projection of [`Item`] used inside the ask pipeline. Created per
/// query, discarded once the response is built.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub ts: String,
    pub title: Option<String>,
    pub content: Option<String>,
    pub meta: serde_json::Value,
}

impl RetrievedItem {
    /// Lowercased title + content, the text keyword matching runs against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or(""),
            self.content.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_round_trips_through_str() {
        for t in ItemType::all() {
            assert_eq!(t.as_str().parse::<ItemType>().unwrap(), t);
        }
    }

    #[test]
    fn families_cover_all_types() {
        let from_channels: usize = [
            Channel::Thoughts,
            Channel::Scrawls,
            Channel::Email,
            Channel::Calendar,
            Channel::Tunes,
        ]
        .iter()
        .map(|c| c.types().len())
        .sum();
        assert_eq!(from_channels, ItemType::all().len());

        for channel in [Channel::Email, Channel::Calendar, Channel::Tunes] {
            for t in channel.types() {
                assert_eq!(t.channel(), channel);
            }
        }
    }

    #[test]
    fn label_spaces_out_separators() {
        assert_eq!(ItemType::EmailReceived.label(), "email received");
        assert_eq!(ItemType::ThoughtVoice.label(), "thought voice");
    }

    #[test]
    fn search_text_is_lowercased_title_and_content() {
        let item = RetrievedItem {
            id: "i1".into(),
            item_type: ItemType::ScrawlText,
            ts: "2026-08-01T00:00:00Z".into(),
            title: Some("Invoice DUE".into()),
            content: Some("Pay by Friday".into()),
            meta: serde_json::json!({}),
        };
        assert_eq!(item.search_text(), "invoice due pay by friday");
    }
}
