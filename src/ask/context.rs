//! Context assembly: render the ranked items into the bounded text block fed
//! to the answer generator, with a parallel citation list explaining why each
//! item was chosen.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::ask::intent::{query_matches_channel, QueryContext};
use crate::items::types::{Channel, RetrievedItem};

/// Items rendered into the generation context. Bounds prompt size and latency
/// no matter how many candidates ranked.
pub const MAX_CONTEXT_ITEMS: usize = 6;
/// Citations returned to the caller — always a prefix of the context items.
pub const MAX_CITATIONS: usize = 5;
/// Hard cap on a single item's body inside the context block.
const MAX_BODY_CHARS: usize = 500;
/// Body preview length in the degraded fallback answer.
const FALLBACK_PREVIEW_CHARS: usize = 100;

/// A citation record: which item backed the answer and why it was selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskSource {
    pub item_id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub ts: String,
    pub reason: String,
}

/// Ordered (metadata key, label) pairs per channel; the first key present in
/// the item's metadata produces the single detail line.
fn detail_fields(channel: Channel) -> &'static [(&'static str, &'static str)] {
    match channel {
        Channel::Email => &[("from", "From")],
        Channel::Calendar => &[("location", "Location")],
        Channel::Tunes => &[("artist", "Artist")],
        Channel::Thoughts | Channel::Scrawls => &[],
    }
}

/// Render the generation context block from the ranked list. At most
/// [`MAX_CONTEXT_ITEMS`] items; each gets an index tag the model can cite.
pub fn build_context_block(ranked: &[RetrievedItem]) -> String {
    ranked
        .iter()
        .take(MAX_CONTEXT_ITEMS)
        .enumerate()
        .map(|(i, item)| render_context_item(i + 1, item))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_context_item(index: usize, item: &RetrievedItem) -> String {
    let label = item.item_type.label();
    let date = format_local_ts(&item.ts);
    let body = item
        .content
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| truncate_chars(c, MAX_BODY_CHARS))
        .or_else(|| item.title.clone())
        .unwrap_or_else(|| "No content".to_string());

    let detail = detail_fields(item.item_type.channel())
        .iter()
        .find_map(|(key, field)| {
            item.meta
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|v| format!("{field}: {v}"))
        });

    match detail {
        Some(detail) => format!("[{index}] {label} ({date}) - {detail}\n{body}"),
        None => format!("[{index}] {label} ({date})\n{body}"),
    }
}

/// Build the citation list: a prefix (same items, same order) of the context
/// list, capped at [`MAX_CITATIONS`].
pub fn build_citations(ranked: &[RetrievedItem], ctx: &QueryContext, query: &str) -> Vec<AskSource> {
    ranked
        .iter()
        .take(MAX_CITATIONS)
        .map(|item| AskSource {
            item_id: item.id.clone(),
            item_type: item.item_type.as_str().to_string(),
            ts: item.ts.clone(),
            reason: source_reason(item, ctx, query),
        })
        .collect()
}

/// Why was this item selected? Priority: literal keyword hit, then channel
/// intent expressed in the raw query, then the generic recency fallback.
fn source_reason(item: &RetrievedItem, ctx: &QueryContext, query: &str) -> String {
    let text = item.search_text();
    if let Some(kw) = ctx.keywords.iter().find(|kw| text.contains(kw.as_str())) {
        return format!("Matches keyword \"{kw}\"");
    }

    let channel = item.item_type.channel();
    if query_matches_channel(query, channel) {
        let phrase = match channel {
            Channel::Email => "Matches email intent",
            Channel::Calendar => "Matches calendar intent",
            Channel::Thoughts => "Matches thoughts intent",
            Channel::Scrawls => "Matches notes intent",
            Channel::Tunes => "Matches music intent",
        };
        return phrase.to_string();
    }

    "Recent activity".to_string()
}

/// Deterministic templated answer used when the generator fails: the top
/// items as a readable list, so the user never dead-ends on an upstream blip.
pub fn build_fallback_answer(ranked: &[RetrievedItem]) -> String {
    let summaries = ranked
        .iter()
        .take(MAX_CITATIONS)
        .enumerate()
        .map(|(i, item)| {
            let preview = item
                .content
                .as_deref()
                .filter(|c| !c.is_empty())
                .map(|c| truncate_chars(c, FALLBACK_PREVIEW_CHARS))
                .or_else(|| item.title.clone())
                .unwrap_or_else(|| "No content".to_string());
            format!("[{}] {}: {}", i + 1, item.item_type.channel(), preview)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Here's what I found related to your query:\n\n{summaries}\n\nWould you like more details about any of these?"
    )
}

/// Format an RFC 3339 timestamp as a short local date/time
/// (e.g. "Tue, Aug 25, 2:05 PM"). Unparseable input passes through as-is.
fn format_local_ts(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%a, %b %-d, %-I:%M %p")
            .to_string(),
        Err(_) => ts.to_string(),
    }
}

/// Truncate to at most `max_chars` characters (not bytes).
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ask::intent::classify;
    use crate::items::types::ItemType;

    fn item(id: &str, item_type: ItemType, title: &str, content: &str) -> RetrievedItem {
        RetrievedItem {
            id: id.into(),
            item_type,
            ts: "2026-08-25T14:05:00Z".into(),
            title: Some(title.into()),
            content: Some(content.into()),
            meta: serde_json::json!({}),
        }
    }

    #[test]
    fn context_caps_at_six_items() {
        let ranked: Vec<RetrievedItem> = (0..12)
            .map(|i| item(&format!("i{i}"), ItemType::ScrawlText, "note", "body"))
            .collect();
        let block = build_context_block(&ranked);
        assert!(block.contains("[6]"));
        assert!(!block.contains("[7]"));
    }

    #[test]
    fn citations_are_a_prefix_of_context_order() {
        let ranked: Vec<RetrievedItem> = (0..8)
            .map(|i| item(&format!("i{i}"), ItemType::ScrawlText, "note", "body"))
            .collect();
        let ctx = classify("notes");
        let citations = build_citations(&ranked, &ctx, "notes");
        assert_eq!(citations.len(), 5);
        for (citation, ranked_item) in citations.iter().zip(ranked.iter()) {
            assert_eq!(citation.item_id, ranked_item.id);
        }
    }

    #[test]
    fn email_detail_line_comes_from_meta() {
        let mut it = item("a", ItemType::EmailReceived, "Invoice", "pay by friday");
        it.meta = serde_json::json!({ "from": "billing@acme.com" });
        let rendered = render_context_item(1, &it);
        assert!(rendered.contains("From: billing@acme.com"));
        assert!(rendered.starts_with("[1] email received ("));
    }

    #[test]
    fn missing_meta_key_renders_no_detail_line() {
        let it = item("a", ItemType::CalendarUpcoming, "Team sync", "");
        let rendered = render_context_item(1, &it);
        assert!(!rendered.contains("Location:"));
        // empty content falls back to the title
        assert!(rendered.ends_with("Team sync"));
    }

    #[test]
    fn tunes_detail_is_artist() {
        let mut it = item("a", ItemType::TunesTrack, "Blue Train", "");
        it.meta = serde_json::json!({ "artist": "John Coltrane", "album": "Blue Train" });
        let rendered = render_context_item(1, &it);
        assert!(rendered.contains("Artist: John Coltrane"));
        assert!(!rendered.contains("Album"));
    }

    #[test]
    fn body_truncates_at_500_chars() {
        let long = "x".repeat(900);
        let it = item("a", ItemType::ScrawlText, "t", &long);
        let rendered = render_context_item(1, &it);
        let body = rendered.lines().last().unwrap();
        assert_eq!(body.chars().count(), 500);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        // 300 chars, 900 bytes: a byte-based cut would lose two thirds of it
        let text = "日本語のテキストです".repeat(30);
        let out = truncate_chars(&text, 500);
        assert_eq!(out, text);

        let long = "日本語のテキストです".repeat(60);
        let cut = truncate_chars(&long, 500);
        assert_eq!(cut.chars().count(), 500);
        assert!(long.starts_with(&cut));
    }

    #[test]
    fn multibyte_body_survives_the_context_cap_intact() {
        let body = "音楽についての長い感想".repeat(40); // 440 chars, well over 500 bytes
        let it = item("a", ItemType::ThoughtVoice, "t", &body);
        let rendered = render_context_item(1, &it);
        let last = rendered.lines().last().unwrap();
        assert_eq!(last, body);
    }

    #[test]
    fn reason_prefers_keyword_over_intent() {
        let ctx = classify("emails about the invoice");
        let it = item("a", ItemType::EmailReceived, "Invoice due", "please pay");
        assert_eq!(
            source_reason(&it, &ctx, "emails about the invoice"),
            "Matches keyword \"invoice\""
        );
    }

    #[test]
    fn reason_falls_back_to_channel_intent() {
        let ctx = classify("what emails do I have");
        let it = item("a", ItemType::EmailSent, "Re: hello", "see attached");
        assert_eq!(
            source_reason(&it, &ctx, "what emails do I have"),
            "Matches email intent"
        );
    }

    #[test]
    fn reason_defaults_to_recent_activity() {
        let ctx = classify("what have I been up to");
        let it = item("a", ItemType::TunesTrack, "Blue Train", "");
        assert_eq!(
            source_reason(&it, &ctx, "what have I been up to"),
            "Recent activity"
        );
    }

    #[test]
    fn fallback_answer_lists_top_items_by_channel() {
        let ranked = vec![
            item("a", ItemType::EmailReceived, "Invoice", "pay by friday please"),
            item("b", ItemType::TunesTrack, "Blue Train", ""),
        ];
        let answer = build_fallback_answer(&ranked);
        assert!(answer.contains("[1] email: pay by friday please"));
        assert!(answer.contains("[2] tunes: Blue Train"));
        assert!(answer.starts_with("Here's what I found"));
    }
}
