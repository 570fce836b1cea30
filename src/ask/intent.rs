//! Query intent classification.
//!
//! Turns a raw ask query into a [`QueryContext`]: a normalized string, up to
//! six keywords, and seven independent boolean intent flags. The flags are
//! matched against the raw query with fixed vocabularies per channel; they
//! are not mutually exclusive, and a query matching nothing is valid (it
//! falls through to search-everything in the selector).

use regex::Regex;
use std::sync::LazyLock;

use crate::items::types::Channel;

static RE_RECENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)recent|latest|last|new|summarize|summary").unwrap());
static RE_THOUGHTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)thought|voice|said|spoke|capture").unwrap());
static RE_SCRAWLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)scrawl|note|wrote|typed|write").unwrap());
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)email|mail|message|inbox").unwrap());
static RE_CALENDAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)calendar|event|meeting|schedule|appointment").unwrap());
static RE_TUNES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)music|song|listen|tune|track|playing|spotify").unwrap());
static RE_ALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)everything|all|activity|overview|what.*been").unwrap());

/// Function words and domain-generic terms dropped from keyword extraction.
const STOP_WORDS: &[&str] = &[
    "what", "is", "are", "the", "my", "i", "have", "has", "been", "a", "an", "to", "for", "of",
    "in", "on", "with", "about", "tell", "me", "show", "find", "get", "summarize", "summary",
    "recent", "latest", "last", "new", "this", "that",
];

/// Maximum keywords kept from a query.
const MAX_KEYWORDS: usize = 6;

/// Per-query classification result. Created once per query, never persisted.
#[derive(Debug, Clone)]
pub struct QueryContext {
    pub normalized: String,
    pub keywords: Vec<String>,
    pub wants_recent: bool,
    pub wants_thoughts: bool,
    pub wants_scrawls: bool,
    pub wants_email: bool,
    pub wants_calendar: bool,
    pub wants_tunes: bool,
    pub wants_all: bool,
}

impl QueryContext {
    /// Whether the intent flag for the given channel family is set.
    pub fn wants_channel(&self, channel: Channel) -> bool {
        match channel {
            Channel::Thoughts => self.wants_thoughts,
            Channel::Scrawls => self.wants_scrawls,
            Channel::Email => self.wants_email,
            Channel::Calendar => self.wants_calendar,
            Channel::Tunes => self.wants_tunes,
        }
    }
}

/// Classify a raw query. Flags are tested against the raw query (so patterns
/// like `what.*been` can span original punctuation); keywords come from the
/// normalized form.
pub fn classify(query: &str) -> QueryContext {
    let normalized = normalize(query);
    let keywords = extract_keywords(&normalized);

    QueryContext {
        wants_recent: RE_RECENT.is_match(query),
        wants_thoughts: RE_THOUGHTS.is_match(query),
        wants_scrawls: RE_SCRAWLS.is_match(query),
        wants_email: RE_EMAIL.is_match(query),
        wants_calendar: RE_CALENDAR.is_match(query),
        wants_tunes: RE_TUNES.is_match(query),
        wants_all: RE_ALL.is_match(query),
        normalized,
        keywords,
    }
}

/// Does the raw query carry intent for the given channel? Used when building
/// citation reasons, where the item's family decides which pattern to test.
pub fn query_matches_channel(query: &str, channel: Channel) -> bool {
    match channel {
        Channel::Thoughts => RE_THOUGHTS.is_match(query),
        Channel::Scrawls => RE_SCRAWLS.is_match(query),
        Channel::Email => RE_EMAIL.is_match(query),
        Channel::Calendar => RE_CALENDAR.is_match(query),
        Channel::Tunes => RE_TUNES.is_match(query),
    }
}

/// Lowercase, strip everything outside `[a-z0-9\s]`, collapse whitespace.
fn normalize(query: &str) -> String {
    let lowered = query.to_lowercase();
    let stripped: String = lowered
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split the normalized query into at most [`MAX_KEYWORDS`] tokens, dropping
/// short tokens and stop words, preserving order.
fn extract_keywords(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(normalize("What's   UP, doc?!"), "what s up doc");
        assert_eq!(normalize("  plain  "), "plain");
        assert_eq!(normalize("héllo"), "h llo");
    }

    #[test]
    fn keywords_drop_stop_words_and_short_tokens() {
        let ctx = classify("tell me about the invoice from acme");
        assert_eq!(ctx.keywords, vec!["invoice", "from", "acme"]);
    }

    #[test]
    fn keywords_cap_at_six() {
        let ctx = classify("alpha bravo charlie delta echo foxtrot golf hotel");
        assert_eq!(ctx.keywords.len(), 6);
        assert_eq!(ctx.keywords[0], "alpha");
        assert_eq!(ctx.keywords[5], "foxtrot");
    }

    #[test]
    fn email_intent_matches_vocabulary() {
        for q in ["what emails do I have", "check my inbox", "any mail today?"] {
            assert!(classify(q).wants_email, "expected email intent for {q:?}");
        }
        assert!(!classify("what did I write down").wants_email);
    }

    #[test]
    fn tunes_intent_matches_spotify() {
        let ctx = classify("what did I play on spotify");
        assert!(ctx.wants_tunes);
        assert!(!ctx.wants_email);
    }

    #[test]
    fn wants_all_matches_broad_phrasing() {
        assert!(classify("summarize everything").wants_all);
        assert!(classify("what have I been up to").wants_all);
        assert!(!classify("invoice from acme").wants_all);
    }

    #[test]
    fn recent_and_all_can_overlap() {
        let ctx = classify("summarize everything");
        assert!(ctx.wants_recent);
        assert!(ctx.wants_all);
    }

    #[test]
    fn empty_intent_query_is_valid() {
        let ctx = classify("xyzzy");
        assert_eq!(ctx.keywords, vec!["xyzzy"]);
        assert!(!ctx.wants_recent);
        assert!(!ctx.wants_thoughts);
        assert!(!ctx.wants_scrawls);
        assert!(!ctx.wants_email);
        assert!(!ctx.wants_calendar);
        assert!(!ctx.wants_tunes);
        assert!(!ctx.wants_all);
    }

    #[test]
    fn classification_is_deterministic() {
        let a = classify("what emails mention the budget review?");
        let b = classify("what emails mention the budget review?");
        assert_eq!(a.normalized, b.normalized);
        assert_eq!(a.keywords, b.keywords);
        assert_eq!(a.wants_email, b.wants_email);
    }
}
