//! Followup suggestions derived from the channels present in the result set.

use std::collections::HashSet;

use crate::items::types::{Channel, RetrievedItem};

/// At most this many suggestions are returned.
pub const MAX_FOLLOWUPS: usize = 3;

/// Generic prompts used when no channel produced a suggestion.
pub const GENERIC_FOLLOWUPS: [&str; 3] = [
    "What should I focus on today?",
    "Any tasks I should follow up on?",
    "What happened this week?",
];

/// Prompts offered when the query matched nothing at all.
pub const NO_RESULT_FOLLOWUPS: [&str; 3] = [
    "What have I captured recently?",
    "Show me my latest emails",
    "What's on my calendar this week?",
];

/// Suggest 1-3 next questions based on the channels present in the ranked
/// result. Channels are checked in a fixed order so output is stable.
pub fn suggest(ranked: &[RetrievedItem]) -> Vec<String> {
    let channels: HashSet<Channel> = ranked.iter().map(|i| i.item_type.channel()).collect();

    let mut followups: Vec<String> = Vec::new();
    if channels.contains(&Channel::Email) {
        followups.push("Which emails need a response?".to_string());
    }
    if channels.contains(&Channel::Calendar) {
        followups.push("What's my schedule for tomorrow?".to_string());
    }
    if channels.contains(&Channel::Thoughts) || channels.contains(&Channel::Scrawls) {
        followups.push("Summarize my recent thoughts".to_string());
    }
    if channels.contains(&Channel::Tunes) {
        followups.push("What music have I been listening to lately?".to_string());
    }

    if followups.is_empty() {
        followups.extend(GENERIC_FOLLOWUPS.iter().map(|s| s.to_string()));
    }

    followups.truncate(MAX_FOLLOWUPS);
    followups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::types::ItemType;

    fn item(item_type: ItemType) -> RetrievedItem {
        RetrievedItem {
            id: "x".into(),
            item_type,
            ts: "2026-08-25T10:00:00Z".into(),
            title: None,
            content: None,
            meta: serde_json::json!({}),
        }
    }

    #[test]
    fn one_suggestion_per_present_channel_in_fixed_order() {
        let ranked = vec![
            item(ItemType::TunesTrack),
            item(ItemType::EmailReceived),
            item(ItemType::CalendarPast),
        ];
        let followups = suggest(&ranked);
        assert_eq!(
            followups,
            vec![
                "Which emails need a response?",
                "What's my schedule for tomorrow?",
                "What music have I been listening to lately?",
            ]
        );
    }

    #[test]
    fn thoughts_and_scrawls_share_one_suggestion() {
        let ranked = vec![item(ItemType::ThoughtVoice), item(ItemType::ScrawlText)];
        let followups = suggest(&ranked);
        assert_eq!(followups, vec!["Summarize my recent thoughts"]);
    }

    #[test]
    fn caps_at_three_even_with_all_channels() {
        let ranked = vec![
            item(ItemType::EmailSent),
            item(ItemType::CalendarUpcoming),
            item(ItemType::ThoughtVoice),
            item(ItemType::TunesContext),
        ];
        let followups = suggest(&ranked);
        assert_eq!(followups.len(), 3);
        // tunes drops off: email, calendar, thoughts fill the cap first
        assert!(!followups.iter().any(|f| f.contains("music")));
    }

    #[test]
    fn empty_result_gets_generic_trio() {
        let followups = suggest(&[]);
        assert_eq!(followups, GENERIC_FOLLOWUPS.to_vec());
    }
}
