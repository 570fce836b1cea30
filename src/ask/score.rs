//! Relevance scoring and ranking.
//!
//! Scores every candidate against the query context and sorts best-first.
//! Keyword hits dominate (weight 2 per hit) since a literal lexical match is
//! the strongest signal available without embeddings; recency is a linear
//! decay reaching zero at 30 days so stale items fade without a hard cutoff;
//! a matching channel intent adds a moderate nudge.

use chrono::{DateTime, Utc};

use crate::ask::intent::QueryContext;
use crate::items::types::RetrievedItem;

/// Weight per keyword substring hit.
const KEYWORD_WEIGHT: f64 = 2.0;
/// Bonus when the item's channel matches a set intent flag.
const TYPE_BONUS: f64 = 1.2;
/// Flat bonus for every item when the query asks for recent activity.
const RECENT_BONUS: f64 = 0.4;
/// Recency decays linearly to zero over this many days.
const DECAY_WINDOW_DAYS: f64 = 30.0;

/// Ranked result cap when the query produced keywords.
const RANKED_LIMIT_KEYWORDS: usize = 12;
/// Ranked result cap for keyword-less (recency-dominated) queries.
const RANKED_LIMIT_BARE: usize = 10;

/// Score a single item. Pure function of (item, ctx, now).
pub fn score_item(item: &RetrievedItem, ctx: &QueryContext, now: DateTime<Utc>) -> f64 {
    let recency = recency_score(&item.ts, now);

    let text = item.search_text();
    let keyword_hits = ctx
        .keywords
        .iter()
        .filter(|kw| text.contains(kw.as_str()))
        .count() as f64;

    let type_bonus = if ctx.wants_channel(item.item_type.channel()) {
        TYPE_BONUS
    } else {
        0.0
    };

    let recent_bonus = if ctx.wants_recent { RECENT_BONUS } else { 0.0 };

    keyword_hits * KEYWORD_WEIGHT + type_bonus + recency + recent_bonus
}

/// Linear decay: 1.0 now, 0.0 at [`DECAY_WINDOW_DAYS`] and beyond.
/// Unparseable timestamps contribute nothing.
fn recency_score(ts: &str, now: DateTime<Utc>) -> f64 {
    let Ok(parsed) = DateTime::parse_from_rfc3339(ts) else {
        return 0.0;
    };
    let age_days =
        ((now - parsed.with_timezone(&Utc)).num_seconds() as f64 / 86_400.0).max(0.0);
    (1.0 - age_days / DECAY_WINDOW_DAYS).max(0.0)
}

/// Score, sort (score descending, newer timestamp wins ties), and truncate
/// the candidate list to the final ranked size.
pub fn rank(
    candidates: Vec<RetrievedItem>,
    ctx: &QueryContext,
    now: DateTime<Utc>,
) -> Vec<RetrievedItem> {
    let mut scored: Vec<(RetrievedItem, f64, DateTime<Utc>)> = candidates
        .into_iter()
        .map(|item| {
            let score = score_item(&item, ctx, now);
            let ts = DateTime::parse_from_rfc3339(&item.ts)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            (item, score, ts)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.2.cmp(&a.2))
    });

    let limit = if ctx.keywords.is_empty() {
        RANKED_LIMIT_BARE
    } else {
        RANKED_LIMIT_KEYWORDS
    };
    scored.truncate(limit);

    scored.into_iter().map(|(item, _, _)| item).collect()
}
