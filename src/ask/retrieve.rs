//! Candidate selection: intent flags → type allowlist → one bounded fetch.

use anyhow::Result;

use crate::ask::intent::QueryContext;
use crate::items::store::ItemStore;
use crate::items::types::{Channel, ItemType, RetrievedItem};

/// Pool size for broad or recency-driven queries. These need a larger pool
/// so the scorer can find the true top results.
const FETCH_LIMIT_BROAD: usize = 60;
/// Pool size for channel-narrowed queries, where the type filter has already
/// done most of the narrowing.
const FETCH_LIMIT_NARROW: usize = 40;

/// Build the type allowlist for a classified query. An empty family set or
/// an explicit broad-scope intent expands to all eight types.
pub fn type_allowlist(ctx: &QueryContext) -> Vec<ItemType> {
    let mut types: Vec<ItemType> = Vec::new();
    for channel in [
        Channel::Thoughts,
        Channel::Scrawls,
        Channel::Email,
        Channel::Calendar,
        Channel::Tunes,
    ] {
        if ctx.wants_channel(channel) {
            types.extend_from_slice(channel.types());
        }
    }

    if types.is_empty() || ctx.wants_all {
        types = ItemType::all().to_vec();
    }
    types
}

/// The fetch limit for a classified query.
pub fn fetch_limit(ctx: &QueryContext) -> usize {
    if ctx.wants_recent || ctx.wants_all {
        FETCH_LIMIT_BROAD
    } else {
        FETCH_LIMIT_NARROW
    }
}

/// Issue the single bounded fetch against the item store. Returns candidates
/// newest-first; the store guarantees uniqueness per item id, so no dedup.
pub async fn select_candidates(
    store: &dyn ItemStore,
    user_id: &str,
    ctx: &QueryContext,
) -> Result<Vec<RetrievedItem>> {
    let types = type_allowlist(ctx);
    let limit = fetch_limit(ctx);
    tracing::debug!(
        types = types.len(),
        limit,
        keywords = ctx.keywords.len(),
        "selecting candidates"
    );
    store.fetch_recent(user_id, &types, limit).await
}
