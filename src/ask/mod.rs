//! The ask pipeline: classify → select → score → assemble → generate →
//! suggest, all request-scoped with every dependency injected.

pub mod context;
pub mod followups;
pub mod intent;
pub mod retrieve;
pub mod score;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::ask::context::AskSource;
use crate::generate::{self, AnswerGenerator};
use crate::items::store::ItemStore;

/// Fixed answer for queries that matched nothing. The generator is never
/// invoked on an empty context.
pub const NO_RESULTS_ANSWER: &str = "I couldn't find relevant items yet. Try being more specific, or connect email, calendar, or Spotify to give me more context.";

/// Followups offered alongside the degraded fallback answer.
pub const FALLBACK_FOLLOWUPS: [&str; 3] = [
    "Tell me more about the first one",
    "Summarize all of these",
    "What should I follow up on?",
];

/// How the answer text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// The generator returned an answer.
    Generated,
    /// The generator failed; the answer is the deterministic template.
    Fallback,
    /// No candidates matched; the generator was not called.
    Empty,
}

/// Everything the transport layer needs to build a response.
#[derive(Debug)]
pub struct AskOutcome {
    pub answer: String,
    pub sources: Vec<AskSource>,
    pub followups: Vec<String>,
    pub generation: Generation,
}

/// Run one ask query end to end.
///
/// A store failure propagates (there is no meaningful answer without items);
/// a generator failure never does — the caller always gets a well-formed
/// outcome. `now` is injected so selection and scoring stay pure.
pub async fn answer_query(
    store: &dyn ItemStore,
    generator: &dyn AnswerGenerator,
    now: DateTime<Utc>,
    user_id: &str,
    display_name: &str,
    query: &str,
) -> Result<AskOutcome> {
    // 1. Classify intent
    let ctx = intent::classify(query);

    // 2. Fetch candidates
    let candidates = retrieve::select_candidates(store, user_id, &ctx).await?;

    // 3. Score and rank
    let ranked = score::rank(candidates, &ctx, now);

    // 4. Empty short-circuit: fixed answer, no generation call
    if ranked.is_empty() {
        tracing::info!(query_len = query.len(), "ask matched no items");
        return Ok(AskOutcome {
            answer: NO_RESULTS_ANSWER.to_string(),
            sources: Vec::new(),
            followups: followups::NO_RESULT_FOLLOWUPS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            generation: Generation::Empty,
        });
    }

    // 5. Assemble context and citations
    let context_block = context::build_context_block(&ranked);
    let sources = context::build_citations(&ranked, &ctx, query);

    // 6. Generate, degrading to the templated answer on any failure
    let user_prompt = generate::user_prompt(display_name, query, &context_block);
    let (answer, generation, followups) =
        match generator.complete(generate::SYSTEM_PROMPT, &user_prompt).await {
            Ok(answer) => (answer, Generation::Generated, followups::suggest(&ranked)),
            Err(err) => {
                tracing::warn!(error = %err, "generation failed, using fallback answer");
                (
                    context::build_fallback_answer(&ranked),
                    Generation::Fallback,
                    FALLBACK_FOLLOWUPS.iter().map(|s| s.to_string()).collect(),
                )
            }
        };

    tracing::info!(
        query_len = query.len(),
        ranked = ranked.len(),
        sources = sources.len(),
        outcome = ?generation,
        "ask answered"
    );

    Ok(AskOutcome {
        answer,
        sources,
        followups,
        generation,
    })
}
