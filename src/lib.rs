//! Ask-anything retrieval over a personal activity timeline.
//!
//! hindsight aggregates a user's activity streams — voice thoughts, text
//! scrawls, email, calendar events, and music listening — into one timeline
//! and answers natural-language questions about it with retrieval-augmented
//! generation. Retrieval is deliberately lexical and heuristic: intent flags
//! and keywords from the query drive a typed, recency-ordered fetch, a
//! weighted scorer ranks the pool, and the top items become both the
//! generation context and the citation list. No embeddings involved.
//!
//! # Pipeline
//!
//! classify → select → score → assemble → generate → suggest, sequential per
//! query, with every dependency (item store, generator, clock) injected so
//! each stage is a pure function of its inputs.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization and schema
//! - [`items`] — Item types, channel families, and the item store seam
//! - [`ask`] — The retrieval-and-ranking core: intent, selection, scoring,
//!   context assembly, and followups
//! - [`generate`] — The answer-generator seam and the Gemini client
//! - [`session`] — Durable ask transcript (sessions and messages)
//! - [`server`] — axum HTTP transport

pub mod ask;
pub mod config;
pub mod db;
pub mod generate;
pub mod items;
pub mod server;
pub mod session;
