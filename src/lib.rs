//! crumb — bread-baking Q&A and recipe backend.
//!
//! Sanitizes user input against prompt-injection idioms, forwards it to an
//! upstream LLM provider, caches responses content-addressed by
//! `(kind, normalized query)`, and records feedback for offline
//! prompt-variant comparison.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;
pub mod payload;
pub mod prompts;
pub mod providers;
pub mod sanitize;
