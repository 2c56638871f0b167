//! Per-service knobs, snapshotted from CONFIG at assembly time so the
//! service itself never reads globals and tests can construct their own.

use std::time::Duration;
use tracing::warn;

use crate::config::CONFIG;

/// How retrieved site content is injected into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalStrategy {
    /// Top-k tf-idf chunks ranked against the user message.
    Ranked,
    /// A fixed-length prefix of the page text, no ranking.
    Truncated,
}

/// Whether a model-supplied callback payload is checked against the
/// endpoint's payload template before being forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadPolicy {
    /// Forward the payload untouched (historical behavior).
    Permissive,
    /// Every payload key must appear in the endpoint's template; a
    /// violation degrades to the couldn't-match reply.
    TemplateKeys,
}

#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub top_k: usize,
    pub chunk_words: usize,
    pub strategy: RetrievalStrategy,
    pub truncate_chars: usize,
    pub payload_policy: PayloadPolicy,
    pub fetch_timeout: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            chunk_words: 50,
            strategy: RetrievalStrategy::Ranked,
            truncate_chars: 3000,
            payload_policy: PayloadPolicy::Permissive,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl ChatOptions {
    pub fn from_config() -> Self {
        Self {
            top_k: CONFIG.retrieval_top_k,
            chunk_words: CONFIG.chunk_words,
            strategy: parse_strategy(&CONFIG.retrieval_strategy),
            truncate_chars: CONFIG.truncate_chars,
            payload_policy: parse_policy(&CONFIG.payload_policy),
            fetch_timeout: Duration::from_secs(CONFIG.fetch_timeout),
        }
    }
}

fn parse_strategy(value: &str) -> RetrievalStrategy {
    match value.trim().to_lowercase().as_str() {
        "ranked" => RetrievalStrategy::Ranked,
        "truncated" => RetrievalStrategy::Truncated,
        other => {
            warn!("unknown retrieval strategy '{}', using ranked", other);
            RetrievalStrategy::Ranked
        }
    }
}

fn parse_policy(value: &str) -> PayloadPolicy {
    match value.trim().to_lowercase().as_str() {
        "permissive" => PayloadPolicy::Permissive,
        "template-keys" | "template_keys" => PayloadPolicy::TemplateKeys,
        other => {
            warn!("unknown payload policy '{}', using permissive", other);
            PayloadPolicy::Permissive
        }
    }
}
