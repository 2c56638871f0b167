//! The text-generation seam. Everything above the HTTP client talks to this
//! trait so tests can script model replies.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One-shot prompt in, raw model text out. No conversation memory
    /// across calls.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
