//! Lenient completion wrapper around a [`TextGenerator`].
//!
//! Downstream parsing must never see a transport error: any generator
//! failure becomes a serialized `{"response": ...}` object, and Markdown
//! code fences around the model's JSON are stripped here.

use serde_json::json;
use std::sync::Arc;
use tracing::error;

use super::generate::TextGenerator;

pub struct LlmGateway {
    generator: Arc<dyn TextGenerator>,
}

impl LlmGateway {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Send a prompt and return cleaned reply text. Infallible: call
    /// failures come back as the serialized AI-service-error object.
    pub async fn complete(&self, prompt: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(text) => strip_code_fence(text.trim()).to_string(),
            Err(e) => {
                error!("generative API error: {:#}", e);
                json!({ "response": format!("AI service error: {}", e) }).to_string()
            }
        }
    }
}

/// Strip a leading ```json marker and trailing ``` marker, if present.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}
