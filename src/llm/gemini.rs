//! Gemini provider: plain generateContent calls, no streaming, no tools.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::generate::TextGenerator;
use crate::config::CONFIG;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub struct GeminiClient {
    client: HttpClient,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client with default model settings.
    pub fn new(client: HttpClient, api_key: String) -> Self {
        Self {
            client,
            api_key,
            endpoint: format!("{}/{}:generateContent", DEFAULT_API_BASE, DEFAULT_MODEL),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create from GENAI_API_KEY plus the model settings in CONFIG.
    pub fn from_env(client: HttpClient) -> Result<Self> {
        let api_key = std::env::var("GENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow::anyhow!("GENAI_API_KEY not set"))?;
        Ok(Self {
            client,
            api_key,
            endpoint: CONFIG.genai_endpoint(),
            timeout: Duration::from_secs(CONFIG.llm_timeout),
        })
    }

    /// Concatenate the text parts of the first candidate.
    fn parse_response(response: GeminiResponse) -> String {
        let mut text = String::new();
        if let Some(candidates) = response.candidates {
            if let Some(candidate) = candidates.into_iter().next() {
                for part in candidate.content.parts {
                    if let Some(t) = part.text {
                        text.push_str(&t);
                    }
                }
            }
        }
        text
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart { text: prompt.to_string() }],
            }],
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);

        let response = self
            .client
            .post(&url)
            .json(&api_request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, body);
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = &api_response.error {
            anyhow::bail!("Gemini error: {}", error.message);
        }

        Ok(Self::parse_response(api_response))
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let client = GeminiClient::new(HttpClient::new(), "test_key".into());
        assert_eq!(
            client.endpoint,
            format!("{}/{}:generateContent", DEFAULT_API_BASE, DEFAULT_MODEL)
        );
    }

    #[test]
    fn test_parse_response_concatenates_parts() {
        let response = GeminiResponse {
            candidates: Some(vec![GeminiCandidate {
                content: GeminiContentResponse {
                    parts: vec![
                        GeminiPartResponse { text: Some("Hello ".into()) },
                        GeminiPartResponse { text: None },
                        GeminiPartResponse { text: Some("world".into()) },
                    ],
                },
            }]),
            error: None,
        };
        assert_eq!(GeminiClient::parse_response(response), "Hello world");
    }

    #[test]
    fn test_parse_response_empty_candidates() {
        let response = GeminiResponse { candidates: None, error: None };
        assert_eq!(GeminiClient::parse_response(response), "");
    }
}
