//! The per-turn pipeline: fetch the tenant config, decide whether to
//! retrieve site content, compose the prompt, call the model, and resolve
//! its reply into a conversational response or an endpoint callback.
//!
//! Every failure in the pipeline is recovered at the turn boundary into a
//! fixed conversational response; a turn never surfaces an HTTP error and
//! never poisons the site cache or other in-flight turns.

use chrono::Local;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{is_site_related, parse_directive, Directive, LlmGateway, TextGenerator};
use crate::retrieval::{ensure_site_indexed, SiteCache};

use super::endpoints::{fetch_endpoint_config, Endpoint, EndpointConfig};
use super::options::{ChatOptions, PayloadPolicy, RetrievalStrategy};
use super::prompt::{format_prompt, intent_prompt};

const GENERIC_FAILURE: &str = "Something went wrong while processing your request.";
const NO_MATCH: &str = "Sorry, I couldn't match the action with any known endpoint.";

/// What a chat turn produces for the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Response { response: String },
    Callback { callback: CallbackData },
}

#[derive(Debug, Clone, Serialize)]
pub struct CallbackData {
    pub action: String,
    pub payload: Value,
}

impl ChatOutcome {
    fn response(text: impl Into<String>) -> Self {
        ChatOutcome::Response { response: text.into() }
    }
}

pub struct ChatService {
    llm: Arc<dyn TextGenerator>,
    gateway: LlmGateway,
    http: Client,
    sites: Arc<SiteCache>,
    options: ChatOptions,
}

impl ChatService {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        http: Client,
        sites: Arc<SiteCache>,
        options: ChatOptions,
    ) -> Self {
        let gateway = LlmGateway::new(llm.clone());
        Self { llm, gateway, http, sites, options }
    }

    /// Run one chat turn. Infallible by design: anything that goes wrong
    /// inside becomes the generic failure response.
    pub async fn handle_message(
        &self,
        message: &str,
        config_url: &str,
        email: Option<&str>,
    ) -> ChatOutcome {
        match self.run_turn(message, config_url, email).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("chat turn failed: {:#}", e);
                ChatOutcome::response(GENERIC_FAILURE)
            }
        }
    }

    async fn run_turn(
        &self,
        message: &str,
        config_url: &str,
        email: Option<&str>,
    ) -> anyhow::Result<ChatOutcome> {
        let config = fetch_endpoint_config(&self.http, config_url).await?;
        info!("loaded endpoint config with {} endpoints", config.endpoints.len());

        let site_info = self.site_context(&config, message).await;

        let today = Local::now().format("%Y-%m-%d").to_string();
        let prompt = intent_prompt(
            message,
            &today,
            site_info.as_deref(),
            email,
            &config.catalog_json(),
        );

        let reply = self.gateway.complete(&prompt).await;
        info!("raw model reply: {}", reply);

        Ok(self.dispatch(&reply, &config))
    }

    /// Build the retrieved-content block, or nothing. The classifier runs
    /// every turn; retrieval additionally needs a configured base URL and a
    /// fetchable site.
    async fn site_context(&self, config: &EndpointConfig, message: &str) -> Option<String> {
        let related = is_site_related(self.llm.as_ref(), message).await;
        let url = config.site_url()?;
        if !related {
            return None;
        }

        let site = ensure_site_indexed(
            &self.sites,
            &self.http,
            url,
            self.options.chunk_words,
            self.options.fetch_timeout,
        )
        .await?;

        match self.options.strategy {
            RetrievalStrategy::Ranked => {
                let chunks = site.top_chunks(message, self.options.top_k);
                info!("retrieved {} relevant chunks from {}", chunks.len(), url);
                Some(chunks.join("\n"))
            }
            RetrievalStrategy::Truncated => {
                let cut = site
                    .text
                    .char_indices()
                    .nth(self.options.truncate_chars)
                    .map(|(i, _)| i)
                    .unwrap_or(site.text.len());
                Some(site.text[..cut].to_string())
            }
        }
    }

    /// Resolve the model's reply against the tenant's endpoint catalog.
    fn dispatch(&self, reply: &str, config: &EndpointConfig) -> ChatOutcome {
        match parse_directive(reply) {
            Directive::Plain(text) => ChatOutcome::response(text),
            Directive::Reply(text) => ChatOutcome::response(text),
            Directive::Call { action, payload } => match config.find_action(&action) {
                None => {
                    info!("model returned unknown action '{}'", action);
                    ChatOutcome::response(NO_MATCH)
                }
                Some(endpoint) => {
                    if !payload_allowed(endpoint, &payload, self.options.payload_policy) {
                        warn!("payload for '{}' violates the endpoint template", action);
                        return ChatOutcome::response(NO_MATCH);
                    }
                    ChatOutcome::Callback { callback: CallbackData { action, payload } }
                }
            },
        }
    }

    /// Restate an arbitrary backend payload as a human-readable sentence.
    pub async fn format_payload(&self, raw_data: &Value, org_msg: &str) -> String {
        self.gateway.complete(&format_prompt(raw_data, org_msg)).await
    }
}

/// Template check for a callback payload. Only enforced under the
/// template-keys policy, and only when both sides are objects.
fn payload_allowed(endpoint: &Endpoint, payload: &Value, policy: PayloadPolicy) -> bool {
    match policy {
        PayloadPolicy::Permissive => true,
        PayloadPolicy::TemplateKeys => {
            let (Some(Value::Object(template)), Value::Object(supplied)) =
                (&endpoint.payload, payload)
            else {
                return true;
            };
            supplied.keys().all(|k| template.contains_key(k))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedReply(&'static str);

    #[async_trait]
    impl TextGenerator for FixedReply {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn service(options: ChatOptions) -> ChatService {
        ChatService::new(
            Arc::new(FixedReply("no")),
            Client::new(),
            Arc::new(SiteCache::unbounded()),
            options,
        )
    }

    fn config() -> EndpointConfig {
        serde_json::from_value(json!({
            "endpoints": [
                {"action": "get_news", "payload": {}},
                {"action": "book_meeting", "payload": {"date": "", "email": ""}}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_dispatch_plain_text_verbatim() {
        let svc = service(ChatOptions::default());
        let outcome = svc.dispatch("hello", &config());
        match outcome {
            ChatOutcome::Response { response } => assert_eq!(response, "hello"),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_matched_action() {
        let svc = service(ChatOptions::default());
        let outcome = svc.dispatch(r#"{"action": "get_news", "payload": {}}"#, &config());
        match outcome {
            ChatOutcome::Callback { callback } => {
                assert_eq!(callback.action, "get_news");
                assert_eq!(callback.payload, json!({}));
            }
            other => panic!("expected callback, got {:?}", other),
        }
    }

    #[test]
    fn test_dispatch_unknown_action_degrades() {
        let svc = service(ChatOptions::default());
        let outcome = svc.dispatch(r#"{"action": "unknown_action"}"#, &config());
        match outcome {
            ChatOutcome::Response { response } => assert_eq!(response, NO_MATCH),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_template_keys_policy_rejects_foreign_keys() {
        let options = ChatOptions { payload_policy: PayloadPolicy::TemplateKeys, ..Default::default() };
        let svc = service(options);

        let ok = svc.dispatch(
            r#"{"action": "book_meeting", "payload": {"date": "2026-08-07"}}"#,
            &config(),
        );
        assert!(matches!(ok, ChatOutcome::Callback { .. }));

        let bad = svc.dispatch(
            r#"{"action": "book_meeting", "payload": {"sql": "drop table"}}"#,
            &config(),
        );
        match bad {
            ChatOutcome::Response { response } => assert_eq!(response, NO_MATCH),
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[test]
    fn test_permissive_policy_forwards_anything() {
        let svc = service(ChatOptions::default());
        let outcome = svc.dispatch(
            r#"{"action": "book_meeting", "payload": {"sql": "drop table"}}"#,
            &config(),
        );
        assert!(matches!(outcome, ChatOutcome::Callback { .. }));
    }

    #[test]
    fn test_outcome_serialization_shapes() {
        let response = serde_json::to_value(ChatOutcome::response("hi")).unwrap();
        assert_eq!(response, json!({"response": "hi"}));

        let callback = serde_json::to_value(ChatOutcome::Callback {
            callback: CallbackData { action: "a".into(), payload: json!({"x": 1}) },
        })
        .unwrap();
        assert_eq!(callback, json!({"callback": {"action": "a", "payload": {"x": 1}}}));
    }
}
