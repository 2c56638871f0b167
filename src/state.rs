// src/state.rs

use std::sync::Arc;

use crate::chat::{ChatOptions, ChatService};
use crate::llm::TextGenerator;
use crate::retrieval::SiteCache;

#[derive(Clone)]
pub struct AppState {
    // -------- Shared clients --------
    pub http: reqwest::Client,
    pub llm: Arc<dyn TextGenerator>,

    // -------- Retrieval --------
    pub sites: Arc<SiteCache>,

    // -------- Services --------
    pub chat_service: Arc<ChatService>,
}

impl AppState {
    /// Assemble the full state from a generator and the chat options. One
    /// reqwest client and one site cache are shared by everything.
    pub fn new(llm: Arc<dyn TextGenerator>, options: ChatOptions) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; YubaBackend/0.1)")
            .build()
            .unwrap_or_default();

        let sites = Arc::new(SiteCache::unbounded());

        let chat_service = Arc::new(ChatService::new(
            llm.clone(),
            http.clone(),
            sites.clone(),
            options,
        ));

        Self { http, llm, sites, chat_service }
    }
}
