// src/llm/mod.rs

pub mod directive;
pub mod gateway;
pub mod gemini;
pub mod generate;
pub mod intent;

pub use directive::{parse_directive, Directive};
pub use gateway::LlmGateway;
pub use gemini::GeminiClient;
pub use generate::TextGenerator;
pub use intent::is_site_related;
