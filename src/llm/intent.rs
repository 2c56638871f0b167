// src/llm/intent.rs
// Site-relatedness gate: one strict yes/no model call deciding whether
// retrieval should run for this message. Fails open to "no" so a flaky
// model never blocks the main flow.

use tracing::warn;

use super::generate::TextGenerator;

pub async fn is_site_related(llm: &dyn TextGenerator, message: &str) -> bool {
    let prompt = format!(
        "You're a helper AI. The user typed: \"{}\"\n\
         Does this message refer to information that would be on a company's website?\n\
         Reply only with \"yes\" or \"no\".",
        message
    );

    match llm.generate(&prompt).await {
        Ok(reply) => reply.trim().to_lowercase().contains("yes"),
        Err(e) => {
            warn!("site-related check failed: {:#}", e);
            false
        }
    }
}
