//! Prompt composition. Pure functions of their inputs; the structural
//! contract (date anchoring, strict output shapes, endpoint catalog) lives
//! here, nowhere else.

use serde_json::Value;

/// The main instruction prompt for a chat turn.
///
/// `today` is an ISO `YYYY-MM-DD` date; the model is told to resolve
/// relative dates against it. `site_info` is the retrieved-content block,
/// already assembled; when absent the model is told explicitly that no
/// content was found so it does not invent site facts.
pub fn intent_prompt(
    message: &str,
    today: &str,
    site_info: Option<&str>,
    email: Option<&str>,
    catalog_json: &str,
) -> String {
    format!(
        r#"You are Yuba, which stands for Your Ultimate Backend Agent, a helpful and smart assistant.
If the user chats casually, you must also chat in a fun way. Keep the convo short.

You help users interact with their website by calling the appropriate API endpoints.
If the user says 'today', 'tomorrow', or 'next Monday', convert to ISO date format.
Today is {today}.

If the user asks about the website or any info from it, answer from the below relevant content only:
{site_info}

Match user intent with endpoint and return JSON like:
{{
  "action": "<action from config>",
  "payload": {{ ... }}
}}

If no match, return a friendly message like:
{{ "response": "Sorry, I couldn't find anything related." }}

CONFIG:
{catalog_json}

USER MESSAGE: "{message}"
USER EMAIL: "{email}""#,
        today = today,
        site_info = site_info.filter(|s| !s.is_empty()).unwrap_or("(No content found)"),
        catalog_json = catalog_json,
        message = message,
        email = email.unwrap_or("Not provided"),
    )
}

/// Prompt for restating a backend payload as a human-readable sentence.
pub fn format_prompt(raw_data: &Value, org_msg: &str) -> String {
    format!(
        r#"You're a helpful assistant. Don't say 'your' if data is shared or public.
User asked: "{org_msg}"
Backend returned: {raw_data}

Format this clearly using commas, DON'T use *, or emails in response."#,
        org_msg = org_msg,
        raw_data = raw_data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_prompt_anchors_date() {
        let prompt = intent_prompt("book for tomorrow", "2026-08-07", None, None, "[]");
        assert!(prompt.contains("Today is 2026-08-07."));
        assert!(prompt.contains("ISO date format"));
    }

    #[test]
    fn test_intent_prompt_includes_catalog_and_message() {
        let catalog = r#"[{"action": "get_news"}]"#;
        let prompt = intent_prompt("news please", "2026-08-07", None, None, catalog);
        assert!(prompt.contains(catalog));
        assert!(prompt.contains("USER MESSAGE: \"news please\""));
    }

    #[test]
    fn test_intent_prompt_site_info_block() {
        let with = intent_prompt("q", "2026-08-07", Some("chunk one\nchunk two"), None, "[]");
        assert!(with.contains("chunk one\nchunk two"));
        assert!(!with.contains("(No content found)"));

        let without = intent_prompt("q", "2026-08-07", None, None, "[]");
        assert!(without.contains("(No content found)"));

        let empty = intent_prompt("q", "2026-08-07", Some(""), None, "[]");
        assert!(empty.contains("(No content found)"));
    }

    #[test]
    fn test_intent_prompt_email_line() {
        let with = intent_prompt("q", "2026-08-07", None, Some("a@b.example"), "[]");
        assert!(with.contains("USER EMAIL: \"a@b.example\""));

        let without = intent_prompt("q", "2026-08-07", None, None, "[]");
        assert!(without.contains("USER EMAIL: \"Not provided\""));
    }

    #[test]
    fn test_format_prompt_embeds_question_and_data() {
        let prompt = format_prompt(&json!({"items": [1, 2]}), "what's in stock?");
        assert!(prompt.contains("what's in stock?"));
        assert!(prompt.contains(r#"{"items":[1,2]}"#));
        assert!(prompt.contains("DON'T use *"));
    }
}
