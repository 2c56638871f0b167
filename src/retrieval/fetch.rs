//! Site content fetching: plain GET with a short timeout, HTML stripped to
//! plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

// Cached regexes for HTML processing
static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));
static RE_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid regex"));
static RE_NOSCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<noscript[^>]*>.*?</noscript>").expect("valid regex"));
static RE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(p|div|br|h[1-6]|li|tr)[^>]*>").expect("valid regex"));
static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static RE_MULTI_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static RE_MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("failed to fetch {0}: {1}")]
    Fetch(String, String),
}

/// Fetch a page and return its plain-text content.
pub async fn fetch_site_text(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<String, RetrievalError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| RetrievalError::Fetch(url.to_string(), e.to_string()))?;

    if !response.status().is_success() {
        return Err(RetrievalError::Fetch(
            url.to_string(),
            format!("HTTP {}", response.status().as_u16()),
        ));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response
        .text()
        .await
        .map_err(|e| RetrievalError::Fetch(url.to_string(), e.to_string()))?;

    // Untyped responses are treated as HTML; most sites omit the header on
    // error pages but not on content.
    if content_type.is_empty() || content_type.contains("html") {
        Ok(html_to_text(&body))
    } else {
        Ok(body)
    }
}

/// Convert HTML to plain text
pub fn html_to_text(html: &str) -> String {
    // Remove script, style and noscript tags with their content
    let text = RE_SCRIPT.replace_all(html, "");
    let text = RE_STYLE.replace_all(&text, "");
    let text = RE_NOSCRIPT.replace_all(&text, "");

    // Replace common block elements with newlines
    let text = RE_BLOCK.replace_all(&text, "\n");

    // Remove all remaining HTML tags
    let text = RE_TAG.replace_all(&text, "");

    // Decode common HTML entities
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    // Collapse multiple newlines and spaces
    let text = RE_MULTI_NEWLINE.replace_all(&text, "\n\n");
    let text = RE_MULTI_SPACE.replace_all(&text, " ");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text() {
        let html = r#"
            <html>
            <head><script>alert('hi')</script></head>
            <body>
                <h1>Title</h1>
                <p>Hello <b>world</b>!</p>
                <div>Another &amp; line</div>
                <noscript>Enable JS</noscript>
            </body>
            </html>
        "#;

        let text = html_to_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Hello world!"));
        assert!(text.contains("Another & line"));
        assert!(!text.contains("<script>"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("Enable JS"));
    }

    #[test]
    fn test_html_entities() {
        let html = "&lt;code&gt; &amp; &quot;test&quot;";
        let text = html_to_text(html);
        assert_eq!(text, "<code> & \"test\"");
    }
}
