// src/config/mod.rs
// All tunables come from the environment (.env supported); defaults match the
// deployed widget backend.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct YubaConfig {
    // ── Generative model
    pub genai_api_key: String,
    pub genai_base_url: String,
    pub genai_model: String,
    pub llm_timeout: u64,

    // ── Site retrieval
    pub fetch_timeout: u64,
    pub retrieval_top_k: usize,
    pub chunk_words: usize,
    pub retrieval_strategy: String,
    pub truncate_chars: usize,

    // ── Dispatch
    pub payload_policy: String,

    // ── Server
    pub host: String,
    pub port: u16,

    // ── Logging
    pub log_level: String,
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl YubaConfig {
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_err() {
            eprintln!("Warning: .env file not found. Using environment variables and defaults.");
        }

        Self {
            genai_api_key: env_var_or("GENAI_API_KEY", String::new()),
            genai_base_url: env_var_or(
                "YUBA_GENAI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            ),
            genai_model: env_var_or("YUBA_GENAI_MODEL", "gemini-1.5-flash".to_string()),
            llm_timeout: env_var_or("YUBA_LLM_TIMEOUT", 120),
            fetch_timeout: env_var_or("YUBA_FETCH_TIMEOUT", 10),
            retrieval_top_k: env_var_or("YUBA_RETRIEVAL_TOP_K", 3),
            chunk_words: env_var_or("YUBA_CHUNK_WORDS", 50),
            retrieval_strategy: env_var_or("YUBA_RETRIEVAL_STRATEGY", "ranked".to_string()),
            truncate_chars: env_var_or("YUBA_TRUNCATE_CHARS", 3000),
            payload_policy: env_var_or("YUBA_PAYLOAD_POLICY", "permissive".to_string()),
            host: env_var_or("YUBA_HOST", "0.0.0.0".to_string()),
            port: env_var_or("YUBA_PORT", 8000),
            log_level: env_var_or("YUBA_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full generateContent URL for the configured model.
    pub fn genai_endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.genai_base_url, self.genai_model)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<YubaConfig> = Lazy::new(YubaConfig::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = YubaConfig::from_env();

        assert_eq!(config.retrieval_top_k, 3);
        assert_eq!(config.chunk_words, 50);
        assert_eq!(config.retrieval_strategy, "ranked");
    }

    #[test]
    fn test_genai_endpoint() {
        let config = YubaConfig::from_env();
        assert!(config.genai_endpoint().ends_with(":generateContent"));
        assert!(config.genai_endpoint().contains(&config.genai_model));
    }

    #[test]
    fn test_bind_address() {
        let config = YubaConfig::from_env();
        assert!(config.bind_address().contains(':'));
    }
}
