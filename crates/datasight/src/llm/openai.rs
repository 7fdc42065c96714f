//! OpenAI-backed narrative enricher.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::error::{DatasightError, Result};

use super::provider::{EnricherConfig, EnrichmentFacts, NarrativeEnricher};

/// OpenAI API endpoint.
const API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Keys that are template placeholders rather than real credentials.
const PLACEHOLDER_KEYS: &[&str] = &[
    "",
    "your-openai-api-key-here",
    "your_openai_api_key_here",
];

const SYSTEM_PROMPT: &str = "You are a business analyst. Reword the provided answer and \
facts as one short, plain-language narrative. Use only the numbers given; never invent \
figures. Respond with the narrative text only.";

/// OpenAI narrative enricher.
pub struct OpenAiEnricher {
    client: Client,
    api_key: String,
    config: EnricherConfig,
}

impl OpenAiEnricher {
    /// Create a new enricher with the given API key.
    ///
    /// Returns a config error for empty or placeholder keys so a template
    /// `.env` never triggers live API calls.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, EnricherConfig::default())
    }

    /// Create a new enricher with custom configuration.
    pub fn with_config(api_key: impl Into<String>, config: EnricherConfig) -> Result<Self> {
        let api_key = api_key.into();
        if is_placeholder_key(&api_key) {
            return Err(DatasightError::Config(
                "OpenAI API key is missing or a placeholder".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                DatasightError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            DatasightError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Self::new(api_key)
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| DatasightError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    fn send_message(&self, user_prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": user_prompt }
            ]
        });

        let response = self
            .client
            .post(API_URL)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| DatasightError::Enrichment(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(DatasightError::Enrichment(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OpenAiResponse = response.json().map_err(|e| {
            DatasightError::Enrichment(format!("Failed to parse API response: {}", e))
        })?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DatasightError::Enrichment("No response from OpenAI".to_string()))
    }
}

impl NarrativeEnricher for OpenAiEnricher {
    fn enrich(&self, facts: &EnrichmentFacts) -> Result<String> {
        let prompt = format!(
            "Question: {}\nComputed answer: {}\nFacts:\n{}",
            facts.question,
            facts.answer,
            facts
                .supporting_facts
                .iter()
                .map(|f| format!("- {f}"))
                .collect::<Vec<_>>()
                .join("\n")
        );

        let response = self.send_message(&prompt)?;
        Ok(strip_code_fences(&response))
    }

    fn config(&self) -> &EnricherConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Check whether an API key is empty or a known template placeholder.
pub fn is_placeholder_key(key: &str) -> bool {
    let trimmed = key.trim();
    PLACEHOLDER_KEYS
        .iter()
        .any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Strip markdown code fences some models wrap plain-text answers in.
fn strip_code_fences(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|s| s.strip_suffix("```"))
    {
        // Drop an optional language tag on the first line
        let inner = inner.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        return inner.trim().to_string();
    }
    trimmed.to_string()
}

/// OpenAI API response structure.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_keys_rejected() {
        assert!(OpenAiEnricher::new("").is_err());
        assert!(OpenAiEnricher::new("your-openai-api-key-here").is_err());
        assert!(OpenAiEnricher::new("  YOUR_OPENAI_API_KEY_HERE  ").is_err());
        assert!(OpenAiEnricher::new("sk-real-looking-key").is_ok());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("plain text"), "plain text");
        assert_eq!(strip_code_fences("```\nfenced\n```"), "fenced");
        assert_eq!(strip_code_fences("```text\nfenced\n```"), "fenced");
    }
}
