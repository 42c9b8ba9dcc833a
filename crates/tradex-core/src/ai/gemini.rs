//! Google Generative Language (`generateContent`) client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::CompletionClient;
use crate::error::AiError;
use crate::models::AiConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini completion client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Build a client from configuration, reading the API key from the
    /// configured environment variable.
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config.api_key().ok_or_else(|| {
            AiError::NotConfigured(format!("{} is not set", config.api_key_env))
        })?;

        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

const API_KEY_HEADER: &str = "x-goog-api-key";

impl GeminiClient {
    /// The key goes in a header so it never shows up in URLs or their errors.
    fn request(&self, prompt: &str) -> Result<Request, AiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        Ok(self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .build()?)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let request = self.request(prompt)?;

        debug!("Requesting completion from model {}", self.model);
        let res = self.client.execute(request).await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = res
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::MalformedResponse(
                "no text in the first candidate".to_string(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_not_configured() {
        let config = AiConfig {
            api_key_env: "TRADEX_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..AiConfig::default()
        };
        assert!(matches!(
            GeminiClient::from_config(&config),
            Err(AiError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_api_key_is_sent_as_header_not_query() {
        let client = GeminiClient {
            client: Client::new(),
            api_key: "secret-key".to_string(),
            base_url: "https://example.test/v1beta".to_string(),
            model: "gemini-test".to_string(),
            temperature: 0.2,
        };

        let request = client.request("EUR/USD long").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
        assert!(!request.url().as_str().contains("secret-key"));
        assert_eq!(request.headers()[API_KEY_HEADER], "secret-key");
    }

    #[test]
    fn test_request_serializes_in_camel_case() {
        let payload = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some("hi".to_string()),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.5 },
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_response_text_parts() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[{\"pair\":"},{"text":"\"EUR/USD\"}]"}]}}]}"#;
        let body: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let content = body.candidates.into_iter().next().unwrap().content.unwrap();
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        assert_eq!(text, r#"[{"pair":"EUR/USD"}]"#);
    }
}
