use crate::error::QueryError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub num_predict: u32,
    pub num_ctx: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_k: 40,
            top_p: 0.9,
            num_predict: 400,
            num_ctx: 2_048,
        }
    }
}

/// Seam over the local LLM backend. A timeout is a
/// [`QueryError::GenerationUnavailable`], never an indefinite block.
#[async_trait]
pub trait Generator {
    async fn generate(&self, prompt: &str) -> Result<String, QueryError>;

    async fn is_available(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaGenerator {
    endpoint: String,
    model: String,
    options: GenerationOptions,
    timeout: Duration,
    client: Client,
}

impl OllamaGenerator {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 25;

    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            options: GenerationOptions::default(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            client: Client::new(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, QueryError> {
        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: self.options,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.endpoint))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|error| QueryError::GenerationUnavailable(error.to_string()))?;

        if !response.status().is_success() {
            return Err(QueryError::GenerationUnavailable(format!(
                "generation endpoint returned {}",
                response.status()
            )));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|error| QueryError::GenerationUnavailable(error.to_string()))?;

        Ok(parsed.response.trim().to_string())
    }

    async fn is_available(&self) -> bool {
        let probe = self
            .client
            .get(format!("{}/", self.endpoint))
            .timeout(Duration::from_secs(3))
            .send()
            .await;

        matches!(probe, Ok(response) if response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_reference_sampling() {
        let options = GenerationOptions::default();
        assert_eq!(options.top_k, 40);
        assert_eq!(options.num_predict, 400);
        assert_eq!(options.num_ctx, 2_048);
        assert!((options.temperature - 0.2).abs() < f32::EPSILON);
        assert!((options.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn generate_request_serializes_non_streaming() {
        let request = OllamaGenerateRequest {
            model: "mistral:7b",
            prompt: "hello",
            stream: false,
            options: GenerationOptions::default(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], serde_json::json!(false));
        assert_eq!(value["model"], serde_json::json!("mistral:7b"));
        assert!(value["options"]["num_ctx"].is_number());
    }
}
