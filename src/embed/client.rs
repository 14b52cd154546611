//! HTTP embedding client
//!
//! Speaks the two embedding APIs we deploy against: an Ollama-style
//! `/api/embeddings` endpoint and an OpenAI-style `/embeddings` endpoint.
//! The reasoning engine is synchronous per query, so the client uses
//! reqwest's blocking surface.

use super::{EmbedError, EmbedResult, TextEncoder};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Embedding API flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncoderProvider {
    Ollama,
    OpenAi,
}

impl EncoderProvider {
    fn default_base_url(&self) -> &'static str {
        match self {
            EncoderProvider::Ollama => "http://localhost:11434",
            EncoderProvider::OpenAi => "https://api.openai.com/v1",
        }
    }
}

/// Client for a remote embedding service
pub struct HttpEncoder {
    client: Client,
    provider: EncoderProvider,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl HttpEncoder {
    pub fn new(
        provider: EncoderProvider,
        base_url: Option<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> EmbedResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmbedError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            provider,
            model: model.into(),
            api_key,
            base_url: base_url.unwrap_or_else(|| provider.default_base_url().to_string()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn ollama_embedding(&self, text: &str) -> EmbedResult<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&OllamaRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().unwrap_or_default();
            return Err(EmbedError::ApiError(format!(
                "embedding service returned error: {}",
                error_text
            )));
        }

        let result: OllamaResponse = resp
            .json()
            .map_err(|e| EmbedError::SerializationError(e.to_string()))?;
        Ok(result.embedding)
    }

    fn openai_embedding(&self, text: &str) -> EmbedResult<Vec<f32>> {
        #[derive(Serialize)]
        struct OpenAiRequest<'a> {
            input: [&'a str; 1],
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAiResponse {
            data: Vec<OpenAiData>,
        }

        #[derive(Deserialize)]
        struct OpenAiData {
            embedding: Vec<f32>,
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| EmbedError::ConfigError("OpenAI-style API requires a key".to_string()))?;

        let url = format!("{}/embeddings", self.base_url);
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&OpenAiRequest {
                input: [text],
                model: &self.model,
            })
            .send()
            .map_err(|e| EmbedError::NetworkError(e.to_string()))?;

        if !resp.status().is_success() {
            let error_text = resp.text().unwrap_or_default();
            return Err(EmbedError::ApiError(format!(
                "embedding service returned error: {}",
                error_text
            )));
        }

        let result: OpenAiResponse = resp
            .json()
            .map_err(|e| EmbedError::SerializationError(e.to_string()))?;
        result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbedError::EmptyEmbedding(text.to_string()))
    }
}

impl TextEncoder for HttpEncoder {
    fn encode(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let embedding = match self.provider {
            EncoderProvider::Ollama => self.ollama_embedding(text)?,
            EncoderProvider::OpenAi => self.openai_embedding(text)?,
        };
        if embedding.is_empty() {
            return Err(EmbedError::EmptyEmbedding(text.to_string()));
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_urls() {
        let encoder = HttpEncoder::new(EncoderProvider::Ollama, None, "sapbert", None).unwrap();
        assert_eq!(encoder.base_url(), "http://localhost:11434");

        let encoder = HttpEncoder::new(
            EncoderProvider::OpenAi,
            Some("https://embeddings.internal/v1".to_string()),
            "text-embedding-3-small",
            Some("key".to_string()),
        )
        .unwrap();
        assert_eq!(encoder.base_url(), "https://embeddings.internal/v1");
    }

    #[test]
    fn test_openai_without_key_fails() {
        let encoder = HttpEncoder::new(EncoderProvider::OpenAi, None, "m", None).unwrap();
        let err = encoder.encode("nausea").unwrap_err();
        assert!(matches!(err, EmbedError::ConfigError(_)));
    }
}
