//! Outbound consultation client.
//!
//! Handlers only see the [`Consultant`] trait; the server wires in
//! [`GeminiClient`], tests wire in a canned responder.

use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

/// Text-generation backend behind `/chat`.
#[async_trait]
pub trait Consultant: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Google Generative Language `generateContent` REST client.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> anyhow::Result<String> {
        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .context("Model returned no candidates")?;

        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        if text.is_empty() {
            bail!("Model returned an empty answer");
        }
        Ok(text)
    }
}

#[async_trait]
impl Consultant for GeminiClient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if self.api_key.is_empty() {
            bail!("No LLM API key configured");
        }

        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            bail!("LLM API returned {status}: {detail}");
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .context("Malformed LLM response")?;
        parsed.into_text()
    }
}
