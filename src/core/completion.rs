//! Gemini `generateContent` client.
//!

use crate::core::config::CompletionConfig;
use crate::core::traits::CompletionClient;
use async_trait::async_trait;
use di::{Ref, inject, injectable};
use log::{debug, warn};
use reqwest::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("prompt is empty")]
    InvalidInput,

    #[error("request to completion provider failed: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("completion provider returned {status}: {body}")]
    UpstreamError { status: StatusCode, body: String },
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize, Debug)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined.
    fn first_candidate_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct GeminiClient {
    http: Client,
    config: CompletionConfig,
}

#[injectable(CompletionClient)]
impl GeminiClient {
    #[inject]
    pub fn create(config: Ref<CompletionConfig>) -> Self {
        Self::new((*config).clone())
    }
}

impl GeminiClient {
    pub fn new(config: CompletionConfig) -> Self {
        if config.api_key.is_empty() {
            warn!("GEMINI_API_KEY is not set, completion requests will be rejected");
        }

        Self {
            http: Client::new(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.trim().is_empty() {
            return Err(CompletionError::InvalidInput);
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        };

        debug!("requesting completion from {}", self.config.model);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::UpstreamError { status, body });
        }

        response
            .json::<GenerateContentResponse>()
            .await?
            .first_candidate_text()
            .ok_or_else(|| CompletionError::UpstreamError {
                status,
                body: "response contained no candidate text".to_string(),
            })
    }
}
