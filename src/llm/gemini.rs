// ABOUTME: Google Gemini generateContent client implementing the LlmProvider trait
// ABOUTME: Builds requests with persona, safety settings and tools; validates responses at the boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! Google Gemini provider
//!
//! Talks to `POST {base}/models/{model}:generateContent` with the key in the
//! `x-goog-api-key` header. Responses are deserialized into private wire structs and
//! then reduced to an [`LlmResponse`]; anything that does not fit is reported as
//! [`ProviderError::InvalidResponse`] instead of being trusted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    ChatRequest, Content, FunctionCall, FunctionResponse, LlmProvider, LlmResponse, Part,
    ProviderError, TokenUsage, Tool,
};
use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult};

/// Harm categories we set thresholds for
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Threshold applied to every category
pub const DEFAULT_BLOCK_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Safety threshold for one harm category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    /// Harm category
    pub category: String,
    /// Block threshold
    pub threshold: String,
}

/// The four standard categories at `BLOCK_MEDIUM_AND_ABOVE`
#[must_use]
pub fn default_safety_settings() -> Vec<SafetySetting> {
    HARM_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: (*category).to_owned(),
            threshold: DEFAULT_BLOCK_THRESHOLD.to_owned(),
        })
        .collect()
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [Tool],
    safety_settings: &'a [SafetySetting],
}

#[allow(clippy::ref_option_ref, clippy::trivially_copy_pass_by_ref)]
fn no_tools(tools: &&[Tool]) -> bool {
    tools.is_empty()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text(text) => Self {
                text: Some(text.clone()),
                ..Self::default()
            },
            Part::FunctionCall(call) => Self {
                function_call: Some(call.clone()),
                thought_signature: call.thought_signature.clone(),
                ..Self::default()
            },
            Part::FunctionResponse(response) => Self {
                function_response: Some(response.clone()),
                ..Self::default()
            },
        }
    }
}

impl From<&Content> for WireContent {
    fn from(content: &Content) -> Self {
        Self {
            role: Some(content.role.as_str().to_owned()),
            parts: content.parts.iter().map(WirePart::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<WireContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
struct SafetyRating {
    #[serde(default)]
    blocked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<Value>,
}

// ============================================================================
// Provider
// ============================================================================

/// Gemini `generateContent` client
pub struct GeminiProvider {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiProvider {
    /// Build a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &LlmConfig) -> AppResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::external_service("o Gemini", format!("HTTP client setup failed: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            safety_settings: default_safety_settings(),
        })
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request_body(&self, request: &ChatRequest) -> Result<Value, ProviderError> {
        let body = GenerateContentRequest {
            contents: request.contents.iter().map(WireContent::from).collect(),
            system_instruction: request.system_instruction.as_ref().map(|text| WireContent {
                role: None,
                parts: vec![WirePart {
                    text: Some(text.clone()),
                    ..WirePart::default()
                }],
            }),
            tools: &request.tools,
            safety_settings: &self.safety_settings,
        };
        serde_json::to_value(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("request serialization: {e}")))
    }
}

/// Classify a non-success HTTP answer
fn classify_error(status: StatusCode, body: &str) -> ProviderError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map_or_else(|| body.chars().take(300).collect(), |e| e.error.message.clone());

    let mentions_key = {
        let upper = message.to_uppercase();
        upper.contains("API_KEY")
            || upper.contains("API KEY")
            || parsed.as_ref().is_some_and(|e| {
                e.error
                    .details
                    .iter()
                    .any(|d| d.to_string().to_uppercase().contains("API_KEY"))
            })
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        StatusCode::SERVICE_UNAVAILABLE => ProviderError::Overloaded,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(message),
        StatusCode::BAD_REQUEST if mentions_key => ProviderError::Authentication(message),
        _ => {
            if parsed.as_ref().is_some_and(|e| e.error.status == "RESOURCE_EXHAUSTED") {
                ProviderError::RateLimited
            } else {
                ProviderError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Reduce a raw provider answer to an [`LlmResponse`]
fn parse_response(json: Value) -> Result<LlmResponse, ProviderError> {
    let response: GenerateContentResponse = serde_json::from_value(json)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            warn!(reason = %reason, "Prompt blocked by safety filters");
            return Err(ProviderError::SafetyBlocked {
                reason: reason.clone(),
            });
        }
        if feedback.safety_ratings.iter().any(|r| r.blocked) {
            return Err(ProviderError::SafetyBlocked {
                reason: "SAFETY".to_owned(),
            });
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no candidates in response".to_owned()))?;

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    if parts.is_empty() && candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(ProviderError::SafetyBlocked {
            reason: "SAFETY".to_owned(),
        });
    }

    let mut text = String::new();
    let mut function_calls = Vec::new();
    for part in parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if let Some(mut call) = part.function_call {
            call.thought_signature = part.thought_signature;
            function_calls.push(call);
        }
    }

    Ok(LlmResponse {
        text: (!text.is_empty()).then_some(text),
        function_calls,
        finish_reason: candidate.finish_reason,
        usage: response.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
        }),
    })
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ChatRequest) -> Result<LlmResponse, ProviderError> {
        let body = self.build_request_body(request)?;

        debug!(
            model = %self.model,
            contents = request.contents.len(),
            "Gemini API request"
        );

        let response = self
            .http
            .post(self.api_url())
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = classify_error(status, &text);
            warn!(status = status.as_u16(), error = %err, "Gemini API returned an error");
            return Err(err);
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        parse_response(json)
    }
}
