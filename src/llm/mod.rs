// ABOUTME: LLM provider abstraction: conversation content types, tool declarations, provider trait
// ABOUTME: ProviderError classifies upstream failures and maps them to user-facing AppErrors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! # LLM Provider Abstraction
//!
//! The conversation orchestrator talks to the model exclusively through the
//! [`LlmProvider`] trait. Content is modelled the way the generative-language API
//! expects it: a sequence of role-tagged [`Content`] entries made of [`Part`]s, where a
//! part is plain text, a function call emitted by the model, or a function response
//! sent back by us.

/// Google Gemini `generateContent` implementation
pub mod gemini;
/// Default persona instruction
pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::errors::{AppError, ErrorCode};
use luna_core::models::{HistoryEntry, ToolCall, ToolResult};

pub use gemini::GeminiProvider;
pub use prompts::default_persona_instruction;

/// Role of a content entry in the conversation sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Human turn
    User,
    /// Model turn
    Model,
    /// Batched tool results
    Function,
}

impl MessageRole {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
            Self::Function => "function",
        }
    }
}

/// A function invocation emitted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Declared function name
    pub name: String,
    /// Arguments object
    #[serde(default)]
    pub args: Value,
    /// Opaque signature some models attach to the part; must be echoed back verbatim
    #[serde(skip)]
    pub thought_signature: Option<String>,
}

impl FunctionCall {
    /// Call without a signature
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
            thought_signature: None,
        }
    }
}

impl From<&FunctionCall> for ToolCall {
    fn from(call: &FunctionCall) -> Self {
        Self::new(call.name.clone(), call.args.clone())
    }
}

/// A function result sent back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Name of the function that produced it
    pub name: String,
    /// Result mapping
    pub response: Value,
}

impl From<&ToolResult> for FunctionResponse {
    fn from(result: &ToolResult) -> Self {
        Self {
            name: result.name.clone(),
            response: result.response(),
        }
    }
}

/// One piece of a content entry
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Plain text
    Text(String),
    /// Function call requested by the model
    FunctionCall(FunctionCall),
    /// Function result supplied by the host
    FunctionResponse(FunctionResponse),
}

/// A role-tagged conversation entry
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    /// Who produced it
    pub role: MessageRole,
    /// Ordered parts
    pub parts: Vec<Part>,
}

impl Content {
    /// Single-text user entry
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Single-text model entry
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Model entry replaying the function calls it requested
    #[must_use]
    pub fn model_calls(calls: &[FunctionCall]) -> Self {
        Self {
            role: MessageRole::Model,
            parts: calls.iter().cloned().map(Part::FunctionCall).collect(),
        }
    }

    /// One batched entry carrying every tool result of a round
    #[must_use]
    pub fn function_responses(results: &[ToolResult]) -> Self {
        Self {
            role: MessageRole::Function,
            parts: results
                .iter()
                .map(|r| Part::FunctionResponse(FunctionResponse::from(r)))
                .collect(),
        }
    }

    /// Map stored chat history (user→user, ai→model) into model content
    #[must_use]
    pub fn from_history(history: &[HistoryEntry]) -> Vec<Self> {
        history
            .iter()
            .map(|entry| Self {
                role: match entry.sender.llm_role() {
                    "model" => MessageRole::Model,
                    _ => MessageRole::User,
                },
                parts: vec![Part::Text(entry.text.clone())],
            })
            .collect()
    }

    /// Concatenated text parts
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Schema of a callable function declared to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// When the model should call it
    pub description: String,
    /// JSON schema of the arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Group of function declarations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Declared functions
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// One model call
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Persona instruction
    pub system_instruction: Option<String>,
    /// Full conversation so far, oldest first
    pub contents: Vec<Content>,
    /// Callable tools
    pub tools: Vec<Tool>,
}

impl ChatRequest {
    /// Request over `contents` with no persona and no tools
    #[must_use]
    pub const fn new(contents: Vec<Content>) -> Self {
        Self {
            system_instruction: None,
            contents,
            tools: Vec::new(),
        }
    }

    /// Set the persona instruction
    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Declare callable tools
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Prompt tokens
    pub prompt_tokens: u32,
    /// Generated tokens
    pub completion_tokens: u32,
}

/// Validated model answer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LlmResponse {
    /// Text parts concatenated, if any
    pub text: Option<String>,
    /// Requested function calls, in emission order
    pub function_calls: Vec<FunctionCall>,
    /// Provider finish reason
    pub finish_reason: Option<String>,
    /// Token usage
    pub usage: Option<TokenUsage>,
}

impl LlmResponse {
    /// Text-only answer
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Answer requesting function calls
    #[must_use]
    pub fn calls(function_calls: Vec<FunctionCall>) -> Self {
        Self {
            function_calls,
            ..Self::default()
        }
    }

    /// Whether the model wants tools run
    #[must_use]
    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}

/// Upstream model failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Prompt or answer blocked by safety filters
    #[error("content blocked: {reason}")]
    SafetyBlocked {
        /// Provider block reason
        reason: String,
    },
    /// HTTP 429
    #[error("rate limited by provider")]
    RateLimited,
    /// HTTP 503
    #[error("provider overloaded")]
    Overloaded,
    /// Bad or missing API key, or misconfigured project
    #[error("provider authentication failed: {0}")]
    Authentication(String),
    /// Any other non-success status
    #[error("provider API error ({status}): {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Provider message
        message: String,
    },
    /// Transport failure
    #[error("network error: {0}")]
    Network(String),
    /// Response did not match the expected shape
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::SafetyBlocked { reason } => Self::new(
                ErrorCode::ContentBlocked,
                format!("Desculpe, não posso responder a isso ({reason}). Vamos falar de outra coisa? 😊"),
            )
            .with_details(format!("Conteúdo bloqueado por: {reason}")),
            ProviderError::RateLimited => Self::new(
                ErrorCode::RateLimited,
                "Estou recebendo muitas mensagens agora, amor. Espera um minutinho e tenta de novo? 💖",
            ),
            ProviderError::Overloaded => Self::new(
                ErrorCode::ServiceUnavailable,
                "Meu cérebro está meio sobrecarregado agora, vida. Tenta de novo daqui a pouquinho? 😔",
            ),
            ProviderError::Authentication(details) => {
                error!("Generative-language API rejected the API key: {details}");
                Self::new(
                    ErrorCode::ExternalAuthFailed,
                    "Parece que há um problema com a minha conexão principal (API Key do Google). Vou precisar que meu criador verifique isso! 😱",
                )
                .with_details(
                    "Verifique a configuração da GOOGLE_API_KEY e se ela é válida.",
                )
            }
            ProviderError::Network(details) => Self::new(
                ErrorCode::ExternalServiceError,
                "Tive um problema de comunicação para buscar sua resposta, meu bem. 📶",
            )
            .with_details(details),
            other @ (ProviderError::Api { .. } | ProviderError::InvalidResponse(_)) => Self::new(
                ErrorCode::ExternalServiceError,
                "Oops, tive um probleminha aqui do meu lado e não consegui responder. Tenta de novo mais tarde, amor? 😢",
            )
            .with_details(other.to_string()),
        }
    }
}

/// A hosted generative-language model
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Model id in use
    fn model(&self) -> &str;

    /// Run one model call over the full conversation
    async fn generate(&self, request: &ChatRequest) -> Result<LlmResponse, ProviderError>;
}
