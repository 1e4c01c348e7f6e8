// ABOUTME: Drives one chat turn through the model and any tool-calling rounds it requests
// ABOUTME: Bounded by a round cap and a per-turn timeout; tool errors stay in-band
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! # Conversation Orchestrator
//!
//! A turn moves through three states:
//!
//! - `AwaitingModel`: the full conversation is sent to the model.
//! - `DispatchingTools`: the model asked for function calls. All of them are run
//!   concurrently, the model's call entry and one batched function-response entry are
//!   appended, and the turn goes back to `AwaitingModel`.
//! - `Done`: the model answered without function calls; its text is the result.
//!
//! More than `max_tool_rounds` dispatch rounds fails the turn with
//! [`ErrorCode::ToolLoopExceeded`]. The whole turn also runs under a timeout; when it
//! fires, in-flight provider and tool calls are dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ConversationConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{ChatRequest, Content, LlmProvider, TokenUsage};
use crate::tools::ToolDispatcher;
use luna_core::models::{HistoryEntry, ToolCall};

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for the model
    AwaitingModel,
    /// Running requested tools
    DispatchingTools,
    /// Final text produced
    Done,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingModel => "awaiting_model",
            Self::DispatchingTools => "dispatching_tools",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Final assistant text
    pub text: String,
    /// Tool rounds that were dispatched
    pub tool_rounds: usize,
    /// Total tool calls executed
    pub tool_calls: usize,
    /// Usage reported on the final model call
    pub usage: Option<TokenUsage>,
}

/// Runs turns against a model with the registered tools
#[derive(Clone)]
pub struct ConversationOrchestrator {
    llm: Arc<dyn LlmProvider>,
    dispatcher: ToolDispatcher,
    max_tool_rounds: usize,
    turn_timeout: Duration,
}

impl ConversationOrchestrator {
    /// Build an orchestrator
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        dispatcher: ToolDispatcher,
        config: &ConversationConfig,
    ) -> Self {
        Self {
            llm,
            dispatcher,
            max_tool_rounds: config.max_tool_rounds,
            turn_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Tool registry in use
    #[must_use]
    pub const fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Produce the assistant reply for `prompt` given the prior `history`
    ///
    /// # Errors
    ///
    /// Provider failures (mapped through [`crate::llm::ProviderError`]), the round cap,
    /// and the turn timeout.
    pub async fn run_turn(
        &self,
        prompt: &str,
        history: &[HistoryEntry],
        system_instruction: &str,
    ) -> AppResult<TurnOutcome> {
        let mut contents = Content::from_history(history);
        contents.push(Content::user(prompt));

        if let Ok(result) = tokio::time::timeout(
            self.turn_timeout,
            self.run_tool_loop(contents, system_instruction),
        )
        .await
        {
            result
        } else {
            warn!(
                timeout_secs = self.turn_timeout.as_secs(),
                "Chat turn timed out"
            );
            Err(AppError::new(
                ErrorCode::Timeout,
                "Demorei demais para pensar na resposta, amor. Tenta de novo? 🥺",
            ))
        }
    }

    async fn run_tool_loop(
        &self,
        mut contents: Vec<Content>,
        system_instruction: &str,
    ) -> AppResult<TurnOutcome> {
        let tools = self.dispatcher.declarations();
        let mut tool_rounds = 0;
        let mut tool_calls = 0;

        loop {
            debug!(state = %TurnState::AwaitingModel, round = tool_rounds, model = self.llm.model(), "Calling model");
            let request = ChatRequest::new(contents.clone())
                .with_system_instruction(system_instruction)
                .with_tools(tools.clone());
            let response = self.llm.generate(&request).await?;

            if !response.has_function_calls() {
                let text = response.text.unwrap_or_default();
                if text.is_empty() {
                    warn!("Model finished the turn without text");
                }
                info!(
                    state = %TurnState::Done,
                    tool_rounds,
                    tool_calls,
                    "Chat turn completed"
                );
                return Ok(TurnOutcome {
                    text,
                    tool_rounds,
                    tool_calls,
                    usage: response.usage,
                });
            }

            if tool_rounds >= self.max_tool_rounds {
                warn!(
                    max_tool_rounds = self.max_tool_rounds,
                    "Model kept requesting tools past the round cap"
                );
                return Err(AppError::new(
                    ErrorCode::ToolLoopExceeded,
                    "Me enrolei um pouquinho tentando buscar essas informações, amor. Pode perguntar de novo de um jeito mais simples? 😅",
                )
                .with_details(format!(
                    "Limite de {} rodadas de ferramentas atingido",
                    self.max_tool_rounds
                )));
            }

            tool_rounds += 1;
            let calls: Vec<ToolCall> = response.function_calls.iter().map(ToolCall::from).collect();
            info!(
                state = %TurnState::DispatchingTools,
                round = tool_rounds,
                calls = calls.len(),
                "Executing tool calls"
            );

            let results = self.dispatcher.dispatch_all(&calls).await;
            tool_calls += results.len();

            contents.push(Content::model_calls(&response.function_calls));
            contents.push(Content::function_responses(&results));
        }
    }
}
