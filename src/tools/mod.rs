// ABOUTME: Tool registry and dispatcher for model-requested function calls
// ABOUTME: Dispatch never fails; unknown names and handler errors become in-band error results
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! # Tools
//!
//! Each callable function implements [`ChatTool`]. The [`ToolDispatcher`] owns the
//! registered tools, exposes their declarations to the model, and resolves
//! [`ToolCall`]s into [`ToolResult`]s.

/// Sao Paulo date and time tool
pub mod datetime;
/// City weather tool
pub mod weather;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::external::WeatherClient;
use crate::llm::{FunctionDeclaration, Tool};
use luna_core::models::{ToolCall, ToolOutcome, ToolResult};

pub use datetime::{format_sao_paulo, SaoPauloDateTimeTool, DATETIME_TOOL_NAME};
pub use weather::{WeatherTool, WEATHER_TOOL_NAME};

/// A function the model may call
#[async_trait]
pub trait ChatTool: Send + Sync {
    /// Name the model uses to call it
    fn name(&self) -> &'static str;

    /// When the model should call it
    fn description(&self) -> &'static str;

    /// JSON schema of the arguments, `None` for argument-less tools
    fn parameters(&self) -> Option<Value>;

    /// Run the tool; failures are reported as [`ToolOutcome::Failure`]
    async fn execute(&self, call: &ToolCall) -> ToolOutcome;

    /// Declaration sent to the model
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_owned(),
            description: self.description().to_owned(),
            parameters: self.parameters(),
        }
    }
}

/// Registry of callable tools
#[derive(Clone, Default)]
pub struct ToolDispatcher {
    tools: HashMap<&'static str, Arc<dyn ChatTool>>,
    order: Vec<&'static str>,
}

impl ToolDispatcher {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the datetime and weather tools
    #[must_use]
    pub fn with_default_tools(weather: WeatherClient) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Arc::new(SaoPauloDateTimeTool));
        dispatcher.register(Arc::new(WeatherTool::new(weather)));
        dispatcher
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: Arc<dyn ChatTool>) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_none() {
            self.order.push(name);
        }
    }

    /// Registered names in registration order
    #[must_use]
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    /// Declarations grouped as the model expects them
    #[must_use]
    pub fn declarations(&self) -> Vec<Tool> {
        if self.order.is_empty() {
            return Vec::new();
        }
        vec![Tool {
            function_declarations: self
                .order
                .iter()
                .filter_map(|name| self.tools.get(name))
                .map(|tool| tool.declaration())
                .collect(),
        }]
    }

    /// Resolve one call
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.tools.get(call.name.as_str()) else {
            warn!(tool = %call.name, "Model requested an unknown tool");
            return ToolResult::new(
                call.name.clone(),
                ToolOutcome::failure(format!(
                    "Função {} não implementada no backend.",
                    call.name
                )),
            );
        };

        debug!(tool = %call.name, args = ?call.args, "Dispatching tool call");
        let outcome = tool.execute(call).await;
        if outcome.is_error() {
            debug!(tool = %call.name, "Tool returned an in-band error");
        }
        ToolResult::new(call.name.clone(), outcome)
    }

    /// Resolve every call of a round concurrently; results keep the call order
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.dispatch(call))).await
    }
}
