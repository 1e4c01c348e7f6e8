// ABOUTME: Ephemeral tool-call request and result types exchanged with the language model
// ABOUTME: ToolOutcome makes the success/error split explicit instead of duck-typed JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A function invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Declared function name
    pub name: String,
    /// Arguments object (empty when the model sent none)
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl ToolCall {
    /// Build a call from a name and a JSON value; non-object args become empty
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        let args = match args {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            args,
        }
    }

    /// Non-blank string argument
    #[must_use]
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Outcome of a tool handler
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Domain payload (always a JSON object)
    Success(Map<String, Value>),
    /// In-band failure the model can narrate
    Failure {
        /// User-safe explanation
        message: String,
        /// Extra context fields (search details, provider code)
        context: Map<String, Value>,
    },
}

impl ToolOutcome {
    /// Failure without extra context
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            context: Map::new(),
        }
    }

    /// Whether this is a failure
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// JSON object sent back to the model: the payload, or `{ error: true, message, .. }`
    #[must_use]
    pub fn to_response(&self) -> Value {
        match self {
            Self::Success(payload) => Value::Object(payload.clone()),
            Self::Failure { message, context } => {
                let mut obj = context.clone();
                obj.insert("error".to_owned(), Value::Bool(true));
                obj.insert("message".to_owned(), Value::String(message.clone()));
                Value::Object(obj)
            }
        }
    }
}

/// Result of one tool call, ready to be batched back to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Name of the function that was called
    pub name: String,
    /// What happened
    pub outcome: ToolOutcome,
}

impl ToolResult {
    /// Pair a name with an outcome
    pub fn new(name: impl Into<String>, outcome: ToolOutcome) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }

    /// Response mapping for the model
    #[must_use]
    pub fn response(&self) -> Value {
        self.outcome.to_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_response_shape() {
        let mut context = Map::new();
        context.insert("code".to_owned(), json!("404"));
        let result = ToolResult::new(
            "get_weather_for_city",
            ToolOutcome::Failure {
                message: "não encontrei".to_owned(),
                context,
            },
        );
        let response = result.response();
        assert_eq!(response["error"], json!(true));
        assert_eq!(response["message"], json!("não encontrei"));
        assert_eq!(response["code"], json!("404"));
    }

    #[test]
    fn test_non_object_args_are_dropped() {
        let call = ToolCall::new("x", json!("oops"));
        assert!(call.args.is_empty());
        let call = ToolCall::new("x", json!({"cityName": "  "}));
        assert_eq!(call.str_arg("cityName"), None);
    }
}
