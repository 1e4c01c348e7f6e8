// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Scripted model provider, in-memory resources, weather stub server and request helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `luna_chat_server`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use luna_chat_server::config::{ServerConfig, WeatherConfig};
use luna_chat_server::database::Database;
use luna_chat_server::llm::{ChatRequest, LlmProvider, LlmResponse, ProviderError};
use luna_chat_server::resources::ServerResources;
use luna_chat_server::server::build_router;

pub const TEST_ADMIN_SECRET: &str = "segredo-de-teste";

/// Model stand-in answering from a script and recording every request
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<LlmResponse, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Result<LlmResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Provider that always asks for more tool calls
    pub fn endless(response: LlmResponse, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(response.clone())).collect())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: &ChatRequest) -> Result<LlmResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::InvalidResponse("script exhausted".to_owned())))
    }
}

/// Configuration pointing at in-memory storage and no real upstreams
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig {
        database_url: "sqlite::memory:".to_owned(),
        admin_secret: Some(TEST_ADMIN_SECRET.to_owned()),
        ..ServerConfig::default()
    };
    config.llm.api_key = "test-key".to_owned();
    config
}

pub async fn create_test_database() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

pub async fn create_test_resources_with(
    config: ServerConfig,
    provider: Arc<ScriptedProvider>,
) -> Arc<ServerResources> {
    let database = Database::new(&config.database_url).await.unwrap();
    Arc::new(ServerResources::new(config, database, provider).unwrap())
}

pub async fn create_test_resources(provider: Arc<ScriptedProvider>) -> Arc<ServerResources> {
    create_test_resources_with(test_config(), provider).await
}

pub async fn create_test_router(provider: Arc<ScriptedProvider>) -> (Router, Arc<ServerResources>) {
    let resources = create_test_resources(provider).await;
    (build_router(&resources), resources)
}

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_stub_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn weather_config(base_url: &str) -> WeatherConfig {
    WeatherConfig {
        api_key: Some("weather-key".to_owned()),
        base_url: base_url.to_owned(),
        timeout_secs: 5,
    }
}

/// Send a request through the router and decode the JSON body (`Null` when empty)
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
