// ABOUTME: Service objects built once at startup and shared with every request handler
// ABOUTME: Holds configuration, database, model client and the conversation orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::conversation::ConversationOrchestrator;
use crate::database::Database;
use crate::errors::AppResult;
use crate::external::WeatherClient;
use crate::llm::{default_persona_instruction, GeminiProvider, LlmProvider};
use crate::tools::ToolDispatcher;

/// Shared server state
#[derive(Clone)]
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Database pool
    pub database: Database,
    /// Turn driver
    pub orchestrator: ConversationOrchestrator,
}

impl ServerResources {
    /// Wire services around an already-built model client
    ///
    /// # Errors
    ///
    /// Returns an error if the weather HTTP client cannot be built.
    pub fn new(
        config: ServerConfig,
        database: Database,
        llm: Arc<dyn LlmProvider>,
    ) -> AppResult<Self> {
        if !config.weather_enabled() {
            warn!("OPENWEATHERMAP_API_KEY not configured; weather lookups will report a configuration problem");
        }
        let weather = WeatherClient::new(config.weather.clone())?;
        let dispatcher = ToolDispatcher::with_default_tools(weather);
        info!(
            provider = llm.name(),
            model = llm.model(),
            tools = ?dispatcher.tool_names(),
            "Conversation services ready"
        );
        let orchestrator = ConversationOrchestrator::new(llm, dispatcher, &config.conversation);

        Ok(Self {
            config: Arc::new(config),
            database,
            orchestrator,
        })
    }

    /// Connect the database and the Gemini client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database or either HTTP client cannot be set up.
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database_url).await?;
        let llm: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::new(&config.llm)?);
        Self::new(config, database, llm)
    }

    /// Persona instruction in effect and whether it is the built-in default
    ///
    /// # Errors
    ///
    /// Returns an error if the settings table cannot be read.
    pub async fn persona_instruction(&self) -> AppResult<(String, bool)> {
        Ok(
            match self.database.system_settings().persona_instruction().await? {
                Some(custom) => (custom, false),
                None => (default_persona_instruction().to_owned(), true),
            },
        )
    }
}
