// ABOUTME: Configuration module root
// ABOUTME: Environment-driven server settings live in `environment`
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

/// Environment-based configuration
pub mod environment;

pub use environment::{
    ConversationConfig, LlmConfig, LogFormat, LogLevel, LoggingConfig, ServerConfig,
    WeatherConfig,
};
