// ABOUTME: Environment-based server configuration with typed sections and validation
// ABOUTME: Reads PORT, DATABASE_URL, provider keys, admin secret, loop cap and logging settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! Environment-only configuration
//!
//! The process environment is the single source of truth. Every section has a
//! `Default` so tests can build a `ServerConfig` literal with `..Default::default()`.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};
use luna_core::models::DEFAULT_BOT_ID;

/// Placeholder shipped in sample `.env` files for the Gemini key
pub const GOOGLE_API_KEY_PLACEHOLDER: &str = "SUA_CHAVE_GOOGLE_AI_AQUI";
/// Placeholder shipped in sample `.env` files for the weather key
pub const WEATHER_API_KEY_PLACEHOLDER: &str = "SUA_CHAVE_OPENWEATHERMAP_AQUI";

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 3001;
/// Default SQLite location
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/luna.db";
/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
/// Default Gemini API base
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default OpenWeatherMap API base
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
/// Default cap on tool-calling rounds per turn
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;
/// Default time budget for one generate turn
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
/// Upper bound accepted for `REQUEST_TIMEOUT_SECS`
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Normal operation
    #[default]
    Info,
    /// Verbose
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `EnvFilter`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging section
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Verbosity used when `RUST_LOG` is not set
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
}

/// Generative-language provider section
#[derive(Clone)]
pub struct LlmConfig {
    /// Gemini API key
    pub api_key: String,
    /// Model id
    pub model: String,
    /// API base URL (overridable for tests)
    pub base_url: String,
    /// HTTP timeout for one model call
    pub timeout_secs: u64,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_owned(),
            timeout_secs: 45,
        }
    }
}

/// Weather provider section
#[derive(Clone)]
pub struct WeatherConfig {
    /// OpenWeatherMap key; `None` disables the weather tool
    pub api_key: Option<String>,
    /// API base URL (overridable for tests)
    pub base_url: String,
    /// HTTP timeout for one lookup
    pub timeout_secs: u64,
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_WEATHER_BASE_URL.to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Conversation orchestration section
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Maximum tool-calling rounds before giving up
    pub max_tool_rounds: usize,
    /// Time budget for a whole generate turn
    pub request_timeout_secs: u64,
    /// Bot id stored on new sessions
    pub bot_id: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            bot_id: DEFAULT_BOT_ID.to_owned(),
        }
    }
}

/// Complete server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Shared secret for admin routes; `None` disables them
    pub admin_secret: Option<String>,
    /// Model provider
    pub llm: LlmConfig,
    /// Weather provider
    pub weather: WeatherConfig,
    /// Tool loop and turn limits
    pub conversation: ConversationConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_port", &self.http_port)
            .field("database_url", &self.database_url)
            .field("admin_secret", &self.admin_secret.as_ref().map(|_| "[REDACTED]"))
            .field("llm", &self.llm)
            .field("weather", &self.weather)
            .field("conversation", &self.conversation)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            admin_secret: None,
            llm: LlmConfig::default(),
            weather: WeatherConfig::default(),
            conversation: ConversationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `GOOGLE_API_KEY` is missing or still the placeholder,
    /// or if a numeric variable cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let api_key = var("GOOGLE_API_KEY")
            .filter(|k| k != GOOGLE_API_KEY_PLACEHOLDER)
            .ok_or_else(|| {
                AppError::config("GOOGLE_API_KEY is not set or still holds the placeholder value")
            })?;

        let defaults = Self::default();

        let llm = LlmConfig {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or(defaults.llm.model),
            base_url: var("GEMINI_BASE_URL").unwrap_or(defaults.llm.base_url),
            timeout_secs: parse_var(&var, "GEMINI_TIMEOUT_SECS", defaults.llm.timeout_secs)?,
        };

        let weather = WeatherConfig {
            api_key: var("OPENWEATHERMAP_API_KEY").filter(|k| k != WEATHER_API_KEY_PLACEHOLDER),
            base_url: var("OPENWEATHERMAP_BASE_URL").unwrap_or(defaults.weather.base_url),
            timeout_secs: parse_var(
                &var,
                "OPENWEATHERMAP_TIMEOUT_SECS",
                defaults.weather.timeout_secs,
            )?,
        };

        let max_tool_rounds: usize = parse_var(
            &var,
            "MAX_TOOL_ROUNDS",
            defaults.conversation.max_tool_rounds,
        )?;
        if max_tool_rounds == 0 {
            return Err(AppError::config("MAX_TOOL_ROUNDS must be at least 1"));
        }

        let request_timeout_secs: u64 = parse_var(
            &var,
            "REQUEST_TIMEOUT_SECS",
            defaults.conversation.request_timeout_secs,
        )?;
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&request_timeout_secs) {
            return Err(AppError::config(format!(
                "REQUEST_TIMEOUT_SECS must be between 1 and {MAX_REQUEST_TIMEOUT_SECS}"
            )));
        }

        let conversation = ConversationConfig {
            max_tool_rounds,
            request_timeout_secs,
            bot_id: var("BOT_ID").unwrap_or(defaults.conversation.bot_id),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL")
                .map(|l| LogLevel::from_str_or_default(&l))
                .unwrap_or_default(),
            format: match var("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Self {
            http_port: parse_var(&var, "PORT", defaults.http_port)?,
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            admin_secret: var("ADMIN_SECRET"),
            llm,
            weather,
            conversation,
            logging,
        })
    }

    /// Whether the weather tool can reach its provider
    #[must_use]
    pub const fn weather_enabled(&self) -> bool {
        self.weather.api_key.is_some()
    }
}

fn parse_var<T, V>(var: &V, key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    var(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|_| AppError::config(format!("{key} has an invalid value: {raw}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = ServerConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "abc")])).unwrap();
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(config.llm.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.conversation.max_tool_rounds, 5);
        assert_eq!(config.conversation.bot_id, DEFAULT_BOT_ID);
        assert!(!config.weather_enabled());
        assert!(config.admin_secret.is_none());
    }

    #[test]
    fn test_missing_or_placeholder_google_key_is_fatal() {
        assert!(ServerConfig::from_lookup(lookup(&[])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[(
            "GOOGLE_API_KEY",
            GOOGLE_API_KEY_PLACEHOLDER
        )]))
        .is_err());
    }

    #[test]
    fn test_weather_placeholder_disables_tool() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "abc"),
            ("OPENWEATHERMAP_API_KEY", WEATHER_API_KEY_PLACEHOLDER),
        ]))
        .unwrap();
        assert!(!config.weather_enabled());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "abc"),
            ("PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.message.contains("PORT"));

        assert!(ServerConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "abc"),
            ("MAX_TOOL_ROUNDS", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn test_request_timeout_bounds() {
        for raw in ["0", "601", "18446744073709551615"] {
            let err = ServerConfig::from_lookup(lookup(&[
                ("GOOGLE_API_KEY", "abc"),
                ("REQUEST_TIMEOUT_SECS", raw),
            ]))
            .unwrap_err();
            assert!(err.message.contains("REQUEST_TIMEOUT_SECS"), "{raw}");
        }

        let config = ServerConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "abc"),
            ("REQUEST_TIMEOUT_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(config.conversation.request_timeout_secs, MAX_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "super-secret-key"),
            ("ADMIN_SECRET", "admin-pass"),
        ]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret-key"));
        assert!(!rendered.contains("admin-pass"));
    }
}
