// ABOUTME: OpenWeatherMap current-weather client used by the weather tool
// ABOUTME: Builds the city query, validates the payload and classifies provider failures

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! OpenWeatherMap Client
//!
//! A single `GET {base}/weather?q=..&appid=..&units=metric&lang=pt_br` call. The
//! query is the URL-encoded city, optionally followed by a state code and a
//! two-letter country code, joined with commas.
//!
//! The provider's JSON is deserialized into private structs and reduced to a
//! [`WeatherReport`]; anything else becomes a [`WeatherError`].
//!
//! # Example
//! ```rust,no_run
//! use luna_chat_server::config::WeatherConfig;
//! use luna_chat_server::external::weather_client::{WeatherClient, WeatherQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WeatherClient::new(WeatherConfig {
//!     api_key: Some("your_api_key".to_owned()),
//!     ..WeatherConfig::default()
//! })?;
//! let report = client
//!     .current_weather(&WeatherQuery::new("Londrina").with_state("PR").with_country("BR"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::WeatherConfig;
use crate::errors::{AppError, AppResult};

/// What the caller asked to look up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherQuery {
    /// City name as the user wrote it
    pub city_name: Option<String>,
    /// State or province code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,
    /// ISO 3166 alpha-2 country code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl WeatherQuery {
    /// Query for a city with no state or country
    pub fn new(city: impl Into<String>) -> Self {
        Self {
            city_name: Some(city.into()),
            ..Self::default()
        }
    }

    /// Narrow by state code
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state_code = Some(state.into());
        self
    }

    /// Narrow by country code
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country_code = Some(country.into());
        self
    }

    /// City name, if a non-blank one was given
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        non_blank(self.city_name.as_deref())
    }

    /// Provider `q` parameter: each present part URL-encoded, joined with commas
    ///
    /// Returns `None` when there is no city.
    #[must_use]
    pub fn to_query_string(&self) -> Option<String> {
        let city = self.city()?;
        let parts = std::iter::once(city)
            .chain(non_blank(self.state_code.as_deref()))
            .chain(non_blank(self.country_code.as_deref()));
        Some(
            parts
                .map(|p| urlencoding::encode(p).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Human-readable "city, state, country" used in messages
    #[must_use]
    pub fn display_name(&self) -> String {
        std::iter::once(self.city_name.as_deref().unwrap_or_default())
            .chain(non_blank(self.state_code.as_deref()))
            .chain(non_blank(self.country_code.as_deref()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Normalized current conditions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    /// City name as corrected by the provider
    pub city_name: String,
    /// Country code reported by the provider
    pub country: String,
    /// Condition description, first letter capitalized
    pub description: String,
    /// Temperature in °C
    pub temperature: f64,
    /// Apparent temperature in °C
    pub feels_like: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Provider icon code
    pub icon: String,
}

/// Weather lookup failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WeatherError {
    /// No API key configured
    #[error("weather API key not configured")]
    NotConfigured,
    /// Query had no city
    #[error("city name missing")]
    MissingCity,
    /// Provider rejected the key
    #[error("weather provider rejected the API key")]
    InvalidApiKey,
    /// Provider does not know the place
    #[error("city not found")]
    NotFound,
    /// Any other non-success answer
    #[error("weather provider error ({status}): {message}")]
    Api {
        /// Provider status code
        status: u16,
        /// Provider message
        message: String,
    },
    /// Provider unreachable
    #[error("weather provider unreachable: {0}")]
    Network(String),
    /// Success status with an unexpected body
    #[error("unexpected weather payload: {0}")]
    InvalidResponse(String),
}

// Provider payload (internal)
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    sys: SysSection,
    #[serde(default)]
    weather: Vec<ConditionSection>,
    main: MainSection,
    wind: Option<WindSection>,
}

#[derive(Debug, Deserialize)]
struct SysSection {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ConditionSection {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct WindSection {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

impl From<CurrentWeatherResponse> for WeatherReport {
    fn from(raw: CurrentWeatherResponse) -> Self {
        let condition = raw.weather.into_iter().next();
        let (description, icon) = condition.map_or_else(
            || (String::new(), String::new()),
            |c| (capitalize_first(&c.description), c.icon),
        );
        Self {
            city_name: raw.name,
            country: raw.sys.country,
            description,
            temperature: raw.main.temp,
            feels_like: raw.main.feels_like,
            humidity: raw.main.humidity,
            wind_speed: raw.wind.map_or(0.0, |w| w.speed),
            icon,
        }
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// OpenWeatherMap client
#[derive(Clone)]
pub struct WeatherClient {
    config: WeatherConfig,
    http: Client,
}

impl WeatherClient {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: WeatherConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::external_service("o serviço de clima", format!("HTTP client setup failed: {e}"))
            })?;
        Ok(Self { config, http })
    }

    /// Whether an API key is available
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Fetch current conditions
    ///
    /// # Errors
    ///
    /// See [`WeatherError`] for the failure cases.
    pub async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(WeatherError::NotConfigured)?;
        let q = query.to_query_string().ok_or(WeatherError::MissingCity)?;

        let base = self.config.base_url.trim_end_matches('/');
        let url = format!(
            "{base}/weather?q={q}&appid={}&units=metric&lang=pt_br",
            urlencoding::encode(api_key)
        );
        debug!(url = %format!("{base}/weather?q={q}&appid=[REDACTED]&units=metric&lang=pt_br"), "Weather lookup");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ProviderErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_default();
            warn!(status = status.as_u16(), query = %q, message = %message, "Weather provider returned an error");
            return Err(match status {
                StatusCode::UNAUTHORIZED => WeatherError::InvalidApiKey,
                StatusCode::NOT_FOUND => WeatherError::NotFound,
                _ => WeatherError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let raw: CurrentWeatherResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::InvalidResponse(e.to_string()))?;
        Ok(WeatherReport::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_city_only() {
        assert_eq!(
            WeatherQuery::new("Paris").to_query_string().as_deref(),
            Some("Paris")
        );
    }

    #[test]
    fn test_query_with_state_and_country() {
        let query = WeatherQuery::new("Londrina").with_state("PR").with_country("BR");
        assert_eq!(query.to_query_string().as_deref(), Some("Londrina,PR,BR"));
        assert_eq!(query.display_name(), "Londrina, PR, BR");
    }

    #[test]
    fn test_query_encodes_each_part() {
        let query = WeatherQuery::new("São Paulo").with_country("BR");
        assert_eq!(
            query.to_query_string().as_deref(),
            Some("S%C3%A3o%20Paulo,BR")
        );
    }

    #[test]
    fn test_query_blank_parts_skipped() {
        let query = WeatherQuery::new("Ouro Preto").with_state("  ");
        assert_eq!(query.to_query_string().as_deref(), Some("Ouro%20Preto"));
        assert_eq!(WeatherQuery::new("   ").to_query_string(), None);
        assert_eq!(WeatherQuery::default().to_query_string(), None);
    }

    #[test]
    fn test_report_from_payload() {
        let raw: CurrentWeatherResponse = serde_json::from_value(serde_json::json!({
            "name": "Londrina",
            "sys": {"country": "BR"},
            "weather": [{"description": "céu limpo", "icon": "01d"}],
            "main": {"temp": 27.4, "feels_like": 28.1, "humidity": 48},
            "wind": {"speed": 3.6},
            "cod": 200
        }))
        .unwrap();
        let report = WeatherReport::from(raw);
        assert_eq!(report.city_name, "Londrina");
        assert_eq!(report.description, "Céu limpo");
        assert!((report.humidity - 48.0).abs() < f64::EPSILON);
        assert_eq!(report.icon, "01d");
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = WeatherClient::new(WeatherConfig::default()).unwrap();
        assert!(!client.is_configured());
        let err = client
            .current_weather(&WeatherQuery::new("Paris"))
            .await
            .unwrap_err();
        assert_eq!(err, WeatherError::NotConfigured);
    }
}
