// ABOUTME: get_weather_for_city tool backed by the OpenWeatherMap client
// ABOUTME: Every lookup failure is turned into an in-band error result with a user-safe message
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::ChatTool;
use crate::external::{WeatherClient, WeatherError, WeatherQuery};
use luna_core::models::{ToolCall, ToolOutcome};

/// Tool name declared to the model
pub const WEATHER_TOOL_NAME: &str = "get_weather_for_city";

/// `get_weather_for_city({ cityName, stateCode?, countryCode? })`
#[derive(Clone)]
pub struct WeatherTool {
    client: WeatherClient,
}

impl WeatherTool {
    /// Wrap a weather client
    #[must_use]
    pub const fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

fn query_from_call(call: &ToolCall) -> WeatherQuery {
    WeatherQuery {
        city_name: call.str_arg("cityName").map(str::to_owned),
        state_code: call.str_arg("stateCode").map(str::to_owned),
        country_code: call.str_arg("countryCode").map(str::to_owned),
    }
}

fn search_details(query: &WeatherQuery) -> Value {
    serde_json::to_value(query).unwrap_or(Value::Null)
}

/// User-facing message for a failed lookup
#[must_use]
pub fn failure_message(err: &WeatherError, query: &WeatherQuery) -> String {
    match err {
        WeatherError::NotConfigured => "A funcionalidade de clima está temporariamente indisponível (problema de configuração da API Key).".to_owned(),
        WeatherError::MissingCity => "O nome da cidade não foi fornecido para a busca de clima.".to_owned(),
        WeatherError::InvalidApiKey => "Problema ao autenticar com o serviço de clima (API Key inválida).".to_owned(),
        WeatherError::NotFound => format!(
            "Não consegui encontrar informações do clima para \"{}\". Verifique se o nome está correto e completo.",
            query.display_name()
        ),
        WeatherError::Api { message, .. } => format!("Erro ao buscar o clima: {message}"),
        WeatherError::Network(_) | WeatherError::InvalidResponse(_) => {
            "Não consegui me conectar ao serviço de clima agora, tente mais tarde.".to_owned()
        }
    }
}

const fn provider_code(err: &WeatherError) -> Option<u16> {
    match err {
        WeatherError::InvalidApiKey => Some(401),
        WeatherError::NotFound => Some(404),
        WeatherError::Api { status, .. } => Some(*status),
        _ => None,
    }
}

#[async_trait]
impl ChatTool for WeatherTool {
    fn name(&self) -> &'static str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Obtém informações sobre o clima atual de uma cidade. Use quando o usuário perguntar sobre o tempo, o clima ou a temperatura em uma cidade nomeada. Extraia também o código do estado e o código do país quando o usuário os fornecer."
    }

    fn parameters(&self) -> Option<Value> {
        Some(json!({
            "type": "OBJECT",
            "properties": {
                "cityName": {
                    "type": "STRING",
                    "description": "Nome da cidade. Exemplos: 'Paris', 'Salvador', 'Ouro Preto'."
                },
                "stateCode": {
                    "type": "STRING",
                    "description": "Sigla do estado ou província, por exemplo 'SP', 'PR' ou 'CA'."
                },
                "countryCode": {
                    "type": "STRING",
                    "description": "Código do país com duas letras (ISO 3166), por exemplo 'BR' ou 'US'."
                }
            },
            "required": ["cityName"]
        }))
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutcome {
        let query = query_from_call(call);
        let details = search_details(&query);

        match self.client.current_weather(&query).await {
            Ok(report) => {
                info!(city = %report.city_name, country = %report.country, "Weather lookup succeeded");
                let mut payload = match serde_json::to_value(&report) {
                    Ok(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                payload.insert("searchDetails".to_owned(), details);
                ToolOutcome::Success(payload)
            }
            Err(err) => {
                warn!(query = %query.display_name(), error = %err, "Weather lookup failed");
                let mut context = Map::new();
                context.insert("searchDetails".to_owned(), details);
                if let Some(code) = provider_code(&err) {
                    context.insert("code".to_owned(), json!(code.to_string()));
                }
                ToolOutcome::Failure {
                    message: failure_message(&err, &query),
                    context,
                }
            }
        }
    }
}
