// ABOUTME: Current date and time in America/Sao_Paulo rendered in Brazilian Portuguese
// ABOUTME: Shared by the datetime tool and the /api/datetime endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::America::Sao_Paulo;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::ChatTool;
use luna_core::models::{ToolCall, ToolOutcome};

/// Tool name declared to the model
pub const DATETIME_TOOL_NAME: &str = "get_current_sao_paulo_datetime";

const WEEKDAYS: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

/// Long pt-BR rendering, e.g. `sexta-feira, 26 de abril de 2024 às 15:30:00`
///
/// Seconds are omitted when `with_seconds` is false.
#[must_use]
pub fn format_sao_paulo(instant: DateTime<Utc>, with_seconds: bool) -> String {
    let local = Sao_Paulo.from_utc_datetime(&instant.naive_utc());
    let month = MONTHS[local.month0() as usize];
    let time = if with_seconds {
        format!(
            "{:02}:{:02}:{:02}",
            local.hour(),
            local.minute(),
            local.second()
        )
    } else {
        format!("{:02}:{:02}", local.hour(), local.minute())
    };
    format!(
        "{}, {:02} de {} de {} às {}",
        weekday_name(local.weekday()),
        local.day(),
        month,
        local.year(),
        time
    )
}

/// `get_current_sao_paulo_datetime`: no arguments, returns `{ currentDateTime }`
#[derive(Debug, Default, Clone, Copy)]
pub struct SaoPauloDateTimeTool;

#[async_trait]
impl ChatTool for SaoPauloDateTimeTool {
    fn name(&self) -> &'static str {
        DATETIME_TOOL_NAME
    }

    fn description(&self) -> &'static str {
        "Obtém a data e hora atuais em São Paulo, Brasil. Use quando o usuário perguntar que dia é hoje, que horas são ou a data atual."
    }

    fn parameters(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, _call: &ToolCall) -> ToolOutcome {
        let formatted = format_sao_paulo(Utc::now(), true);
        debug!(datetime = %formatted, "Resolved Sao Paulo datetime");
        let mut payload = Map::new();
        payload.insert("currentDateTime".to_owned(), json!(formatted));
        ToolOutcome::Success(payload)
    }
}
