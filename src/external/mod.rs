// ABOUTME: Clients for third-party HTTP APIs consumed by tools
// ABOUTME: Currently the OpenWeatherMap current-weather endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

/// OpenWeatherMap client
pub mod weather_client;

pub use weather_client::{WeatherClient, WeatherError, WeatherQuery, WeatherReport};
