// ABOUTME: Re-export of the unified error system defined in luna-core
// ABOUTME: Lets server modules write `crate::errors::AppError` regardless of where it lives
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

pub use luna_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
