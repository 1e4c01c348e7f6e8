// ABOUTME: Luna chat server entry point
// ABOUTME: Loads configuration from the environment, applies CLI overrides and serves HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

//! # Luna Server
//!
//! ```bash
//! # Serve on PORT (default 3001) with DATABASE_URL
//! GOOGLE_API_KEY=... cargo run --bin luna-server
//!
//! # Override port and database
//! cargo run --bin luna-server -- --port 8080 --database-url sqlite:./data/dev.db
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use luna_chat_server::config::ServerConfig;
use luna_chat_server::logging::init_logging;
use luna_chat_server::resources::ServerResources;
use luna_chat_server::server::LunaServer;

#[derive(Parser)]
#[command(
    name = "luna-server",
    about = "Luna persona chat backend",
    long_about = "Chat backend for the Luna persona: Gemini tool calling, weather and datetime tools, persisted sessions"
)]
struct Args {
    /// HTTP port override
    #[arg(long)]
    port: Option<u16>,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env().context("Invalid configuration")?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    init_logging(&config.logging).context("Failed to initialize logging")?;
    info!(config = ?config, "Starting Luna server");

    let port = config.http_port;
    let resources = ServerResources::from_config(config)
        .await
        .context("Failed to initialize server resources")?;

    LunaServer::new(Arc::new(resources))
        .run(port)
        .await
        .context("Server error")?;
    Ok(())
}
