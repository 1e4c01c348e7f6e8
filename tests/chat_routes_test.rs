// ABOUTME: Integration tests for the generate, history, datetime, log and health HTTP routes
// ABOUTME: Requests go through the full router with a scripted model and in-memory SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{
    create_test_resources_with, create_test_router, send, test_config, ScriptedProvider,
};
use luna_chat_server::server::build_router;
use luna_chat_server::llm::{FunctionCall, LlmResponse, ProviderError};
use luna_chat_server::models::{ChatMessage, DEFAULT_BOT_ID};
use luna_chat_server::tools::DATETIME_TOOL_NAME;

#[tokio::test]
async fn test_generate_requires_prompt_and_session() {
    let (router, _) = create_test_router(Arc::new(ScriptedProvider::default())).await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({"sessionId": "s"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Mensagem (prompt) é obrigatória"));

    let (status, _) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({"prompt": "oi"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_persists_turn() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(LlmResponse::calls(vec![FunctionCall::new(
            DATETIME_TOOL_NAME,
            json!({}),
        )])),
        Ok(LlmResponse::text("Hoje é sexta, amor!")),
    ]));
    let (router, resources) = create_test_router(provider.clone()).await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({"prompt": "que dia é hoje?", "sessionId": "sess-1"})),
        &[("x-forwarded-for", "198.51.100.4")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generatedText"], json!("Hoje é sexta, amor!"));

    let session = resources
        .database
        .chat_sessions()
        .get_session("sess-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.message_count, 2);
    assert_eq!(session.messages[0].text, "que dia é hoje?");
    assert_eq!(session.messages[1].text, "Hoje é sexta, amor!");
    assert_eq!(session.user_ip, "198.51.100.4");
    assert_eq!(session.bot_id, DEFAULT_BOT_ID);
}

#[tokio::test]
async fn test_stored_history_wins_over_client_history() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(LlmResponse::text("certo"))]));
    let (router, resources) = create_test_router(provider.clone()).await;
    let now = Utc::now();
    resources
        .database
        .chat_sessions()
        .append_turn(
            "sess-2",
            "127.0.0.1",
            DEFAULT_BOT_ID,
            ChatMessage::user("do servidor", now),
            ChatMessage::ai("resposta do servidor", now),
        )
        .await
        .unwrap();

    let (status, _) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({
            "prompt": "e agora?",
            "sessionId": "sess-2",
            "history": [{"sender": "user", "text": "do cliente"}]
        })),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = &provider.requests()[0];
    assert_eq!(request.contents.len(), 3);
    assert_eq!(request.contents[0].text(), "do servidor");
    assert_eq!(request.contents[1].text(), "resposta do servidor");
}

#[tokio::test]
async fn test_client_history_used_for_new_session() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(LlmResponse::text("certo"))]));
    let (router, _) = create_test_router(provider.clone()).await;

    let (status, _) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({
            "prompt": "e agora?",
            "sessionId": "nova",
            "history": [
                {"sender": "user", "text": "oi"},
                {"sender": "ai", "text": "oi, vida"}
            ]
        })),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(provider.requests()[0].contents.len(), 3);
}

#[tokio::test]
async fn test_generate_safety_block_is_400_and_not_stored() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(
        ProviderError::SafetyBlocked {
            reason: "SAFETY".to_owned(),
        },
    )]));
    let (router, resources) = create_test_router(provider).await;

    let (status, body) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({"prompt": "algo ruim", "sessionId": "sess-3"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("SAFETY"));
    assert_eq!(body["details"], json!("Conteúdo bloqueado por: SAFETY"));
    assert!(resources
        .database
        .chat_sessions()
        .get_session("sess-3")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_generate_rate_limit_passthrough() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::RateLimited)]));
    let (router, _) = create_test_router(provider).await;
    let (status, body) = send(
        &router,
        "POST",
        "/api/generate",
        Some(json!({"prompt": "oi", "sessionId": "s"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_history_routes() {
    let (router, resources) = create_test_router(Arc::new(ScriptedProvider::default())).await;
    let now = Utc::now();
    resources
        .database
        .chat_sessions()
        .append_turn(
            "hist-1",
            "127.0.0.1",
            DEFAULT_BOT_ID,
            ChatMessage::user("primeira", now),
            ChatMessage::ai("segunda", now),
        )
        .await
        .unwrap();

    let (status, body) = send(&router, "GET", "/api/chat/historicos?limit=10", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessions"][0]["sessionId"], json!("hist-1"));
    assert_eq!(body["sessions"][0]["firstUserMessage"], json!("primeira"));
    assert_eq!(body["sessions"][0]["messageCount"], json!(2));

    let (status, body) = send(&router, "GET", "/api/chat/historicos/hist-1", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][1]["sender"], json!("ai"));
    assert_eq!(body["userIP"], json!("127.0.0.1"));

    let (status, body) = send(&router, "GET", "/api/chat/historicos/nao-existe", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], json!("nao-existe"));
    assert_eq!(body["messages"], json!([]));
    assert_eq!(body["messageCount"], json!(0));

    let (status, _) = send(&router, "DELETE", "/api/chat/historicos/hist-1", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&router, "DELETE", "/api/chat/historicos/hist-1", None, &[]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_datetime_route() {
    let (router, _) = create_test_router(Arc::new(ScriptedProvider::default())).await;
    let (status, body) = send(&router, "GET", "/api/datetime", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    let datetime = body["datetime"].as_str().unwrap();
    assert!(datetime.contains(" às "));
    // minutes precision: HH:MM at the end
    assert_eq!(datetime.rsplit(' ').next().unwrap().len(), 5);
    assert!(body["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_log_connection_route() {
    let (router, resources) = create_test_router(Arc::new(ScriptedProvider::default())).await;

    let (status, _) = send(
        &router,
        "POST",
        "/api/log-connection",
        Some(json!({"acao": "acesso_site"})),
        &[("x-forwarded-for", "192.0.2.10")],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &router,
        "POST",
        "/api/log-connection",
        Some(json!({"ip": "192.0.2.11"})),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(resources.database.access_logs().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_health_route() {
    let (router, _) = create_test_router(Arc::new(ScriptedProvider::default())).await;
    let (status, body) = send(&router, "GET", "/health", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["database"], json!("up"));
}

#[tokio::test]
async fn test_body_without_json_content_type_gets_error_envelope() {
    let (router, _) = create_test_router(Arc::new(ScriptedProvider::default())).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .body(Body::from(r#"{"prompt":"oi","sessionId":"s"}"#))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], json!("Corpo da requisição inválido."));
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Content-Type"));
}

#[tokio::test]
async fn test_malformed_json_and_query_get_error_envelope() {
    let (router, _) = create_test_router(Arc::new(ScriptedProvider::default())).await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/log-connection")
        .header("content-type", "application/json")
        .body(Body::from("{nao é json"))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, "GET", "/api/chat/historicos?limit=abc", None, &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Parâmetros de consulta inválidos."));
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_router_builds_with_huge_turn_timeout() {
    let mut config = test_config();
    config.conversation.request_timeout_secs = u64::MAX;
    let resources =
        create_test_resources_with(config, Arc::new(ScriptedProvider::default())).await;
    let router = build_router(&resources);

    let (status, _) = send(&router, "GET", "/health", None, &[]).await;
    assert_eq!(status, StatusCode::OK);
}
