// ABOUTME: Integration tests for the SQLite session store, settings and access logs
// ABOUTME: Covers upsert semantics, ordering, listing previews, deletion and counters
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Luna Chat

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, TimeZone, Utc};

use common::create_test_database;
use luna_chat_server::models::{ChatMessage, Sender, DEFAULT_BOT_ID};

#[tokio::test]
async fn test_missing_session_is_none() {
    let db = create_test_database().await;
    assert!(db.chat_sessions().get_session("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_append_turns_round_trip_in_order() {
    let db = create_test_database().await;
    let sessions = db.chat_sessions();
    let base = Utc.with_ymd_and_hms(2024, 4, 26, 15, 0, 0).unwrap();

    for i in 0..3 {
        let at = base + Duration::seconds(i * 10);
        sessions
            .append_turn(
                "s-1",
                "10.0.0.1",
                DEFAULT_BOT_ID,
                ChatMessage::user(format!("pergunta {i}"), at),
                ChatMessage::ai(format!("resposta {i}"), at + Duration::seconds(1)),
            )
            .await
            .unwrap();
    }

    let session = sessions.get_session("s-1").await.unwrap().unwrap();
    assert_eq!(session.message_count, 6);
    assert_eq!(session.messages.len(), 6);
    for i in 0..3 {
        let user = &session.messages[i * 2];
        let ai = &session.messages[i * 2 + 1];
        assert_eq!(user.sender, Sender::User);
        assert_eq!(user.text, format!("pergunta {i}"));
        assert_eq!(ai.sender, Sender::Ai);
        assert_eq!(ai.text, format!("resposta {i}"));
    }

    // start_time comes from the first user message and never moves
    assert_eq!(session.start_time, base);
    assert_eq!(session.user_ip, "10.0.0.1");
    let end = session.end_time.unwrap();
    assert_eq!(session.duration, Some((end - base).num_seconds()));

    let history = session.history();
    assert_eq!(history.len(), 6);
    assert_eq!(history[0].sender.llm_role(), "user");
    assert_eq!(history[1].sender.llm_role(), "model");
}

#[tokio::test]
async fn test_first_writer_keeps_start_time_and_ip() {
    let db = create_test_database().await;
    let sessions = db.chat_sessions();
    let first = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

    sessions
        .append_turn(
            "s-2",
            "1.1.1.1",
            DEFAULT_BOT_ID,
            ChatMessage::user("oi", first),
            ChatMessage::ai("olá", first),
        )
        .await
        .unwrap();
    sessions
        .append_turn(
            "s-2",
            "2.2.2.2",
            "outro-bot",
            ChatMessage::user("tudo bem?", first + Duration::hours(1)),
            ChatMessage::ai("tudo!", first + Duration::hours(1)),
        )
        .await
        .unwrap();

    let session = sessions.get_session("s-2").await.unwrap().unwrap();
    assert_eq!(session.start_time, first);
    assert_eq!(session.user_ip, "1.1.1.1");
    assert_eq!(session.bot_id, DEFAULT_BOT_ID);
    assert_eq!(session.message_count, 4);
}

#[tokio::test]
async fn test_list_sessions_newest_first_with_preview() {
    let db = create_test_database().await;
    let sessions = db.chat_sessions();
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();

    for (i, id) in ["antiga", "media", "nova"].iter().enumerate() {
        let at = base + Duration::days(i as i64);
        sessions
            .append_turn(
                id,
                "127.0.0.1",
                DEFAULT_BOT_ID,
                ChatMessage::user(format!("primeira de {id}"), at),
                ChatMessage::ai("ok", at),
            )
            .await
            .unwrap();
    }

    let listed = sessions.list_sessions(2).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].session_id, "nova");
    assert_eq!(listed[1].session_id, "media");
    assert_eq!(
        listed[0].first_user_message.as_deref(),
        Some("primeira de nova")
    );
    assert_eq!(listed[0].message_count, 2);
}

#[tokio::test]
async fn test_delete_session() {
    let db = create_test_database().await;
    let sessions = db.chat_sessions();
    let now = Utc::now();

    assert!(!sessions.delete_session("fantasma").await.unwrap());

    sessions
        .append_turn(
            "s-3",
            "127.0.0.1",
            DEFAULT_BOT_ID,
            ChatMessage::user("oi", now),
            ChatMessage::ai("oi!", now),
        )
        .await
        .unwrap();
    assert!(sessions.delete_session("s-3").await.unwrap());
    assert!(sessions.get_session("s-3").await.unwrap().is_none());
    assert!(!sessions.delete_session("s-3").await.unwrap());
}

#[tokio::test]
async fn test_counters() {
    let db = create_test_database().await;
    let sessions = db.chat_sessions();
    let now = Utc::now();

    assert_eq!(sessions.count_sessions().await.unwrap(), 0);
    assert_eq!(sessions.count_messages().await.unwrap(), 0);

    for id in ["a", "b"] {
        sessions
            .append_turn(
                id,
                "127.0.0.1",
                DEFAULT_BOT_ID,
                ChatMessage::user("oi", now),
                ChatMessage::ai("oi!", now),
            )
            .await
            .unwrap();
    }
    assert_eq!(sessions.count_sessions().await.unwrap(), 2);
    assert_eq!(sessions.count_messages().await.unwrap(), 4);

    let logs = db.access_logs();
    logs.log_connection("203.0.113.9", "entrou").await.unwrap();
    logs.log_connection("203.0.113.9", "saiu").await.unwrap();
    assert_eq!(logs.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_persona_instruction_setting() {
    let db = create_test_database().await;
    let settings = db.system_settings();

    assert!(settings.persona_instruction().await.unwrap().is_none());
    settings
        .set_persona_instruction("Seja breve.")
        .await
        .unwrap();
    settings
        .set_persona_instruction("Seja muito breve.")
        .await
        .unwrap();
    assert_eq!(
        settings.persona_instruction().await.unwrap().as_deref(),
        Some("Seja muito breve.")
    );
}
