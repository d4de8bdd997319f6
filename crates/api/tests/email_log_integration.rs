//! Integration tests for the email log and dashboard statistics.
//!
//! These tests require a running PostgreSQL instance.

mod common;

use axum::http::{Method, StatusCode};
use common::{parse_response_body, request_with_cookie, TestContext};
use serde_json::Value;

/// Inserts `(ticket_id, status, test_mode, age_in_hours)` rows.
async fn seed_log(ctx: &TestContext, rows: &[(&str, &str, bool, i32)]) {
    for (ticket_id, status, test_mode, age_hours) in rows {
        sqlx::query(
            "INSERT INTO email_sent (ticket_id, username, email, subject, status, test_mode, sent_at) \
             VALUES ($1, 'anna', 'anna@example.com', 'Umfrage', $2, $3, NOW() - make_interval(hours => $4))",
        )
        .bind(ticket_id)
        .bind(status)
        .bind(test_mode)
        .bind(age_hours)
        .execute(&ctx.pool)
        .await
        .unwrap();
    }
}

async fn get(ctx: &TestContext, cookie: &str, uri: &str) -> (StatusCode, Value) {
    let response = ctx.send(request_with_cookie(Method::GET, uri, cookie)).await;
    let status = response.status();
    (status, parse_response_body(response).await)
}

fn ticket_ids(page: &Value) -> Vec<String> {
    page["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["ticketId"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_email_log_cursor_pagination() {
    let ctx = TestContext::new().await;
    seed_log(
        &ctx,
        &[
            ("T-1", "Versendet", false, 5),
            ("T-2", "Versendet", false, 4),
            ("T-3", "Übersprungen: bereits verarbeitet", false, 3),
            ("T-4", "Fehler: Verbindung abgelehnt", false, 2),
            ("T-5", "Versendet", true, 1),
        ],
    )
    .await;
    let cookie = ctx.login().await;

    let (status, first) = get(&ctx, &cookie, "/api/v1/admin/emails?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket_ids(&first), vec!["T-5", "T-4"]);
    assert_eq!(first["hasMore"], true);

    let cursor = first["nextCursor"].as_str().unwrap();
    let (_, second) = get(
        &ctx,
        &cookie,
        &format!("/api/v1/admin/emails?limit=2&cursor={}", cursor),
    )
    .await;
    assert_eq!(ticket_ids(&second), vec!["T-3", "T-2"]);

    let cursor = second["nextCursor"].as_str().unwrap();
    let (_, last) = get(
        &ctx,
        &cookie,
        &format!("/api/v1/admin/emails?limit=2&cursor={}", cursor),
    )
    .await;
    assert_eq!(ticket_ids(&last), vec!["T-1"]);
    assert_eq!(last["hasMore"], false);
    assert!(last["nextCursor"].is_null());
}

#[tokio::test]
async fn test_email_log_filters() {
    let ctx = TestContext::new().await;
    seed_log(
        &ctx,
        &[
            ("T-1", "Versendet", false, 3),
            ("T-2", "Übersprungen: von Umfragen ausgeschlossen", false, 2),
            ("T-3", "Fehler: Timeout", false, 1),
        ],
    )
    .await;
    let cookie = ctx.login().await;

    let (_, skipped) = get(&ctx, &cookie, "/api/v1/admin/emails?status=skipped").await;
    assert_eq!(ticket_ids(&skipped), vec!["T-2"]);
    assert_eq!(
        skipped["data"][0]["status"],
        "Übersprungen: von Umfragen ausgeschlossen"
    );

    let (_, errors) = get(&ctx, &cookie, "/api/v1/admin/emails?status=error").await;
    assert_eq!(ticket_ids(&errors), vec!["T-3"]);

    let (_, by_ticket) = get(&ctx, &cookie, "/api/v1/admin/emails?ticket_id=T-1").await;
    assert_eq!(ticket_ids(&by_ticket), vec!["T-1"]);
}

#[tokio::test]
async fn test_email_log_rejects_invalid_cursor() {
    let ctx = TestContext::new().await;
    let cookie = ctx.login().await;

    let (status, body) = get(&ctx, &cookie, "/api/v1/admin/emails?cursor=!!!").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_dashboard_counts_exclude_test_mode() {
    let ctx = TestContext::new().await;
    ctx.insert_user("anna", "anna@example.com", false).await;
    ctx.insert_user("bernd", "bernd@example.com", true).await;
    seed_log(
        &ctx,
        &[
            ("T-1", "Versendet", false, 24 * 10),
            ("T-2", "Versendet", false, 1),
            ("T-3", "Übersprungen: bereits verarbeitet", false, 1),
            ("T-4", "Fehler: Timeout", false, 1),
            ("T-5", "Versendet", true, 1),
        ],
    )
    .await;
    let cookie = ctx.login().await;

    let (status, stats) = get(&ctx, &cookie, "/api/v1/admin/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["emails"]["total"], 4);
    assert_eq!(stats["emails"]["sent"], 2);
    assert_eq!(stats["emails"]["skipped"], 1);
    assert_eq!(stats["emails"]["failed"], 1);
    assert_eq!(stats["emails"]["sentLast7Days"], 1);
    assert_eq!(stats["emails"]["sentLast30Days"], 2);
    assert_eq!(stats["users"]["total"], 2);
    assert_eq!(stats["users"]["excluded"], 1);
    assert!(stats["lastSentAt"].is_string());
}
