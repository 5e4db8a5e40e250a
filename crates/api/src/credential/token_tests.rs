// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::TransportError;
use crate::test_support::{record, store_with, MockResponse, MockServer};

const HOUR_MS: u64 = 60 * 60 * 1000;

#[test]
fn expired_one_ms_ago() {
    let now = 1_800_000_000_000;
    assert!(is_expired(&record("a", None, Some(now - 1)), now));
}

#[test]
fn not_expired_an_hour_out() {
    let now = 1_800_000_000_000;
    assert!(!is_expired(&record("a", None, Some(now + HOUR_MS)), now));
}

#[test]
fn absent_expiry_never_expires() {
    assert!(!is_expired(&record("a", None, None), u64::MAX));
}

#[yare::parameterized(
    inside_skew = { 4 * 60 * 1000, true },
    at_skew_boundary = { 5 * 60 * 1000, true },
    just_outside_skew = { 5 * 60 * 1000 + 1, false },
)]
fn skew_window(remaining_ms: u64, expected: bool) {
    let now = 1_800_000_000_000;
    assert_eq!(is_expired(&record("a", None, Some(now + remaining_ms)), now), expected);
}

fn manager(store: CredentialStore, server: &MockServer) -> Arc<TokenManager> {
    let http = crate::transport::http_client().unwrap_or_default();
    Arc::new(TokenManager::new(store, http).with_api_override(Some(server.url())))
}

#[tokio::test]
async fn refresh_updates_store_and_returns_token() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![(
        "/oauth/v2/refresh",
        vec![MockResponse::json(
            200,
            serde_json::json!({ "access_token": "new-access", "refresh_token": "new-refresh", "expires_in": 3600 }),
        )],
    )])
    .await?;
    let (dir, store) = store_with("M1", record("old-access", Some("old-refresh"), Some(1)))?;
    let mgr = manager(store, &server);

    let before = epoch_ms();
    let token = mgr.refresh("M1").await?;
    assert_eq!(token, "new-access");

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method, "POST");
    assert_eq!(reqs[0].param("client_id"), Some("cid"));
    assert_eq!(reqs[0].param("client_secret"), Some("secret"));
    assert_eq!(reqs[0].param("refresh_token"), Some("old-refresh"));

    // Persisted, not just in memory.
    let reloaded = CredentialStore::load(dir.path().join("config.json"));
    let rec = reloaded.get(Some("M1")).cloned().ok_or_else(|| anyhow::anyhow!("missing"))?;
    assert_eq!(rec.access_token, "new-access");
    assert_eq!(rec.refresh_token.as_deref(), Some("new-refresh"));
    let expires_at = rec.expires_at.unwrap_or_default();
    assert!(expires_at >= before + 3600 * 1000);
    assert_eq!(rec.client_id, "cid");
    Ok(())
}

#[tokio::test]
async fn refresh_keeps_refresh_token_when_not_rotated() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![(
        "/oauth/v2/refresh",
        vec![MockResponse::json(200, serde_json::json!({ "access_token": "fresh" }))],
    )])
    .await?;
    let (_dir, store) = store_with("M1", record("old", Some("keep-me"), Some(5)))?;
    let mgr = manager(store, &server);

    mgr.refresh("M1").await?;
    let store = mgr.store().await;
    let rec = store.get(Some("M1")).cloned().ok_or_else(|| anyhow::anyhow!("missing"))?;
    assert_eq!(rec.refresh_token.as_deref(), Some("keep-me"));
    assert_eq!(rec.expires_at, Some(5));
    Ok(())
}

#[tokio::test]
async fn refresh_without_refresh_token_fails() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![]).await?;
    let (_dir, store) = store_with("M1", record("a", None, None))?;
    let mgr = manager(store, &server);

    let err = mgr.refresh("M1").await.err().ok_or_else(|| anyhow::anyhow!("expected error"))?;
    assert!(matches!(err, ClientError::Auth(AuthError::NoRefreshToken { ref merchant }) if merchant == "M1"));
    assert!(server.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn refresh_unknown_merchant_is_not_authenticated() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![]).await?;
    let (_dir, store) = store_with("M1", record("a", Some("r"), None))?;
    let mgr = manager(store, &server);

    let err = mgr.refresh("M2").await.err().ok_or_else(|| anyhow::anyhow!("expected error"))?;
    assert!(matches!(err, ClientError::Auth(AuthError::NotAuthenticated { .. })));
    Ok(())
}

#[tokio::test]
async fn refresh_endpoint_error_surfaces_unmodified() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![(
        "/oauth/v2/refresh",
        vec![MockResponse::json(400, serde_json::json!({ "message": "invalid_grant" }))],
    )])
    .await?;
    let (_dir, store) = store_with("M1", record("old", Some("dead"), Some(1)))?;
    let mgr = manager(store, &server);

    let err = mgr.refresh("M1").await.err().ok_or_else(|| anyhow::anyhow!("expected error"))?;
    match err {
        ClientError::Transport(TransportError::Http { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => anyhow::bail!("expected Http error, got {other:?}"),
    }
    // Store untouched.
    let store = mgr.store().await;
    assert_eq!(store.get(Some("M1")).map(|r| r.access_token.as_str()), Some("old"));
    Ok(())
}

#[tokio::test]
async fn access_token_refreshes_proactively_when_expired() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![(
        "/oauth/v2/refresh",
        vec![MockResponse::json(200, serde_json::json!({ "access_token": "proactive", "expires_in": 3600 }))],
    )])
    .await?;
    let (_dir, store) = store_with("M1", record("stale", Some("r"), Some(epoch_ms() - 1)))?;
    let mgr = manager(store, &server);

    assert_eq!(mgr.access_token("M1").await?, "proactive");
    // Now fresh: no second refresh.
    assert_eq!(mgr.access_token("M1").await?, "proactive");
    assert_eq!(server.count("/oauth/v2/refresh"), 1);
    Ok(())
}

#[tokio::test]
async fn access_token_skips_refresh_when_fresh_or_unrefreshable() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![]).await?;
    let (_dir, mut store) = store_with("M1", record("fresh", Some("r"), Some(epoch_ms() + HOUR_MS)))?;
    store.put("M2", record("expired-no-refresh", None, Some(1)))?;
    let mgr = manager(store, &server);

    assert_eq!(mgr.access_token("M1").await?, "fresh");
    assert_eq!(mgr.access_token("M2").await?, "expired-no-refresh");
    assert!(server.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn static_token_cannot_refresh() -> anyhow::Result<()> {
    let source = TokenSource::Static(StaticToken("env-token".into()));
    assert_eq!(source.token().await?, "env-token");
    let err = source.on_unauthorized().await.err().ok_or_else(|| anyhow::anyhow!("expected error"))?;
    assert!(matches!(err, ClientError::Auth(AuthError::Unauthorized)));
    Ok(())
}

#[tokio::test]
async fn stored_token_delegates_to_manager() -> anyhow::Result<()> {
    let server = MockServer::scripted(vec![(
        "/oauth/v2/refresh",
        vec![MockResponse::json(200, serde_json::json!({ "access_token": "reactive" }))],
    )])
    .await?;
    let (_dir, store) = store_with("M1", record("current", Some("r"), None))?;
    let source = TokenSource::Stored(StoredToken::new(manager(store, &server), "M1"));

    assert_eq!(source.token().await?, "current");
    assert_eq!(source.on_unauthorized().await?, "reactive");
    assert_eq!(source.token().await?, "reactive");
    Ok(())
}
