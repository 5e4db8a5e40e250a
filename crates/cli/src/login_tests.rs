// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::*;
use crate::test_support::MockApi;

fn params(api: &MockApi, timeout: Duration) -> LoginParams {
    LoginParams {
        client_id: "APP".into(),
        client_secret: "S3CRET".into(),
        region: Region::Sandbox,
        port: 0,
        api_override: Some(api.url()),
        timeout,
    }
}

async fn token_api(status: u16) -> anyhow::Result<MockApi> {
    MockApi::start(move |hit| match (status, hit.path.as_str()) {
        (200, "/oauth/v2/token") => {
            (200, json!({ "access_token": "acc", "refresh_token": "ref", "expires_in": 3600 }))
        }
        (_, "/oauth/v2/token") => (status, json!({ "message": "invalid code" })),
        _ => (404, json!({})),
    })
    .await
}

/// Run a login and answer its callback with the query built from the
/// generated state. Returns the login result and the browser's view.
async fn login_with_callback(
    params: &LoginParams,
    query: impl FnOnce(&str) -> String,
) -> anyhow::Result<(Result<LoginOutcome, LoginError>, u16, String)> {
    let http = cloverapi::transport::http_client()?;
    let (url_tx, url_rx) = oneshot::channel::<Url>();

    let browser = async {
        let url = url_rx.await?;
        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let state = pairs.get("state").cloned().unwrap_or_default();
        let redirect = pairs.get("redirect_uri").cloned().unwrap_or_default().replace("localhost", "127.0.0.1");
        let resp = http.get(format!("{redirect}?{}", query(&state))).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        anyhow::Ok((status, body))
    };

    let (result, seen) = tokio::join!(
        login(params, &http, |url| {
            let _ = url_tx.send(url.clone());
        }),
        browser
    );
    let (status, body) = seen?;
    Ok((result, status, body))
}

#[tokio::test]
async fn successful_callback_yields_record() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let (result, status, body) = login_with_callback(&params(&api, CALLBACK_TIMEOUT), |state| {
        format!("code=abc&merchant_id=MX1&state={state}")
    })
    .await?;

    assert_eq!(status, 200);
    assert!(body.contains("MX1"), "{body}");
    let outcome = result?;
    assert_eq!(outcome.merchant_id, "MX1");
    assert_eq!(outcome.record.access_token, "acc");
    assert_eq!(outcome.record.refresh_token.as_deref(), Some("ref"));
    assert_eq!(outcome.record.client_id, "APP");
    assert_eq!(outcome.record.client_secret, "S3CRET");
    assert_eq!(outcome.record.region, Region::Sandbox);
    assert!(outcome.record.expires_at.is_some_and(|t| t > epoch_ms()));

    let exchange = api.last().ok_or_else(|| anyhow::anyhow!("no exchange request"))?;
    assert_eq!(exchange.method, "POST");
    assert_eq!(exchange.param("code"), Some("abc"));
    assert_eq!(exchange.param("grant_type"), Some("authorization_code"));
    assert_eq!(exchange.param("client_secret"), Some("S3CRET"));
    Ok(())
}

#[tokio::test]
async fn authorize_url_points_at_local_callback() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let (result, _, _) = login_with_callback(&params(&api, CALLBACK_TIMEOUT), |state| {
        format!("code=abc&merchant_id=MX1&state={state}")
    })
    .await?;
    assert!(result.is_ok());

    let http = cloverapi::transport::http_client()?;
    let mut seen = None;
    let short = LoginParams { timeout: Duration::from_millis(20), ..params(&api, CALLBACK_TIMEOUT) };
    let _ = login(&short, &http, |url| seen = Some(url.clone())).await;
    let url = seen.ok_or_else(|| anyhow::anyhow!("on_url not called"))?;
    assert!(url.as_str().starts_with(&api.url()), "override replaces the web host too: {url}");
    assert_eq!(url.path(), "/oauth/v2/authorize");
    let redirect = url.query_pairs().find(|(k, _)| k == "redirect_uri").map(|(_, v)| v.into_owned());
    assert!(redirect.is_some_and(|r| r.starts_with("http://localhost:") && r.ends_with("/callback")));
    Ok(())
}

#[tokio::test]
async fn missing_params_is_bad_request() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let (result, status, _) =
        login_with_callback(&params(&api, CALLBACK_TIMEOUT), |state| format!("state={state}")).await?;

    assert_eq!(status, 400);
    assert!(matches!(result, Err(LoginError::MissingParams)));
    assert!(api.hits().is_empty());
    Ok(())
}

#[tokio::test]
async fn state_mismatch_is_bad_request() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let (result, status, _) = login_with_callback(&params(&api, CALLBACK_TIMEOUT), |_| {
        "code=abc&merchant_id=MX1&state=forged".to_owned()
    })
    .await?;

    assert_eq!(status, 400);
    assert!(matches!(result, Err(LoginError::StateMismatch)));
    assert!(api.hits().is_empty(), "no exchange on a forged state");
    Ok(())
}

#[tokio::test]
async fn provider_error_is_denied() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let (result, status, body) =
        login_with_callback(&params(&api, CALLBACK_TIMEOUT), |_| "error=access_denied".to_owned()).await?;

    assert_eq!(status, 400);
    assert!(body.contains("access_denied"));
    assert!(matches!(result, Err(LoginError::Denied(ref r)) if r == "access_denied"));
    Ok(())
}

#[tokio::test]
async fn rejected_exchange_is_bad_gateway() -> anyhow::Result<()> {
    let api = token_api(401).await?;
    let (result, status, body) = login_with_callback(&params(&api, CALLBACK_TIMEOUT), |state| {
        format!("code=abc&merchant_id=MX1&state={state}")
    })
    .await?;

    assert_eq!(status, 502);
    assert!(body.contains("token exchange failed"), "{body}");
    match result {
        Err(LoginError::Exchange(e)) => assert_eq!(e.status(), Some(401)),
        other => anyhow::bail!("expected exchange error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn times_out_and_releases_port() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let http = cloverapi::transport::http_client()?;
    let mut port = None;
    let result = login(&params(&api, Duration::from_millis(50)), &http, |url| {
        port = url
            .query_pairs()
            .find(|(k, _)| k == "redirect_uri")
            .and_then(|(_, v)| Url::parse(&v).ok())
            .and_then(|u| u.port());
    })
    .await;

    assert!(matches!(result, Err(LoginError::TimedOut)));
    let port = port.ok_or_else(|| anyhow::anyhow!("no port in redirect"))?;
    TcpListener::bind(("127.0.0.1", port)).await?;
    Ok(())
}

#[tokio::test]
async fn port_in_use_fails_to_bind() -> anyhow::Result<()> {
    let api = token_api(200).await?;
    let taken = TcpListener::bind("127.0.0.1:0").await?;
    let port = taken.local_addr()?.port();
    let http = cloverapi::transport::http_client()?;

    let result = login(&LoginParams { port, ..params(&api, CALLBACK_TIMEOUT) }, &http, |_| {}).await;
    assert!(matches!(result, Err(LoginError::Bind { port: p, .. }) if p == port));
    Ok(())
}

#[test]
fn page_escapes_markup() {
    let html = page("<t>", "a & <b>");
    assert!(html.contains("&lt;t&gt;"));
    assert!(html.contains("a &amp; &lt;b&gt;"));
}
