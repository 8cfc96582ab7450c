//! End-to-end race behavior against local mock providers.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::Value;

mod common;

use common::{BRASIL_API_BODY, VIA_CEP_BODY};

#[tokio::test]
async fn test_fastest_provider_wins() {
    let brasil = common::start_mock_backend(Duration::from_millis(150), 200, BRASIL_API_BODY).await;
    let via_cep = common::start_mock_backend(Duration::ZERO, 200, VIA_CEP_BODY).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .expect("Resolver unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.headers()["x-cep-provider"], "ViaCep");

    let json: Value = res.json().await.unwrap();
    let expected: Value = serde_json::from_str(VIA_CEP_BODY).unwrap();
    assert_eq!(json, expected);

    resolver.stop();
}

#[tokio::test]
async fn test_provider_receives_postal_code_in_path() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let recorded = seen.clone();
    let brasil = common::start_programmable_backend(move |target| {
        recorded.lock().unwrap().push(target);
        async { (200, BRASIL_API_BODY.to_string()) }
    })
    .await;
    let via_cep = common::start_mock_backend(Duration::from_millis(300), 200, VIA_CEP_BODY).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-cep-provider"], "BrasilAPI");
    assert_eq!(*seen.lock().unwrap(), vec!["/api/cep/v1/01001000".to_string()]);

    resolver.stop();
}

#[tokio::test]
async fn test_first_failure_aborts_race() {
    let brasil = common::closed_port().await;
    let via_cep = common::start_mock_backend(Duration::from_millis(50), 200, VIA_CEP_BODY).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.bytes().await.unwrap().is_empty());

    resolver.stop();
}

#[tokio::test]
async fn test_first_success_policy_survives_failure() {
    let brasil = common::closed_port().await;
    let via_cep = common::start_mock_backend(Duration::from_millis(50), 200, VIA_CEP_BODY).await;
    let mut config = common::test_config(brasil, via_cep, 1000);
    config.race.policy = cep_resolver::config::RacePolicy::FirstSuccess;
    let resolver = common::start_resolver(config).await;

    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-cep-provider"], "ViaCep");

    resolver.stop();
}

#[tokio::test]
async fn test_timeout_when_both_providers_stall() {
    let brasil = common::start_mock_backend(Duration::from_secs(3), 200, BRASIL_API_BODY).await;
    let via_cep = common::start_mock_backend(Duration::from_secs(3), 200, VIA_CEP_BODY).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 200)).await;

    let start = Instant::now();
    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(elapsed >= Duration::from_millis(200), "answered early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(1500), "answered late: {:?}", elapsed);

    resolver.stop();
}

#[tokio::test]
async fn test_empty_body_is_internal_error() {
    let brasil = common::start_mock_backend(Duration::ZERO, 200, "").await;
    let via_cep = common::start_mock_backend(Duration::from_millis(200), 200, VIA_CEP_BODY).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    resolver.stop();
}

#[tokio::test]
async fn test_error_status_body_is_judged_by_schema() {
    // ViaCep answers unknown postal codes with 200 and {"erro": "true"}.
    let brasil = common::start_mock_backend(Duration::from_millis(200), 200, BRASIL_API_BODY).await;
    let via_cep = common::start_mock_backend(Duration::ZERO, 200, r#"{"erro": "true"}"#).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let res = common::client()
        .get(resolver.url("?cep=99999999"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    resolver.stop();
}

#[tokio::test]
async fn test_non_success_status_with_valid_body_is_accepted() {
    let brasil = common::start_mock_backend(Duration::ZERO, 404, BRASIL_API_BODY).await;
    let via_cep = common::start_mock_backend(Duration::from_millis(200), 200, VIA_CEP_BODY).await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let res = common::client()
        .get(resolver.url("?cep=01001000"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-cep-provider"], "BrasilAPI");

    resolver.stop();
}

#[tokio::test]
async fn test_missing_postal_code_never_reaches_providers() {
    let calls = Arc::new(AtomicU32::new(0));
    let counted = calls.clone();
    let brasil = common::start_programmable_backend(move |_| {
        counted.fetch_add(1, Ordering::SeqCst);
        async { (200, BRASIL_API_BODY.to_string()) }
    })
    .await;
    let via_cep = common::closed_port().await;
    let resolver = common::start_resolver(common::test_config(brasil, via_cep, 1000)).await;

    let client = common::client();
    for query in ["", "?cep=", "?cep=%20%20", "?zip=01001000"] {
        let res = client.get(resolver.url(query)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "query {:?}", query);
    }

    let res = client
        .get(format!("http://{}/api/cep?cep=01001000", resolver.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    resolver.stop();
}

#[tokio::test]
async fn test_config_reload_swaps_providers() {
    let brasil = common::start_mock_backend(Duration::ZERO, 200, BRASIL_API_BODY).await;
    let via_cep = common::start_mock_backend(Duration::ZERO, 200, VIA_CEP_BODY).await;

    let mut config = common::test_config(brasil, via_cep, 1000);
    config.providers.via_cep.enabled = false;
    let resolver = common::start_resolver(config.clone()).await;
    let client = common::client();

    let res = client.get(resolver.url("?cep=01001000")).send().await.unwrap();
    assert_eq!(res.headers()["x-cep-provider"], "BrasilAPI");

    config.providers.via_cep.enabled = true;
    config.providers.brasil_api.enabled = false;
    resolver.config_tx.send(config).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client.get(resolver.url("?cep=01001000")).send().await.unwrap();
    assert_eq!(res.headers()["x-cep-provider"], "ViaCep");

    resolver.stop();
}
