use axum::http::StatusCode;
use expeditions::api::{self, AppState};
use expeditions::datasource::{DataSourceError, MockDataSource};
use expeditions::db::init_db;
use expeditions::domain::{Address, Campaign, Decimal, TaskType, TimeMs};
use expeditions::signature::{address_of, hash_message};
use expeditions::{Orchestrator, Repository};
use k256::ecdsa::SigningKey;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

struct TestApp {
    app: axum::Router,
    campaign: Option<Campaign>,
    _temp: TempDir,
}

async fn setup_test_app(datasource: MockDataSource, with_campaign: bool) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let campaign = if with_campaign {
        let now = TimeMs::now();
        let campaign = Campaign::new(
            now.minus_days(1),
            now.plus_days(30),
            now.plus_days(60),
            wallet(99).1,
        );
        repo.insert_campaign(&campaign).await.unwrap();
        Some(campaign)
    } else {
        None
    };

    let orchestrator = Arc::new(Orchestrator::new(
        repo.clone(),
        Arc::new(datasource),
        Decimal::from_i64(50),
    ));
    let app = api::create_router(AppState::new(repo, orchestrator));

    TestApp {
        app,
        campaign,
        _temp: temp_dir,
    }
}

fn wallet(seed: u8) -> (SigningKey, Address) {
    let mut secret = [0u8; 32];
    secret[31] = seed;
    let key = SigningKey::from_slice(&secret).unwrap();
    let address = address_of(key.verifying_key());
    (key, address)
}

fn sign(key: &SigningKey, message: &str) -> String {
    let (sig, recid) = key.sign_prehash_recoverable(&hash_message(message)).unwrap();
    let mut bytes = sig.to_bytes().to_vec();
    bytes.push(recid.to_byte() + 27);
    format!("0x{}", hex::encode(bytes))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    send(app, req).await
}

async fn post(app: axum::Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn send(
    app: axum::Router,
    req: axum::http::Request<axum::body::Body>,
) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_visits_default_state() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (_, address) = wallet(1);

    let (status, body) = get(
        test_app.app,
        &format!("/expeditions?address={}", address.as_str().to_lowercase()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], address.as_str());
    assert_eq!(body["allVisits"], 0);
    assert_eq!(body["lastVisit"], 0);
}

#[tokio::test]
async fn test_visits_invalid_address() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;

    let (status, body) = get(test_app.app, "/expeditions?address=0x1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid address");
}

#[tokio::test]
async fn test_no_active_campaign() {
    let test_app = setup_test_app(MockDataSource::new(), false).await;
    let (key, address) = wallet(1);

    let (status, body) = post(
        test_app.app.clone(),
        "/expeditions/daily-visit",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&key, TaskType::Visit.claim_message()),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active campaign has been found");

    let (status, body) = get(test_app.app, "/expeditions/campaign").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active campaign has been found");
}

#[tokio::test]
async fn test_daily_visit_idempotent_same_day() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (key, address) = wallet(2);
    let payload = serde_json::json!({
        "address": address.as_str(),
        "signature": sign(&key, TaskType::Visit.claim_message()),
    });

    let (status, first) = post(test_app.app.clone(), "/expeditions/daily-visit", payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["allVisits"], 1);
    assert!(first["lastVisit"].as_i64().unwrap() > 0);

    let (status, second) = post(test_app.app.clone(), "/expeditions/daily-visit", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, first);

    let (_, visits) = get(
        test_app.app,
        &format!("/expeditions?address={}", address.as_str()),
    )
    .await;
    assert_eq!(visits["allVisits"], 1);
}

#[tokio::test]
async fn test_daily_visit_rejects_foreign_signature() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (_, address) = wallet(3);
    let (other_key, _) = wallet(4);

    let (status, body) = post(
        test_app.app,
        "/expeditions/daily-visit",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&other_key, TaskType::Visit.claim_message()),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid signature");
}

#[tokio::test]
async fn test_claim_requires_task_specific_message() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (key, address) = wallet(5);

    // A daily-visit signature must not authorise a liquidity claim.
    let (status, body) = post(
        test_app.app,
        "/expeditions/claim",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&key, TaskType::Visit.claim_message()),
            "type": "LIQUIDITY_PROVISION",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid signature");
}

#[tokio::test]
async fn test_claim_missing_signature() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (_, address) = wallet(5);

    let (status, body) = post(
        test_app.app,
        "/expeditions/claim",
        serde_json::json!({
            "address": address.as_str(),
            "signature": " ",
            "type": "VISIT",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing signature");
}

#[tokio::test]
async fn test_generic_visit_claim_returns_zero() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (key, address) = wallet(6);

    let (status, body) = post(
        test_app.app.clone(),
        "/expeditions/claim",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&key, TaskType::Visit.claim_message()),
            "type": "VISIT",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "VISIT");
    assert_eq!(body["claimedFragments"], 0);

    let (_, visits) = get(
        test_app.app,
        &format!("/expeditions?address={}", address.as_str()),
    )
    .await;
    assert_eq!(visits["allVisits"], 1);
}

#[tokio::test]
async fn test_provision_claim_then_double_claim() {
    let (key, address) = wallet(7);
    let datasource = MockDataSource::new().with_liquidity_deposit(address.as_str(), "64.9");
    let test_app = setup_test_app(datasource, true).await;
    let payload = serde_json::json!({
        "address": address.as_str(),
        "signature": sign(&key, TaskType::LiquidityProvision.claim_message()),
    });

    let (status, body) = post(
        test_app.app.clone(),
        "/expeditions/weekly-fragments/claim-liquidity-provision",
        payload.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "LIQUIDITY_PROVISION");
    assert_eq!(body["claimedFragments"], 64);

    let week_date = expeditions::engine::week_information(TimeMs::now()).week_date;
    let (status, body) = post(
        test_app.app.clone(),
        "/expeditions/weekly-fragments/claim-liquidity-provision",
        payload,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("already claimed"));
    assert!(message.contains(&week_date));

    let (status, body) = get(
        test_app.app,
        &format!("/expeditions/weekly-fragments?address={}", address.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFragments"], 64);
    assert_eq!(body["week"]["weekDate"], week_date.as_str());
    assert_eq!(body["fragments"].as_array().unwrap().len(), 1);
    assert_eq!(body["fragments"][0]["type"], "LIQUIDITY_PROVISION");
    assert_eq!(
        body["campaignId"],
        test_app.campaign.as_ref().unwrap().id.as_str()
    );
}

#[tokio::test]
async fn test_provision_below_threshold() {
    let (key, address) = wallet(8);
    let datasource = MockDataSource::new()
        .with_liquidity_deposit(address.as_str(), "10")
        .with_liquidity_deposit(address.as_str(), "20");
    let test_app = setup_test_app(datasource, true).await;

    let (status, body) = post(
        test_app.app,
        "/expeditions/claim",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&key, TaskType::LiquidityProvision.claim_message()),
            "type": "LIQUIDITY_PROVISION",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No claimable fragments");
}

#[tokio::test]
async fn test_staking_claim() {
    let (key, address) = wallet(9);
    let datasource =
        MockDataSource::new().with_staking_position(address.as_str(), "3", "10", "400");
    let test_app = setup_test_app(datasource, true).await;

    let (status, body) = post(
        test_app.app,
        "/expeditions/weekly-fragments/claim-liquidity-staking",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&key, TaskType::LiquidityStaking.claim_message()),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "LIQUIDITY_STAKING");
    assert_eq!(body["claimedFragments"], 120);
}

#[tokio::test]
async fn test_external_outage_is_service_unavailable() {
    let (key, address) = wallet(10);
    let datasource = MockDataSource::new().failing(DataSourceError::HttpError {
        status: 502,
        message: "Server error".to_string(),
    });
    let test_app = setup_test_app(datasource, true).await;

    let (status, body) = post(
        test_app.app,
        "/expeditions/claim",
        serde_json::json!({
            "address": address.as_str(),
            "signature": sign(&key, TaskType::LiquidityStaking.claim_message()),
            "type": "LIQUIDITY_STAKING",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("External source unavailable"));
}

#[tokio::test]
async fn test_active_campaign_endpoint() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let campaign = test_app.campaign.clone().unwrap();

    let (status, body) = get(test_app.app, "/expeditions/campaign").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], campaign.id.as_str());
    assert_eq!(body["startDate"], campaign.start_ms.as_ms());
    assert_eq!(body["endDate"], campaign.end_ms.as_ms());
    assert_eq!(body["redeemEndDate"], campaign.redeem_end_ms.as_ms());
    assert_eq!(body["initiatorAddress"], campaign.initiator_address.as_str());
}

#[tokio::test]
async fn test_weekly_fragments_listing() {
    let (key, address) = wallet(11);
    let datasource = MockDataSource::new()
        .with_liquidity_deposit(address.as_str(), "75.4")
        .with_staking_position(address.as_str(), "1", "2", "120");
    let test_app = setup_test_app(datasource, true).await;

    for (route, task_type) in [
        ("claim-liquidity-provision", TaskType::LiquidityProvision),
        ("claim-liquidity-staking", TaskType::LiquidityStaking),
    ] {
        let (status, _) = post(
            test_app.app.clone(),
            &format!("/expeditions/weekly-fragments/{}", route),
            serde_json::json!({
                "address": address.as_str(),
                "signature": sign(&key, task_type.claim_message()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let week = expeditions::engine::week_information(TimeMs::now());
    let (status, body) = get(
        test_app.app,
        &format!(
            "/expeditions/weekly-fragments?address={}",
            address.as_str().to_lowercase()
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], address.as_str());
    assert_eq!(
        body["campaignId"],
        test_app.campaign.as_ref().unwrap().id.as_str()
    );
    assert_eq!(body["week"]["weekNumber"], week.week_number);
    assert_eq!(body["week"]["year"], week.year);
    assert_eq!(body["week"]["weekDate"], week.week_date.as_str());
    assert_eq!(body["week"]["startDate"], week.start_ms.as_ms());
    assert_eq!(body["week"]["endDate"], week.end_ms.as_ms());
    assert_eq!(body["totalFragments"], 75 + 60);

    let fragments = body["fragments"].as_array().unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0]["type"], "LIQUIDITY_PROVISION");
    assert_eq!(fragments[0]["fragments"], 75);
    assert_eq!(fragments[0]["week"], week.week_number);
    assert_eq!(fragments[0]["year"], week.year);
    assert_eq!(fragments[1]["type"], "LIQUIDITY_STAKING");
    assert_eq!(fragments[1]["fragments"], 60);
}

#[tokio::test]
async fn test_weekly_fragments_empty_for_new_address() {
    let test_app = setup_test_app(MockDataSource::new(), true).await;
    let (_, address) = wallet(12);

    let (status, body) = get(
        test_app.app,
        &format!("/expeditions/weekly-fragments?address={}", address.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalFragments"], 0);
    assert!(body["fragments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_weekly_fragments_without_active_campaign() {
    let test_app = setup_test_app(MockDataSource::new(), false).await;
    let (_, address) = wallet(13);

    let (status, body) = get(
        test_app.app,
        &format!("/expeditions/weekly-fragments?address={}", address.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No active campaign has been found");
}
