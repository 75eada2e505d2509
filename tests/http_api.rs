//! HTTP API Tests - Handlers and Router Wiring
//!
//! Drives the axum handlers directly and through the assembled router,
//! checking status codes and outcome bodies.

use std::sync::Arc;

use axum::Json;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use free_share_rewards::adapters::api::types::{ClaimRequest, ShareRequest};
use free_share_rewards::adapters::api::{self, ApiState, handlers};
use free_share_rewards::adapters::metrics::{HealthState, MetricsRegistry};
use free_share_rewards::adapters::persistence::RecordStore;
use free_share_rewards::domain::{Account, Asset, BucketTable, MarketStatus, RewardBucket, market_status_at};
use free_share_rewards::ports::{AccountRepository, AssetRepository, MarketClock};
use free_share_rewards::usecases::{AccountLedger, AssetPriceOracle, ClaimAllocator, SharePurchase};

struct OpenClock;

impl MarketClock for OpenClock {
    fn is_open(&self) -> MarketStatus {
        MarketStatus {
            open: true,
            ..market_status_at(Utc::now())
        }
    }
}

async fn app_state() -> (ApiState, Arc<RecordStore>) {
    let store = Arc::new(RecordStore::in_memory());
    AssetRepository::save(store.as_ref(), &Asset::new("AAPL", dec!(1)))
        .await
        .unwrap();
    AccountRepository::save(store.as_ref(), &Account::with_cash("rewards", dec!(100)))
        .await
        .unwrap();

    let clock: Arc<dyn MarketClock> = Arc::new(OpenClock);
    let ledger = Arc::new(AccountLedger::new(
        store.clone(),
        store.clone(),
        Arc::clone(&clock),
        "rewards",
    ));
    let allocator = Arc::new(ClaimAllocator::new(
        store.clone(),
        Arc::clone(&clock),
        Arc::new(AssetPriceOracle::new(store.clone())),
        Arc::clone(&ledger),
        BucketTable::new(vec![RewardBucket {
            p0: 0.0,
            p1: 1.0,
            min: 4,
            max: 5,
        }]),
        StdRng::seed_from_u64(5),
    ));
    let purchases = Arc::new(SharePurchase::new(store.clone(), clock, ledger));

    let state = ApiState {
        allocator,
        purchases,
        metrics: Arc::new(MetricsRegistry::new().unwrap()),
    };
    (state, store)
}

async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn claim(user: &str) -> Result<Json<ClaimRequest>, axum::extract::rejection::JsonRejection> {
    Ok(Json(ClaimRequest {
        user: user.to_string(),
    }))
}

#[tokio::test]
async fn test_claim_returns_created_then_bad_request() {
    let (state, _) = app_state().await;

    let response = handlers::claim_free_share(State(state.clone()), claim("alice"))
        .await
        .into_response();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["outcome"], "SUCCESS");
    assert_eq!(body["data"]["tickerSymbol"], "AAPL");
    assert_eq!(body["data"]["quantity"], 4);

    let response = handlers::claim_free_share(State(state.clone()), claim("alice"))
        .await
        .into_response();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["outcome"], "FAILURE");
    assert_eq!(body["errorCode"], "CLAIMED_ALREADY");

    let metrics = state.metrics.render().unwrap();
    assert!(metrics.contains("CLAIMED_ALREADY"));
}

#[tokio::test]
async fn test_short_user_is_a_validation_error() {
    let (state, store) = app_state().await;

    let response = handlers::claim_free_share(State(state), claim("al"))
        .await
        .into_response();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "VALIDATION_ERROR");
    assert!(AccountRepository::get_by_name(store.as_ref(), "al").await.is_err());
}

#[tokio::test]
async fn test_share_endpoint_validates_quantity() {
    let (state, _) = app_state().await;

    let request = ShareRequest {
        user: "bruno".to_string(),
        quantity: 0,
        ticker_symbol: "AAPL".to_string(),
    };
    let response = handlers::buy_share(State(state.clone()), Ok(Json(request)))
        .await
        .into_response();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "VALIDATION_ERROR");

    let request = ShareRequest {
        user: "bruno".to_string(),
        quantity: 3,
        ticker_symbol: "AAPL".to_string(),
    };
    let response = handlers::buy_share(State(state), Ok(Json(request)))
        .await
        .into_response();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["sharePricePaid"], 3.0);
}

#[tokio::test]
async fn test_router_serves_claims_stats_and_probes() {
    let (state, store) = app_state().await;
    let app = api::router(state, Arc::new(HealthState::new(store)));

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/claim-free-share")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"user":"carla"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/v1/claim-free-share")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "VALIDATION_ERROR");

    let response = app
        .clone()
        .oneshot(Request::get("/api/v1/claims/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalUsers"], 1);
    assert_eq!(body["totalStock"], 4);

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    for path in ["/live", "/ready", "/metrics"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}
