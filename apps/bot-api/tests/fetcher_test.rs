use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use bot_api::error::TrackerError;
use bot_api::tracker::{Category, HttpStockFetcher, Item, StockFetcher};

/// Helper: start an upstream stand-in on a random local port.
async fn start_upstream() -> SocketAddr {
    let app = Router::new()
        .route(
            "/stock",
            get(|| async {
                Json(json!({
                    "data": {
                        "gear": { "items": [{ "name": "Godly Sprinkler", "quantity": 1 }] },
                        "seed": { "items": [{ "name": "Carrot", "quantity": "25" }] },
                        "egg": { "items": [] },
                        "honey": { "items": [] },
                        "cosmetics": { "items": [] }
                    }
                }))
            }),
        )
        .route(
            "/weather",
            get(|| async {
                Json(json!({ "currentWeather": "Thunderstorm", "icon": "⛈️", "cropBonuses": "Shocked" }))
            }),
        )
        .route("/weather-array", get(|| async { Json(json!([])) }))
        .route("/stock-partial", get(|| async { Json(json!({ "data": { "gear": { "items": [] } } })) }))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({}))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn fetcher(addr: SocketAddr, stock: &str, weather: &str) -> HttpStockFetcher {
    HttpStockFetcher::new(
        &format!("http://{addr}{stock}"),
        &format!("http://{addr}{weather}"),
        Duration::from_millis(500),
    )
}

#[tokio::test]
async fn fetch_combines_stock_and_weather() {
    let addr = start_upstream().await;

    let snapshot = fetcher(addr, "/stock", "/weather").fetch().await.unwrap();

    assert_eq!(snapshot.items(Category::Gear), &[Item::new("Godly Sprinkler", 1)]);
    assert_eq!(snapshot.items(Category::Seed), &[Item::new("Carrot", 25)]);
    assert!(snapshot.items(Category::Honey).is_empty());
    assert_eq!(snapshot.weather().condition, "Thunderstorm");
    assert_eq!(snapshot.weather().icon, "⛈️");
    assert_eq!(snapshot.weather().crop_bonus, "Shocked");
}

#[tokio::test]
async fn missing_category_fails_closed() {
    let addr = start_upstream().await;

    let err = fetcher(addr, "/stock-partial", "/weather").fetch().await.unwrap_err();
    assert!(matches!(err, TrackerError::FetchFailed(msg) if msg.contains("malformed stock payload")));
}

#[tokio::test]
async fn non_object_weather_fails_closed() {
    let addr = start_upstream().await;

    let err = fetcher(addr, "/stock", "/weather-array").fetch().await.unwrap_err();
    assert!(matches!(err, TrackerError::FetchFailed(msg) if msg.contains("malformed weather payload")));
}

#[tokio::test]
async fn error_status_is_fetch_failure() {
    let addr = start_upstream().await;

    let err = fetcher(addr, "/broken", "/weather").fetch().await.unwrap_err();
    assert!(matches!(err, TrackerError::FetchFailed(_)));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let addr = start_upstream().await;

    let err = fetcher(addr, "/stock", "/slow").fetch().await.unwrap_err();
    assert!(matches!(err, TrackerError::FetchFailed(msg) if msg.contains("timed out")));
}

#[tokio::test]
async fn unreachable_upstream_is_fetch_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetcher(addr, "/stock", "/weather").fetch().await.unwrap_err();
    assert!(matches!(err, TrackerError::FetchFailed(_)));
}
