use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use gagstock_common::Clock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bot_api::config::Config;
use bot_api::messenger::{GraphMessenger, Messenger};
use bot_api::tracker::{Cadence, HttpStockFetcher, StockFetcher, Tracker};
use bot_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present; variables may also come from the environment.
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bot_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "cannot start without a valid configuration");
            std::process::exit(1);
        }
    };
    let port = config.port;

    let messenger: Arc<dyn Messenger> = Arc::new(GraphMessenger::new(
        &config.graph_api_url,
        &config.page_access_token,
        config.typing_delay,
    ));
    let fetcher: Arc<dyn StockFetcher> = Arc::new(HttpStockFetcher::new(
        &config.stock_api_url,
        &config.weather_api_url,
        config.fetch_timeout,
    ));
    let cadence = Cadence {
        interval_secs: config.poll_interval_secs,
        offset_secs: config.poll_offset_secs,
    };
    let tracker = Arc::new(Tracker::new(
        fetcher,
        messenger.clone(),
        Clock::new(config.timezone),
        cadence,
    ));

    tracing::info!(
        timezone = %config.timezone.name(),
        interval_secs = cadence.interval_secs,
        offset_secs = cadence.offset_secs,
        "tracker configured"
    );

    let state = AppState {
        config: Arc::new(config),
        tracker: tracker.clone(),
        messenger,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(bot_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "bot-api listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
    }

    tracker.shutdown().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
