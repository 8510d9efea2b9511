//! Gemini chat web server
//!
//! (c) Softlandia 2025

use tokio_gemini_chat_api::api;
use tokio_gemini_chat_api::core::completion::GeminiClient;
use tokio_gemini_chat_api::core::config::{AppConfig, CompletionConfig};
use tokio_gemini_chat_api::core::events::EventBus;
use tokio_gemini_chat_api::core::orchestrator::ChatTurnOrchestrator;
use tokio_gemini_chat_api::core::services::MyChatService;
use tokio_gemini_chat_api::core::session::SessionStore;
use tokio_gemini_chat_api::infrastructure::database::DatabaseConnection;
use tokio_gemini_chat_api::infrastructure::repositories::DbChatRepository;

use anyhow::{Context, anyhow};
use axum::http::{HeaderValue, Method};
use axum::response::Html;
use axum::routing::get;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::{info, warn};
use tokio::runtime::{Builder, Runtime};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(web_server_task(config))
}

async fn web_server_task(config: AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseConnection::connect(&config.database_url)
        .await
        .with_context(|| format!("cannot open database {}", config.database_url))?;
    DatabaseConnection::install_pool(pool);

    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(CompletionConfig::singleton())
        .add(GeminiClient::singleton())
        .add(SessionStore::singleton())
        .add(EventBus::singleton())
        .add(DbChatRepository::scoped())
        .add(MyChatService::scoped())
        .add(ChatTurnOrchestrator::scoped())
        .build_provider()
        .map_err(|e| anyhow!("invalid service configuration: {e:?}"))?;

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {origin}");
                None
            }
        })
        .collect();

    // build our application with a route
    let app = api::router()
        .route("/", get(index))
        .nest_service(
            "/static",
            ServiceBuilder::new().service(ServeDir::new("static")),
        )
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_origin(AllowOrigin::list(origins)),
        )
        .with_provider(provider);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.bind_addr))?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
