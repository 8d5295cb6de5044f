//! HTTP server using axum.

use crate::config::{ServerConfig, StoreKind};
use crate::handler::UserHandler;
use crate::store::{MemoryUserStore, SharedStore, SqliteUserStore};
use crate::validate::parse_body;
use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared state for the server
pub struct AppState {
    pub config: ServerConfig,
    pub users: UserHandler,
}

impl AppState {
    pub fn new(config: ServerConfig, store: SharedStore) -> Arc<Self> {
        Arc::new(Self {
            config,
            users: UserHandler::new(store),
        })
    }
}

/// Open the store selected by the configuration
pub async fn open_store(config: &ServerConfig) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config.store {
        StoreKind::Sqlite => SqliteUserStore::connect(&config.database_url)
            .await
            .with_context(|| format!("failed to open database {}", config.database_url))?,
        StoreKind::Memory => MemoryUserStore::new(),
    };
    tracing::info!(backend = store.name(), "store ready");
    Ok(store)
}

/// Build the router with all routes and middleware
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
}

/// Run the server until SIGINT/SIGTERM, then drain and close the store
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let addr = config.bind_addr();
    let state = AppState::new(config, store.clone());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("Users API: http://{}/users", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("HTTP server closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received: closing HTTP server"),
        _ = terminate => tracing::info!("SIGTERM received: closing HTTP server"),
    }
}

async fn index_handler() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the users API",
        "endpoints": {
            "health": "GET /health",
            "users": {
                "list": "GET /users",
                "get": "GET /users/:id",
                "create": "POST /users",
                "update": "PUT /users/:id",
                "delete": "DELETE /users/:id"
            }
        }
    }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "service": state.config.service_name,
    }))
}

/// GET /users
async fn list_users(State(state): State<Arc<AppState>>) -> Response {
    state.users.list().await.into_response()
}

/// GET /users/{id}
async fn get_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    state.users.get(&id).await.into_response()
}

/// POST /users
async fn create_user(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    match parse_body(&body) {
        Ok(value) => state.users.create(&value).await.into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /users/{id}
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    state.users.update_raw(&id, &body).await.into_response()
}

/// DELETE /users/{id}
async fn delete_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    state.users.delete(&id).await.into_response()
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "Internal server error",
            "message": message,
        })),
    )
        .into_response()
}
