pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resource;
pub mod validation;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Compose the full application router over an injected pool.
pub fn app(pool: PgPool) -> Router {
    Router::new()
        .route("/", get(service_root))
        .route("/health", get(health))
        .with_state(pool.clone())
        .nest(
            "/accelerometer",
            handlers::records::router(&resource::ACCELEROMETER, pool.clone()),
        )
        .nest("/ecu", handlers::records::router(&resource::ECU, pool.clone()))
        .nest("/gps", handlers::records::router(&resource::GPS, pool.clone()))
        .nest("/users", handlers::users::router(pool))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn service_root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Telemetry API",
        "version": version,
        "description": "Paginated CRUD access to vehicle sensor telemetry",
        "endpoints": {
            "accelerometer": "/accelerometer[/:id] (reads public, writes require auth)",
            "ecu": "/ecu[/:id] (reads public, writes require auth)",
            "gps": "/gps[/:id] (reads public, writes require auth)",
            "users": "/users, /users/login, /users/:id",
            "health": "/health (public)",
        }
    }))
}

async fn health(State(pool): State<PgPool>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
