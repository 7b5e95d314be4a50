use axum::extract::State;
use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use projecthub_api::config;
use projecthub_api::database::manager::Db;
use projecthub_api::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting ProjectHub API in {:?} mode", config.environment);

    let db = Db::connect(&config.database).await?;
    db.ensure_schema().await?;

    let app = app(db.clone());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("ProjectHub API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Explicit pool teardown once the server has drained
    db.close().await;
    Ok(())
}

fn app(db: Db) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        .merge(project_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

fn user_routes() -> Router<Db> {
    use handlers::users;

    Router::new()
        .route("/api/v1/users", get(users::list).post(users::create))
        .route(
            "/api/v1/users/:id",
            get(users::get).put(users::update).delete(users::delete),
        )
}

fn project_routes() -> Router<Db> {
    use handlers::projects;

    Router::new()
        .route("/api/v1/projects", get(projects::list).post(projects::create))
        .route(
            "/api/v1/projects/:id",
            get(projects::get)
                .put(projects::update)
                .delete(projects::delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "ProjectHub API",
            "version": version,
            "description": "REST API for managing users, projects and project membership",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "users": "/api/v1/users[/:id]",
                "projects": "/api/v1/projects[/:id]",
            }
        }
    }))
}

async fn health(State(db): State<Db>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
