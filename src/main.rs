use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use bi_bridge_api::database::manager::DatabaseManager;
use bi_bridge_api::handlers::{provision, roles};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, BASE_URL, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = bi_bridge_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting BI bridge in {:?} mode", config.environment);

    // Create the backup table and id sequences. The server still comes up
    // when the database is down; /health reports the degraded state.
    if let Err(e) = DatabaseManager::ensure_schema().await {
        tracing::warn!("Could not verify bridge schema at startup: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("BRIDGE_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("BI bridge listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Role reassignment
        .route("/update_user_role", get(roles::update_user_role))
        .route("/restore_user_role", get(roles::restore_user_role))
        .route("/redirect.html", get(roles::redirect_page))
        // Role lookup / creation
        .route("/roles", get(roles::list_roles))
        .route("/create_role/:role_name", get(roles::create_role))
        // Remote account provisioning
        .route("/create/user", post(provision::create_user))
        .route("/create/database", post(provision::create_database))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "BI Bridge API",
            "version": version,
            "description": "Backend bridge for BI platform role reassignment and account provisioning",
            "endpoints": {
                "home": "/",
                "health": "/health",
                "reassign": "/update_user_role?email&tenant_id",
                "restore": "/restore_user_role?email",
                "roles": "/roles",
                "create_role": "/create_role/:role_name",
                "create_user": "POST /create/user",
                "create_database": "POST /create/database",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
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
        Err(e) => {
            // Log the real failure; clients only see the degraded state
            tracing::error!("Health check database failure: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                axum::response::Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
