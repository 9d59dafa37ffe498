use axum::{
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::{index, users};
use crate::config::Settings;
use crate::db::{self, repo};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

/// Builds the full router around an already-prepared pool.
pub fn app(pool: SqlitePool) -> Router {
    let state = Arc::new(AppState { db: pool });

    Router::new()
        .route("/", get(index::index).post(index::create_from_form))
        .route("/ping", get(users::ping))
        .route("/users", get(users::get_all_users).post(users::add_user))
        .route("/users/{user_id}", get(users::get_single_user))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connects to the configured database and makes sure the `users` table
/// exists.
pub async fn prepare_database(settings: &Settings) -> anyhow::Result<SqlitePool> {
    let pool = db::connect(&settings.database.url, settings.database.max_connections).await?;
    repo::create_user_table(&pool).await?;
    tracing::info!("Database ready at {}", settings.database.url);
    Ok(pool)
}

pub async fn start_server(settings: &Settings) -> anyhow::Result<()> {
    let pool = prepare_database(settings).await?;
    let app = app(pool);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        "Server running on http://{} ({:?})",
        addr,
        settings.environment
    );

    axum::serve(listener, app).await?;

    Ok(())
}
