//! Gateway server setup
//!
//! Provides the WebSocket server configuration, routes and the wiring of the
//! presence bridge.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::connection::ConnectionManager;
use axum::{extract::State, routing::get, Json, Router};
use presence_cache::{
    EventSource, FixedBackoff, RedisBroker, RedisParticipantLookup, RedisPool, SignalingKeys,
};
use presence_common::{AppConfig, AppError};
use presence_db::PgUserEmailRepository;
use presence_service::{
    DirectorySync, PbxDirectory, PresencePipeline, ReplicationEvent, ServiceContext,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

/// Buffer between the WebSocket handlers and the directory sync
pub const REPLICATION_BUFFER: usize = 256;

/// Create the gateway router with the WebSocket route at `path`
pub fn create_router(path: &str) -> Router<GatewayState> {
    Router::new()
        .route(path, get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check(State(state): State<GatewayState>) -> Json<Value> {
    let manager = state.connection_manager();
    Json(json!({
        "status": "ok",
        "connections": manager.connection_count(),
        "identified": manager.identified_count(),
    }))
}

/// Build the complete application
///
/// The WebSocket route is `/domain/name/instance` of the app service.
pub fn create_app(state: GatewayState) -> Router {
    let path = state.app_service().path();
    create_router(&path)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the directory sync and return its feed
pub fn spawn_directory_sync(
    directory: Arc<PbxDirectory>,
    buffer: usize,
) -> (mpsc::Sender<ReplicationEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(buffer);
    let handle = tokio::spawn(DirectorySync::new(directory).run(rx));
    (tx, handle)
}

/// Initialize all dependencies and create `GatewayState`
///
/// Also starts the directory sync. Returns the pipeline that turns room
/// events into presence commands on the registered connections.
pub fn create_gateway_state(
    config: &AppConfig,
) -> Result<(GatewayState, PresencePipeline), AppError> {
    // Relational store: user id -> email
    let db_config = presence_db::DatabaseConfig::from(&config.database);
    let pool = presence_db::create_pool(&db_config).map_err(AppError::database)?;
    let users = PgUserEmailRepository::new(
        pool,
        &config.database.users_table,
        &config.database.users_id_type,
    )
    .map_err(|e| AppError::Config(e.to_string()))?;

    // Key-value store: participant -> user id
    let redis_pool = RedisPool::from_config(&config.redis).map_err(AppError::cache)?;
    let keys = SignalingKeys::from(&config.signaling);
    let participants = RedisParticipantLookup::new(redis_pool, keys);

    let directory = Arc::new(PbxDirectory::new());
    let connection_manager = ConnectionManager::new_shared();

    let context = ServiceContext::builder()
        .participants(Arc::new(participants))
        .users(Arc::new(users))
        .directory(directory.clone())
        .registry(connection_manager.clone())
        .busy_note(config.presence.busy_note.clone())
        .build()?;

    let (replication_tx, _sync) = spawn_directory_sync(directory, REPLICATION_BUFFER);

    let state = GatewayState::new(
        connection_manager,
        replication_tx,
        config.app_service.clone(),
    );

    Ok((state, PresencePipeline::new(context)))
}

/// Subscribe to participant events and feed them into the pipeline
pub fn spawn_event_pipeline(
    config: &AppConfig,
    pipeline: PresencePipeline,
) -> Result<JoinHandle<()>, AppError> {
    let keys = SignalingKeys::from(&config.signaling);
    let broker = RedisBroker::open(&config.redis.url).map_err(AppError::cache)?;
    let source = EventSource::new(
        broker,
        FixedBackoff::from_millis(config.signaling.reconnect_delay_ms),
        keys.event_pattern(),
    );

    tracing::info!(pattern = %source.pattern(), "Subscribing to participant events");

    let (rx, _source) = source.spawn(config.signaling.event_buffer);
    Ok(tokio::spawn(pipeline.run(rx)))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting app service on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::server(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::server(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete presence bridge with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let (state, pipeline) = create_gateway_state(&config)?;
    spawn_event_pipeline(&config, pipeline)?;

    tracing::info!(
        path = %config.app_service.path(),
        "PBX app service listening on ws://{}{}",
        addr,
        config.app_service.path()
    );

    let app = create_app(state);
    run_server(app, addr).await
}
