// API Layer
// 接続レジストリをREST(JSON)として公開する

pub mod auth;
pub mod error;
pub mod handlers;

use crate::services::connection_registry::ConnectionRegistry;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// ハンドラー間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// ルーターを構築
///
/// axumのルーターは同じ位置で異なるパラメータ名を許さないため、
/// パスパラメータ名は全ルートで `{id}` に統一している。
pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/connections/{id}/create", post(handlers::create_connection))
        .route("/connections/workspace/{id}", get(handlers::list_connections))
        .route("/connections/{id}", get(handlers::get_connection))
        .route("/connections/{id}/schema", get(handlers::get_schema))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// 許可オリジンからCORSレイヤーを構築（不正なオリジンは無視）
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static(auth::USER_ID_HEADER),
        ])
}

/// サーバーを起動し、shutdown が完了するまで待つ
pub async fn serve<F>(
    app: Router,
    addr: SocketAddr,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}
