// HTTPハンドラー

use crate::api::auth::CallerId;
use crate::api::AppState;
use crate::core::connection::{ConnectionConfig, ConnectionSummary};
use crate::core::error::RegistryError;
use crate::core::schema::SchemaMap;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

/// 接続作成リクエスト
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConnectionRequest {
    pub name: String,
    pub config: ConnectionConfig,
}

/// POST /connections/{workspaceId}/create
pub async fn create_connection(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    caller: CallerId,
    Json(request): Json<CreateConnectionRequest>,
) -> Result<(StatusCode, Json<ConnectionSummary>), RegistryError> {
    let connection = state
        .registry
        .create_connection(
            &workspace_id,
            caller.as_str(),
            &request.name,
            &request.config.connection_string,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(connection.summary())))
}

/// GET /connections/workspace/{workspaceId}
pub async fn list_connections(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
    caller: CallerId,
) -> Result<Json<Vec<ConnectionSummary>>, RegistryError> {
    let summaries = state
        .registry
        .list_connections(&workspace_id, caller.as_str())
        .await?;
    Ok(Json(summaries))
}

/// GET /connections/{connectionId}
pub async fn get_connection(
    State(state): State<AppState>,
    Path(connection_id): Path<String>,
    caller: CallerId,
) -> Result<Json<ConnectionSummary>, RegistryError> {
    let summary = state
        .registry
        .get_connection(&connection_id, caller.as_str())
        .await?;
    Ok(Json(summary))
}

/// GET /connections/{connectionId}/schema
pub async fn get_schema(
    State(state): State<AppState>,
    Path(connection_id): Path<String>,
    caller: CallerId,
) -> Result<Json<SchemaMap>, RegistryError> {
    let schema = state
        .registry
        .get_schema(&connection_id, caller.as_str())
        .await?;
    Ok(Json(schema))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
