// APIエラーレスポンス
//
// RegistryError を `{"error": <message>, "code": <ERROR_CODE>}` 形式のHTTPレスポンスに変換する。

use crate::core::error::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal error");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.error_code(),
        }));

        (status, body).into_response()
    }
}

/// エラーボディを組み立てる（レジストリ外のエラー用）
pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": message,
            "code": code,
        })),
    )
        .into_response()
}
