// 呼び出し元の識別
//
// 認証は上流のミドルウェアの責務。ここでは認証済みユーザーIDをヘッダーから受け取るだけ。

use crate::api::error::error_response;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

/// 認証済みユーザーIDを運ぶヘッダー
pub const USER_ID_HEADER: &str = "x-user-id";

/// 呼び出し元のユーザーID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// ユーザーIDが取得できない場合の拒否
#[derive(Debug)]
pub struct MissingCallerId;

impl IntoResponse for MissingCallerId {
    fn into_response(self) -> Response {
        error_response(
            StatusCode::UNAUTHORIZED,
            "UNAUTHENTICATED",
            "Missing authenticated user id",
        )
    }
}

impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = MissingCallerId;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| CallerId(value.to_string()))
            .ok_or(MissingCallerId)
    }
}
