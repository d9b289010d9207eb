// 接続モデル
//
// パース済みの接続記述子（一時的）と、ワークスペースに保存される接続エンティティ。

use crate::core::schema::SchemaMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// サポートする唯一のドライバー識別子
pub const MYSQL_DRIVER: &str = "mysql";

/// MySQLのデフォルトポート
pub const MYSQL_DEFAULT_PORT: u16 = 3306;

/// SSL接続モード（`ssl-mode` クエリパラメータ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SslMode {
    Disabled,
    #[default]
    Preferred,
    Required,
    VerifyCa,
    VerifyIdentity,
}

impl SslMode {
    /// 大文字小文字を区別せずにパース
    ///
    /// 未知の値は None（呼び出し側でデフォルトにフォールバックする）。
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DISABLED" => Some(SslMode::Disabled),
            "PREFERRED" => Some(SslMode::Preferred),
            "REQUIRED" => Some(SslMode::Required),
            "VERIFY_CA" => Some(SslMode::VerifyCa),
            "VERIFY_IDENTITY" => Some(SslMode::VerifyIdentity),
            _ => None,
        }
    }
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SslMode::Disabled => write!(f, "DISABLED"),
            SslMode::Preferred => write!(f, "PREFERRED"),
            SslMode::Required => write!(f, "REQUIRED"),
            SslMode::VerifyCa => write!(f, "VERIFY_CA"),
            SslMode::VerifyIdentity => write!(f, "VERIFY_IDENTITY"),
        }
    }
}

/// 接続記述子
///
/// 接続文字列をパースした結果。1回のイントロスペクションの間だけ存在し、
/// 永続化されるのは元の接続文字列のみ。
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// データベース名（パスが空の場合はNone）
    pub database: Option<String>,
    pub ssl_mode: SslMode,
    /// `ssl-mode` 以外のクエリパラメータ
    pub extra_params: BTreeMap<String, String>,
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: MYSQL_DEFAULT_PORT,
            user: None,
            password: None,
            database: None,
            ssl_mode: SslMode::default(),
            extra_params: BTreeMap::new(),
        }
    }
}

impl ConnectionDescriptor {
    /// ログ用の接続先表記（認証情報を含まない）
    pub fn target(&self) -> String {
        format!(
            "{}:{}/{}",
            self.host,
            self.port,
            self.database.as_deref().unwrap_or("")
        )
    }
}

// パスワードをログに出さないための手書き実装
impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("extra_params", &self.extra_params)
            .finish()
    }
}

/// 保存される接続設定
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// 元の接続文字列
    pub connection_string: String,
}

/// ワークスペースに保存された接続
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: Uuid,
    /// 表示名（ワークスペース内で一意）
    pub name: String,
    pub driver: String,
    pub config: ConnectionConfig,
    /// 作成時点のスキーマスナップショット
    #[serde(rename = "dbSchema")]
    pub schema: SchemaMap,
    pub created_by: String,
    pub workspace_id: String,
    pub created_at: DateTime<Utc>,
}

impl Connection {
    /// 新しい接続を作成（IDと作成日時を採番）
    pub fn new(
        workspace_id: impl Into<String>,
        created_by: impl Into<String>,
        name: impl Into<String>,
        config: ConnectionConfig,
        schema: SchemaMap,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            driver: MYSQL_DRIVER.to_string(),
            config,
            schema,
            created_by: created_by.into(),
            workspace_id: workspace_id.into(),
            created_at: Utc::now(),
        }
    }

    /// 軽量なサマリーに変換
    pub fn summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            id: self.id,
            name: self.name.clone(),
            driver: self.driver.clone(),
            workspace_id: self.workspace_id.clone(),
            created_at: self.created_at,
            has_schema: !self.schema.is_empty(),
            table_count: self.schema.len(),
        }
    }
}

/// 接続のサマリー（スキーマ本体を含まない）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub id: Uuid,
    pub name: String,
    pub driver: String,
    pub workspace_id: String,
    pub created_at: DateTime<Utc>,
    pub has_schema: bool,
    pub table_count: usize,
}

/// ワークスペースのメンバーシップ判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Membership {
    pub is_member: bool,
    pub is_admin: bool,
}
