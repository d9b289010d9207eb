// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ConnectionStringError, IntrospectionError, StoreError,
// RegistryError, ConfigError を定義します。

use thiserror::Error;

/// 接続文字列のパースエラー
///
/// 接続文字列がURIとして不正な場合、またはスキームが未対応の場合に発生します。
/// メッセージには接続文字列そのもの（認証情報を含む）を含めません。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionStringError {
    /// URIとして解釈できない
    #[error("Invalid connection string format: {reason}")]
    InvalidUri {
        /// 原因
        reason: String,
    },

    /// 未対応のスキーム
    #[error("Connection string must start with '{expected}://' (got '{scheme}://')")]
    UnsupportedScheme {
        /// 指定されたスキーム
        scheme: String,
        /// 期待するスキーム
        expected: &'static str,
    },
}

/// スキーマ取得エラー
///
/// 対象データベースへの接続・カタログ読み取り時に発生するエラーを表現します。
/// いずれも呼び出し元が指定した接続文字列に起因するものとして扱います。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntrospectionError {
    /// ホスト/ポートに到達できない
    #[error("Can't connect to MySQL server at {host}:{port}. Please check host and port. ({cause})")]
    ConnectionRefused {
        /// ホスト名
        host: String,
        /// ポート番号
        port: u16,
        /// 原因
        cause: String,
    },

    /// 認証失敗
    #[error("Access denied. Please check your username and password.")]
    AuthenticationFailed {
        /// ドライバーのエラーメッセージ
        cause: String,
    },

    /// データベースが存在しない
    #[error("Unknown database '{database}'. Please check the database name.")]
    UnknownDatabase {
        /// データベース名
        database: String,
    },

    /// その他のエンジンエラー
    #[error("MySQL Error: {message}")]
    Failed {
        /// ドライバーのエラーメッセージ
        message: String,
    },
}

impl IntrospectionError {
    /// 接続拒否エラーかどうか
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, IntrospectionError::ConnectionRefused { .. })
    }

    /// 認証エラーかどうか
    pub fn is_authentication_failed(&self) -> bool {
        matches!(self, IntrospectionError::AuthenticationFailed { .. })
    }

    /// 不明なデータベースエラーかどうか
    pub fn is_unknown_database(&self) -> bool {
        matches!(self, IntrospectionError::UnknownDatabase { .. })
    }

    /// その他のエンジンエラーかどうか
    pub fn is_failed(&self) -> bool {
        matches!(self, IntrospectionError::Failed { .. })
    }
}

/// 一意インデックスの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueIndex {
    /// (workspace, name)
    WorkspaceName,
    /// (workspace, config)
    WorkspaceConfig,
}

impl std::fmt::Display for UniqueIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueIndex::WorkspaceName => write!(f, "unique_connection_name_per_workspace"),
            UniqueIndex::WorkspaceConfig => write!(f, "unique_connection_config_per_workspace"),
        }
    }
}

/// 永続化層のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 一意制約違反
    #[error("Duplicate key violates unique index '{index}'")]
    DuplicateKey {
        /// 違反したインデックス
        index: UniqueIndex,
    },

    /// ストア自体の障害
    #[error("Store error: {message}")]
    Backend {
        /// エラーメッセージ
        message: String,
    },
}

/// 接続レジストリのエラー
///
/// API層でHTTPステータスに変換されます。
#[derive(Debug, Error)]
pub enum RegistryError {
    /// 接続文字列が不正
    #[error(transparent)]
    MalformedConnectionString(#[from] ConnectionStringError),

    /// ワークスペースが存在しない
    #[error("Workspace not found")]
    WorkspaceNotFound {
        /// ワークスペースID
        workspace_id: String,
    },

    /// 接続が存在しない
    #[error("Connection not found")]
    ConnectionNotFound {
        /// 接続ID
        connection_id: String,
    },

    /// ワークスペースのメンバーではない
    #[error("You don't have access to this workspace")]
    Forbidden,

    /// 名前または設定が重複している
    #[error("{}", duplicate_message(.index))]
    DuplicateConnection {
        /// 違反した一意制約
        index: UniqueIndex,
    },

    /// スキーマ取得の失敗
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    /// 予期しないエラー
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// エラーメッセージ
        message: String,
    },
}

fn duplicate_message(index: &UniqueIndex) -> &'static str {
    match index {
        UniqueIndex::WorkspaceName => "A connection with this name already exists in this workspace",
        UniqueIndex::WorkspaceConfig => {
            "A connection with this configuration already exists in this workspace"
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { index } => RegistryError::DuplicateConnection { index },
            StoreError::Backend { message } => RegistryError::Unexpected { message },
        }
    }
}

impl RegistryError {
    /// HTTPステータスコード
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::MalformedConnectionString(_) | RegistryError::Introspection(_) => 400,
            RegistryError::Forbidden => 403,
            RegistryError::WorkspaceNotFound { .. } | RegistryError::ConnectionNotFound { .. } => {
                404
            }
            RegistryError::DuplicateConnection { .. } => 409,
            RegistryError::Unexpected { .. } => 500,
        }
    }

    /// 機械可読なエラーコード
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::MalformedConnectionString(_) => "MALFORMED_CONNECTION_STRING",
            RegistryError::WorkspaceNotFound { .. } => "WORKSPACE_NOT_FOUND",
            RegistryError::ConnectionNotFound { .. } => "CONNECTION_NOT_FOUND",
            RegistryError::Forbidden => "FORBIDDEN",
            RegistryError::DuplicateConnection { .. } => "DUPLICATE_CONNECTION",
            RegistryError::Introspection(IntrospectionError::ConnectionRefused { .. }) => {
                "CONNECTION_REFUSED"
            }
            RegistryError::Introspection(IntrospectionError::AuthenticationFailed { .. }) => {
                "AUTHENTICATION_FAILED"
            }
            RegistryError::Introspection(IntrospectionError::UnknownDatabase { .. }) => {
                "UNKNOWN_DATABASE"
            }
            RegistryError::Introspection(IntrospectionError::Failed { .. }) => {
                "INTROSPECTION_FAILED"
            }
            RegistryError::Unexpected { .. } => "UNEXPECTED",
        }
    }

    /// 重複エラーかどうか
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RegistryError::DuplicateConnection { .. })
    }

    /// 権限エラーかどうか
    pub fn is_forbidden(&self) -> bool {
        matches!(self, RegistryError::Forbidden)
    }
}

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAMLとして解釈できない
    #[error("Failed to parse config file: {message}")]
    Parse {
        /// エラーメッセージ
        message: String,
    },

    /// バインドアドレスが不正
    #[error("Invalid bind address '{address}': {reason}")]
    InvalidBindAddress {
        /// 指定されたアドレス
        address: String,
        /// 原因
        reason: String,
    },

    /// 接続タイムアウトが0
    #[error("introspection.connect_timeout_secs must be greater than 0")]
    ZeroConnectTimeout,

    /// ワークスペースIDが空
    #[error("Workspace id must not be empty")]
    EmptyWorkspaceId,

    /// ワークスペースIDの重複
    #[error("Duplicate workspace id '{id}'")]
    DuplicateWorkspace {
        /// ワークスペースID
        id: String,
    },
}
