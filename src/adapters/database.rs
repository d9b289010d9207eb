// データベース接続アダプター
//
// SQLxを使用した対象MySQLへの一時接続の確立と、ドライバーエラーの分類を行います。
// イントロスペクションは1リクエストにつき1接続で、プールは使用しません。

use crate::core::connection::{ConnectionDescriptor, SslMode};
use crate::core::error::IntrospectionError;
use sqlx::mysql::{MySqlConnectOptions, MySqlDatabaseError, MySqlSslMode};
use sqlx::{Connection, MySqlConnection};
use std::time::Duration;
use tracing::debug;

/// Access denied for user (using password)
pub const ER_ACCESS_DENIED_ERROR: u16 = 1045;
/// Access denied for user to database
pub const ER_DBACCESS_DENIED_ERROR: u16 = 1044;
/// Access denied (auth plugin / no password)
pub const ER_ACCESS_DENIED_NO_PASSWORD_ERROR: u16 = 1698;
/// Unknown database
pub const ER_BAD_DB_ERROR: u16 = 1049;

/// デフォルトの接続タイムアウト（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// データベース接続サービス
///
/// 接続オプションの構築と、タイムアウト付きの接続確立を行います。
#[derive(Debug, Clone)]
pub struct DatabaseConnectionService {
    connect_timeout: Duration,
}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    /// 接続タイムアウト
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// 接続記述子からSQLxの接続オプションを構築
    ///
    /// SSLモードの変換:
    /// - REQUIRED / VERIFY_CA / VERIFY_IDENTITY: TLSを有効化
    /// - DISABLED: TLSを明示的に無効化
    /// - それ以外: ドライバーのデフォルト
    pub fn build_connect_options(&self, descriptor: &ConnectionDescriptor) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&descriptor.host)
            .port(descriptor.port);

        // ユーザー未指定時にドライバー既定の "root" を使わせない（匿名ユーザー扱い）
        options = options.username(descriptor.user.as_deref().unwrap_or(""));
        if let Some(password) = descriptor.password.as_deref() {
            options = options.password(password);
        }
        if let Some(database) = descriptor.database.as_deref() {
            options = options.database(database);
        }

        match descriptor.ssl_mode {
            SslMode::Required => options.ssl_mode(MySqlSslMode::Required),
            SslMode::VerifyCa => options.ssl_mode(MySqlSslMode::VerifyCa),
            SslMode::VerifyIdentity => options.ssl_mode(MySqlSslMode::VerifyIdentity),
            SslMode::Disabled => options.ssl_mode(MySqlSslMode::Disabled),
            SslMode::Preferred => options,
        }
    }

    /// タイムアウト付きで接続を確立
    ///
    /// # Returns
    ///
    /// 接続、または分類済みのエラー
    pub async fn connect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<MySqlConnection, IntrospectionError> {
        let options = self.build_connect_options(descriptor);

        debug!(
            target_db = %descriptor.target(),
            ssl_mode = %descriptor.ssl_mode,
            timeout_secs = self.connect_timeout.as_secs(),
            "Connecting to MySQL"
        );

        match tokio::time::timeout(self.connect_timeout, MySqlConnection::connect_with(&options))
            .await
        {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(classify_connect_error(&e, descriptor)),
            Err(_) => Err(IntrospectionError::ConnectionRefused {
                host: descriptor.host.clone(),
                port: descriptor.port,
                cause: format!(
                    "connection timed out after {}s",
                    self.connect_timeout.as_secs()
                ),
            }),
        }
    }

    /// 接続を閉じる
    ///
    /// クローズ時のエラーは結果に影響させない（ソケットはdropで解放される）。
    pub async fn close(&self, conn: MySqlConnection) {
        if let Err(e) = conn.close().await {
            debug!(error = %e, "Failed to close MySQL connection cleanly");
        }
    }
}

impl Default for DatabaseConnectionService {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
    }
}

/// 接続時のドライバーエラーを分類
///
/// MySQLのエラー番号で認証失敗/不明なデータベースを判定し、
/// I/Oエラーは到達不能として扱う。それ以外は IntrospectionError::Failed。
pub fn classify_connect_error(
    err: &sqlx::Error,
    descriptor: &ConnectionDescriptor,
) -> IntrospectionError {
    match err {
        sqlx::Error::Database(db_err) => {
            let number = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| e.number());
            classify_error_number(number, db_err.message(), descriptor)
        }
        sqlx::Error::Io(io_err) => IntrospectionError::ConnectionRefused {
            host: descriptor.host.clone(),
            port: descriptor.port,
            cause: io_err.to_string(),
        },
        other => IntrospectionError::Failed {
            message: other.to_string(),
        },
    }
}

/// クエリ実行時のドライバーエラーを分類
pub fn classify_query_error(
    err: &sqlx::Error,
    descriptor: &ConnectionDescriptor,
) -> IntrospectionError {
    match err {
        sqlx::Error::Database(db_err) => {
            let number = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| e.number());
            classify_error_number(number, db_err.message(), descriptor)
        }
        other => IntrospectionError::Failed {
            message: other.to_string(),
        },
    }
}

/// MySQLエラー番号による分類
pub fn classify_error_number(
    number: Option<u16>,
    message: &str,
    descriptor: &ConnectionDescriptor,
) -> IntrospectionError {
    match number {
        Some(ER_ACCESS_DENIED_ERROR)
        | Some(ER_DBACCESS_DENIED_ERROR)
        | Some(ER_ACCESS_DENIED_NO_PASSWORD_ERROR) => IntrospectionError::AuthenticationFailed {
            cause: message.to_string(),
        },
        Some(ER_BAD_DB_ERROR) => IntrospectionError::UnknownDatabase {
            database: descriptor.database.clone().unwrap_or_default(),
        },
        _ => IntrospectionError::Failed {
            message: message.to_string(),
        },
    }
}
