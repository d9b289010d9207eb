// inspectコマンドハンドラー
//
// 接続文字列をパースし、スキーマを取得してJSONで出力します。
// サーバーを起動せずに接続設定を確認するための診断コマンド。

use crate::adapters::connection_string;
use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::database_introspector::{DatabaseIntrospector, MySqlIntrospector};
use crate::core::config::IntrospectionConfig;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

/// inspectコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct InspectCommand {
    /// 接続文字列
    pub connection_string: String,
    /// 接続タイムアウト（秒）
    pub timeout: Option<u64>,
}

/// inspectコマンドハンドラー
#[derive(Debug, Default)]
pub struct InspectCommandHandler {}

impl InspectCommandHandler {
    /// 新しいInspectCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スキーマを取得してJSON文字列を返す
    pub async fn execute(&self, command: &InspectCommand) -> Result<String> {
        let timeout = command
            .timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| IntrospectionConfig::default().connect_timeout());

        let introspector = MySqlIntrospector::new(DatabaseConnectionService::new(timeout));
        self.execute_with(command, &introspector).await
    }

    /// イントロスペクターを指定して実行
    pub async fn execute_with(
        &self,
        command: &InspectCommand,
        introspector: &dyn DatabaseIntrospector,
    ) -> Result<String> {
        let redacted = connection_string::redact_connection_string(&command.connection_string);
        let descriptor = connection_string::parse(&command.connection_string)
            .with_context(|| format!("Invalid connection string: {}", redacted))?;

        info!(target_db = %descriptor.target(), "Inspecting database");

        let schema = introspector
            .introspect(&descriptor)
            .await
            .with_context(|| format!("Failed to introspect {}", descriptor.target()))?;

        serde_json::to_string_pretty(&schema).context("Failed to serialize schema")
    }
}
