// serveコマンドハンドラー
//
// 設定を読み込み、レジストリの依存関係を組み立ててHTTPサーバーを起動します。

use crate::adapters::connection_store::InMemoryConnectionStore;
use crate::adapters::database::DatabaseConnectionService;
use crate::adapters::database_introspector::MySqlIntrospector;
use crate::adapters::workspace_directory::InMemoryWorkspaceDirectory;
use crate::api::{self, AppState};
use crate::core::config::AppConfig;
use crate::services::connection_registry::ConnectionRegistry;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// serveコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ServeCommand {
    /// 読み込み・検証済みの設定
    pub config: AppConfig,
}

/// serveコマンドハンドラー
#[derive(Debug, Default)]
pub struct ServeCommandHandler {}

impl ServeCommandHandler {
    /// 新しいServeCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 設定からアプリケーション状態を組み立てる
    pub fn build_state(config: &AppConfig) -> AppState {
        let connection_service =
            DatabaseConnectionService::new(config.introspection.connect_timeout());
        let registry = ConnectionRegistry::new(
            Arc::new(InMemoryConnectionStore::new()),
            Arc::new(InMemoryWorkspaceDirectory::from_seeds(&config.workspaces)),
            Arc::new(MySqlIntrospector::new(connection_service)),
        );
        AppState::new(registry)
    }

    /// サーバーを起動し、Ctrl-Cで停止する
    pub async fn execute(&self, command: &ServeCommand) -> Result<String> {
        let config = &command.config;
        let addr = config.server.socket_addr()?;

        info!(
            workspaces = config.workspaces.len(),
            connect_timeout_secs = config.introspection.connect_timeout_secs,
            "Starting dbchat server"
        );

        let app = api::router(Self::build_state(config), &config.server.allowed_origins);
        api::serve(app, addr, shutdown_signal()).await?;

        Ok(String::new())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
