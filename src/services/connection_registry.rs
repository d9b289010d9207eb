// 接続レジストリサービス
//
// ワークスペース単位で接続を登録・参照するサービス。
// 作成時に接続文字列のパースとスキーマ取得を行い、成功した場合のみ永続化する。

use crate::adapters::connection_store::ConnectionStore;
use crate::adapters::connection_string;
use crate::adapters::database_introspector::DatabaseIntrospector;
use crate::adapters::workspace_directory::WorkspaceDirectory;
use crate::core::connection::{Connection, ConnectionConfig, ConnectionSummary, Membership};
use crate::core::error::{RegistryError, UniqueIndex};
use crate::core::schema::SchemaMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 接続レジストリサービス
#[derive(Clone)]
pub struct ConnectionRegistry {
    store: Arc<dyn ConnectionStore>,
    directory: Arc<dyn WorkspaceDirectory>,
    introspector: Arc<dyn DatabaseIntrospector>,
}

impl ConnectionRegistry {
    /// 新しいConnectionRegistryを作成
    pub fn new(
        store: Arc<dyn ConnectionStore>,
        directory: Arc<dyn WorkspaceDirectory>,
        introspector: Arc<dyn DatabaseIntrospector>,
    ) -> Self {
        Self {
            store,
            directory,
            introspector,
        }
    }

    /// 接続を作成
    ///
    /// 処理順序:
    /// 1. メンバーシップ確認
    /// 2. 接続文字列のパース
    /// 3. 一意性の事前確認
    /// 4. スキーマ取得
    /// 5. 永続化（ストアの一意制約が最終判定）
    ///
    /// いずれかが失敗した場合は何も保存しない。
    pub async fn create_connection(
        &self,
        workspace_id: &str,
        caller_id: &str,
        name: &str,
        connection_string: &str,
    ) -> Result<Connection, RegistryError> {
        self.require_member(workspace_id, caller_id).await?;

        let descriptor = connection_string::parse(connection_string)?;
        let config = ConnectionConfig {
            connection_string: connection_string.to_string(),
        };

        if self.store.exists_with_name(workspace_id, name).await? {
            return Err(RegistryError::DuplicateConnection {
                index: UniqueIndex::WorkspaceName,
            });
        }
        if self.store.exists_with_config(workspace_id, &config).await? {
            return Err(RegistryError::DuplicateConnection {
                index: UniqueIndex::WorkspaceConfig,
            });
        }

        let schema = self.introspector.introspect(&descriptor).await.map_err(|e| {
            warn!(
                workspace_id = %workspace_id,
                target_db = %descriptor.target(),
                error = %e,
                "Schema introspection failed"
            );
            e
        })?;

        let connection = Connection::new(workspace_id, caller_id, name, config, schema);
        // 事前確認後に並行リクエストが先に挿入した場合もここで重複として返る
        self.store.insert(connection.clone()).await?;

        info!(
            workspace_id = %workspace_id,
            connection_id = %connection.id,
            tables = connection.schema.len(),
            "Connection created"
        );

        Ok(connection)
    }

    /// ワークスペースの接続一覧（スキーマ本体は含まない）
    pub async fn list_connections(
        &self,
        workspace_id: &str,
        caller_id: &str,
    ) -> Result<Vec<ConnectionSummary>, RegistryError> {
        self.require_member(workspace_id, caller_id).await?;

        let connections = self.store.find_by_workspace(workspace_id).await?;
        Ok(connections.iter().map(Connection::summary).collect())
    }

    /// 接続のサマリーを取得
    pub async fn get_connection(
        &self,
        connection_id: &str,
        caller_id: &str,
    ) -> Result<ConnectionSummary, RegistryError> {
        let connection = self.find_accessible(connection_id, caller_id).await?;
        Ok(connection.summary())
    }

    /// 保存済みのスキーマスナップショットを取得
    ///
    /// 対象データベースには再接続しない。
    pub async fn get_schema(
        &self,
        connection_id: &str,
        caller_id: &str,
    ) -> Result<SchemaMap, RegistryError> {
        let connection = self.find_accessible(connection_id, caller_id).await?;
        Ok(connection.schema)
    }

    /// 接続を取得し、呼び出し元が所有ワークスペースのメンバーであることを確認
    async fn find_accessible(
        &self,
        connection_id: &str,
        caller_id: &str,
    ) -> Result<Connection, RegistryError> {
        let not_found = || RegistryError::ConnectionNotFound {
            connection_id: connection_id.to_string(),
        };

        let id = Uuid::parse_str(connection_id).map_err(|_| not_found())?;
        let connection = self.store.find_by_id(id).await?.ok_or_else(not_found)?;

        self.require_member(&connection.workspace_id, caller_id)
            .await?;

        Ok(connection)
    }

    async fn require_member(
        &self,
        workspace_id: &str,
        caller_id: &str,
    ) -> Result<Membership, RegistryError> {
        let membership = self
            .directory
            .membership(workspace_id, caller_id)
            .await
            .ok_or_else(|| RegistryError::WorkspaceNotFound {
                workspace_id: workspace_id.to_string(),
            })?;

        if !membership.is_member {
            return Err(RegistryError::Forbidden);
        }

        Ok(membership)
    }
}
