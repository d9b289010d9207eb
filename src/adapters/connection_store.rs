// 接続ストア
//
// 接続エンティティの永続化を抽象化します。
// (workspace, name) と (workspace, config) の2つの一意インデックスを持ち、
// 違反時は StoreError::DuplicateKey を返すことが実装側の契約です。

use crate::core::connection::{Connection, ConnectionConfig};
use crate::core::error::{StoreError, UniqueIndex};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// 接続の永続化インターフェース
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    /// 接続を挿入
    ///
    /// 一意インデックスの検査と挿入は不可分に行われなければならない。
    async fn insert(&self, connection: Connection) -> Result<(), StoreError>;

    /// IDで取得
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Connection>, StoreError>;

    /// ワークスペースの接続一覧（作成順）
    async fn find_by_workspace(&self, workspace_id: &str) -> Result<Vec<Connection>, StoreError>;

    /// 名前で存在確認
    async fn exists_with_name(&self, workspace_id: &str, name: &str) -> Result<bool, StoreError>;

    /// 設定で存在確認
    async fn exists_with_config(
        &self,
        workspace_id: &str,
        config: &ConnectionConfig,
    ) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
struct StoreState {
    /// 挿入順の接続
    connections: Vec<Connection>,
    by_id: HashMap<Uuid, usize>,
    names: HashSet<(String, String)>,
    configs: HashSet<(String, ConnectionConfig)>,
}

/// インメモリの接続ストア
///
/// 全インデックスを1つのロックで保護するため、検査と挿入は競合しない。
#[derive(Debug, Default)]
pub struct InMemoryConnectionStore {
    state: Mutex<StoreState>,
}

impl InMemoryConnectionStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存件数
    pub fn len(&self) -> usize {
        self.state.lock().connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ConnectionStore for InMemoryConnectionStore {
    async fn insert(&self, connection: Connection) -> Result<(), StoreError> {
        let mut state = self.state.lock();

        let name_key = (connection.workspace_id.clone(), connection.name.clone());
        if state.names.contains(&name_key) {
            return Err(StoreError::DuplicateKey {
                index: UniqueIndex::WorkspaceName,
            });
        }

        let config_key = (connection.workspace_id.clone(), connection.config.clone());
        if state.configs.contains(&config_key) {
            return Err(StoreError::DuplicateKey {
                index: UniqueIndex::WorkspaceConfig,
            });
        }

        if state.by_id.contains_key(&connection.id) {
            return Err(StoreError::Backend {
                message: format!("Connection id {} already exists", connection.id),
            });
        }

        let position = state.connections.len();
        state.by_id.insert(connection.id, position);
        state.names.insert(name_key);
        state.configs.insert(config_key);
        state.connections.push(connection);

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Connection>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .by_id
            .get(&id)
            .and_then(|&position| state.connections.get(position))
            .cloned())
    }

    async fn find_by_workspace(&self, workspace_id: &str) -> Result<Vec<Connection>, StoreError> {
        let state = self.state.lock();
        Ok(state
            .connections
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn exists_with_name(&self, workspace_id: &str, name: &str) -> Result<bool, StoreError> {
        let state = self.state.lock();
        Ok(state
            .names
            .contains(&(workspace_id.to_string(), name.to_string())))
    }

    async fn exists_with_config(
        &self,
        workspace_id: &str,
        config: &ConnectionConfig,
    ) -> Result<bool, StoreError> {
        let state = self.state.lock();
        Ok(state
            .configs
            .contains(&(workspace_id.to_string(), config.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::SchemaMap;
    use std::sync::Arc;

    fn connection(workspace: &str, name: &str, conn_str: &str) -> Connection {
        Connection::new(
            workspace,
            "user-1",
            name,
            ConnectionConfig {
                connection_string: conn_str.to_string(),
            },
            SchemaMap::new(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = InMemoryConnectionStore::new();
        let conn = connection("w1", "prod", "mysql://h/a");
        let id = conn.id;

        store.insert(conn).await.unwrap();

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.name, "prod");
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_in_same_workspace() {
        let store = InMemoryConnectionStore::new();
        store.insert(connection("w1", "prod", "mysql://h/a")).await.unwrap();

        let err = store
            .insert(connection("w1", "prod", "mysql://h/b"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                index: UniqueIndex::WorkspaceName
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_config_in_same_workspace() {
        let store = InMemoryConnectionStore::new();
        store.insert(connection("w1", "prod", "mysql://h/a")).await.unwrap();

        let err = store
            .insert(connection("w1", "staging", "mysql://h/a"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateKey {
                index: UniqueIndex::WorkspaceConfig
            }
        );
    }

    #[tokio::test]
    async fn test_same_name_in_other_workspace_is_allowed() {
        let store = InMemoryConnectionStore::new();
        store.insert(connection("w1", "prod", "mysql://h/a")).await.unwrap();
        store.insert(connection("w2", "prod", "mysql://h/a")).await.unwrap();

        assert_eq!(store.find_by_workspace("w1").await.unwrap().len(), 1);
        assert_eq!(store.find_by_workspace("w2").await.unwrap().len(), 1);
        assert!(store.find_by_workspace("w3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let store = InMemoryConnectionStore::new();
        store.insert(connection("w1", "prod", "mysql://h/a")).await.unwrap();

        assert!(store.exists_with_name("w1", "prod").await.unwrap());
        assert!(!store.exists_with_name("w1", "dev").await.unwrap());
        let config = ConnectionConfig {
            connection_string: "mysql://h/a".to_string(),
        };
        assert!(store.exists_with_config("w1", &config).await.unwrap());
        assert!(!store.exists_with_config("w2", &config).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_only_one_wins() {
        let store = Arc::new(InMemoryConnectionStore::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert(connection("w1", "shared", &format!("mysql://h/db{}", i)))
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }
}
