// ワークスペースディレクトリ
//
// ワークスペースの存在確認とメンバーシップ判定の境界。
// ワークスペース管理自体は外部システムの責務で、ここでは判定結果だけを扱う。

use crate::core::config::WorkspaceSeed;
use crate::core::connection::Membership;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// メンバーシップ判定インターフェース
#[async_trait]
pub trait WorkspaceDirectory: Send + Sync {
    /// ワークスペース内でのユーザーのメンバーシップ
    ///
    /// ワークスペースが存在しない場合は None。
    async fn membership(&self, workspace_id: &str, user_id: &str) -> Option<Membership>;
}

/// インメモリのワークスペースディレクトリ
#[derive(Debug, Default)]
pub struct InMemoryWorkspaceDirectory {
    /// workspace_id -> (user_id -> is_admin)
    workspaces: RwLock<HashMap<String, HashMap<String, bool>>>,
}

impl InMemoryWorkspaceDirectory {
    /// 空のディレクトリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 設定の初期データから作成
    pub fn from_seeds(seeds: &[WorkspaceSeed]) -> Self {
        let directory = Self::new();
        for seed in seeds {
            directory.add_workspace(&seed.id);
            for member in &seed.members {
                directory.add_member(&seed.id, &member.user_id, member.admin);
            }
        }
        directory
    }

    /// ワークスペースを登録（既存の場合は何もしない）
    pub fn add_workspace(&self, workspace_id: &str) {
        self.workspaces
            .write()
            .entry(workspace_id.to_string())
            .or_default();
    }

    /// メンバーを登録（ワークスペースがなければ作成）
    pub fn add_member(&self, workspace_id: &str, user_id: &str, is_admin: bool) {
        self.workspaces
            .write()
            .entry(workspace_id.to_string())
            .or_default()
            .insert(user_id.to_string(), is_admin);
    }
}

#[async_trait]
impl WorkspaceDirectory for InMemoryWorkspaceDirectory {
    async fn membership(&self, workspace_id: &str, user_id: &str) -> Option<Membership> {
        let workspaces = self.workspaces.read();
        let members = workspaces.get(workspace_id)?;

        Some(match members.get(user_id) {
            Some(&is_admin) => Membership {
                is_member: true,
                is_admin,
            },
            None => Membership::default(),
        })
    }
}
