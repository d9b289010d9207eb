// 設定管理
//
// サーバー設定（YAML形式）の読み込みと検証を行います。
// プロセス起動時に一度だけ構築され、以後は読み取り専用で各層に渡されます。

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTPサーバー設定
    #[serde(default)]
    pub server: ServerConfig,

    /// イントロスペクション設定
    #[serde(default)]
    pub introspection: IntrospectionConfig,

    /// ログ設定
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 初期登録するワークスペース
    #[serde(default)]
    pub workspaces: Vec<WorkspaceSeed>,
}

/// HTTPサーバー設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// バインドアドレス
    #[serde(default = "default_bind")]
    pub bind: String,

    /// CORSで許可するオリジン
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    [
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "https://localhost:3000",
        "http://localhost:3001",
        "http://127.0.0.1:3001",
        "https://localhost:3001",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl ServerConfig {
    /// バインドアドレスをパース
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBindAddress {
                address: self.bind.clone(),
                reason: e.to_string(),
            })
    }
}

/// イントロスペクション設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrospectionConfig {
    /// 初回接続のタイムアウト（秒）
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl IntrospectionConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// ログ出力フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilterのディレクティブ（RUST_LOGが優先）
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// ワークスペースの初期データ
///
/// ワークスペース管理自体は外部の責務。ここではメンバーシップ判定に必要な情報のみ持つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceSeed {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub members: Vec<MemberSeed>,
}

/// ワークスペースメンバーの初期データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSeed {
    pub user_id: String,

    #[serde(default)]
    pub admin: bool,
}

impl AppConfig {
    /// 環境変数で上書き
    ///
    /// - `DBCHAT_BIND`: server.bind
    /// - `DBCHAT_LOG_LEVEL`: logging.level
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(bind) = std::env::var("DBCHAT_BIND") {
            if !bind.is_empty() {
                self.server.bind = bind;
            }
        }
        if let Ok(level) = std::env::var("DBCHAT_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
        self
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;

        if self.introspection.connect_timeout_secs == 0 {
            return Err(ConfigError::ZeroConnectTimeout);
        }

        let mut seen = HashSet::new();
        for workspace in &self.workspaces {
            if workspace.id.trim().is_empty() {
                return Err(ConfigError::EmptyWorkspaceId);
            }
            if !seen.insert(workspace.id.as_str()) {
                return Err(ConfigError::DuplicateWorkspace {
                    id: workspace.id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        if yaml.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.server.allowed_origins.len(), 6);
        assert_eq!(config.introspection.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server:
  bind: 127.0.0.1:9000
introspection:
  connect_timeout_secs: 3
logging:
  level: debug
  format: json
workspaces:
  - id: ws-1
    name: Analytics
    members:
      - user_id: alice
        admin: true
      - user_id: bob
"#;
        let config: AppConfig = yaml.parse().unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:9000");
        // allowed_origins は省略時にデフォルト
        assert_eq!(config.server.allowed_origins.len(), 6);
        assert_eq!(config.introspection.connect_timeout_secs, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.workspaces.len(), 1);
        assert_eq!(config.workspaces[0].members.len(), 2);
        assert!(config.workspaces[0].members[0].admin);
        assert!(!config.workspaces[0].members[1].admin);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config: AppConfig = "".parse().unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = "server: [unclosed".parse::<AppConfig>();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = AppConfig::default();
        config.introspection.connect_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroConnectTimeout)
        ));
    }

    #[test]
    fn test_validate_bad_bind() {
        let mut config = AppConfig::default();
        config.server.bind = "not-an-address".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBindAddress { .. })
        ));
    }

    #[test]
    fn test_validate_duplicate_workspace() {
        let mut config = AppConfig::default();
        let seed = WorkspaceSeed {
            id: "ws".to_string(),
            name: String::new(),
            members: Vec::new(),
        };
        config.workspaces = vec![seed.clone(), seed];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateWorkspace { .. })
        ));
    }

    #[test]
    fn test_validate_empty_workspace_id() {
        let mut config = AppConfig::default();
        config.workspaces = vec![WorkspaceSeed {
            id: " ".to_string(),
            name: String::new(),
            members: Vec::new(),
        }];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyWorkspaceId)
        ));
    }
}
