// 設定ファイル読み込みサービス
//
// core::config の純粋性を保つため、ファイルI/Oはこのサービスに集約する。

use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// 設定ファイル読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// YAMLファイルから設定を読み込む
    pub fn from_file(path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        content
            .parse::<AppConfig>()
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// 設定を読み込み、環境変数を適用して検証する
    ///
    /// パスが指定されない場合はデフォルト設定を使う。
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => AppConfig::default(),
        }
        .apply_env_overrides();

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "introspection:\n  connect_timeout_secs: 9\nworkspaces:\n  - id: w1\n    name: Team"
        )
        .unwrap();

        let config = ConfigLoader::from_file(file.path()).unwrap();
        assert_eq!(config.introspection.connect_timeout_secs, 9);
        assert_eq!(config.workspaces.len(), 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ConfigLoader::from_file(Path::new("/nonexistent/dbchat.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "introspection:\n  connect_timeout_secs: 0").unwrap();

        let err = ConfigLoader::load(Some(file.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("connect_timeout_secs"));
    }
}
