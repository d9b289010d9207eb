// ログ初期化
//
// RUST_LOG が設定されていればそれを優先し、なければ設定ファイルのレベルを使う。

use crate::core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// 設定からEnvFilterを構築
pub fn build_filter(config: &LoggingConfig, verbose: bool) -> EnvFilter {
    let fallback = if verbose {
        "debug".to_string()
    } else {
        config.level.clone()
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// グローバルなサブスクライバーを初期化
///
/// 2回目以降の呼び出しは無視される。
pub fn init(config: &LoggingConfig, verbose: bool) {
    let filter = build_filter(config, verbose);

    let result = match config.format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Logging already initialized");
    }
}
