// Services Layer
// ドメインロジックを実行するサービス層

pub mod config_loader;
pub mod connection_registry;
