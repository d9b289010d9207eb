// Adapters
// 対象データベース、永続化、メンバーシップ判定へのアクセスを抽象化

pub mod connection_store;
pub mod connection_string;
pub mod database;
pub mod database_introspector;
pub mod type_mapping;
pub mod workspace_directory;
