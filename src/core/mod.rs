// Core Domain
// 接続記述子・スキーマモデル・設定・エラー型などの純粋なドメイン定義

pub mod config;
pub mod connection;
pub mod error;
pub mod schema;
