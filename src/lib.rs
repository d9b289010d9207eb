// dbchatライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: ドメインモデル（スキーマ、接続、エラー、設定）
// - adapters: 対象データベース、永続化、メンバーシップ判定へのアクセスを抽象化
// - services: 接続レジストリと設定読み込み
// - api: REST APIレイヤー

pub mod cli;
pub mod core;
pub mod adapters;
pub mod services;
pub mod api;
