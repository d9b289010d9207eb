// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod inspect;
pub mod serve;
