// 型マッピング
//
// MySQLのネイティブ型名（INFORMATION_SCHEMA.COLUMNS.DATA_TYPE）を
// CanonicalType に正規化する。全域関数で、失敗しない。

use crate::core::schema::CanonicalType;

/// ネイティブ型名 → 正規化型 の対応表
///
/// 新しい型の追加はこの表に1行足すだけでよい。
const NATIVE_TYPE_TABLE: &[(&str, CanonicalType)] = &[
    // 整数型
    ("tinyint", CanonicalType::Int),
    ("smallint", CanonicalType::Int),
    ("mediumint", CanonicalType::Int),
    ("int", CanonicalType::Int),
    ("integer", CanonicalType::Int),
    ("bigint", CanonicalType::Int),
    // 数値型
    ("decimal", CanonicalType::Decimal),
    ("numeric", CanonicalType::Decimal),
    ("float", CanonicalType::Decimal),
    ("double", CanonicalType::Decimal),
    ("real", CanonicalType::Decimal),
    // 文字列型
    ("char", CanonicalType::Varchar),
    ("varchar", CanonicalType::Varchar),
    ("text", CanonicalType::Varchar),
    ("tinytext", CanonicalType::Varchar),
    ("mediumtext", CanonicalType::Varchar),
    ("longtext", CanonicalType::Varchar),
    // 日付/時刻型
    ("date", CanonicalType::Datetime),
    ("time", CanonicalType::Datetime),
    ("datetime", CanonicalType::Datetime),
    ("timestamp", CanonicalType::Datetime),
    ("year", CanonicalType::Datetime),
    // バイナリ型
    ("binary", CanonicalType::Binary),
    ("varbinary", CanonicalType::Binary),
    ("blob", CanonicalType::Binary),
    ("tinyblob", CanonicalType::Binary),
    ("mediumblob", CanonicalType::Binary),
    ("longblob", CanonicalType::Binary),
    // 真偽値
    ("boolean", CanonicalType::Boolean),
    ("bool", CanonicalType::Boolean),
    // JSON
    ("json", CanonicalType::Json),
];

/// 未知の型のフォールバック
pub const FALLBACK_TYPE: CanonicalType = CanonicalType::Varchar;

/// ネイティブ型名を正規化
///
/// 大文字小文字は区別しない。対応表にない型は `varchar` を返す。
pub fn normalize(native_type: &str) -> CanonicalType {
    let lowered = native_type.trim().to_lowercase();
    NATIVE_TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(FALLBACK_TYPE)
}
