// スキーマモデル
//
// イントロスペクション結果を表す正規化済みのスキーマ表現。
// JSONの形はチャットUI/クエリアシスタントが消費する既存のAPIと互換です。

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 正規化済みカラム型
///
/// ベンダー固有の型名を少数の語彙にまとめたもの。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    Int,
    Decimal,
    Varchar,
    Datetime,
    Binary,
    Boolean,
    Json,
}

impl CanonicalType {
    /// 型名の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::Int => "int",
            CanonicalType::Decimal => "decimal",
            CanonicalType::Varchar => "varchar",
            CanonicalType::Datetime => "datetime",
            CanonicalType::Binary => "binary",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Json => "json",
        }
    }
}

impl std::fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// カラム定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSchema {
    /// カラム名
    pub name: String,

    /// 正規化済みの型
    #[serde(rename = "type")]
    pub column_type: CanonicalType,

    /// 主キーの一部かどうか
    #[serde(default)]
    pub is_primary: bool,

    /// 参照先テーブル（外部キーの場合）
    #[serde(default)]
    pub reference_table: Option<String>,

    /// 参照先カラム（外部キーの場合）
    #[serde(default)]
    pub reference_column: Option<String>,
}

impl ColumnSchema {
    /// 外部キーを持たないカラムを作成
    pub fn new(name: impl Into<String>, column_type: CanonicalType, is_primary: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_primary,
            reference_table: None,
            reference_column: None,
        }
    }

    /// 外部キー参照を設定
    ///
    /// 参照先テーブルとカラムは常にペアで設定される。
    pub fn with_reference(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.reference_table = Some(table.into());
        self.reference_column = Some(column.into());
        self
    }

    /// 外部キー参照を持つかどうか
    pub fn is_foreign_key(&self) -> bool {
        self.reference_table.is_some() && self.reference_column.is_some()
    }
}

/// テーブル定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// テーブル名
    pub name: String,

    /// テーブルが属するデータベース名
    #[serde(alias = "database_schema")]
    pub schema_name: String,

    /// カラム一覧（カタログのordinal position順）
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    /// 新しいテーブル定義を作成
    pub fn new(name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_name: schema_name.into(),
            columns: Vec::new(),
        }
    }

    /// SchemaMapのキー（`{schemaName}.{tableName}`）
    pub fn key(&self) -> String {
        format!("{}.{}", self.schema_name, self.name)
    }

    /// カラム名で検索
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// スキーマスナップショット
///
/// キーは `{schemaName}.{tableName}`、挿入順はカタログの列挙順。
/// 空のマップは「テーブルが0件」を意味し、失敗とは区別される。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaMap {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaMap {
    /// 空のスキーマを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// テーブルを追加（キーはテーブルから導出）
    ///
    /// 同じキーが既にある場合は置き換え、元の位置を保つ。
    pub fn insert(&mut self, table: TableSchema) -> Option<TableSchema> {
        self.tables.insert(table.key(), table)
    }

    /// キーで取得
    pub fn get(&self, key: &str) -> Option<&TableSchema> {
        self.tables.get(key)
    }

    /// テーブル数
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// キーの一覧（挿入順）
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.tables.keys()
    }
}

impl FromIterator<TableSchema> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = TableSchema>>(iter: I) -> Self {
        let mut schema = SchemaMap::new();
        for table in iter {
            schema.insert(table);
        }
        schema
    }
}
