// データベースイントロスペクター
//
// 対象データベースからスキーマ情報を取得するための抽象化レイヤー。
// MySQLのINFORMATION_SCHEMAクエリを実装します。

use crate::adapters::database::{classify_query_error, DatabaseConnectionService};
use crate::adapters::type_mapping;
use crate::core::connection::ConnectionDescriptor;
use crate::core::error::IntrospectionError;
use crate::core::schema::{ColumnSchema, SchemaMap, TableSchema};
use async_trait::async_trait;
use sqlx::{MySqlConnection, Row};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// 生のカラム情報（DB固有フォーマット）
///
/// INFORMATION_SCHEMA.COLUMNS と KEY_COLUMN_USAGE の結合結果の1行。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawColumnInfo {
    /// カラム名
    pub name: String,
    /// データ型（DATA_TYPE）
    pub data_type: String,
    /// NULL許可フラグ
    pub is_nullable: bool,
    /// キー種別（PRI / UNI / MUL / 空）
    pub column_key: String,
    /// 追加情報（auto_increment 等）
    pub extra: String,
    /// 参照先テーブル
    pub referenced_table: Option<String>,
    /// 参照先カラム
    pub referenced_column: Option<String>,
}

/// データベーススキーマ取得インターフェース
///
/// 接続記述子を受け取り、正規化済みのスキーマを返します。
#[async_trait]
pub trait DatabaseIntrospector: Send + Sync {
    /// スキーマを取得
    async fn introspect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<SchemaMap, IntrospectionError>;
}

/// MySQL用イントロスペクター
#[derive(Debug, Clone, Default)]
pub struct MySqlIntrospector {
    connection_service: DatabaseConnectionService,
}

const TABLE_NAMES_SQL: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR) AS table_name
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ?
"#;

const COLUMNS_SQL: &str = r#"
    SELECT
        CAST(c.COLUMN_NAME AS CHAR) AS column_name,
        CAST(c.DATA_TYPE AS CHAR) AS data_type,
        CAST(c.IS_NULLABLE AS CHAR) AS is_nullable,
        CAST(c.COLUMN_KEY AS CHAR) AS column_key,
        CAST(c.EXTRA AS CHAR) AS extra,
        CAST(kcu.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name,
        CAST(kcu.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name
    FROM INFORMATION_SCHEMA.COLUMNS c
    LEFT JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
        ON c.TABLE_SCHEMA = kcu.TABLE_SCHEMA
        AND c.TABLE_NAME = kcu.TABLE_NAME
        AND c.COLUMN_NAME = kcu.COLUMN_NAME
        AND kcu.REFERENCED_TABLE_NAME IS NOT NULL
    WHERE c.TABLE_SCHEMA = ? AND c.TABLE_NAME = ?
    ORDER BY c.ORDINAL_POSITION
"#;

impl MySqlIntrospector {
    /// 新しいMySqlIntrospectorを作成
    pub fn new(connection_service: DatabaseConnectionService) -> Self {
        Self { connection_service }
    }

    /// テーブル名一覧を取得（カタログの返却順のまま）
    async fn get_table_names(
        &self,
        conn: &mut MySqlConnection,
        database: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows = sqlx::query(TABLE_NAMES_SQL)
            .bind(database)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(|row| row.try_get::<String, _>(0)).collect()
    }

    /// カラム情報を取得（ordinal position順）
    async fn get_columns(
        &self,
        conn: &mut MySqlConnection,
        database: &str,
        table_name: &str,
    ) -> Result<Vec<RawColumnInfo>, sqlx::Error> {
        let rows = sqlx::query(COLUMNS_SQL)
            .bind(database)
            .bind(table_name)
            .fetch_all(&mut *conn)
            .await?;

        rows.iter()
            .map(|row| -> Result<RawColumnInfo, sqlx::Error> {
                Ok(RawColumnInfo {
                    name: row.try_get(0)?,
                    data_type: row.try_get(1)?,
                    is_nullable: row.try_get::<String, _>(2)? == "YES",
                    column_key: row.try_get::<Option<String>, _>(3)?.unwrap_or_default(),
                    extra: row.try_get::<Option<String>, _>(4)?.unwrap_or_default(),
                    referenced_table: row.try_get(5)?,
                    referenced_column: row.try_get(6)?,
                })
            })
            .collect()
    }

    /// 接続済みのコネクションからスキーマ全体を読み取る
    async fn read_schema(
        &self,
        conn: &mut MySqlConnection,
        database: &str,
        descriptor: &ConnectionDescriptor,
    ) -> Result<SchemaMap, IntrospectionError> {
        let tables = self
            .get_table_names(conn, database)
            .await
            .map_err(|e| classify_query_error(&e, descriptor))?;

        info!(database = %database, tables = tables.len(), "Found tables");

        let mut schema = SchemaMap::new();
        if tables.is_empty() {
            warn!(database = %database, "No tables found in the database");
            return Ok(schema);
        }

        // 対象DBへの負荷を抑えるため、テーブルは逐次処理する
        for table_name in &tables {
            let columns = self
                .get_columns(conn, database, table_name)
                .await
                .map_err(|e| classify_query_error(&e, descriptor))?;

            debug!(table = %table_name, columns = columns.len(), "Processed table");

            schema.insert(build_table_schema(database, table_name, columns));
        }

        info!(database = %database, tables = schema.len(), "Schema extraction completed");
        Ok(schema)
    }
}

#[async_trait]
impl DatabaseIntrospector for MySqlIntrospector {
    async fn introspect(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<SchemaMap, IntrospectionError> {
        let database = descriptor
            .database
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| IntrospectionError::Failed {
                message: "No database specified in connection string".to_string(),
            })?;

        let mut conn = self.connection_service.connect(descriptor).await?;
        info!(target_db = %descriptor.target(), "Connected to database");

        // 成功・失敗にかかわらず接続を閉じてから結果を返す
        let result = self.read_schema(&mut conn, database, descriptor).await;
        self.connection_service.close(conn).await;

        result
    }
}

/// 生のカラム行からテーブル定義を組み立てる
///
/// 1カラムに複数の外部キー行が結合された場合は、最初の行のみを採用する。
pub fn build_table_schema(database: &str, table_name: &str, rows: Vec<RawColumnInfo>) -> TableSchema {
    let mut table = TableSchema::new(table_name, database);
    let mut seen = HashSet::new();

    for raw in rows {
        if !seen.insert(raw.name.clone()) {
            continue;
        }
        table.columns.push(to_column_schema(raw));
    }

    table
}

fn to_column_schema(raw: RawColumnInfo) -> ColumnSchema {
    let column = ColumnSchema::new(
        raw.name,
        type_mapping::normalize(&raw.data_type),
        raw.column_key == "PRI",
    );

    match (raw.referenced_table, raw.referenced_column) {
        (Some(table), Some(col)) => column.with_reference(table, col),
        _ => column,
    }
}
