/// REST API統合テスト
///
/// ルーターを 127.0.0.1:0 で起動し、reqwestでHTTP経由の振る舞いを検証します。
/// スキーマ取得はフェイクのイントロスペクターで置き換えるため、Dockerは不要です。

#[cfg(test)]
mod api_tests {
    use async_trait::async_trait;
    use dbchat::adapters::connection_store::InMemoryConnectionStore;
    use dbchat::adapters::database_introspector::DatabaseIntrospector;
    use dbchat::adapters::workspace_directory::InMemoryWorkspaceDirectory;
    use dbchat::api::{self, AppState};
    use dbchat::core::connection::ConnectionDescriptor;
    use dbchat::core::error::IntrospectionError;
    use dbchat::core::schema::{CanonicalType, ColumnSchema, SchemaMap, TableSchema};
    use dbchat::services::connection_registry::ConnectionRegistry;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;

    /// ホスト名で振る舞いを切り替えるイントロスペクター
    struct HostDrivenIntrospector;

    #[async_trait]
    impl DatabaseIntrospector for HostDrivenIntrospector {
        async fn introspect(
            &self,
            descriptor: &ConnectionDescriptor,
        ) -> Result<SchemaMap, IntrospectionError> {
            match descriptor.host.as_str() {
                "unreachable" => Err(IntrospectionError::ConnectionRefused {
                    host: descriptor.host.clone(),
                    port: descriptor.port,
                    cause: "Connection refused".to_string(),
                }),
                "badauth" => Err(IntrospectionError::AuthenticationFailed {
                    cause: "Access denied for user".to_string(),
                }),
                _ => {
                    let database = descriptor.database.clone().unwrap_or_default();
                    let mut lines = TableSchema::new("productlines", &database);
                    lines
                        .columns
                        .push(ColumnSchema::new("productLine", CanonicalType::Varchar, true));

                    let mut products = TableSchema::new("products", &database);
                    products
                        .columns
                        .push(ColumnSchema::new("productCode", CanonicalType::Varchar, true));
                    products.columns.push(
                        ColumnSchema::new("productLine", CanonicalType::Varchar, false)
                            .with_reference("productlines", "productLine"),
                    );

                    Ok([lines, products].into_iter().collect())
                }
            }
        }
    }

    /// テスト用サーバーを起動してベースURLを返す
    async fn spawn_server() -> String {
        let directory = InMemoryWorkspaceDirectory::new();
        directory.add_member("team", "alice", true);
        directory.add_member("team", "bob", false);
        directory.add_member("other", "mallory", false);

        let registry = ConnectionRegistry::new(
            Arc::new(InMemoryConnectionStore::new()),
            Arc::new(directory),
            Arc::new(HostDrivenIntrospector),
        );
        let app = api::router(
            AppState::new(registry),
            &["http://localhost:3000".to_string()],
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    async fn create(
        client: &reqwest::Client,
        base: &str,
        workspace: &str,
        user: &str,
        name: &str,
        connection_string: &str,
    ) -> (StatusCode, Value) {
        let response = client
            .post(format!("{}/connections/{}/create", base, workspace))
            .header("X-User-Id", user)
            .json(&json!({
                "name": name,
                "config": { "connectionString": connection_string }
            }))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_server().await;
        let body = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_create_list_and_fetch_schema() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let (status, created) = create(
            &client,
            &base,
            "team",
            "alice",
            "Classic",
            "mysql://u:p@db:3306/classicmodels",
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["name"], "Classic");
        assert_eq!(created["driver"], "mysql");
        assert_eq!(created["workspaceId"], "team");
        assert_eq!(created["hasSchema"], true);
        assert!(created.get("createdAt").is_some());
        assert!(created.get("dbSchema").is_none());

        let listed: Value = client
            .get(format!("{}/connections/workspace/team", base))
            .header("X-User-Id", "bob")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);
        assert_eq!(listed[0]["id"], created["id"]);

        let id = created["id"].as_str().unwrap();
        let response = client
            .get(format!("{}/connections/{}/schema", base, id))
            .header("X-User-Id", "bob")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let schema: Value = response.json().await.unwrap();

        let keys: Vec<&String> = schema.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["classicmodels.productlines", "classicmodels.products"]);
        let fk = &schema["classicmodels.products"]["columns"][1];
        assert_eq!(fk["name"], "productLine");
        assert_eq!(fk["type"], "varchar");
        assert_eq!(fk["isPrimary"], false);
        assert_eq!(fk["referenceTable"], "productlines");
        assert_eq!(fk["referenceColumn"], "productLine");

        let summary: Value = client
            .get(format!("{}/connections/{}", base, id))
            .header("X-User-Id", "alice")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(summary["tableCount"], 2);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let (status, body) = create(&client, &base, "team", "alice", "bad", "postgres://h/db").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MALFORMED_CONNECTION_STRING");

        let (status, body) =
            create(&client, &base, "team", "mallory", "x", "mysql://db/app").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (status, body) =
            create(&client, &base, "nowhere", "alice", "x", "mysql://db/app").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "WORKSPACE_NOT_FOUND");

        let (status, body) =
            create(&client, &base, "team", "alice", "x", "mysql://unreachable/app").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "CONNECTION_REFUSED");

        let (status, body) =
            create(&client, &base, "team", "alice", "x", "mysql://badauth/app").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "AUTHENTICATION_FAILED");

        // 失敗した作成は何も保存しない
        let listed: Value = client
            .get(format!("{}/connections/workspace/team", base))
            .header("X-User-Id", "alice")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert!(listed.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_return_conflict() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let (status, _) = create(&client, &base, "team", "alice", "prod", "mysql://db/a").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = create(&client, &base, "team", "alice", "prod", "mysql://db/b").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE_CONNECTION");

        let (status, _) = create(&client, &base, "team", "bob", "copy", "mysql://db/a").await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_schema_access_rules() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let (_, created) = create(&client, &base, "team", "alice", "prod", "mysql://db/a").await;
        let id = created["id"].as_str().unwrap();

        let response = client
            .get(format!("{}/connections/{}/schema", base, id))
            .header("X-User-Id", "mallory")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = client
            .get(format!("{}/connections/{}/schema", base, uuid::Uuid::new_v4()))
            .header("X-User-Id", "alice")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = client
            .get(format!("{}/connections/{}/schema", base, id))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }
}
