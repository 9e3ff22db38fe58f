#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use backoffice::auth::password;
use backoffice::config::Config;
use backoffice::db;
use backoffice::models::User;

pub const ALL_CAPABILITIES: &[&str] = &[
    "create-user",
    "read-user",
    "update-user",
    "delete-user",
    "show-user",
    "create-city",
    "read-city",
    "update-city",
    "delete-city",
    "show-city",
];

pub const TEST_PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Create a role carrying the given capabilities.
    pub async fn seed_role(&self, name: &str, capabilities: &[&str]) -> i64 {
        let role = db::roles::create(&self.pool, name)
            .await
            .expect("failed to create role");
        db::permissions::grant(&self.pool, role.id, capabilities)
            .await
            .expect("failed to grant capabilities");
        role.id
    }

    /// Create an active user with [`TEST_PASSWORD`], optionally bound to a role.
    pub async fn seed_user(
        &self,
        name: &str,
        username: &str,
        org_id: Option<i64>,
        role_id: Option<i64>,
    ) -> User {
        let pw_hash = password::hash(TEST_PASSWORD).expect("hash failed");
        let user = db::users::create(
            &self.pool,
            org_id,
            name,
            username,
            &format!("{username}@test.com"),
            None,
            &pw_hash,
        )
        .await
        .expect("failed to create user");

        if let Some(role_id) = role_id {
            let role = db::roles::find_by_id(&self.pool, role_id)
                .await
                .expect("role lookup failed")
                .expect("role missing");
            db::roles::sync_for_user(&self.pool, user.id, &role.name)
                .await
                .expect("role sync failed");
        }

        user
    }

    /// Seed an Admin role with every capability plus an admin user, and
    /// return the user with a fresh access token.
    pub async fn bootstrap_admin(&self) -> (User, String) {
        let role_id = self.seed_role("Admin", ALL_CAPABILITIES).await;
        let admin = self.seed_user("ZZ Admin", "admin", None, Some(role_id)).await;
        let token = self.token_for("admin").await;
        (admin, token)
    }

    /// Login and return the auth response body + status.
    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn token_for(&self, username: &str) -> String {
        let (body, status) = self.login(username, TEST_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Make an authenticated GET request, returning the raw response.
    pub async fn get_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed")
    }

    /// Make an authenticated form POST request.
    pub async fn post_form(
        &self,
        path: &str,
        token: &str,
        fields: &[(&str, &str)],
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .form(fields)
            .send()
            .await
            .expect("post request failed")
    }

    /// Make an authenticated form PUT request.
    pub async fn put_form(
        &self,
        path: &str,
        token: &str,
        fields: &[(&str, &str)],
    ) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .form(fields)
            .send()
            .await
            .expect("put request failed")
    }

    /// Make an authenticated DELETE request without a body.
    pub async fn delete_auth(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed")
    }

    /// Make an authenticated DELETE request with a JSON body.
    pub async fn delete_json(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("delete request failed")
    }
}

/// Spawn a test app with a fresh temporary database and the default page size.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_page_size(25).await
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app_with_page_size(page_size: i64) -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "backoffice_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        page_size,
        log_level: "warn".to_string(),
    };

    let app = backoffice::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
