#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use league_api::auth::{generate_jwt, Claims};
use league_api::config::AppConfig;
use league_api::database::MemoryStore;
use league_api::services::AuditLog;
use league_api::state::AppState;

pub const SECRET: &str = "integration-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    /// Starts the real router over a fresh in-memory store on an unused port
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::from_env()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(Arc::new(MemoryStore::new()), SECRET, 2, AuditLog::new(true));
        let app = league_api::app(state, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request as `token` and returns the status with the parsed body
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = self.client.request(method, self.url(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.call(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.call(Method::POST, path, token, Some(body)).await
    }

    /// Creates a season as admin and returns its id
    pub async fn season(&self, required_team_count: i64) -> Result<i64> {
        let (status, body) = self
            .post(
                "/seasons",
                &admin(),
                json!({"name": "Test season", "requiredTeamCount": required_team_count}),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "season create failed: {}", body);
        id_of(&body)
    }
}

pub fn token(user_id: i64, roles: &[&str], team_ids: &[i64]) -> String {
    let claims = Claims::new(
        user_id,
        roles.iter().map(|r| r.to_string()).collect(),
        vec![],
        team_ids.to_vec(),
        1,
    )
    .expect("test claims");
    generate_jwt(&claims, SECRET).expect("test token")
}

pub fn admin() -> String {
    token(1, &["admin"], &[])
}

pub fn id_of(body: &Value) -> Result<i64> {
    body["data"]["id"].as_i64().context("response has no data.id")
}
