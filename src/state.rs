use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, StorageBackend};
use crate::database::{DatabaseManager, LeagueStore, MemoryStore, PgStore};
use crate::services::{AuditLog, MatchService, RegistrationService, ReportService, SeasonService};

/// Shared handler state: the store and the services built on top of it
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeagueStore>,
    pub seasons: SeasonService,
    pub matches: MatchService,
    pub registrations: RegistrationService,
    pub reports: ReportService,
    jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn LeagueStore>,
        jwt_secret: impl Into<Arc<str>>,
        default_required_team_count: i32,
        audit: AuditLog,
    ) -> Self {
        Self {
            seasons: SeasonService::new(store.clone(), default_required_team_count),
            matches: MatchService::new(store.clone(), audit),
            registrations: RegistrationService::new(store.clone(), audit),
            reports: ReportService::new(store.clone(), audit),
            store,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Opens the configured backend and wires the services onto it
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.security.jwt_secret.is_empty() {
            anyhow::bail!("JWT_SECRET must be set outside development");
        }

        let store: Arc<dyn LeagueStore> = match config.league.storage {
            StorageBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.database)
                    .await
                    .context("failed to connect to Postgres")?;
                Arc::new(PgStore::new(pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(
            store,
            config.security.jwt_secret.as_str(),
            config.league.default_required_team_count,
            AuditLog::new(config.security.enable_audit_logging),
        ))
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
