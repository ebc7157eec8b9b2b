//! Test store that loses compare-and-swap races on request.
//!
//! Wraps `MemoryStore`. For every id passed to `contest`, the next `update_*`
//! of that row first rewrites the stored row unchanged (bumping its version),
//! so the caller's write goes in with a stale version.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::memory::MemoryStore;
use crate::database::store::{LeagueStore, ReportFilter};
use crate::lifecycle::RegistrationStatus;
use crate::models::{
    Match, NewMatch, NewRegistration, NewSupervisorReport, Season, SeasonTeamRegistration,
    SupervisorReport,
};

#[derive(Default)]
pub struct RacingStore {
    inner: MemoryStore,
    contested: Mutex<HashSet<i64>>,
}

impl RacingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write of row `id` lose to a competing writer
    pub fn contest(&self, id: i64) {
        self.contested.lock().expect("contested ids").insert(id);
    }

    fn take(&self, id: i64) -> bool {
        self.contested.lock().expect("contested ids").remove(&id)
    }
}

#[async_trait]
impl LeagueStore for RacingStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.inner.ping().await
    }

    async fn insert_season(&self, name: &str, required_team_count: i32) -> Result<Season, DatabaseError> {
        self.inner.insert_season(name, required_team_count).await
    }

    async fn find_season(&self, id: i64) -> Result<Option<Season>, DatabaseError> {
        self.inner.find_season(id).await
    }

    async fn insert_match(&self, new: &NewMatch) -> Result<Match, DatabaseError> {
        self.inner.insert_match(new).await
    }

    async fn find_match(&self, id: i64) -> Result<Option<Match>, DatabaseError> {
        self.inner.find_match(id).await
    }

    async fn list_matches(&self, season_id: i64) -> Result<Vec<Match>, DatabaseError> {
        self.inner.list_matches(season_id).await
    }

    async fn update_match(&self, row: &Match) -> Result<Option<Match>, DatabaseError> {
        if self.take(row.id) {
            if let Some(current) = self.inner.find_match(row.id).await? {
                self.inner.update_match(&current).await?;
            }
        }
        self.inner.update_match(row).await
    }

    async fn insert_registration(
        &self,
        new: &NewRegistration,
    ) -> Result<SeasonTeamRegistration, DatabaseError> {
        self.inner.insert_registration(new).await
    }

    async fn find_registration(&self, id: i64) -> Result<Option<SeasonTeamRegistration>, DatabaseError> {
        self.inner.find_registration(id).await
    }

    async fn list_registrations(&self, season_id: i64) -> Result<Vec<SeasonTeamRegistration>, DatabaseError> {
        self.inner.list_registrations(season_id).await
    }

    async fn update_registration(
        &self,
        row: &SeasonTeamRegistration,
    ) -> Result<Option<SeasonTeamRegistration>, DatabaseError> {
        if self.take(row.id) {
            if let Some(current) = self.inner.find_registration(row.id).await? {
                self.inner.update_registration(&current).await?;
            }
        }
        self.inner.update_registration(row).await
    }

    async fn count_registrations(
        &self,
        season_id: i64,
    ) -> Result<Vec<(RegistrationStatus, i64)>, DatabaseError> {
        self.inner.count_registrations(season_id).await
    }

    async fn insert_report(&self, new: &NewSupervisorReport) -> Result<SupervisorReport, DatabaseError> {
        self.inner.insert_report(new).await
    }

    async fn find_report(&self, id: i64) -> Result<Option<SupervisorReport>, DatabaseError> {
        self.inner.find_report(id).await
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<SupervisorReport>, DatabaseError> {
        self.inner.list_reports(filter).await
    }

    async fn update_report(&self, row: &SupervisorReport) -> Result<Option<SupervisorReport>, DatabaseError> {
        if self.take(row.id) {
            if let Some(current) = self.inner.find_report(row.id).await? {
                self.inner.update_report(&current).await?;
            }
        }
        self.inner.update_report(row).await
    }
}
