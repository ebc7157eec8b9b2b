//! In-process store used by tests and `LEAGUE_STORAGE=memory`.
//! Mirrors the Postgres constraints that the services rely on.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::store::{LeagueStore, ReportFilter};
use crate::lifecycle::{LineupStatus, MatchStatus, RegistrationStatus, ReviewStatus};
use crate::models::{
    Match, NewMatch, NewRegistration, NewSupervisorReport, Season, SeasonTeamRegistration,
    SupervisorReport,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    seasons: BTreeMap<i64, Season>,
    matches: BTreeMap<i64, Match>,
    registrations: BTreeMap<i64, SeasonTeamRegistration>,
    reports: BTreeMap<i64, SupervisorReport>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Writes `row` over the stored entry when versions match
fn compare_and_swap<T: Clone>(
    slot: Option<&mut T>,
    version_of: impl Fn(&T) -> i32,
    row: &T,
    stamp: impl FnOnce(&mut T),
) -> Option<T> {
    let stored = slot?;
    if version_of(&*stored) != version_of(row) {
        return None;
    }
    let mut next = row.clone();
    stamp(&mut next);
    *stored = next.clone();
    Some(next)
}

#[async_trait]
impl LeagueStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn insert_season(&self, name: &str, required_team_count: i32) -> Result<Season, DatabaseError> {
        let mut tables = self.tables.write().await;
        let season = Season {
            id: tables.next_id(),
            name: name.to_string(),
            required_team_count,
            created_at: Utc::now(),
        };
        tables.seasons.insert(season.id, season.clone());
        Ok(season)
    }

    async fn find_season(&self, id: i64) -> Result<Option<Season>, DatabaseError> {
        Ok(self.tables.read().await.seasons.get(&id).cloned())
    }

    async fn insert_match(&self, new: &NewMatch) -> Result<Match, DatabaseError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let row = Match {
            id: tables.next_id(),
            season_id: new.season_id,
            home_team_id: new.home_team_id,
            away_team_id: new.away_team_id,
            kickoff_at: new.kickoff_at,
            status: MatchStatus::Scheduled,
            home_score: None,
            away_score: None,
            main_referee_id: None,
            assistant_referee1_id: None,
            assistant_referee2_id: None,
            fourth_official_id: None,
            supervisor_id: None,
            home_lineup_status: LineupStatus::Pending,
            away_lineup_status: LineupStatus::Pending,
            home_lineup_rejection_reason: None,
            away_lineup_rejection_reason: None,
            status_note: None,
            status_changed_by: None,
            status_changed_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tables.matches.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_match(&self, id: i64) -> Result<Option<Match>, DatabaseError> {
        Ok(self.tables.read().await.matches.get(&id).cloned())
    }

    async fn list_matches(&self, season_id: i64) -> Result<Vec<Match>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .matches
            .values()
            .filter(|m| m.season_id == season_id)
            .cloned()
            .collect())
    }

    async fn update_match(&self, row: &Match) -> Result<Option<Match>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(compare_and_swap(
            tables.matches.get_mut(&row.id),
            |m| m.version,
            row,
            |m| {
                m.version += 1;
                m.updated_at = Utc::now();
            },
        ))
    }

    async fn insert_registration(
        &self,
        new: &NewRegistration,
    ) -> Result<SeasonTeamRegistration, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .registrations
            .values()
            .any(|r| r.season_id == new.season_id && r.team_id == new.team_id)
        {
            return Err(DatabaseError::Duplicate("season_team_registrations".to_string()));
        }

        let now = Utc::now();
        let row = SeasonTeamRegistration {
            id: tables.next_id(),
            season_id: new.season_id,
            team_id: new.team_id,
            status: RegistrationStatus::DraftInvite,
            submission_data: None,
            reviewer_note: None,
            reviewed_by: None,
            submitted_at: None,
            reviewed_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tables.registrations.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_registration(&self, id: i64) -> Result<Option<SeasonTeamRegistration>, DatabaseError> {
        Ok(self.tables.read().await.registrations.get(&id).cloned())
    }

    async fn list_registrations(&self, season_id: i64) -> Result<Vec<SeasonTeamRegistration>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .registrations
            .values()
            .filter(|r| r.season_id == season_id)
            .cloned()
            .collect())
    }

    async fn update_registration(
        &self,
        row: &SeasonTeamRegistration,
    ) -> Result<Option<SeasonTeamRegistration>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(compare_and_swap(
            tables.registrations.get_mut(&row.id),
            |r| r.version,
            row,
            |r| {
                r.version += 1;
                r.updated_at = Utc::now();
            },
        ))
    }

    async fn count_registrations(
        &self,
        season_id: i64,
    ) -> Result<Vec<(RegistrationStatus, i64)>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut counts: Vec<(RegistrationStatus, i64)> = Vec::new();
        for row in tables.registrations.values().filter(|r| r.season_id == season_id) {
            match counts.iter_mut().find(|(status, _)| *status == row.status) {
                Some((_, n)) => *n += 1,
                None => counts.push((row.status, 1)),
            }
        }
        Ok(counts)
    }

    async fn insert_report(&self, new: &NewSupervisorReport) -> Result<SupervisorReport, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .reports
            .values()
            .any(|r| r.match_id == new.match_id && r.supervisor_id == new.supervisor_id)
        {
            return Err(DatabaseError::Duplicate("supervisor_reports".to_string()));
        }

        let now = Utc::now();
        let row = SupervisorReport {
            id: tables.next_id(),
            match_id: new.match_id,
            supervisor_id: new.supervisor_id,
            referee_rating: new.input.referee_rating,
            assistant_referee_rating: new.input.assistant_referee_rating,
            organization_rating: new.input.organization_rating,
            incidents: new.input.incidents.clone(),
            disciplinary_flag: new.input.disciplinary_flag,
            review_status: ReviewStatus::Pending,
            review_note: None,
            reviewed_by: None,
            reviewed_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tables.reports.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_report(&self, id: i64) -> Result<Option<SupervisorReport>, DatabaseError> {
        Ok(self.tables.read().await.reports.get(&id).cloned())
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<SupervisorReport>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .values()
            .filter(|r| filter.match_id.map_or(true, |id| r.match_id == id))
            .filter(|r| filter.review_status.map_or(true, |s| r.review_status == s))
            .cloned()
            .collect())
    }

    async fn update_report(&self, row: &SupervisorReport) -> Result<Option<SupervisorReport>, DatabaseError> {
        let mut tables = self.tables.write().await;
        Ok(compare_and_swap(
            tables.reports.get_mut(&row.id),
            |r| r.version,
            row,
            |r| {
                r.version += 1;
                r.updated_at = Utc::now();
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stale_version_is_not_written() {
        let store = MemoryStore::new();
        let season = store.insert_season("2026", 2).await.unwrap();
        let row = store
            .insert_registration(&NewRegistration { season_id: season.id, team_id: 1 })
            .await
            .unwrap();

        let mut first = row.clone();
        first.status = RegistrationStatus::Invited;
        let written = store.update_registration(&first).await.unwrap().unwrap();
        assert_eq!(written.version, row.version + 1);

        let mut stale = row.clone();
        stale.status = RegistrationStatus::Rejected;
        assert!(store.update_registration(&stale).await.unwrap().is_none());

        let stored = store.find_registration(row.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RegistrationStatus::Invited);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = MemoryStore::new();
        let new = NewRegistration { season_id: 1, team_id: 4 };
        store.insert_registration(&new).await.unwrap();
        assert!(matches!(
            store.insert_registration(&new).await,
            Err(DatabaseError::Duplicate(_))
        ));
    }
}
