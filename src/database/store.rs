use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::lifecycle::{RegistrationStatus, ReviewStatus};
use crate::models::{
    Match, NewMatch, NewRegistration, NewSupervisorReport, Season, SeasonTeamRegistration,
    SupervisorReport,
};

/// Optional filters for report listings
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub match_id: Option<i64>,
    pub review_status: Option<ReviewStatus>,
}

/// Persistence seam for the league services.
///
/// `update_*` methods are compare-and-swap on `version`: the row is written
/// only if its stored version still equals the version of the value passed
/// in. On success the stored version is bumped and the fresh row returned;
/// `None` means the row is gone or someone else wrote it first.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn insert_season(&self, name: &str, required_team_count: i32) -> Result<Season, DatabaseError>;
    async fn find_season(&self, id: i64) -> Result<Option<Season>, DatabaseError>;

    async fn insert_match(&self, new: &NewMatch) -> Result<Match, DatabaseError>;
    async fn find_match(&self, id: i64) -> Result<Option<Match>, DatabaseError>;
    async fn list_matches(&self, season_id: i64) -> Result<Vec<Match>, DatabaseError>;
    async fn update_match(&self, row: &Match) -> Result<Option<Match>, DatabaseError>;

    async fn insert_registration(
        &self,
        new: &NewRegistration,
    ) -> Result<SeasonTeamRegistration, DatabaseError>;
    async fn find_registration(&self, id: i64) -> Result<Option<SeasonTeamRegistration>, DatabaseError>;
    async fn list_registrations(&self, season_id: i64) -> Result<Vec<SeasonTeamRegistration>, DatabaseError>;
    async fn update_registration(
        &self,
        row: &SeasonTeamRegistration,
    ) -> Result<Option<SeasonTeamRegistration>, DatabaseError>;
    async fn count_registrations(
        &self,
        season_id: i64,
    ) -> Result<Vec<(RegistrationStatus, i64)>, DatabaseError>;

    async fn insert_report(&self, new: &NewSupervisorReport) -> Result<SupervisorReport, DatabaseError>;
    async fn find_report(&self, id: i64) -> Result<Option<SupervisorReport>, DatabaseError>;
    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<SupervisorReport>, DatabaseError>;
    async fn update_report(&self, row: &SupervisorReport) -> Result<Option<SupervisorReport>, DatabaseError>;
}
