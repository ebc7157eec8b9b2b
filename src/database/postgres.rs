use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::store::{LeagueStore, ReportFilter};
use crate::lifecycle::{RegistrationStatus, UnknownStatus};
use crate::models::{
    Match, NewMatch, NewRegistration, NewSupervisorReport, Season, SeasonTeamRegistration,
    SupervisorReport,
};

const MATCH_COLUMNS: &str = "id, season_id, home_team_id, away_team_id, kickoff_at, status, \
     home_score, away_score, main_referee_id, assistant_referee1_id, assistant_referee2_id, \
     fourth_official_id, supervisor_id, home_lineup_status, away_lineup_status, \
     home_lineup_rejection_reason, away_lineup_rejection_reason, status_note, \
     status_changed_by, status_changed_at, version, created_at, updated_at";

const REGISTRATION_COLUMNS: &str = "id, season_id, team_id, status, submission_data, \
     reviewer_note, reviewed_by, submitted_at, reviewed_at, version, created_at, updated_at";

const REPORT_COLUMNS: &str = "id, match_id, supervisor_id, referee_rating, \
     assistant_referee_rating, organization_rating, incidents, disciplinary_flag, \
     review_status, review_note, reviewed_by, reviewed_at, version, created_at, updated_at";

impl From<UnknownStatus> for DatabaseError {
    fn from(err: UnknownStatus) -> Self {
        DatabaseError::Decode(err.to_string())
    }
}

#[derive(FromRow)]
struct MatchRow {
    id: i64,
    season_id: i64,
    home_team_id: i64,
    away_team_id: i64,
    kickoff_at: DateTime<Utc>,
    status: String,
    home_score: Option<i32>,
    away_score: Option<i32>,
    main_referee_id: Option<i64>,
    assistant_referee1_id: Option<i64>,
    assistant_referee2_id: Option<i64>,
    fourth_official_id: Option<i64>,
    supervisor_id: Option<i64>,
    home_lineup_status: String,
    away_lineup_status: String,
    home_lineup_rejection_reason: Option<String>,
    away_lineup_rejection_reason: Option<String>,
    status_note: Option<String>,
    status_changed_by: Option<i64>,
    status_changed_at: Option<DateTime<Utc>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MatchRow> for Match {
    type Error = DatabaseError;

    fn try_from(r: MatchRow) -> Result<Self, Self::Error> {
        Ok(Match {
            id: r.id,
            season_id: r.season_id,
            home_team_id: r.home_team_id,
            away_team_id: r.away_team_id,
            kickoff_at: r.kickoff_at,
            status: r.status.parse()?,
            home_score: r.home_score,
            away_score: r.away_score,
            main_referee_id: r.main_referee_id,
            assistant_referee1_id: r.assistant_referee1_id,
            assistant_referee2_id: r.assistant_referee2_id,
            fourth_official_id: r.fourth_official_id,
            supervisor_id: r.supervisor_id,
            home_lineup_status: r.home_lineup_status.parse()?,
            away_lineup_status: r.away_lineup_status.parse()?,
            home_lineup_rejection_reason: r.home_lineup_rejection_reason,
            away_lineup_rejection_reason: r.away_lineup_rejection_reason,
            status_note: r.status_note,
            status_changed_by: r.status_changed_by,
            status_changed_at: r.status_changed_at,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct RegistrationRow {
    id: i64,
    season_id: i64,
    team_id: i64,
    status: String,
    submission_data: Option<Value>,
    reviewer_note: Option<String>,
    reviewed_by: Option<i64>,
    submitted_at: Option<DateTime<Utc>>,
    reviewed_at: Option<DateTime<Utc>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for SeasonTeamRegistration {
    type Error = DatabaseError;

    fn try_from(r: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(SeasonTeamRegistration {
            id: r.id,
            season_id: r.season_id,
            team_id: r.team_id,
            status: r.status.parse()?,
            submission_data: r.submission_data,
            reviewer_note: r.reviewer_note,
            reviewed_by: r.reviewed_by,
            submitted_at: r.submitted_at,
            reviewed_at: r.reviewed_at,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ReportRow {
    id: i64,
    match_id: i64,
    supervisor_id: i64,
    referee_rating: i32,
    assistant_referee_rating: i32,
    organization_rating: i32,
    incidents: String,
    disciplinary_flag: bool,
    review_status: String,
    review_note: Option<String>,
    reviewed_by: Option<i64>,
    reviewed_at: Option<DateTime<Utc>>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for SupervisorReport {
    type Error = DatabaseError;

    fn try_from(r: ReportRow) -> Result<Self, Self::Error> {
        Ok(SupervisorReport {
            id: r.id,
            match_id: r.match_id,
            supervisor_id: r.supervisor_id,
            referee_rating: r.referee_rating,
            assistant_referee_rating: r.assistant_referee_rating,
            organization_rating: r.organization_rating,
            incidents: r.incidents,
            disciplinary_flag: r.disciplinary_flag,
            review_status: r.review_status.parse()?,
            review_note: r.review_note,
            reviewed_by: r.reviewed_by,
            reviewed_at: r.reviewed_at,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DatabaseError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Postgres-backed store; all statements are parameterized
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeagueStore for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn insert_season(&self, name: &str, required_team_count: i32) -> Result<Season, DatabaseError> {
        let season = sqlx::query_as::<_, Season>(
            "INSERT INTO seasons (name, required_team_count) VALUES ($1, $2) \
             RETURNING id, name, required_team_count, created_at",
        )
        .bind(name)
        .bind(required_team_count)
        .fetch_one(&self.pool)
        .await?;
        Ok(season)
    }

    async fn find_season(&self, id: i64) -> Result<Option<Season>, DatabaseError> {
        let season = sqlx::query_as::<_, Season>(
            "SELECT id, name, required_team_count, created_at FROM seasons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(season)
    }

    async fn insert_match(&self, new: &NewMatch) -> Result<Match, DatabaseError> {
        let sql = format!(
            "INSERT INTO matches (season_id, home_team_id, away_team_id, kickoff_at) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            MATCH_COLUMNS
        );
        let row = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(new.season_id)
            .bind(new.home_team_id)
            .bind(new.away_team_id)
            .bind(new.kickoff_at)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn find_match(&self, id: i64) -> Result<Option<Match>, DatabaseError> {
        let sql = format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS);
        let row = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Match::try_from).transpose()
    }

    async fn list_matches(&self, season_id: i64) -> Result<Vec<Match>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM matches WHERE season_id = $1 ORDER BY kickoff_at, id",
            MATCH_COLUMNS
        );
        let rows = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(season_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_match(&self, m: &Match) -> Result<Option<Match>, DatabaseError> {
        let sql = format!(
            "UPDATE matches SET status = $3, home_score = $4, away_score = $5, \
             main_referee_id = $6, assistant_referee1_id = $7, assistant_referee2_id = $8, \
             fourth_official_id = $9, supervisor_id = $10, home_lineup_status = $11, \
             away_lineup_status = $12, home_lineup_rejection_reason = $13, \
             away_lineup_rejection_reason = $14, status_note = $15, status_changed_by = $16, \
             status_changed_at = $17, version = version + 1, updated_at = now() \
             WHERE id = $1 AND version = $2 RETURNING {}",
            MATCH_COLUMNS
        );
        let row = sqlx::query_as::<_, MatchRow>(&sql)
            .bind(m.id)
            .bind(m.version)
            .bind(m.status.as_str())
            .bind(m.home_score)
            .bind(m.away_score)
            .bind(m.main_referee_id)
            .bind(m.assistant_referee1_id)
            .bind(m.assistant_referee2_id)
            .bind(m.fourth_official_id)
            .bind(m.supervisor_id)
            .bind(m.home_lineup_status.as_str())
            .bind(m.away_lineup_status.as_str())
            .bind(&m.home_lineup_rejection_reason)
            .bind(&m.away_lineup_rejection_reason)
            .bind(&m.status_note)
            .bind(m.status_changed_by)
            .bind(m.status_changed_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Match::try_from).transpose()
    }

    async fn insert_registration(
        &self,
        new: &NewRegistration,
    ) -> Result<SeasonTeamRegistration, DatabaseError> {
        let sql = format!(
            "INSERT INTO season_team_registrations (season_id, team_id, status) \
             VALUES ($1, $2, $3) RETURNING {}",
            REGISTRATION_COLUMNS
        );
        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(new.season_id)
            .bind(new.team_id)
            .bind(RegistrationStatus::DraftInvite.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, "season_team_registrations"))?;
        row.try_into()
    }

    async fn find_registration(&self, id: i64) -> Result<Option<SeasonTeamRegistration>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM season_team_registrations WHERE id = $1",
            REGISTRATION_COLUMNS
        );
        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SeasonTeamRegistration::try_from).transpose()
    }

    async fn list_registrations(&self, season_id: i64) -> Result<Vec<SeasonTeamRegistration>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM season_team_registrations WHERE season_id = $1 ORDER BY id",
            REGISTRATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(season_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_registration(
        &self,
        r: &SeasonTeamRegistration,
    ) -> Result<Option<SeasonTeamRegistration>, DatabaseError> {
        let sql = format!(
            "UPDATE season_team_registrations SET status = $3, submission_data = $4, \
             reviewer_note = $5, reviewed_by = $6, submitted_at = $7, reviewed_at = $8, \
             version = version + 1, updated_at = now() \
             WHERE id = $1 AND version = $2 RETURNING {}",
            REGISTRATION_COLUMNS
        );
        let row = sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(r.id)
            .bind(r.version)
            .bind(r.status.as_str())
            .bind(&r.submission_data)
            .bind(&r.reviewer_note)
            .bind(r.reviewed_by)
            .bind(r.submitted_at)
            .bind(r.reviewed_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SeasonTeamRegistration::try_from).transpose()
    }

    async fn count_registrations(
        &self,
        season_id: i64,
    ) -> Result<Vec<(RegistrationStatus, i64)>, DatabaseError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM season_team_registrations \
             WHERE season_id = $1 GROUP BY status",
        )
        .bind(season_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| {
                Ok::<_, DatabaseError>((status.parse::<RegistrationStatus>()?, count))
            })
            .collect()
    }

    async fn insert_report(&self, new: &NewSupervisorReport) -> Result<SupervisorReport, DatabaseError> {
        let sql = format!(
            "INSERT INTO supervisor_reports (match_id, supervisor_id, referee_rating, \
             assistant_referee_rating, organization_rating, incidents, disciplinary_flag) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            REPORT_COLUMNS
        );
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(new.match_id)
            .bind(new.supervisor_id)
            .bind(new.input.referee_rating)
            .bind(new.input.assistant_referee_rating)
            .bind(new.input.organization_rating)
            .bind(&new.input.incidents)
            .bind(new.input.disciplinary_flag)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, "supervisor_reports"))?;
        row.try_into()
    }

    async fn find_report(&self, id: i64) -> Result<Option<SupervisorReport>, DatabaseError> {
        let sql = format!("SELECT {} FROM supervisor_reports WHERE id = $1", REPORT_COLUMNS);
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SupervisorReport::try_from).transpose()
    }

    async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<SupervisorReport>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM supervisor_reports \
             WHERE ($1::BIGINT IS NULL OR match_id = $1) \
             AND ($2::TEXT IS NULL OR review_status = $2) \
             ORDER BY id",
            REPORT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(filter.match_id)
            .bind(filter.review_status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_report(&self, r: &SupervisorReport) -> Result<Option<SupervisorReport>, DatabaseError> {
        let sql = format!(
            "UPDATE supervisor_reports SET referee_rating = $3, assistant_referee_rating = $4, \
             organization_rating = $5, incidents = $6, disciplinary_flag = $7, \
             review_status = $8, review_note = $9, reviewed_by = $10, reviewed_at = $11, \
             version = version + 1, updated_at = now() \
             WHERE id = $1 AND version = $2 RETURNING {}",
            REPORT_COLUMNS
        );
        let row = sqlx::query_as::<_, ReportRow>(&sql)
            .bind(r.id)
            .bind(r.version)
            .bind(r.referee_rating)
            .bind(r.assistant_referee_rating)
            .bind(r.organization_rating)
            .bind(&r.incidents)
            .bind(r.disciplinary_flag)
            .bind(r.review_status.as_str())
            .bind(&r.review_note)
            .bind(r.reviewed_by)
            .bind(r.reviewed_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(SupervisorReport::try_from).transpose()
    }
}
